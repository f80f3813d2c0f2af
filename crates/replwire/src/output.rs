use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use replwire_session::{ShellMessage, WireMessage};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

pub fn print_message(msg: &ShellMessage, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let wire = msg
                .to_wire()
                .unwrap_or_else(|_| serde_json::json!({"status": msg.status()}));
            println!(
                "{}",
                serde_json::to_string(&wire).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["STATUS", "PAYLOAD"])
                .add_row(vec![msg.status().to_string(), summary(msg)]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("status={} {}", msg.status(), summary(msg));
        }
        OutputFormat::Raw => match msg {
            // Shell output goes to the terminal verbatim.
            ShellMessage::ShellOutput(out) => print_raw(out.output.as_bytes()),
            other => {
                let wire = other
                    .to_wire()
                    .unwrap_or_else(|_| serde_json::json!({"status": other.status()}));
                println!("{wire}");
            }
        },
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn summary(msg: &ShellMessage) -> String {
    match msg {
        ShellMessage::InputRequest(m) => format!("prompt={:?}", m.prompt),
        ShellMessage::InputResponse(m) => format!("input={:?}", m.input),
        ShellMessage::CompletionRequest(m) => {
            format!("line={:?} prefix={:?}", m.line, m.prefix)
        }
        ShellMessage::CompletionResponse(m) => {
            format!("completions={}", m.completions.join(", "))
        }
        ShellMessage::ShellOutput(m) => m.output.clone(),
    }
}
