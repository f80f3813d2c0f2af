use std::os::unix::net::{UnixListener, UnixStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use replwire_session::{
    protocol, CompletionResponse, Session, SessionError, ShellMessage, ShellOutput, WireMessage,
};
use tracing::{debug, info, warn};

use crate::cmd::ServeArgs;
use crate::exit::{io_error, session_error, CliError, CliResult, SUCCESS};
use crate::output::OutputFormat;

/// Commands the demo responder offers completions for.
const COMPLETION_CANDIDATES: &[&str] = &["exit", "export", "echo", "env", "help", "history"];

pub fn run(args: ServeArgs, _format: OutputFormat) -> CliResult<i32> {
    let listener = UnixListener::bind(&args.path)
        .map_err(|err| io_error(&format!("bind {} failed", args.path.display()), err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    info!(path = %args.path.display(), "serving sessions");

    let mut served = 0usize;
    while running.load(Ordering::SeqCst) {
        let (stream, _addr) = match listener.accept() {
            Ok(conn) => conn,
            Err(err) => return Err(io_error("accept failed", err)),
        };

        serve_connection(stream, &running)?;
        served = served.saturating_add(1);

        if let Some(connections) = args.connections {
            if served >= connections {
                break;
            }
        }
    }

    let _ = std::fs::remove_file(&args.path);
    Ok(SUCCESS)
}

fn serve_connection(stream: UnixStream, running: &Arc<AtomicBool>) -> CliResult<()> {
    let registry = protocol::registry().map_err(|err| session_error("registry", err))?;
    let mut session = Session::new(stream, registry);
    debug!("session opened");

    while running.load(Ordering::SeqCst) {
        // Non-blocking receive so Ctrl-C is observed once per poll cycle.
        let msg = match session.recv_message(false) {
            Ok(Some(msg)) => msg,
            Ok(None) => continue,
            Err(SessionError::ConnectionClosed) => {
                info!("peer closed session");
                return Ok(());
            }
            Err(SessionError::InvalidMessage(reason)) => {
                // Recoverable: the bad frame is gone, keep serving.
                warn!(%reason, "skipping invalid message");
                continue;
            }
            Err(err) => return Err(session_error("receive failed", err)),
        };

        if let Some(reply) = respond(&msg) {
            if let Err(err) = session.send_message(&reply) {
                if matches!(err, SessionError::ConnectionClosed) {
                    info!("peer closed session");
                    return Ok(());
                }
                return Err(session_error("send failed", err));
            }
        }
    }

    Ok(())
}

fn respond(msg: &ShellMessage) -> Option<ShellMessage> {
    match msg {
        ShellMessage::InputResponse(input) => Some(ShellMessage::ShellOutput(ShellOutput {
            output: format!("{}\n", input.input),
        })),
        ShellMessage::CompletionRequest(req) => {
            let completions = COMPLETION_CANDIDATES
                .iter()
                .filter(|candidate| candidate.starts_with(req.prefix.as_str()))
                .map(|candidate| candidate.to_string())
                .collect();
            Some(ShellMessage::CompletionResponse(CompletionResponse {
                completions,
            }))
        }
        other => {
            debug!(status = other.status(), "ignoring message");
            None
        }
    }
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
