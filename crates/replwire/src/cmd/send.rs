use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use replwire_session::{protocol, InputResponse, Session, SessionError, ShellMessage};
use tracing::debug;

use crate::cmd::SendArgs;
use crate::exit::{io_error, session_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_message, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let wait_timeout = parse_duration(&args.wait_timeout)?;

    let stream = UnixStream::connect(&args.path)
        .map_err(|err| io_error(&format!("connect {} failed", args.path.display()), err))?;
    let registry = protocol::registry().map_err(|err| session_error("registry", err))?;
    let mut session = Session::new(stream, registry);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    match resolve_payload(&args)? {
        Payload::Message(msg) => session
            .send_message(&msg)
            .map_err(|err| session_error("send failed", err))?,
        Payload::Wire(wire) => session
            .send_value(&wire)
            .map_err(|err| session_error("send failed", err))?,
    }
    debug!("message sent");

    if args.wait {
        let msg = wait_for_response(&mut session, wait_timeout, &running)
            .map_err(|err| session_error("receive failed", err))?;
        print_message(&msg, format);
    }

    Ok(SUCCESS)
}

#[derive(Debug)]
enum Payload {
    Message(ShellMessage),
    Wire(serde_json::Value),
}

fn resolve_payload(args: &SendArgs) -> CliResult<Payload> {
    if let Some(json) = &args.json {
        let wire: serde_json::Value = serde_json::from_str(json)
            .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")))?;
        if !wire.is_object() {
            return Err(CliError::new(USAGE, "--json must be a JSON object"));
        }
        return Ok(Payload::Wire(wire));
    }
    if let Some(input) = &args.input {
        return Ok(Payload::Message(ShellMessage::InputResponse(
            InputResponse {
                input: input.clone(),
            },
        )));
    }
    Err(CliError::new(USAGE, "one of --input or --json is required"))
}

/// Poll for a response without ever blocking past the shutdown flag:
/// each pass is one bounded non-blocking receive.
fn wait_for_response(
    session: &mut Session<UnixStream, ShellMessage>,
    timeout: Duration,
    running: &Arc<AtomicBool>,
) -> Result<ShellMessage, SessionError> {
    let deadline = Instant::now() + timeout;
    loop {
        if !running.load(Ordering::SeqCst) {
            return Err(SessionError::Interrupted);
        }
        if let Some(msg) = session.recv_message(false)? {
            return Ok(msg);
        }
        if Instant::now() >= deadline {
            return Err(SessionError::Io(std::io::Error::from(
                std::io::ErrorKind::TimedOut,
            )));
        }
    }
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
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

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn args(input: Option<&str>, json: Option<&str>) -> SendArgs {
        SendArgs {
            path: PathBuf::from("/tmp/replwire.sock"),
            input: input.map(str::to_string),
            json: json.map(str::to_string),
            wait: false,
            wait_timeout: "5s".to_string(),
        }
    }

    #[test]
    fn input_becomes_input_response() {
        let payload = resolve_payload(&args(Some("ls"), None)).unwrap();
        assert!(matches!(
            payload,
            Payload::Message(ShellMessage::InputResponse(InputResponse { ref input }))
                if input == "ls"
        ));
    }

    #[test]
    fn raw_json_must_be_an_object() {
        let err = resolve_payload(&args(None, Some("[1,2]"))).unwrap_err();
        assert_eq!(err.code, USAGE);

        let err = resolve_payload(&args(None, Some("not json"))).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn payload_is_required() {
        let err = resolve_payload(&args(None, None)).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
    }
}
