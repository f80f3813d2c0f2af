use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::registry::{MessageRegistry, RegistryBuilder};
use crate::session::WireMessage;

/// Discriminator: host asks the client for a line of input.
pub const STATUS_INPUT_REQUEST: &str = "input_request";
/// Discriminator: client supplies a line of input.
pub const STATUS_INPUT_RESPONSE: &str = "input_response";
/// Discriminator: client asks for tab completions.
pub const STATUS_COMPLETION_REQUEST: &str = "completion_request";
/// Discriminator: host returns tab completions.
pub const STATUS_COMPLETION_RESPONSE: &str = "completion_response";
/// Discriminator: host pushes shell output to the client.
pub const STATUS_SHELL_OUTPUT: &str = "shell_output";

/// Prompt for one line of input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputRequest {
    pub prompt: String,
}

/// One line of user input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputResponse {
    pub input: String,
}

/// Tab-completion request for a partially typed line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionRequest {
    /// The whole line as typed so far.
    pub line: String,
    /// The token being completed.
    pub prefix: String,
}

/// Completion candidates for a [`CompletionRequest`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionResponse {
    pub completions: Vec<String>,
}

/// A chunk of shell output destined for the client's terminal.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShellOutput {
    pub output: String,
}

/// The built-in remote-shell message set.
///
/// Remaining fields of each variant are variant-specific; the session
/// core only ever inspects the `status` discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellMessage {
    InputRequest(InputRequest),
    InputResponse(InputResponse),
    CompletionRequest(CompletionRequest),
    CompletionResponse(CompletionResponse),
    ShellOutput(ShellOutput),
}

impl WireMessage for ShellMessage {
    fn status(&self) -> &'static str {
        match self {
            ShellMessage::InputRequest(_) => STATUS_INPUT_REQUEST,
            ShellMessage::InputResponse(_) => STATUS_INPUT_RESPONSE,
            ShellMessage::CompletionRequest(_) => STATUS_COMPLETION_REQUEST,
            ShellMessage::CompletionResponse(_) => STATUS_COMPLETION_RESPONSE,
            ShellMessage::ShellOutput(_) => STATUS_SHELL_OUTPUT,
        }
    }

    fn to_wire(&self) -> serde_json::Result<Value> {
        let mut wire = match self {
            ShellMessage::InputRequest(msg) => serde_json::to_value(msg)?,
            ShellMessage::InputResponse(msg) => serde_json::to_value(msg)?,
            ShellMessage::CompletionRequest(msg) => serde_json::to_value(msg)?,
            ShellMessage::CompletionResponse(msg) => serde_json::to_value(msg)?,
            ShellMessage::ShellOutput(msg) => serde_json::to_value(msg)?,
        };
        if let Value::Object(fields) = &mut wire {
            fields.insert(
                "status".to_string(),
                Value::String(self.status().to_string()),
            );
        }
        Ok(wire)
    }
}

/// Build the dispatch table for [`ShellMessage`].
///
/// One explicit decoder per discriminator, fixed after construction.
pub fn registry() -> Result<MessageRegistry<ShellMessage>> {
    Ok(RegistryBuilder::new()
        .register(STATUS_INPUT_REQUEST, |wire| {
            Ok(ShellMessage::InputRequest(from_wire(wire)?))
        })?
        .register(STATUS_INPUT_RESPONSE, |wire| {
            Ok(ShellMessage::InputResponse(from_wire(wire)?))
        })?
        .register(STATUS_COMPLETION_REQUEST, |wire| {
            Ok(ShellMessage::CompletionRequest(from_wire(wire)?))
        })?
        .register(STATUS_COMPLETION_RESPONSE, |wire| {
            Ok(ShellMessage::CompletionResponse(from_wire(wire)?))
        })?
        .register(STATUS_SHELL_OUTPUT, |wire| {
            Ok(ShellMessage::ShellOutput(from_wire(wire)?))
        })?
        .build())
}

fn from_wire<T: DeserializeOwned>(wire: &Value) -> Result<T> {
    Ok(serde_json::from_value(wire.clone())?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn wire_object_carries_status() {
        let msg = ShellMessage::InputRequest(InputRequest {
            prompt: ">>> ".to_string(),
        });
        let wire = msg.to_wire().unwrap();

        assert_eq!(wire["status"], "input_request");
        assert_eq!(wire["prompt"], ">>> ");
    }

    #[test]
    fn registry_decodes_every_variant() {
        let registry = registry().unwrap();
        let messages = [
            ShellMessage::InputRequest(InputRequest {
                prompt: "$ ".to_string(),
            }),
            ShellMessage::InputResponse(InputResponse {
                input: "ls -la".to_string(),
            }),
            ShellMessage::CompletionRequest(CompletionRequest {
                line: "git ch".to_string(),
                prefix: "ch".to_string(),
            }),
            ShellMessage::CompletionResponse(CompletionResponse {
                completions: vec!["checkout".to_string(), "cherry-pick".to_string()],
            }),
            ShellMessage::ShellOutput(ShellOutput {
                output: "total 0\n".to_string(),
            }),
        ];

        for msg in messages {
            let wire = msg.to_wire().unwrap();
            let decoded = registry.decode(&wire).unwrap();
            assert_eq!(decoded, msg);
        }
    }

    #[test]
    fn variant_specific_extras_are_ignored() {
        let registry = registry().unwrap();
        let decoded = registry
            .decode(&json!({
                "status": "shell_output",
                "output": "hi",
                "sequence": 12
            }))
            .unwrap();

        assert_eq!(
            decoded,
            ShellMessage::ShellOutput(ShellOutput {
                output: "hi".to_string()
            })
        );
    }
}
