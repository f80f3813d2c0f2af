use std::collections::HashMap;

use serde_json::Value;

use crate::error::{Result, SessionError};

/// Deserializes one message variant from its decoded wire object.
pub type Decoder<M> = fn(&Value) -> Result<M>;

/// Builds a [`MessageRegistry`], rejecting duplicate discriminators.
///
/// Registering the same status twice is a construction-time error; there
/// is no last-wins overwrite.
#[derive(Debug)]
pub struct RegistryBuilder<M> {
    decoders: HashMap<String, Decoder<M>>,
}

impl<M> RegistryBuilder<M> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// Register a decoder for a `status` discriminator value.
    pub fn register(mut self, status: impl Into<String>, decoder: Decoder<M>) -> Result<Self> {
        let status = status.into();
        if self.decoders.contains_key(&status) {
            return Err(SessionError::DuplicateStatus(status));
        }
        self.decoders.insert(status, decoder);
        Ok(self)
    }

    /// Finalize the registry. It is immutable from here on.
    pub fn build(self) -> MessageRegistry<M> {
        MessageRegistry {
            decoders: self.decoders,
        }
    }
}

impl<M> Default for RegistryBuilder<M> {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable dispatch table from `status` discriminator to decoder.
pub struct MessageRegistry<M> {
    decoders: HashMap<String, Decoder<M>>,
}

impl<M> MessageRegistry<M> {
    /// Decode a wire object into a typed message.
    ///
    /// The object must carry a string `status` field naming a registered
    /// variant; otherwise this fails with
    /// [`SessionError::InvalidMessage`] — before any decoder runs for a
    /// missing discriminator, and naming the discriminator when it is
    /// unknown.
    pub fn decode(&self, wire: &Value) -> Result<M> {
        let status = wire
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                SessionError::InvalidMessage("missing required field status".to_string())
            })?;

        match self.decoders.get(status) {
            Some(decoder) => decoder(wire),
            None => Err(SessionError::InvalidMessage(format!(
                "unknown status {status}"
            ))),
        }
    }

    /// Registered discriminators, sorted.
    pub fn statuses(&self) -> Vec<&str> {
        let mut statuses: Vec<&str> = self.decoders.keys().map(String::as_str).collect();
        statuses.sort_unstable();
        statuses
    }
}
