//! Response mapping (service → client)

use crate::error::{CodecError, TransportError};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// Raw response: a mapping of field name → value
///
/// Either an error response (carries `error`) or the success shape for the
/// action that was sent. Typed views live in [`crate::messages::reply`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionResponse(Map<String, Value>);

impl ActionResponse {
    pub const ERROR_FIELD: &'static str = "error";
    pub const RAW_FIELD: &'static str = "response";

    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Synthetic error response `{"error": message}`
    pub fn error(message: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(Self::ERROR_FIELD.to_string(), Value::String(message.into()));
        Self(fields)
    }

    /// Synthetic error response for a failed call, keeping any raw body
    pub fn from_transport_error(err: &TransportError) -> Self {
        let mut response = Self::error(err.to_string());
        if let Some(raw) = err.raw_response() {
            response
                .0
                .insert(Self::RAW_FIELD.to_string(), Value::String(raw.to_string()));
        }
        response
    }

    /// Parse the first JSON value in `bytes`
    ///
    /// Empty and non-object bodies are failures; the raw text is preserved
    /// in the error for diagnostics.
    pub fn decode(bytes: &[u8]) -> Result<Self, TransportError> {
        let raw = String::from_utf8_lossy(bytes);
        if raw.trim().is_empty() {
            return Err(TransportError::EmptyResponse);
        }

        let malformed = |reason: String| TransportError::Malformed {
            reason,
            raw: raw.to_string(),
        };

        let mut values = serde_json::Deserializer::from_slice(bytes).into_iter::<Value>();
        match values.next() {
            Some(Ok(Value::Object(fields))) => Ok(Self(fields)),
            Some(Ok(other)) => Err(malformed(CodecError::NotAnObject(other.to_string()).to_string())),
            Some(Err(e)) => Err(malformed(e.to_string())),
            None => Err(TransportError::EmptyResponse),
        }
    }

    /// Serialize to wire bytes
    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(&self.0).map_err(CodecError::Encode)
    }

    /// Error description, if this is an error response
    pub fn error_message(&self) -> Option<String> {
        match self.0.get(Self::ERROR_FIELD)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_message().is_some()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Set a field (builder style, used by stubs and tests)
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Decode into a typed reply
    pub fn decode_as<T: DeserializeOwned>(&self) -> Result<T, CodecError> {
        T::deserialize(&Value::Object(self.0.clone())).map_err(CodecError::Decode)
    }
}

impl std::fmt::Display for ActionResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", Value::Object(self.0.clone()))
    }
}

impl From<Map<String, Value>> for ActionResponse {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}
