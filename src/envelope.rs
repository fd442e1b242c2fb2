//! The three envelope shapes exchanged on the wire and their JSON codec.
//!
//! Envelopes are ephemeral: built for one request/response cycle, serialized,
//! and discarded.

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

/// The `jsonrpc` member carried by every envelope.
pub const PROTOCOL_VERSION: &str = "2.0";

/// A request id: a number, a string, or null.
///
/// Ids of any other JSON shape are outside the protocol's id domain and
/// normalize to [`RequestId::Null`] when echoed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Number(i64),
    String(String),
    #[default]
    Null,
}

impl RequestId {
    pub(crate) fn from_value(value: &Value) -> RequestId {
        match value {
            Value::Number(n) => n.as_i64().map(RequestId::Number).unwrap_or(RequestId::Null),
            Value::String(s) => RequestId::String(s.clone()),
            _ => RequestId::Null,
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_owned())
    }
}

/// Call parameters, resolved once from the decoded request and then matched
/// exhaustively by the dispatcher.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Params {
    /// No `params` member in the request.
    #[default]
    None,
    /// Arguments bound by sequence order.
    Positional(Vec<Value>),
    /// Arguments bound by parameter name.
    Named(Map<String, Value>),
}

impl Params {
    pub fn is_none(&self) -> bool {
        matches!(self, Params::None)
    }

    /// Classifies the `params` member of a decoded request. Absent is
    /// [`Params::None`]; a present value that is neither an array nor an
    /// object (including `null`) has no valid classification.
    pub(crate) fn classify(value: Option<&Value>) -> Option<Params> {
        match value {
            None => Some(Params::None),
            Some(Value::Array(seq)) => Some(Params::Positional(seq.clone())),
            Some(Value::Object(map)) => Some(Params::Named(map.clone())),
            Some(_) => None,
        }
    }

    /// The value form used for serde argument binding. Empty argument lists
    /// bind as `null` so zero-argument signatures accept `[]`, `{}`, and
    /// absent params alike.
    pub fn into_value(self) -> Value {
        match self {
            Params::None => Value::Null,
            Params::Positional(seq) if seq.is_empty() => Value::Null,
            Params::Named(map) if map.is_empty() => Value::Null,
            Params::Positional(seq) => Value::Array(seq),
            Params::Named(map) => Value::Object(map),
        }
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Params::None => serializer.serialize_none(),
            Params::Positional(seq) => seq.serialize(serializer),
            Params::Named(map) => map.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Params {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Params::classify(Some(&value))
            .ok_or_else(|| de::Error::custom("params must be an array or an object"))
    }
}

/// A remote call: `{"jsonrpc":"2.0","method":…,"params":…,"id":…}`.
///
/// The `params` member is omitted entirely when there are no parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Params::is_none")]
    pub params: Params,
    pub id: RequestId,
}

impl RequestEnvelope {
    pub fn new(method: impl Into<String>, params: Params, id: RequestId) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION.to_owned(),
            method: method.into(),
            params,
            id,
        }
    }
}

/// A successful response: `{"jsonrpc":"2.0","result":…,"id":…}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub jsonrpc: String,
    pub result: Value,
    pub id: RequestId,
}

impl ResultEnvelope {
    pub fn new(result: Value, id: RequestId) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION.to_owned(),
            result,
            id,
        }
    }
}

/// The fixed failure taxonomy, with the canonical code and message for each.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
}

impl ErrorKind {
    pub const fn code(self) -> i64 {
        match self {
            ErrorKind::ParseError => -32700,
            ErrorKind::InvalidRequest => -32600,
            ErrorKind::MethodNotFound => -32601,
            ErrorKind::InvalidParams => -32602,
            ErrorKind::InternalError => -32603,
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            ErrorKind::ParseError => "Invalid JSON was received by the server.",
            ErrorKind::InvalidRequest => "Invalid JSON-RPC request was received by the server.",
            ErrorKind::MethodNotFound => "Method not found.",
            ErrorKind::InvalidParams => "Invalid method parameter(s)",
            ErrorKind::InternalError => "There was an error in the executed method.",
        }
    }
}

/// The `error` member of an error envelope.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    pub code: i64,
    pub message: String,
}

impl From<ErrorKind> for ErrorObject {
    fn from(kind: ErrorKind) -> Self {
        Self {
            code: kind.code(),
            message: kind.message().to_owned(),
        }
    }
}

/// A failed response: `{"jsonrpc":"2.0","id":…,"error":{"code":…,"message":…}}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub jsonrpc: String,
    pub id: RequestId,
    pub error: ErrorObject,
}

impl ErrorEnvelope {
    pub fn new(kind: ErrorKind, id: RequestId) -> Self {
        Self {
            jsonrpc: PROTOCOL_VERSION.to_owned(),
            id,
            error: kind.into(),
        }
    }
}

/// The inbound text was not valid JSON.
#[derive(Debug, Error)]
#[error("invalid JSON: {0}")]
pub struct ParseError(#[from] serde_json::Error);

/// Decodes interchange text into a generic JSON value.
pub fn decode(text: &str) -> Result<Value, ParseError> {
    Ok(serde_json::from_str(text)?)
}

/// Encodes an envelope to interchange text. Total for every envelope this
/// crate constructs.
pub fn encode<T: Serialize>(envelope: &T) -> String {
    serde_json::to_string(envelope).expect("envelope serialization")
}
