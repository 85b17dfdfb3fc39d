//! JSON-RPC 2.0 message model.
//!
//! [`Message`] is the wire envelope every transport reads and writes. It keeps
//! `params` and `result` as raw JSON and decodes them on demand into the type
//! the caller asks for, so routing never has to guess at payload shapes.
//!
//! A well-formed message is exactly one of:
//!
//! | Kind | `id` | `method` | `result` / `error` |
//! |------|------|----------|--------------------|
//! | request | present | present | absent |
//! | response | present | absent | exactly one present |
//! | notification | absent | present | absent |

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use serde_json::value::RawValue;

use crate::error::{Error, Result};

/// JSON-RPC version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// JSON-RPC version type (always "2.0")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JsonRpcVersion;

impl Serialize for JsonRpcVersion {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(JSONRPC_VERSION)
    }
}

impl<'de> Deserialize<'de> for JsonRpcVersion {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let version = String::deserialize(deserializer)?;
        if version == JSONRPC_VERSION {
            Ok(JsonRpcVersion)
        } else {
            Err(serde::de::Error::custom(format!(
                "Invalid JSON-RPC version: expected '{}', got '{}'",
                JSONRPC_VERSION, version
            )))
        }
    }
}

/// Request identifier - can be string or number
///
/// The variant received from the peer is kept as-is so that a response
/// echoes exactly the id type the request carried.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// String identifier
    String(String),
    /// Numeric identifier
    Number(i64),
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for RequestId {
    fn from(n: i32) -> Self {
        Self::Number(i64::from(n))
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonRpcError {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Create a new error
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    /// Create an error with additional data
    #[must_use]
    pub fn with_data(code: i32, message: impl Into<String>, data: Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }

    /// Create a method not found error (-32601)
    #[must_use]
    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            JsonRpcErrorCode::MethodNotFound.code(),
            format!("Method not found: {}", method),
        )
    }

    /// Classify the numeric code
    #[must_use]
    pub fn kind(&self) -> JsonRpcErrorCode {
        JsonRpcErrorCode::from(self.code)
    }
}

impl fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Error codes understood by this client.
///
/// The standard JSON-RPC codes live in `-32700..=-32600`; the MCP-specific
/// codes occupy the server-defined range starting at `-32000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonRpcErrorCode {
    /// Parse error (-32700)
    ParseError,
    /// Invalid request (-32600)
    InvalidRequest,
    /// Method not found (-32601)
    MethodNotFound,
    /// Invalid params (-32602)
    InvalidParams,
    /// Internal error (-32603)
    InternalError,
    /// Tool not found (-32000)
    ToolNotFound,
    /// Tool execution failed (-32001)
    ToolExecutionFailed,
    /// Resource not found (-32002)
    ResourceNotFound,
    /// Unauthorized (-32003)
    Unauthorized,
    /// Any other application-defined code
    ApplicationError(i32),
}

impl JsonRpcErrorCode {
    /// Get the numeric code
    #[must_use]
    pub const fn code(&self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::ToolNotFound => -32000,
            Self::ToolExecutionFailed => -32001,
            Self::ResourceNotFound => -32002,
            Self::Unauthorized => -32003,
            Self::ApplicationError(code) => *code,
        }
    }

    /// Get the standard message
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
            Self::ToolNotFound => "Tool not found",
            Self::ToolExecutionFailed => "Tool execution failed",
            Self::ResourceNotFound => "Resource not found",
            Self::Unauthorized => "Unauthorized",
            Self::ApplicationError(_) => "Application error",
        }
    }

    /// True for the codes reserved by JSON-RPC itself
    #[must_use]
    pub const fn is_standard(&self) -> bool {
        matches!(self.code(), -32768..=-32600)
    }

    /// True for the MCP-specific codes
    #[must_use]
    pub const fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::ToolNotFound
                | Self::ToolExecutionFailed
                | Self::ResourceNotFound
                | Self::Unauthorized
        )
    }
}

impl fmt::Display for JsonRpcErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

impl From<i32> for JsonRpcErrorCode {
    fn from(code: i32) -> Self {
        match code {
            -32700 => Self::ParseError,
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            -32000 => Self::ToolNotFound,
            -32001 => Self::ToolExecutionFailed,
            -32002 => Self::ResourceNotFound,
            -32003 => Self::Unauthorized,
            other => Self::ApplicationError(other),
        }
    }
}

impl From<JsonRpcErrorCode> for JsonRpcError {
    fn from(code: JsonRpcErrorCode) -> Self {
        Self::new(code.code(), code.message())
    }
}

/// Which of the three JSON-RPC shapes a [`Message`] has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// Has `id` and `method`
    Request,
    /// Has `id` and one of `result` / `error`
    Response,
    /// Has `method` and no `id`
    Notification,
    /// Matches none of the above
    Invalid,
}

/// The JSON-RPC wire envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// JSON-RPC version
    pub jsonrpc: JsonRpcVersion,
    /// Request or response identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,
    /// Method name for requests and notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Undecoded request/notification parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Box<RawValue>>,
    /// Undecoded response result; `"result": null` is kept as `Some`
    #[serde(
        default,
        deserialize_with = "present_raw",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<Box<RawValue>>,
    /// Response error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl Message {
    fn empty() -> Self {
        Self {
            jsonrpc: JsonRpcVersion,
            id: None,
            method: None,
            params: None,
            result: None,
            error: None,
        }
    }

    /// Build a request.
    ///
    /// Fails with [`Error::Serialization`] when `params` cannot be encoded.
    pub fn request<P: Serialize>(
        id: impl Into<RequestId>,
        method: impl Into<String>,
        params: Option<P>,
    ) -> Result<Self> {
        Ok(Self {
            id: Some(id.into()),
            method: Some(method.into()),
            params: params.as_ref().map(encode).transpose()?,
            ..Self::empty()
        })
    }

    /// Build a notification (no id, no reply expected).
    pub fn notification<P: Serialize>(
        method: impl Into<String>,
        params: Option<P>,
    ) -> Result<Self> {
        Ok(Self {
            method: Some(method.into()),
            params: params.as_ref().map(encode).transpose()?,
            ..Self::empty()
        })
    }

    /// Build a successful response.
    pub fn success_response<R: Serialize>(id: RequestId, result: &R) -> Result<Self> {
        Ok(Self {
            id: Some(id),
            result: Some(encode(result)?),
            ..Self::empty()
        })
    }

    /// Build an error response.
    #[must_use]
    pub fn error_response(
        id: RequestId,
        code: i32,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> Self {
        Self {
            id: Some(id),
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data,
            }),
            ..Self::empty()
        }
    }

    /// Structural classification of this envelope
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match (&self.id, &self.method, &self.result, &self.error) {
            (Some(_), Some(_), None, None) => MessageKind::Request,
            (Some(_), None, Some(_), None) | (Some(_), None, None, Some(_)) => {
                MessageKind::Response
            }
            (None, Some(_), None, None) => MessageKind::Notification,
            _ => MessageKind::Invalid,
        }
    }

    /// Check if this is a request
    #[must_use]
    pub fn is_request(&self) -> bool {
        self.kind() == MessageKind::Request
    }

    /// Check if this is a response
    #[must_use]
    pub fn is_response(&self) -> bool {
        self.kind() == MessageKind::Response
    }

    /// Check if this is a notification
    #[must_use]
    pub fn is_notification(&self) -> bool {
        self.kind() == MessageKind::Notification
    }

    /// Method name, or `""` for responses
    #[must_use]
    pub fn method_name(&self) -> &str {
        self.method.as_deref().unwrap_or_default()
    }

    /// Decode `params` into `T`.
    ///
    /// Absent params decode as JSON `null`, so `Option<T>` and unit-like
    /// targets work without special casing.
    pub fn decode_params<T: DeserializeOwned>(&self) -> Result<T> {
        decode(self.params.as_deref())
    }

    /// Decode `result` into `T`.
    pub fn decode_result<T: DeserializeOwned>(&self) -> Result<T> {
        decode(self.result.as_deref())
    }

    /// Parse one frame.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(Error::from)
    }

    /// Parse one frame from text.
    pub fn parse(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(Error::from)
    }

    /// Compact single-line JSON encoding.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(Error::from)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            MessageKind::Request => write!(
                f,
                "request {} (id {})",
                self.method_name(),
                self.id.as_ref().map(ToString::to_string).unwrap_or_default()
            ),
            MessageKind::Response => write!(
                f,
                "response (id {})",
                self.id.as_ref().map(ToString::to_string).unwrap_or_default()
            ),
            MessageKind::Notification => write!(f, "notification {}", self.method_name()),
            MessageKind::Invalid => f.write_str("invalid message"),
        }
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Box<RawValue>> {
    serde_json::value::to_raw_value(value).map_err(Error::from)
}

// Only called when the key is present, so a JSON `null` stays distinguishable
// from an absent field.
fn present_raw<'de, D>(deserializer: D) -> std::result::Result<Option<Box<RawValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

fn decode<T: DeserializeOwned>(raw: Option<&RawValue>) -> Result<T> {
    let text = raw.map_or("null", RawValue::get);
    serde_json::from_str(text).map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_request_classification() {
        let msg = Message::request(1, "tools/list", None::<Value>).unwrap();
        assert!(msg.is_request());
        assert!(!msg.is_response());
        assert!(!msg.is_notification());

        let decoded = Message::parse(&msg.to_json().unwrap()).unwrap();
        assert_eq!(decoded.kind(), MessageKind::Request);
        assert_eq!(decoded.id, Some(RequestId::Number(1)));
        assert_eq!(decoded.method_name(), "tools/list");
    }

    #[test]
    fn test_request_without_params_omits_field() {
        let msg = Message::request(7, "ping", None::<Value>).unwrap();
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(value, json!({"jsonrpc": "2.0", "id": 7, "method": "ping"}));
    }

    #[test]
    fn test_notification_classification() {
        let msg = Message::parse(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .unwrap();
        assert_eq!(msg.kind(), MessageKind::Notification);
    }

    #[test]
    fn test_response_classification() {
        let ok = Message::parse(r#"{"jsonrpc":"2.0","id":"a","result":{}}"#).unwrap();
        assert!(ok.is_response());
        assert_eq!(ok.id, Some(RequestId::String("a".into())));

        let err = Message::parse(
            r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32601,"message":"nope"}}"#,
        )
        .unwrap();
        assert!(err.is_response());
        assert_eq!(err.error.unwrap().kind(), JsonRpcErrorCode::MethodNotFound);
    }

    #[test]
    fn test_null_result_is_a_response() {
        let msg = Message::parse(r#"{"jsonrpc":"2.0","id":4,"result":null}"#).unwrap();
        assert_eq!(msg.kind(), MessageKind::Response);
        assert_eq!(msg.decode_result::<Option<Value>>().unwrap(), None);
        assert_eq!(
            msg.to_json().unwrap(),
            r#"{"jsonrpc":"2.0","id":4,"result":null}"#
        );

        let absent = Message::parse(r#"{"jsonrpc":"2.0","id":4}"#).unwrap();
        assert!(absent.result.is_none());
        assert_eq!(absent.kind(), MessageKind::Invalid);
    }

    #[test]
    fn test_invalid_shapes() {
        let both = Message::parse(
            r#"{"jsonrpc":"2.0","id":1,"result":{},"error":{"code":1,"message":"x"}}"#,
        )
        .unwrap();
        assert_eq!(both.kind(), MessageKind::Invalid);

        let bare = Message::parse(r#"{"jsonrpc":"2.0"}"#).unwrap();
        assert_eq!(bare.kind(), MessageKind::Invalid);
    }

    #[test]
    fn test_rejects_wrong_version() {
        assert!(Message::parse(r#"{"jsonrpc":"1.0","id":1,"method":"x"}"#).is_err());
    }

    #[test]
    fn test_id_type_preserved() {
        let numeric = Message::parse(r#"{"jsonrpc":"2.0","id":42,"result":{}}"#).unwrap();
        let text = Message::parse(r#"{"jsonrpc":"2.0","id":"42","result":{}}"#).unwrap();
        assert_ne!(numeric.id, text.id);
        assert!(numeric.to_json().unwrap().contains(r#""id":42"#));
        assert!(text.to_json().unwrap().contains(r#""id":"42""#));
    }

    #[test]
    fn test_decode_result_on_demand() {
        #[derive(Deserialize)]
        struct Out {
            value: u32,
        }

        let msg = Message::parse(r#"{"jsonrpc":"2.0","id":1,"result":{"value":5}}"#).unwrap();
        let out: Out = msg.decode_result().unwrap();
        assert_eq!(out.value, 5);

        let wrong: Result<Vec<String>> = msg.decode_result();
        assert!(matches!(wrong, Err(Error::Serialization(_))));
    }

    #[test]
    fn test_decode_absent_params_as_null() {
        let msg = Message::notification("x", None::<Value>).unwrap();
        let params: Option<Value> = msg.decode_params().unwrap();
        assert!(params.is_none());
    }

    #[test]
    fn test_unencodable_params_fail() {
        use std::collections::HashMap;

        // Non-string map keys cannot become JSON object keys
        let mut bad = HashMap::new();
        bad.insert(vec![1u8], 1);
        let err = Message::request(1, "x", Some(bad)).unwrap_err();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_error_response_constructor() {
        let msg = Message::error_response(
            RequestId::from("srv-1"),
            -32601,
            "Method not found: roots/list",
            Some(json!({"method": "roots/list"})),
        );
        assert!(msg.is_response());
        let value: Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(value["error"]["code"], -32601);
        assert_eq!(value["id"], "srv-1");
        assert_eq!(value["error"]["data"]["method"], "roots/list");
    }

    #[test]
    fn test_error_code_ranges() {
        assert!(JsonRpcErrorCode::from(-32700).is_standard());
        assert!(JsonRpcErrorCode::from(-32603).is_standard());
        assert!(!JsonRpcErrorCode::from(-32001).is_standard());
        assert!(JsonRpcErrorCode::from(-32001).is_protocol());
        assert_eq!(JsonRpcErrorCode::from(-32003), JsonRpcErrorCode::Unauthorized);
        assert_eq!(JsonRpcErrorCode::from(-1), JsonRpcErrorCode::ApplicationError(-1));
        assert_eq!(JsonRpcErrorCode::ResourceNotFound.code(), -32002);
        assert_eq!(JsonRpcErrorCode::ToolNotFound.code(), -32000);
    }
}
