use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body returned by `/services/oauth2/token`
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub api_instance_url: String,
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub instance_url: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub issued_at: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub external_session_key: String,
    pub instance_config: InstanceConfig,
    pub feature_support: String,
    pub streaming_capabilities: StreamingCapabilities,
    pub bypass_user: bool,
}

#[derive(Debug, Serialize)]
pub struct InstanceConfig {
    pub endpoint: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingCapabilities {
    pub chunk_types: Vec<String>,
}

impl SessionRequest {
    pub fn new(external_session_key: String, endpoint: &str) -> Self {
        Self {
            external_session_key,
            instance_config: InstanceConfig {
                endpoint: endpoint.to_string(),
            },
            feature_support: "Streaming".to_string(),
            streaming_capabilities: StreamingCapabilities {
                chunk_types: vec![MESSAGE_TYPE_TEXT.to_string()],
            },
            bypass_user: true,
        }
    }
}

/// Session creation response. Only `sessionId` is relied upon; the
/// capability metadata is kept for logging.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub session_id: String,
    #[serde(default, rename = "_links")]
    pub links: Option<Value>,
    #[serde(default)]
    pub messages: Vec<Value>,
}

pub const MESSAGE_TYPE_TEXT: &str = "Text";

#[derive(Debug, Serialize)]
pub struct MessageRequest<'a> {
    pub message: OutgoingMessage<'a>,
    pub variables: &'a [ContextVariable],
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage<'a> {
    pub sequence_id: i64,
    #[serde(rename = "type")]
    pub message_type: &'static str,
    pub text: &'a str,
}

/// Context variable passed to the agent alongside a message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub variable_type: String,
    pub value: Value,
}

impl ContextVariable {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variable_type: MESSAGE_TYPE_TEXT.to_string(),
            value: Value::String(value.into()),
        }
    }
}
