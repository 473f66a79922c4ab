use config::{Environment, Map};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::error::AgentforceError;

/// Environment prefix for the Salesforce credentials
pub const SALESFORCE_PREFIX: &str = "SALESFORCE";
/// Environment prefix for the server settings
pub const SERVER_PREFIX: &str = "AGENTFORCE_CHAT";

/// Required variables, in the order they are reported when missing.
pub const REQUIRED_VARS: [&str; 4] = [
    "SALESFORCE_INSTANCE_URL",
    "SALESFORCE_CLIENT_ID",
    "SALESFORCE_CLIENT_SECRET",
    "SALESFORCE_AGENT_ID",
];

/// A credential value that never shows up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Connected app credentials for the Agentforce API
#[derive(Debug, Clone)]
pub struct AgentforceConfig {
    pub instance_url: String,
    pub client_id: String,
    pub client_secret: Secret,
    pub agent_id: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawAgentforceConfig {
    instance_url: Option<String>,
    client_id: Option<String>,
    client_secret: Option<String>,
    agent_id: Option<String>,
}

impl AgentforceConfig {
    pub fn from_env() -> Result<Self, AgentforceError> {
        Self::load(None)
    }

    /// Load from an explicit variable map instead of the process environment.
    pub fn load(source: Option<Map<String, String>>) -> Result<Self, AgentforceError> {
        let raw: RawAgentforceConfig = config::Config::builder()
            .add_source(
                Environment::with_prefix(SALESFORCE_PREFIX)
                    .ignore_empty(true)
                    .source(source),
            )
            .build()?
            .try_deserialize()?;

        let mut missing = Vec::new();
        let mut require = |name: &str, value: Option<String>| -> String {
            match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                Some(v) => v,
                None => {
                    missing.push(name.to_string());
                    String::new()
                }
            }
        };
        let instance_url = require(REQUIRED_VARS[0], raw.instance_url);
        let client_id = require(REQUIRED_VARS[1], raw.client_id);
        let client_secret = require(REQUIRED_VARS[2], raw.client_secret);
        let agent_id = require(REQUIRED_VARS[3], raw.agent_id);

        if !missing.is_empty() {
            return Err(AgentforceError::Configuration { missing });
        }

        Ok(Self {
            instance_url: instance_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret: Secret::new(client_secret),
            agent_id,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound for each outbound call to Salesforce
    pub request_timeout_secs: u64,
    pub max_conversations: usize,
    /// Idle time after which a page's conversation is forgotten
    pub conversation_idle_secs: u64,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, AgentforceError> {
        Self::load(None)
    }

    pub fn load(source: Option<Map<String, String>>) -> Result<Self, AgentforceError> {
        let config = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8000_i64)?
            .set_default("request_timeout_secs", 30_i64)?
            .set_default("max_conversations", 1000_i64)?
            .set_default("conversation_idle_secs", 3600_i64)?
            .add_source(
                Environment::with_prefix(SERVER_PREFIX)
                    .try_parsing(true)
                    .ignore_empty(true)
                    .source(source),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn conversation_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.conversation_idle_secs)
    }
}
