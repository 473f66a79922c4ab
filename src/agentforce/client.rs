use chrono::Utc;
use regex::Regex;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use serde_json::Value;
use std::sync::OnceLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use super::types::{
    ContextVariable, MessageRequest, OutgoingMessage, SessionRequest, SessionResponse,
    TokenResponse, MESSAGE_TYPE_TEXT,
};
use crate::config::{AgentforceConfig, Secret};
use crate::error::AgentforceError;

/// Scopes the connected app must grant for the agent API to accept the token
pub const REQUIRED_SCOPES: [&str; 3] = ["sfap_api", "chatbot_api", "api"];

/// OAuth2 access token issued by the client credentials flow.
///
/// Holding one is the proof of authentication that session and message
/// calls require.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessToken {
    value: Secret,
    api_instance_url: String,
    scopes: Vec<String>,
}

impl AccessToken {
    /// Validate the granted scopes of a token response.
    pub fn from_response(response: TokenResponse) -> Result<Self, AgentforceError> {
        let scopes: Vec<String> = response
            .scope
            .split_whitespace()
            .map(str::to_string)
            .collect();

        let missing: Vec<String> = REQUIRED_SCOPES
            .iter()
            .filter(|required| !scopes.iter().any(|granted| granted == *required))
            .map(|required| required.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(AgentforceError::MissingScopes { missing });
        }

        Ok(Self {
            value: Secret::new(response.access_token),
            api_instance_url: response.api_instance_url.trim_end_matches('/').to_string(),
            scopes,
        })
    }

    /// Base URL for agent API calls, as returned by the token endpoint
    pub fn api_instance_url(&self) -> &str {
        &self.api_instance_url
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    fn bearer(&self) -> &str {
        self.value.expose()
    }
}

/// HTTP client for the Agentforce agent API.
///
/// Owns the one access token of the process. Clones share it. Session ids
/// belong to each [`super::Conversation`].
#[derive(Debug, Clone)]
pub struct AgentforceClient {
    http: Client,
    config: AgentforceConfig,
    token: Arc<Mutex<Option<AccessToken>>>,
}

impl AgentforceClient {
    pub fn new(config: AgentforceConfig, timeout: Duration) -> Result<Self, AgentforceError> {
        let http = Client::builder().timeout(timeout).build()?;
        info!(
            "Initialized AgentforceClient: instance_url={}, agent_id={}",
            config.instance_url, config.agent_id
        );
        Ok(Self {
            http,
            config,
            token: Arc::new(Mutex::new(None)),
        })
    }

    pub fn config(&self) -> &AgentforceConfig {
        &self.config
    }

    /// The stored token, if authentication has succeeded before.
    pub async fn access_token(&self) -> Option<AccessToken> {
        self.token.lock().await.clone()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token.lock().await.is_some()
    }

    /// Exchange the client credentials for a new token and store it.
    /// A failed exchange leaves the stored token as it was.
    pub async fn authenticate(&self) -> Result<AccessToken, AgentforceError> {
        let mut slot = self.token.lock().await;
        let token = self.request_token().await?;
        *slot = Some(token.clone());
        Ok(token)
    }

    /// Return the stored token, authenticating first if there is none.
    ///
    /// The lock is held across the exchange, so concurrent callers wait for
    /// one token instead of each requesting their own.
    pub async fn ensure_authenticated(&self) -> Result<AccessToken, AgentforceError> {
        let mut slot = self.token.lock().await;
        if let Some(token) = slot.as_ref() {
            return Ok(token.clone());
        }
        let token = self.request_token().await?;
        *slot = Some(token.clone());
        Ok(token)
    }

    async fn request_token(&self) -> Result<AccessToken, AgentforceError> {
        let url = format!("{}/services/oauth2/token", self.config.instance_url);
        debug!(
            url = %url,
            client_id = %abbreviate(&self.config.client_id),
            "Requesting access token"
        );

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose()),
        ];
        let response = self
            .http
            .post(&url)
            .form(&form)
            .send()
            .await
            .map_err(|e| AgentforceError::Authentication(describe(e)))?;

        if !response.status().is_success() {
            return Err(AgentforceError::Authentication(
                rejection(response, "token endpoint").await,
            ));
        }

        let body: TokenResponse = response.json().await.map_err(|e| {
            AgentforceError::Authentication(format!("malformed token response: {}", describe(e)))
        })?;
        let token = AccessToken::from_response(body)?;

        info!(
            api_instance_url = %token.api_instance_url(),
            "Authenticated with Salesforce"
        );
        Ok(token)
    }

    /// Open a new agent session. Every call creates a distinct session.
    pub async fn create_session(&self, token: &AccessToken) -> Result<String, AgentforceError> {
        let url = format!(
            "{}/einstein/ai-agent/v1/agents/{}/sessions",
            token.api_instance_url(),
            self.config.agent_id
        );
        let request = SessionRequest::new(external_session_key(), &self.config.instance_url);
        debug!(
            url = %url,
            external_session_key = %request.external_session_key,
            "Creating agent session"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(token.bearer())
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentforceError::Session(describe(e)))?;

        if !response.status().is_success() {
            return Err(AgentforceError::Session(
                rejection(response, "session endpoint").await,
            ));
        }

        let session: SessionResponse = response.json().await.map_err(|e| {
            AgentforceError::Session(format!("malformed session response: {}", describe(e)))
        })?;
        debug!(
            session_id = %session.session_id,
            greeting_messages = session.messages.len(),
            links = ?session.links,
            "Agent session created"
        );
        Ok(session.session_id)
    }

    /// Send one text message and return the agent's reply payload as-is.
    pub async fn send_message(
        &self,
        token: &AccessToken,
        session_id: &str,
        text: &str,
        variables: &[ContextVariable],
    ) -> Result<Value, AgentforceError> {
        let url = format!(
            "{}/einstein/ai-agent/v1/sessions/{}/messages",
            token.api_instance_url(),
            session_id
        );
        let request = MessageRequest {
            message: OutgoingMessage {
                sequence_id: Utc::now().timestamp_millis(),
                message_type: MESSAGE_TYPE_TEXT,
                text,
            },
            variables,
        };
        debug!(
            session_id,
            sequence_id = request.message.sequence_id,
            variables = variables.len(),
            "Sending message to agent"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(token.bearer())
            .header(ACCEPT, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AgentforceError::communication(describe(e), None))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentforceError::communication(
                rejection(response, "message endpoint").await,
                Some(status.as_u16()),
            ));
        }

        response.json().await.map_err(|e| {
            AgentforceError::communication(
                format!("malformed agent response: {}", describe(e)),
                Some(status.as_u16()),
            )
        })
    }
}

fn external_session_key() -> String {
    format!(
        "agentforce-chat-{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

/// Error text for a non-success response. The body only goes to the debug log.
async fn rejection(response: Response, endpoint: &str) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    debug!(status = %status, body = %redact(&body), "{} rejected request", endpoint);
    format!("{} returned {}", endpoint, status)
}

fn describe(err: reqwest::Error) -> String {
    err.without_url().to_string()
}

fn abbreviate(value: &str) -> String {
    let prefix: String = value.chars().take(10).collect();
    format!("{}...", prefix)
}

/// Mask token and credential values in a response body before logging it.
fn redact(body: &str) -> String {
    static TOKEN_FIELD: OnceLock<Regex> = OnceLock::new();
    let pattern = TOKEN_FIELD.get_or_init(|| {
        Regex::new(r#""(access_token|refresh_token|id_token|client_secret)"\s*:\s*"[^"]*""#)
            .expect("token field pattern is valid")
    });
    pattern.replace_all(body, r#""$1":"***""#).into_owned()
}
