use serde_json::Value;
use tracing::{debug, info};

use super::client::AgentforceClient;
use super::types::ContextVariable;
use crate::error::AgentforceError;

/// Where a conversation stands with the agent API. The token half comes from
/// the shared client, the session half from the conversation. Transitions only
/// move forward: there is no logout and no session teardown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationState {
    Unauthenticated,
    Authenticated,
    SessionActive { session_id: String },
}

/// One logical chat with the agent: at most one session on the client's token.
#[derive(Debug)]
pub struct Conversation {
    id: String,
    session_id: Option<String>,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            session_id: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn state(&self, client: &AgentforceClient) -> ConversationState {
        match (&self.session_id, client.is_authenticated().await) {
            (Some(session_id), _) => ConversationState::SessionActive {
                session_id: session_id.clone(),
            },
            (None, true) => ConversationState::Authenticated,
            (None, false) => ConversationState::Unauthenticated,
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Create the conversation's session, or return the one it already has.
    /// Needs the client to be authenticated already.
    pub async fn create_session(
        &mut self,
        client: &AgentforceClient,
    ) -> Result<&str, AgentforceError> {
        if self.session_id.is_none() {
            let Some(token) = client.access_token().await else {
                return Err(AgentforceError::State(
                    "a session cannot be created before authenticating",
                ));
            };
            let session_id = client.create_session(&token).await?;
            info!(conversation = %self.id, session_id = %session_id, "Agent session started");
            self.session_id = Some(session_id);
        }

        self.session_id()
            .ok_or(AgentforceError::State("session id missing"))
    }

    /// Authenticate the client and open this conversation's session as needed.
    pub async fn ensure_session(
        &mut self,
        client: &AgentforceClient,
    ) -> Result<(), AgentforceError> {
        client.ensure_authenticated().await?;
        self.create_session(client).await?;
        debug!(conversation = %self.id, "Conversation ready");
        Ok(())
    }

    /// Send a message on the active session. Never changes the stored token
    /// or session, whether the send succeeds or not.
    pub async fn send_message(
        &self,
        client: &AgentforceClient,
        text: &str,
        variables: &[ContextVariable],
    ) -> Result<Value, AgentforceError> {
        let Some(token) = client.access_token().await else {
            return Err(AgentforceError::State(
                "a message cannot be sent before authenticating",
            ));
        };
        let Some(session_id) = self.session_id.as_deref() else {
            return Err(AgentforceError::State(
                "a message cannot be sent before a session exists",
            ));
        };
        client.send_message(&token, session_id, text, variables).await
    }
}
