use tracing::{error, info, warn};

use crate::agentforce::{format_response, AgentforceClient, Conversation};
use crate::error::AgentforceError;
use crate::render;
use crate::state::AppState;

/// Result of handling one submitted message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    /// The user's text and the formatted agent reply
    Exchange { user: String, agent: String },
    /// Sanitized description of what went wrong
    Error(String),
}

impl ChatOutcome {
    pub fn render(&self) -> String {
        match self {
            ChatOutcome::Exchange { user, agent } => render::exchange(user, agent),
            ChatOutcome::Error(message) => render::error_bubble(message),
        }
    }
}

/// Turn one submitted message into an exchange or a single error.
///
/// The conversation lock is held for the whole chain so that concurrent
/// submissions to one conversation open a session once.
pub async fn handle_chat_message(
    state: &AppState,
    conversation_id: Option<&str>,
    text: &str,
) -> ChatOutcome {
    let Some(client) = state.client.as_deref() else {
        warn!("Chat message received but the client is not configured");
        let err = AgentforceError::Configuration {
            missing: state.missing_config.to_vec(),
        };
        return ChatOutcome::Error(err.user_message());
    };

    let text = text.trim();
    if text.is_empty() {
        return ChatOutcome::Error("Please enter a message.".to_string());
    }

    let key = state.conversation_key(conversation_id);
    let conversation = state.conversation(&key);
    let mut conversation = conversation.lock().await;

    match exchange(client, &mut conversation, text).await {
        Ok(reply) => {
            info!(conversation = %key, "Agent replied");
            ChatOutcome::Exchange {
                user: text.to_string(),
                agent: reply,
            }
        }
        Err(e) => {
            error!(conversation = %key, error = %e, "Chat exchange failed");
            ChatOutcome::Error(e.user_message())
        }
    }
}

async fn exchange(
    client: &AgentforceClient,
    conversation: &mut Conversation,
    text: &str,
) -> Result<String, AgentforceError> {
    conversation.ensure_session(client).await?;
    let response = conversation.send_message(client, text, &[]).await?;
    Ok(format_response(&response))
}
