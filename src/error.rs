use thiserror::Error;

/// Errors raised while talking to the Agentforce API or preparing to.
///
/// `Display` is meant for logs. None of the variants carry the client secret
/// or the access token; use [`AgentforceError::user_message`] for text shown
/// in the browser.
#[derive(Error, Debug)]
pub enum AgentforceError {
    /// Required environment variables are absent or blank
    #[error("missing configuration: {}", .missing.join(", "))]
    Configuration { missing: Vec<String> },

    #[error("failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    /// Token exchange failed
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Token was issued without every scope the agent API needs
    #[error("missing required OAuth scopes: {}", .missing.join(", "))]
    MissingScopes { missing: Vec<String> },

    /// Operation called in a conversation state that does not permit it
    #[error("invalid conversation state: {0}")]
    State(&'static str),

    #[error("session creation failed: {0}")]
    Session(String),

    #[error("message send failed: {message}")]
    Communication { message: String, status: Option<u16> },

    /// HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl AgentforceError {
    pub fn communication(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::Communication {
            message: message.into(),
            status,
        }
    }

    /// True when the agent API rejected the bearer token on a message send.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Communication { status: Some(401), .. })
    }

    /// Sanitized text for an error bubble.
    pub fn user_message(&self) -> String {
        match self {
            Self::Configuration { missing } => format!(
                "Client not initialized. Set the following environment variables: {}",
                missing.join(", ")
            ),
            Self::ConfigLoad(_) => {
                "Client not initialized. The configuration could not be loaded.".to_string()
            }
            Self::Authentication(_) => "Authentication with Salesforce failed. \
                Check the connected app credentials and try again."
                .to_string(),
            Self::MissingScopes { missing } => format!(
                "Authentication with Salesforce failed. The connected app is missing \
                 the required OAuth scopes: {}",
                missing.join(", ")
            ),
            Self::State(_) => {
                "The conversation is not ready yet. Please send your message again.".to_string()
            }
            Self::Session(_) => {
                "Could not start a session with the agent. Please try again.".to_string()
            }
            Self::Communication { .. } if self.is_unauthorized() => {
                "The agent session has expired. Reload the page to start a new conversation."
                    .to_string()
            }
            Self::Communication { .. } => {
                "The agent could not be reached. Please try again.".to_string()
            }
            Self::Transport(_) => "The HTTP client could not be initialized.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_lists_missing_variables() {
        let err = AgentforceError::Configuration {
            missing: vec![
                "SALESFORCE_CLIENT_ID".to_string(),
                "SALESFORCE_AGENT_ID".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "missing configuration: SALESFORCE_CLIENT_ID, SALESFORCE_AGENT_ID"
        );
        assert!(err.user_message().contains("SALESFORCE_AGENT_ID"));
    }

    #[test]
    fn authentication_bubble_is_generic() {
        let err = AgentforceError::Authentication(
            "token endpoint returned 400 Bad Request".to_string(),
        );
        let text = err.user_message();
        assert!(text.starts_with("Authentication with Salesforce failed"));
        assert!(!text.contains("400"));
    }

    #[test]
    fn unauthorized_send_gets_expiry_message() {
        let expired = AgentforceError::communication("agent API returned 401", Some(401));
        assert!(expired.is_unauthorized());
        assert!(expired.user_message().contains("expired"));

        let unavailable = AgentforceError::communication("agent API returned 503", Some(503));
        assert!(!unavailable.is_unauthorized());
        assert!(unavailable.user_message().contains("could not be reached"));
    }
}
