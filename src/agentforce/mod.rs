//! Client side of the Salesforce Agentforce agent API
//!
//! The [`AgentforceClient`] performs the three REST calls and keeps the one
//! access token, while a [`Conversation`] tracks the session that one chat owns.

pub mod client;
pub mod conversation;
pub mod formatter;
pub mod types;

pub use client::{AccessToken, AgentforceClient, REQUIRED_SCOPES};
pub use conversation::{Conversation, ConversationState};
pub use formatter::format_response;
pub use types::ContextVariable;
