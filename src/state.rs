use std::sync::Arc;
use std::time::{Duration, Instant};
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use crate::agentforce::{AgentforceClient, Conversation};

/// Conversation used when a submission carries no known conversation id
pub const DEFAULT_CONVERSATION_ID: &str = "default";

pub const DEFAULT_MAX_CONVERSATIONS: usize = 1000;
pub const DEFAULT_CONVERSATION_IDLE_SECS: u64 = 3600;

/// Bounds on the conversation registry
#[derive(Debug, Clone, Copy)]
pub struct RegistryLimits {
    pub max_conversations: usize,
    /// Conversations unused for this long are dropped on the next page render
    pub idle_timeout: Duration,
}

impl Default for RegistryLimits {
    fn default() -> Self {
        Self {
            max_conversations: DEFAULT_MAX_CONVERSATIONS,
            idle_timeout: Duration::from_secs(DEFAULT_CONVERSATION_IDLE_SECS),
        }
    }
}

struct ConversationEntry {
    conversation: Arc<Mutex<Conversation>>,
    last_used: Instant,
}

impl ConversationEntry {
    fn new(id: &str) -> Self {
        Self {
            conversation: Arc::new(Mutex::new(Conversation::new(id))),
            last_used: Instant::now(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    /// `None` when the Salesforce credentials are not configured
    pub client: Option<Arc<AgentforceClient>>,
    pub missing_config: Arc<Vec<String>>,
    conversations: Arc<DashMap<String, ConversationEntry>>,
    limits: RegistryLimits,
}

impl AppState {
    pub fn new(client: AgentforceClient) -> Self {
        Self {
            client: Some(Arc::new(client)),
            missing_config: Arc::new(Vec::new()),
            conversations: Arc::new(DashMap::new()),
            limits: RegistryLimits::default(),
        }
    }

    /// State for a server whose credentials are incomplete. Pages render
    /// configuration instructions and no network call is ever made.
    pub fn unconfigured(missing: Vec<String>) -> Self {
        Self {
            client: None,
            missing_config: Arc::new(missing),
            conversations: Arc::new(DashMap::new()),
            limits: RegistryLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RegistryLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Issue a fresh conversation id for a chat page and register it.
    pub fn register_conversation(&self) -> String {
        self.prune();
        let id = Uuid::new_v4().to_string();
        self.conversations
            .insert(id.clone(), ConversationEntry::new(&id));
        debug!(conversation = %id, registered = self.conversations.len(), "Conversation registered");
        id
    }

    /// Map a submitted id onto a registry key. Only ids issued by
    /// [`Self::register_conversation`] and still registered are honoured,
    /// anything else shares the default conversation.
    pub fn conversation_key(&self, submitted: Option<&str>) -> String {
        submitted
            .map(str::trim)
            .filter(|id| self.conversations.contains_key(*id))
            .map(str::to_string)
            .unwrap_or_else(|| DEFAULT_CONVERSATION_ID.to_string())
    }

    /// Fetch or create the conversation registered under `key` and mark it used.
    pub fn conversation(&self, key: &str) -> Arc<Mutex<Conversation>> {
        let mut entry = self
            .conversations
            .entry(key.to_string())
            .or_insert_with(|| ConversationEntry::new(key));
        entry.last_used = Instant::now();
        entry.conversation.clone()
    }

    pub fn conversation_count(&self) -> usize {
        self.conversations.len()
    }

    /// Drop idle conversations, then the least recently used ones until there
    /// is room for one more. The default conversation is never dropped.
    fn prune(&self) {
        let idle_timeout = self.limits.idle_timeout;
        self.conversations.retain(|key, entry| {
            key == DEFAULT_CONVERSATION_ID || entry.last_used.elapsed() < idle_timeout
        });

        let max = self.limits.max_conversations.max(1);
        while self.conversations.len() >= max {
            let oldest = self
                .conversations
                .iter()
                .filter(|entry| entry.key() != DEFAULT_CONVERSATION_ID)
                .min_by_key(|entry| entry.value().last_used)
                .map(|entry| entry.key().clone());
            let Some(key) = oldest else { break };
            self.conversations.remove(&key);
            debug!(conversation = %key, "Evicted least recently used conversation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_ids_share_the_default_conversation() {
        let state = AppState::unconfigured(Vec::new());
        assert_eq!(state.conversation_key(None), DEFAULT_CONVERSATION_ID);
        assert_eq!(state.conversation_key(Some("")), DEFAULT_CONVERSATION_ID);
        assert_eq!(
            state.conversation_key(Some("../../etc/passwd")),
            DEFAULT_CONVERSATION_ID
        );
        // Well formed but never issued
        assert_eq!(
            state.conversation_key(Some(&Uuid::new_v4().to_string())),
            DEFAULT_CONVERSATION_ID
        );

        let id = state.register_conversation();
        assert_eq!(state.conversation_key(Some(&id)), id);
        assert_eq!(state.conversation_key(Some(&format!(" {id} "))), id);
    }

    #[tokio::test]
    async fn conversations_are_registered_once_per_key() {
        let state = AppState::unconfigured(Vec::new());
        let first = state.conversation("a");
        let again = state.conversation("a");
        let other = state.conversation("b");

        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(state.conversation_count(), 2);
        assert_eq!(first.lock().await.id(), "a");
    }

    #[test]
    fn idle_conversations_are_swept_on_register() {
        let state = AppState::unconfigured(Vec::new()).with_limits(RegistryLimits {
            max_conversations: 100,
            idle_timeout: Duration::ZERO,
        });
        state.conversation(DEFAULT_CONVERSATION_ID);
        let stale = state.register_conversation();
        let fresh = state.register_conversation();

        assert_eq!(state.conversation_count(), 2);
        assert_eq!(state.conversation_key(Some(&stale)), DEFAULT_CONVERSATION_ID);
        assert_eq!(state.conversation_key(Some(&fresh)), fresh);
    }

    #[test]
    fn registry_is_capped_by_evicting_the_least_recently_used() {
        let state = AppState::unconfigured(Vec::new()).with_limits(RegistryLimits {
            max_conversations: 3,
            idle_timeout: Duration::from_secs(3600),
        });
        let pause = || std::thread::sleep(Duration::from_millis(2));

        let first = state.register_conversation();
        pause();
        let second = state.register_conversation();
        pause();
        let third = state.register_conversation();
        pause();
        // Using the first one makes the second the oldest
        state.conversation(&first);
        pause();
        let fourth = state.register_conversation();

        assert_eq!(state.conversation_count(), 3);
        assert_eq!(state.conversation_key(Some(&second)), DEFAULT_CONVERSATION_ID);
        for id in [&first, &third, &fourth] {
            assert_eq!(&state.conversation_key(Some(id)), id);
        }
    }
}
