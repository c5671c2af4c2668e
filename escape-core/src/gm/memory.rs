//! Conversation memory for the game master.
//!
//! A sliding window of recent exchanges. Messages are stored as
//! user/assistant pairs so the window always starts on a user turn, which
//! the Messages API requires.

use claude::Message;
use serde::{Deserialize, Serialize};

/// Maximum number of messages kept (20 exchanges).
const MAX_RECENT_MESSAGES: usize = 40;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GmMemory {
    recent_messages: Vec<StoredMessage>,
}

impl GmMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed exchange.
    pub fn add_exchange(&mut self, prompt: &str, response: &str) {
        self.recent_messages.push(StoredMessage {
            role: MessageRole::User,
            content: prompt.to_string(),
        });
        self.recent_messages.push(StoredMessage {
            role: MessageRole::Assistant,
            content: response.to_string(),
        });
        self.trim_history();
    }

    /// The stored conversation followed by a new user prompt, ready to send.
    pub fn messages_with(&self, prompt: &str) -> Vec<Message> {
        self.recent_messages
            .iter()
            .map(|m| match m.role {
                MessageRole::User => Message::user(&m.content),
                MessageRole::Assistant => Message::assistant(&m.content),
            })
            .chain(std::iter::once(Message::user(prompt)))
            .collect()
    }

    pub fn clear(&mut self) {
        self.recent_messages.clear();
    }

    /// Get the number of stored messages.
    pub fn message_count(&self) -> usize {
        self.recent_messages.len()
    }

    fn trim_history(&mut self) {
        if self.recent_messages.len() > MAX_RECENT_MESSAGES {
            let excess = self.recent_messages.len() - MAX_RECENT_MESSAGES;
            // Drop whole exchanges so the window still opens on a user turn.
            self.recent_messages.drain(..excess + excess % 2);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredMessage {
    role: MessageRole,
    content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum MessageRole {
    User,
    Assistant,
}

#[cfg(test)]
mod tests {
    use super::*;
    use claude::Role;

    #[test]
    fn test_memory_creation() {
        let memory = GmMemory::new();
        assert_eq!(memory.message_count(), 0);
    }

    #[test]
    fn test_add_exchange() {
        let mut memory = GmMemory::new();
        memory.add_exchange("look around", "The room is dark.");
        assert_eq!(memory.message_count(), 2);
    }

    #[test]
    fn test_messages_with_appends_prompt() {
        let mut memory = GmMemory::new();
        memory.add_exchange("look around", "The room is dark.");

        let messages = memory.messages_with("turn on the light");
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[2].text, "turn on the light");
    }

    #[test]
    fn test_trim_history_keeps_pairs() {
        let mut memory = GmMemory::new();
        for i in 0..30 {
            memory.add_exchange(&format!("action {i}"), &format!("reply {i}"));
        }

        assert_eq!(memory.message_count(), MAX_RECENT_MESSAGES);
        let messages = memory.messages_with("next");
        assert_eq!(messages[0].role, Role::User);
        assert_eq!(messages[0].text, "action 10");
    }

    #[test]
    fn test_clear() {
        let mut memory = GmMemory::new();
        memory.add_exchange("a", "b");
        memory.clear();
        assert_eq!(memory.message_count(), 0);
    }
}
