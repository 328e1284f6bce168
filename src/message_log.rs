use crate::models::Message;
use parking_lot::RwLock;
use std::collections::VecDeque;

/// Messages kept on the board; older ones are evicted past this.
pub const MESSAGE_LOG_CAPACITY: usize = 100;

/// Fixed-capacity board history, newest at the front.
pub struct MessageLog {
    messages: RwLock<VecDeque<Message>>,
    capacity: usize,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::with_capacity(MESSAGE_LOG_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            messages: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Insert as newest, evicting the oldest entry when full.
    pub fn push(&self, message: Message) {
        let mut messages = self.messages.write();
        messages.push_front(message);
        messages.truncate(self.capacity);
    }

    /// Point-in-time copy, newest first.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.read().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for MessageLog {
    fn default() -> Self {
        Self::new()
    }
}
