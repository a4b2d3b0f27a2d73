//! Loop state carried between ticks.

/// Cursor and last delivered message, owned by one orchestrator for the
/// lifetime of the process. Nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopState {
    cursor: i64,
    last_message: String,
}

impl LoopState {
    pub fn new(cursor: i64) -> Self {
        Self {
            cursor,
            last_message: String::new(),
        }
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn last_message(&self) -> &str {
        &self.last_message
    }

    /// Move the cursor to the server-reported value.
    ///
    /// The cursor never moves backwards; returns whether it changed.
    pub fn advance_cursor(&mut self, next: i64) -> bool {
        if next > self.cursor {
            self.cursor = next;
            true
        } else {
            false
        }
    }

    /// Whether `message` is what was last delivered.
    pub fn is_repeat(&self, message: &str) -> bool {
        !self.last_message.is_empty() && self.last_message == message
    }

    /// Record a message that was actually delivered.
    pub fn record_sent(&mut self, message: String) {
        self.last_message = message;
    }
}
