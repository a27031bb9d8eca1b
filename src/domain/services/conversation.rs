#[cfg(test)]
#[path = "conversation_test.rs"]
mod tests;

use std::sync::Mutex;
use std::sync::MutexGuard;

use anyhow::bail;
use anyhow::Result;
use chrono::Utc;

use crate::domain::models::Message;
use crate::domain::models::Role;

/// Locks a std mutex, recovering the data if a previous holder panicked.
/// Guards are never held across an await point.
pub fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => return guard,
        Err(poisoned) => {
            tracing::error!("Conversation lock poisoned, recovering");
            return poisoned.into_inner();
        }
    }
}

/// Ordered messages of the open session, plus the single assistant reply
/// that is still streaming in.
#[derive(Default)]
pub struct ConversationStore {
    session_id: Option<i64>,
    messages: Vec<Message>,
    in_flight: Option<InFlight>,
}

struct InFlight {
    session_id: i64,
    content: String,
}

impl ConversationStore {
    pub fn session_id(&self) -> Option<i64> {
        return self.session_id;
    }

    pub fn messages(&self) -> &[Message] {
        return &self.messages;
    }

    pub fn has_in_flight(&self) -> bool {
        return self.in_flight.is_some();
    }

    /// Swaps in a session and its persisted messages. Any in-progress reply
    /// belongs to the previous state and is dropped.
    pub fn replace(&mut self, session_id: Option<i64>, messages: Vec<Message>) {
        self.session_id = session_id;
        self.messages = messages;
        self.in_flight = None;
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Opens the in-progress assistant slot for a reply in `session_id`.
    pub fn open_assistant(&mut self, session_id: i64) -> Result<()> {
        if self.in_flight.is_some() {
            bail!("An assistant reply is already in progress");
        }

        if self.session_id != Some(session_id) {
            bail!("Session {session_id} is no longer open");
        }

        self.in_flight = Some(InFlight {
            session_id,
            content: "".to_string(),
        });

        return Ok(());
    }

    /// Appends a delta to the in-progress reply and returns the full text so
    /// far. Returns `None` when no reply for `session_id` is in progress.
    pub fn grow_assistant(&mut self, session_id: i64, delta: &str) -> Option<&str> {
        let in_flight = self.in_flight.as_mut()?;
        if in_flight.session_id != session_id {
            return None;
        }

        in_flight.content.push_str(delta);
        return Some(&in_flight.content);
    }

    /// Freezes the in-progress reply into the conversation, stamping it with
    /// the current time. Empty replies get `placeholder` as their content.
    pub fn freeze_assistant(&mut self, session_id: i64, placeholder: &str) -> Option<Message> {
        match &self.in_flight {
            Some(in_flight) if in_flight.session_id == session_id => {}
            _ => return None,
        }

        let in_flight = self.in_flight.take()?;
        let mut content = in_flight.content;
        if content.is_empty() {
            content = placeholder.to_string();
        }

        let message = Message {
            role: Role::Assistant,
            content,
            created_at: Utc::now(),
        };
        self.messages.push(message.clone());

        return Some(message);
    }

    /// Drops the in-progress reply for `session_id`. Returns whether there
    /// was one.
    pub fn discard_assistant(&mut self, session_id: i64) -> bool {
        match &self.in_flight {
            Some(in_flight) if in_flight.session_id == session_id => {
                self.in_flight = None;
                return true;
            }
            _ => return false,
        }
    }
}
