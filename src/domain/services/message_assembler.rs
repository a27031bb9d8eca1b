#[cfg(test)]
#[path = "message_assembler_test.rs"]
mod tests;

use anyhow::Result;

use super::lock_or_recover;
use super::ChatContext;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::MessageView;

pub const NO_RESPONSE: &str = "(No response)";

/// Grows the in-progress assistant reply one delta at a time. Every delta
/// re-renders the full text received so far, so markdown spanning several
/// deltas renders correctly once it closes.
///
/// Dropping an assembler that was never finished discards the reply.
pub struct MessageAssembler {
    ctx: ChatContext,
    session_id: i64,
    surfaced: bool,
    finished: bool,
}

impl MessageAssembler {
    pub fn open(ctx: &ChatContext, session_id: i64) -> Result<MessageAssembler> {
        lock_or_recover(&ctx.conversation).open_assistant(session_id)?;

        return Ok(MessageAssembler {
            ctx: ctx.clone(),
            session_id,
            surfaced: false,
            finished: false,
        });
    }

    pub fn on_delta(&mut self, delta: &str) {
        let mut store = lock_or_recover(&self.ctx.conversation);
        let view = match store.grow_assistant(self.session_id, delta) {
            Some(content) => MessageView::draft(content, self.ctx.renderer.as_ref()),
            None => {
                tracing::debug!(
                    session_id = self.session_id,
                    "Session changed mid reply, dropping delta"
                );
                return;
            }
        };
        drop(store);

        if !self.surfaced {
            self.surfaced = true;
            self.ctx.emit(Event::Composing(false));
        }

        self.ctx.emit(Event::AssistantDraft(view));
    }

    /// Commits the reply with the current time. An empty reply is committed
    /// as a placeholder so the turn still leaves a record.
    pub fn finish(mut self) -> Option<Message> {
        self.finished = true;

        let message =
            lock_or_recover(&self.ctx.conversation).freeze_assistant(self.session_id, NO_RESPONSE)?;

        self.ctx.emit(Event::AssistantCommitted(MessageView::project(
            &message,
            self.ctx.renderer.as_ref(),
        )));

        return Some(message);
    }
}

impl Drop for MessageAssembler {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        lock_or_recover(&self.ctx.conversation).discard_assistant(self.session_id);
        self.ctx.emit(Event::AssistantDraftDiscarded());
    }
}
