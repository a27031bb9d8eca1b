#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use anyhow::Result;
use futures::StreamExt;
use tokio::task::JoinHandle;

use super::lock_or_recover;
use super::ChatContext;
use super::GenerationGuard;
use super::MessageAssembler;
use super::StreamDecoder;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::MessageView;

/// The text path: append the user's message, then stream or fetch the reply.
pub struct ChatService {
    ctx: ChatContext,
}

impl ChatService {
    pub fn new(ctx: ChatContext) -> ChatService {
        return ChatService { ctx };
    }

    /// Starts a turn for `content`. Returns `None` when nothing was started:
    /// blank input, no open session, or a turn already in flight.
    pub fn send_text(&self, content: &str) -> Option<JoinHandle<Result<()>>> {
        let content = content.trim().to_string();
        if content.is_empty() {
            return None;
        }

        let session_id = match self.ctx.session_id() {
            Some(session_id) => session_id,
            None => {
                self.ctx
                    .error("Select a chat first (or create a new chat) with /sessions or /new.");
                return None;
            }
        };

        let guard = self.ctx.lock.try_acquire()?;
        let ctx = self.ctx.clone();

        return Some(tokio::spawn(async move {
            if let Err(err) = run_turn(&ctx, &guard, session_id, &content).await {
                tracing::error!(session_id, error = ?err, "Chat turn failed");
                ctx.error(&format!("Error: {err}"));
            }

            drop(guard);
            return Ok(());
        }));
    }
}

async fn run_turn(
    ctx: &ChatContext,
    guard: &GenerationGuard,
    session_id: i64,
    content: &str,
) -> Result<()> {
    let user_message = Message::user(content);
    let user_view = MessageView::project(&user_message, ctx.renderer.as_ref());
    lock_or_recover(&ctx.conversation).push(user_message);
    ctx.emit(Event::MessageAppended(user_view));

    guard.composing(true);

    if !ctx.stream {
        let reply = ctx.backend.send_message(session_id, content).await?;
        let view = MessageView::project(&reply, ctx.renderer.as_ref());

        let mut store = lock_or_recover(&ctx.conversation);
        if store.session_id() != Some(session_id) {
            return Ok(());
        }
        store.push(reply);
        drop(store);

        ctx.emit(Event::MessageAppended(view));
        return Ok(());
    }

    let body = ctx.backend.stream_message(session_id, content).await?;
    let mut deltas = StreamDecoder::decode(body);
    let mut assembler = MessageAssembler::open(ctx, session_id)?;

    while let Some(delta) = deltas.next().await {
        assembler.on_delta(&delta?);
    }

    if let Some(reply) = assembler.finish() {
        tracing::debug!(session_id, length = reply.content.len(), "Reply committed");
    }

    return Ok(());
}
