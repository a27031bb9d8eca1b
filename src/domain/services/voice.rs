#[cfg(test)]
#[path = "voice_test.rs"]
mod tests;

use anyhow::Result;
use tokio::task::JoinHandle;

use super::lock_or_recover;
use super::ChatContext;
use super::BUSY_STATUS;
use crate::domain::models::AudioBlob;
use crate::domain::models::AudioSinkBox;
use crate::domain::models::Event;
use crate::domain::models::MessageView;
use crate::domain::models::Status;
use crate::domain::models::VoiceReply;
use crate::domain::models::GUARD_RESET;
use crate::domain::models::VOICE_ERROR_RESET;

pub const PROCESSING_STATUS: &str = "Processing voice...";
pub const TRANSCRIBE_FAILED: &str =
    "Could not transcribe audio. Speak clearly and record at least 1 second.";
pub const UPLOAD_FAILED: &str = "Failed to send voice. Check connection and try again.";
const NO_SESSION: &str = "Select a chat first (or create a new chat).";

/// Maps the platform's error text to what the user sees. Transcription
/// failures get a hint on how to record; anything else is shown as is.
pub fn classify_voice_error(text: &str) -> String {
    let text = text.trim();
    if text.contains("no text") || text.contains("Speech") || text.contains("transcri") {
        return TRANSCRIBE_FAILED.to_string();
    }

    if text.is_empty() {
        return UPLOAD_FAILED.to_string();
    }

    return text.to_string();
}

/// Uploads finished recordings and plays back the spoken reply.
pub struct VoicePipeline {
    ctx: ChatContext,
    sink: AudioSinkBox,
}

impl VoicePipeline {
    pub fn new(ctx: ChatContext, sink: AudioSinkBox) -> VoicePipeline {
        return VoicePipeline { ctx, sink };
    }

    /// Starts the upload of `audio`. Returns `None` when nothing was started:
    /// no open session, or a turn already in flight.
    pub fn send(&self, audio: AudioBlob) -> Option<JoinHandle<Result<()>>> {
        let session_id = match self.ctx.session_id() {
            Some(session_id) => session_id,
            None => {
                self.ctx
                    .status(Status::error(NO_SESSION).reset_after(GUARD_RESET));
                return None;
            }
        };

        let guard = match self.ctx.lock.try_acquire() {
            Some(guard) => guard,
            None => {
                tracing::debug!(session_id, "Reply in flight, dropping recording");
                self.ctx
                    .status(Status::error(BUSY_STATUS).reset_after(GUARD_RESET));
                return None;
            }
        };
        let ctx = self.ctx.clone();
        let sink = self.sink.clone();

        return Some(tokio::spawn(async move {
            guard.composing(true);
            ctx.status(Status::info(PROCESSING_STATUS));

            let status = match upload(&ctx, &sink, session_id, audio).await {
                Ok(status) => status,
                Err(err) => {
                    tracing::error!(session_id, error = ?err, "Voice upload failed");
                    Status::error(UPLOAD_FAILED).reset_after(VOICE_ERROR_RESET)
                }
            };

            ctx.status(status);
            drop(guard);
            return Ok(());
        }));
    }
}

async fn upload(
    ctx: &ChatContext,
    sink: &AudioSinkBox,
    session_id: i64,
    audio: AudioBlob,
) -> Result<Status> {
    tracing::debug!(
        session_id,
        bytes = audio.bytes.len(),
        mime_type = %audio.mime_type,
        "Uploading recording"
    );

    let reply = match ctx.backend.send_voice(session_id, audio).await? {
        VoiceReply::Audio(reply) => reply,
        VoiceReply::Rejected(text) => {
            tracing::warn!(session_id, error = %text, "Voice request rejected");
            return Ok(Status::error(&classify_voice_error(&text)).reset_after(VOICE_ERROR_RESET));
        }
    };

    if let Err(err) = sink.play(reply).await {
        tracing::warn!(error = ?err, "Failed to play spoken reply");
    }

    // Transcript and reply text only exist on the platform.
    let messages = ctx.backend.list_messages(session_id).await?;

    let mut store = lock_or_recover(&ctx.conversation);
    if store.session_id() != Some(session_id) {
        return Ok(Status::idle());
    }
    let views = MessageView::project_all(&messages, ctx.renderer.as_ref());
    store.replace(Some(session_id), messages);
    drop(store);

    ctx.emit(Event::ConversationReplaced(views));

    return Ok(Status::idle());
}
