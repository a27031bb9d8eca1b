#[cfg(test)]
#[path = "recording_test.rs"]
mod tests;

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::GenerationLock;
use crate::domain::models::AudioBlob;
use crate::domain::models::CaptureBox;
use crate::domain::models::Event;
use crate::domain::models::MicrophoneBox;
use crate::domain::models::Status;
use crate::domain::models::GUARD_RESET;

pub const RECORDING_STATUS: &str = "Recording... Speak now. Press CTRL+R again to send.";
pub const SENDING_STATUS: &str = "Sending...";
pub const BUSY_STATUS: &str = "Wait for the current reply to finish before recording.";
pub const NO_SESSION_STATUS: &str = "Select a chat first (or create a new chat).";
pub const UNAVAILABLE_STATUS: &str =
    "Microphone access denied or unavailable. Check device permissions.";
pub const TOO_SHORT_STATUS: &str =
    "Record at least ~1 second. Press CTRL+R, speak, then press it again to send.";
pub const EMPTY_STATUS: &str = "No audio captured. Try again and check the microphone.";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordingPhase {
    Idle,
    Recording,
    Stopping,
}

enum RecordingState {
    Idle,
    Recording {
        started_at: Instant,
        capture: CaptureBox,
    },
    Stopping,
}

impl RecordingState {
    fn phase(&self) -> RecordingPhase {
        match self {
            RecordingState::Idle => return RecordingPhase::Idle,
            RecordingState::Recording { .. } => return RecordingPhase::Recording,
            RecordingState::Stopping => return RecordingPhase::Stopping,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum StopOutcome {
    /// Stop was called while not recording.
    NotRecording,
    TooShort(Duration),
    Empty,
    Failed,
    /// A recording ready for upload.
    Captured(AudioBlob),
}

/// Microphone lifecycle: `Idle -> Recording -> Stopping -> Idle`. A capture
/// exists exactly while the state is `Recording`.
pub struct RecordingController {
    state: Mutex<RecordingState>,
    microphone: MicrophoneBox,
    min_duration: Duration,
    tx: mpsc::UnboundedSender<Event>,
}

impl RecordingController {
    pub fn new(
        microphone: MicrophoneBox,
        min_duration: Duration,
        tx: mpsc::UnboundedSender<Event>,
    ) -> RecordingController {
        return RecordingController {
            state: Mutex::new(RecordingState::Idle),
            microphone,
            min_duration,
            tx,
        };
    }

    pub async fn phase(&self) -> RecordingPhase {
        return self.state.lock().await.phase();
    }

    fn status(&self, status: Status) {
        let _ = self.tx.send(Event::Status(status));
    }

    /// Opens the microphone. Rejected while a reply is generating or when no
    /// session is open. Does nothing unless idle.
    pub async fn start(&self, lock: &GenerationLock, session_id: Option<i64>) {
        if lock.is_held() {
            self.status(Status::error(BUSY_STATUS).reset_after(GUARD_RESET));
            return;
        }

        if session_id.is_none() {
            self.status(Status::error(NO_SESSION_STATUS));
            return;
        }

        // Held across open so a concurrent start cannot open a second device.
        let mut state = self.state.lock().await;
        if state.phase() != RecordingPhase::Idle {
            tracing::debug!(phase = ?state.phase(), "Recording already in progress");
            return;
        }

        let capture = match self.microphone.open().await {
            Ok(capture) => capture,
            Err(err) => {
                tracing::warn!(error = ?err, "Failed to open microphone");
                self.status(Status::error(UNAVAILABLE_STATUS));
                return;
            }
        };

        *state = RecordingState::Recording {
            started_at: Instant::now(),
            capture,
        };
        drop(state);

        let _ = self.tx.send(Event::Recording(true));
        self.status(Status::info(RECORDING_STATUS));
    }

    /// Stops the capture and releases the device on every path. Returns the
    /// recording when it is long enough and not empty.
    pub async fn stop(&self) -> StopOutcome {
        let mut state = self.state.lock().await;
        let (started_at, mut capture) =
            match std::mem::replace(&mut *state, RecordingState::Stopping) {
                RecordingState::Recording {
                    started_at,
                    capture,
                } => (started_at, capture),
                other => {
                    *state = other;
                    return StopOutcome::NotRecording;
                }
            };
        drop(state);

        let _ = self.tx.send(Event::Recording(false));
        self.status(Status::info(SENDING_STATUS));

        let elapsed = started_at.elapsed();
        let mime_type = capture.mime_type();
        let captured = capture.stop().await;
        drop(capture);
        *self.state.lock().await = RecordingState::Idle;

        let chunks = match captured {
            Ok(chunks) => chunks,
            Err(err) => {
                tracing::error!(error = ?err, "Failed to stop recording");
                self.status(Status::error(UNAVAILABLE_STATUS));
                return StopOutcome::Failed;
            }
        };

        if elapsed < self.min_duration {
            tracing::debug!(elapsed_ms = elapsed.as_millis() as u64, "Recording too short");
            self.status(Status::error(TOO_SHORT_STATUS).reset_after(GUARD_RESET));
            return StopOutcome::TooShort(elapsed);
        }

        let blob = AudioBlob::from_chunks(chunks, &mime_type);
        if blob.is_empty() {
            self.status(Status::error(EMPTY_STATUS).reset_after(GUARD_RESET));
            return StopOutcome::Empty;
        }

        tracing::debug!(
            elapsed_ms = elapsed.as_millis() as u64,
            bytes = blob.bytes.len(),
            mime_type = %mime_type,
            "Recording captured"
        );

        return StopOutcome::Captured(blob);
    }
}
