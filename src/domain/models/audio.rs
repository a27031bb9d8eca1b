#[cfg(test)]
#[path = "audio_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// A finished recording, or a spoken reply from the platform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioBlob {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl AudioBlob {
    pub fn new(bytes: Vec<u8>, mime_type: &str) -> AudioBlob {
        return AudioBlob {
            bytes,
            mime_type: mime_type.to_string(),
        };
    }

    /// Joins recorded chunks in order.
    pub fn from_chunks(chunks: Vec<Vec<u8>>, mime_type: &str) -> AudioBlob {
        return AudioBlob::new(chunks.concat(), mime_type);
    }

    pub fn is_empty(&self) -> bool {
        return self.bytes.is_empty();
    }

    /// Upload file name, derived from the container part of the MIME type so
    /// `audio/webm;codecs=opus` becomes `audio.webm`.
    pub fn file_name(&self) -> String {
        let extension = self
            .mime_type
            .split(';')
            .next()
            .and_then(|essence| return essence.trim().split('/').nth(1))
            .map(|subtype| {
                return match subtype {
                    "mpeg" => "mp3",
                    "x-wav" | "wave" => "wav",
                    other => other,
                };
            })
            .filter(|subtype| return !subtype.is_empty())
            .unwrap_or("bin");

        return format!("audio.{extension}");
    }
}

/// An open capture. Dropping it releases the device.
#[async_trait]
pub trait Capture {
    /// MIME type negotiated when the device was opened.
    fn mime_type(&self) -> String;

    /// Stops capturing and releases the device, returning every chunk captured
    /// since open, in order.
    async fn stop(&mut self) -> Result<Vec<Vec<u8>>>;
}

pub type CaptureBox = Box<dyn Capture + Send>;

#[async_trait]
pub trait Microphone {
    /// Opens the capture device. Fails when permission is denied or no device
    /// is available.
    async fn open(&self) -> Result<CaptureBox>;
}

pub type MicrophoneBox = Arc<dyn Microphone + Send + Sync>;

#[async_trait]
pub trait AudioSink {
    /// Starts playback. Returns once the audio has been handed to the output,
    /// not when playback finishes.
    async fn play(&self, audio: AudioBlob) -> Result<()>;
}

pub type AudioSinkBox = Arc<dyn AudioSink + Send + Sync>;
