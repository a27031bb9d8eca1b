#[cfg(test)]
#[path = "command_microphone_test.rs"]
mod tests;

use std::process::Stdio;
use std::time::Duration;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use tokio::process::Child;
use tokio::process::ChildStdout;
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio_util::io::ReaderStream;

use super::split_command;
use crate::domain::models::Capture;
use crate::domain::models::CaptureBox;
use crate::domain::models::Microphone;

/// How long a freshly started recorder gets to fail before the device counts
/// as open.
const STARTUP_PROBE: Duration = Duration::from_millis(100);

async fn read_chunks(stdout: ChildStdout) -> Result<Vec<Vec<u8>>> {
    let mut chunks = vec![];
    let mut stream = ReaderStream::new(stdout);
    while let Some(chunk) = stream.next().await {
        chunks.push(chunk?.to_vec());
    }

    return Ok(chunks);
}

/// Records by running an external program that writes audio to stdout, such
/// as `arecord` or `sox`.
pub struct CommandMicrophone {
    program: String,
    args: Vec<String>,
    mime_type: String,
}

impl CommandMicrophone {
    pub fn new(command: &str, mime_type: &str) -> Result<CommandMicrophone> {
        let (program, args) = split_command(command)?;

        return Ok(CommandMicrophone {
            program,
            args,
            mime_type: mime_type.to_string(),
        });
    }
}

#[async_trait]
impl Microphone for CommandMicrophone {
    #[allow(clippy::implicit_return)]
    async fn open(&self) -> Result<CaptureBox> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| return format!("Failed to start recorder '{}'", self.program))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| return anyhow!("Recorder has no stdout"))?;
        let reader = tokio::spawn(read_chunks(stdout));

        tokio::time::sleep(STARTUP_PROBE).await;
        if let Some(status) = child.try_wait()? {
            if !status.success() {
                tracing::warn!(program = %self.program, status = ?status, "Recorder exited on start");
                bail!("Recorder '{}' exited with {status}", self.program);
            }
        }

        tracing::debug!(program = %self.program, mime_type = %self.mime_type, "Recorder started");

        return Ok(Box::new(CommandCapture {
            child,
            reader: Some(reader),
            mime_type: self.mime_type.to_string(),
        }));
    }
}

/// A running recorder process. Dropping it kills the process.
pub struct CommandCapture {
    child: Child,
    reader: Option<JoinHandle<Result<Vec<Vec<u8>>>>>,
    mime_type: String,
}

#[async_trait]
impl Capture for CommandCapture {
    fn mime_type(&self) -> String {
        return self.mime_type.to_string();
    }

    #[allow(clippy::implicit_return)]
    async fn stop(&mut self) -> Result<Vec<Vec<u8>>> {
        if let Err(err) = self.child.start_kill() {
            tracing::debug!(error = ?err, "Recorder already exited");
        }
        let status = self.child.wait().await?;
        tracing::debug!(status = ?status, "Recorder stopped");

        let reader = self
            .reader
            .take()
            .ok_or_else(|| return anyhow!("Recording was already stopped"))?;
        let chunks = reader.await??;

        return Ok(chunks);
    }
}
