#[cfg(test)]
#[path = "command_player_test.rs"]
mod tests;

use std::process::Stdio;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::split_command;
use crate::domain::models::AudioBlob;
use crate::domain::models::AudioSink;

/// Plays audio by piping it into an external program's stdin, such as
/// `ffplay` or `mpv`.
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    pub fn new(command: &str) -> Result<CommandPlayer> {
        let (program, args) = split_command(command)?;

        return Ok(CommandPlayer { program, args });
    }
}

#[async_trait]
impl AudioSink for CommandPlayer {
    #[allow(clippy::implicit_return)]
    async fn play(&self, audio: AudioBlob) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| return format!("Failed to start player '{}'", self.program))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| return anyhow!("Player has no stdin"))?;

        tracing::debug!(
            program = %self.program,
            mime_type = %audio.mime_type,
            bytes = audio.bytes.len(),
            "Playing audio"
        );

        tokio::spawn(async move {
            if let Err(err) = stdin.write_all(&audio.bytes).await {
                tracing::warn!(error = ?err, "Failed to write audio to player");
            }
            drop(stdin);

            match child.wait().await {
                Ok(status) if !status.success() => {
                    tracing::warn!(status = ?status, "Player exited with an error");
                }
                Err(err) => {
                    tracing::warn!(error = ?err, "Failed to wait for player");
                }
                _ => {}
            }
        });

        return Ok(());
    }
}
