pub mod command_microphone;
pub mod command_player;

use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::AudioSinkBox;
use crate::domain::models::MicrophoneBox;

/// Splits a configured command line into program and arguments.
pub fn split_command(command: &str) -> Result<(String, Vec<String>)> {
    let mut parts = command.split_whitespace().map(|e| return e.to_string());
    let program = match parts.next() {
        Some(program) => program,
        None => bail!("Audio command is empty"),
    };

    return Ok((program, parts.collect()));
}

pub struct AudioManager {}

impl AudioManager {
    pub fn microphone() -> Result<MicrophoneBox> {
        let microphone = command_microphone::CommandMicrophone::new(
            &Config::get(ConfigKey::RecorderCommand),
            &Config::get(ConfigKey::RecorderMimeType),
        )?;

        return Ok(Arc::new(microphone));
    }

    pub fn sink() -> Result<AudioSinkBox> {
        let player = command_player::CommandPlayer::new(&Config::get(ConfigKey::PlayerCommand))?;

        return Ok(Arc::new(player));
    }
}
