use std::time::Duration;

pub const IDLE_STATUS: &str = "Press CTRL+R to start recording, press it again to send.";

/// Guard statuses after a too short or empty recording.
pub const GUARD_RESET: Duration = Duration::from_millis(4000);

/// Statuses after a failed voice upload.
pub const VOICE_ERROR_RESET: Duration = Duration::from_millis(5000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// The voice status line. Statuses with `reset_after` revert to the idle hint
/// once the delay has passed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub level: StatusLevel,
    pub reset_after: Option<Duration>,
}

impl Default for Status {
    fn default() -> Status {
        return Status::idle();
    }
}

impl Status {
    pub fn idle() -> Status {
        return Status::info(IDLE_STATUS);
    }

    pub fn info(text: &str) -> Status {
        return Status {
            text: text.to_string(),
            level: StatusLevel::Info,
            reset_after: None,
        };
    }

    pub fn error(text: &str) -> Status {
        return Status {
            text: text.to_string(),
            level: StatusLevel::Error,
            reset_after: None,
        };
    }

    pub fn reset_after(mut self, delay: Duration) -> Status {
        self.reset_after = Some(delay);
        return self;
    }

    pub fn is_error(&self) -> bool {
        return self.level == StatusLevel::Error;
    }
}
