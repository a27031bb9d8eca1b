#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use serde::Deserialize;
use serde::Serialize;

use super::format_time;
use super::parse_timestamp;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: i64,
    pub agent_id: i64,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Session {
    pub fn label(&self) -> String {
        let time = self
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .map(|datetime| return format_time(&datetime))
            .unwrap_or_default();

        if time.is_empty() {
            return format!("Chat {}", self.session_id);
        }

        return format!("Chat {} ({time})", self.session_id);
    }
}
