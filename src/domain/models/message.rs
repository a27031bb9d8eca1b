#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use chrono::DateTime;
use chrono::Local;
use chrono::NaiveDateTime;
use chrono::TimeZone;
use chrono::Utc;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Parses backend timestamps. The platform emits ISO-8601 with or without an
/// offset; offset-less values are UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }

    return None;
}

/// Local wall clock time as shown next to each message.
pub fn format_time(datetime: &DateTime<Utc>) -> String {
    return datetime.with_timezone(&Local).format("%H:%M:%S").to_string();
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<DateTime<Utc>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => return Ok(Utc::now()),
        Some(val) => {
            return parse_timestamp(&val).ok_or_else(|| {
                return serde::de::Error::custom(format!("Invalid timestamp {val}"));
            });
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default = "Utc::now", deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Message {
        return Message {
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
    }

    pub fn user(content: &str) -> Message {
        return Message::new(Role::User, content);
    }

    pub fn assistant(content: &str) -> Message {
        return Message::new(Role::Assistant, content);
    }

    pub fn time(&self) -> String {
        return format_time(&self.created_at);
    }
}
