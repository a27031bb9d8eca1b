#[cfg(test)]
#[path = "view_test.rs"]
mod tests;

use super::Message;
use super::Renderer;
use super::Role;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
    /// Client side notices: listings, help, inline errors. Never persisted.
    Parley,
}

impl From<Role> for Speaker {
    fn from(role: Role) -> Speaker {
        match role {
            Role::User => return Speaker::User,
            Role::Assistant => return Speaker::Assistant,
        }
    }
}

/// What the display surface shows for one message. Views are projections of
/// the conversation model and are rebuilt rather than edited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageView {
    pub speaker: Speaker,
    pub body: String,
    pub time: String,
    pub is_error: bool,
}

impl MessageView {
    pub fn project(message: &Message, renderer: &dyn Renderer) -> MessageView {
        let body = match message.role {
            Role::User => renderer.escape(&message.content),
            Role::Assistant => renderer.render(&message.content),
        };

        return MessageView {
            speaker: message.role.into(),
            body,
            time: message.time(),
            is_error: false,
        };
    }

    pub fn project_all(messages: &[Message], renderer: &dyn Renderer) -> Vec<MessageView> {
        return messages
            .iter()
            .map(|message| {
                return MessageView::project(message, renderer);
            })
            .collect();
    }

    /// The in-progress assistant reply, rendered from everything received so
    /// far. Drafts carry no time until committed.
    pub fn draft(content: &str, renderer: &dyn Renderer) -> MessageView {
        return MessageView {
            speaker: Speaker::Assistant,
            body: renderer.render(content),
            time: "".to_string(),
            is_error: false,
        };
    }

    pub fn notice(text: &str) -> MessageView {
        return MessageView {
            speaker: Speaker::Parley,
            body: text.to_string(),
            time: "".to_string(),
            is_error: false,
        };
    }

    pub fn error(text: &str) -> MessageView {
        return MessageView {
            is_error: true,
            ..MessageView::notice(text)
        };
    }
}
