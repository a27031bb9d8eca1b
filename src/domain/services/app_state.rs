#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use std::time::Instant;

use ratatui::prelude::Rect;
use ratatui::style::Color;
use ratatui::style::Modifier;
use ratatui::style::Style;
use ratatui::text::Line;
use ratatui::text::Span;

use super::Scroll;
use crate::domain::models::Event;
use crate::domain::models::Loading;
use crate::domain::models::MessageView;
use crate::domain::models::Speaker;
use crate::domain::models::Status;

/// Breaks `text` into lines of at most `width` characters, on spaces where
/// possible. Explicit newlines are kept.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = vec![];

    for raw_line in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;

        for word in raw_line.split(' ') {
            let mut word = word.to_string();
            let mut word_len = word.chars().count();

            if current_len > 0 && current_len + 1 + word_len > width {
                lines.push(current);
                current = String::new();
                current_len = 0;
            }

            while word_len > width {
                let head = word.chars().take(width).collect::<String>();
                word = word.chars().skip(width).collect::<String>();
                word_len -= width;

                if current_len > 0 {
                    lines.push(current);
                    current = String::new();
                    current_len = 0;
                }
                lines.push(head);
            }

            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(&word);
            current_len += word_len;
        }

        lines.push(current);
    }

    return lines;
}

/// Everything the terminal shows, rebuilt from events sent by the services.
pub struct AppState {
    pub agent_name: Option<String>,
    pub session_id: Option<i64>,
    pub messages: Vec<MessageView>,
    pub draft: Option<MessageView>,
    pub composing: bool,
    pub generating: bool,
    pub recording: bool,
    pub status: Status,
    pub loading: Loading,
    pub scroll: Scroll,
    pub last_known_height: u16,
    pub last_known_width: u16,
    status_set_at: Instant,
    lines: Vec<Line<'static>>,
}

impl Default for AppState {
    fn default() -> AppState {
        return AppState {
            agent_name: None,
            session_id: None,
            messages: vec![],
            draft: None,
            composing: false,
            generating: false,
            recording: false,
            status: Status::idle(),
            loading: Loading::default(),
            scroll: Scroll::default(),
            last_known_height: 0,
            last_known_width: 0,
            status_set_at: Instant::now(),
            lines: vec![],
        };
    }
}

impl AppState {
    /// Applies a service event. Keyboard and scroll input is handled by the
    /// UI loop and ignored here.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::AssistantDraft(view) => {
                self.draft = Some(view);
            }
            Event::AssistantCommitted(view) => {
                self.draft = None;
                self.messages.push(view);
            }
            Event::AssistantDraftDiscarded() => {
                self.draft = None;
            }
            Event::Composing(composing) => {
                self.composing = composing;
                return;
            }
            Event::ConversationReplaced(views) => {
                self.draft = None;
                self.messages = views;
                self.scroll.last();
            }
            Event::Generating(generating) => {
                self.generating = generating;
                if !generating {
                    self.composing = false;
                }
                return;
            }
            Event::MessageAppended(view) | Event::Notice(view) => {
                self.messages.push(view);
                self.scroll.last();
            }
            Event::Recording(recording) => {
                self.recording = recording;
                return;
            }
            Event::SessionSelected(agent_name, session_id) => {
                self.agent_name = agent_name;
                self.session_id = session_id;
                return;
            }
            Event::Status(status) => {
                self.set_status(status, Instant::now());
                return;
            }
            Event::UITick() => {
                self.loading.tick();
                self.expire_status(Instant::now());
                return;
            }
            _ => return,
        }

        self.sync_dependants();
    }

    pub fn set_status(&mut self, status: Status, now: Instant) {
        self.status = status;
        self.status_set_at = now;
    }

    /// Reverts a timed status to the idle hint once its delay has passed.
    pub fn expire_status(&mut self, now: Instant) {
        if let Some(delay) = self.status.reset_after {
            if now.saturating_duration_since(self.status_set_at) >= delay {
                self.status = Status::idle();
            }
        }
    }

    pub fn header(&self) -> String {
        let agent = self.agent_name.as_deref().unwrap_or("No agent");
        let session = match self.session_id {
            Some(session_id) => format!("Chat {session_id}"),
            None => "No chat selected".to_string(),
        };

        return format!("Parley · {agent} · {session}");
    }

    pub fn lines(&self) -> &[Line<'static>] {
        return &self.lines;
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    fn speaker_line(&self, view: &MessageView, draft: bool) -> Line<'static> {
        let (name, color) = match view.speaker {
            Speaker::User => ("You".to_string(), Color::Cyan),
            Speaker::Assistant => (
                self.agent_name
                    .clone()
                    .unwrap_or_else(|| return "Assistant".to_string()),
                Color::Green,
            ),
            Speaker::Parley => ("Parley".to_string(), Color::Yellow),
        };

        let mut spans = vec![Span::styled(
            name,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )];

        if draft {
            spans.push(Span::styled(" ...", Style::default().fg(Color::DarkGray)));
        } else if !view.time.is_empty() {
            spans.push(Span::styled(
                format!("  {}", view.time),
                Style::default().fg(Color::DarkGray),
            ));
        }

        return Line::from(spans);
    }

    fn view_lines(&self, view: &MessageView, draft: bool, width: usize) -> Vec<Line<'static>> {
        let mut style = Style::default();
        if view.is_error {
            style = style.fg(Color::Red);
        }

        let mut lines = vec![self.speaker_line(view, draft)];
        lines.extend(wrap(&view.body, width).into_iter().map(|line| {
            return Line::from(Span::styled(format!("  {line}"), style));
        }));
        lines.push(Line::from(""));

        return lines;
    }

    fn sync_dependants(&mut self) {
        // Indent plus scrollbar.
        let width = (self.last_known_width as usize).saturating_sub(3).max(10);

        let mut lines = vec![];
        for view in &self.messages {
            lines.extend(self.view_lines(view, false, width));
        }
        if let Some(draft) = &self.draft {
            lines.extend(self.view_lines(draft, true, width));
        }
        self.lines = lines;

        let lines_len = u16::try_from(self.lines.len()).unwrap_or(u16::MAX);
        self.scroll.set_state(lines_len, self.last_known_height);
    }
}
