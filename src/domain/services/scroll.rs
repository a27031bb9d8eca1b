#[cfg(test)]
#[path = "scroll_test.rs"]
mod tests;

use ratatui::widgets::ScrollbarState;

const PAGE: u16 = 10;

/// Transcript scroll position. Follows the bottom until the user scrolls up,
/// and resumes following once they scroll back down to it.
pub struct Scroll {
    list_length: u16,
    viewport_length: u16,
    following: bool,
    pub position: u16,
    pub scrollbar_state: ScrollbarState,
}

impl Default for Scroll {
    fn default() -> Scroll {
        return Scroll {
            list_length: 0,
            viewport_length: 0,
            following: true,
            position: 0,
            scrollbar_state: ScrollbarState::default(),
        };
    }
}

impl Scroll {
    fn max_position(&self) -> u16 {
        return self.list_length.saturating_sub(self.viewport_length);
    }

    pub fn is_following(&self) -> bool {
        return self.following;
    }

    pub fn up(&mut self) {
        self.position = self.position.saturating_sub(1);
        self.following = self.position >= self.max_position();
        self.scrollbar_state = self.scrollbar_state.position(self.position);
    }

    pub fn up_page(&mut self) {
        for _ in 0..PAGE {
            self.up();
        }
    }

    pub fn down(&mut self) {
        self.position = self.position.saturating_add(1).min(self.max_position());
        self.following = self.position >= self.max_position();
        self.scrollbar_state = self.scrollbar_state.position(self.position);
    }

    pub fn down_page(&mut self) {
        for _ in 0..PAGE {
            self.down();
        }
    }

    pub fn last(&mut self) {
        self.position = self.max_position();
        self.following = true;
        self.scrollbar_state = self.scrollbar_state.position(self.position);
    }

    pub fn set_state(&mut self, list_length: u16, viewport_length: u16) {
        self.list_length = list_length;
        self.viewport_length = viewport_length;
        self.scrollbar_state = self
            .scrollbar_state
            .content_length(self.max_position())
            .viewport_content_length(viewport_length);

        if self.following {
            self.last();
        } else {
            self.position = self.position.min(self.max_position());
            self.scrollbar_state = self.scrollbar_state.position(self.position);
        }
    }
}
