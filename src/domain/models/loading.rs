use ratatui::prelude::Alignment;
use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

const DOTS: [&str; 4] = ["", ".", "..", "..."];

/// Takes the place of the prompt while an assistant turn is in flight.
#[derive(Default)]
pub struct Loading {
    frame: usize,
}

impl Loading {
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % DOTS.len();
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect, composing: bool) {
        let label = if composing { "Generating" } else { "Receiving" };

        frame.render_widget(
            Paragraph::new(format!("{label}{:<3}", DOTS[self.frame]))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Double)
                        .padding(Padding::new(1, 1, 0, 0)),
                )
                .alignment(Alignment::Center),
            rect,
        );
    }
}
