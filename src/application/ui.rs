use std::io;

use anyhow::Result;
use crossterm::cursor;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableMouseCapture;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::backend::CrosstermBackend;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Scrollbar;
use ratatui::widgets::ScrollbarOrientation;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tui_textarea::TextArea;

use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::SlashCommand;
use crate::domain::services::events::EventsService;
use crate::domain::services::AppState;

fn prompt_textarea() -> TextArea<'static> {
    let mut textarea = TextArea::default();
    textarea.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title("Message, or /help for commands"),
    );
    textarea.set_cursor_line_style(Style::default());

    return textarea;
}

fn render_status<B: Backend>(frame: &mut Frame<B>, rect: Rect, app_state: &AppState) {
    let mut spans = vec![];
    if app_state.recording {
        spans.push(Span::styled(
            "● ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ));
    }

    let mut style = Style::default().fg(Color::DarkGray);
    if app_state.status.is_error() {
        style = Style::default().fg(Color::Red);
    }
    spans.push(Span::styled(app_state.status.text.to_string(), style));

    frame.render_widget(Paragraph::new(Line::from(spans)), rect);
}

async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    app_state: &mut AppState,
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut textarea = prompt_textarea();
    let mut events = EventsService::new(rx);

    loop {
        terminal.draw(|frame| {
            let layout = Layout::default()
                .direction(Direction::Vertical)
                .constraints(vec![
                    Constraint::Length(1),
                    Constraint::Min(1),
                    Constraint::Length(1),
                    Constraint::Max(4),
                ])
                .split(frame.size());

            if layout[1].width != app_state.last_known_width
                || layout[1].height != app_state.last_known_height
            {
                app_state.set_rect(layout[1]);
            }

            frame.render_widget(
                Paragraph::new(app_state.header()).style(Style::default().add_modifier(Modifier::BOLD)),
                layout[0],
            );
            frame.render_widget(
                Paragraph::new(app_state.lines().to_vec()).scroll((app_state.scroll.position, 0)),
                layout[1],
            );
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                layout[1].inner(&Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut app_state.scroll.scrollbar_state,
            );
            render_status(frame, layout[2], app_state);

            if app_state.generating {
                app_state.loading.render(frame, layout[3], app_state.composing);
            } else {
                frame.render_widget(textarea.widget(), layout[3]);
            }
        })?;

        match events.next().await? {
            Event::KeyboardCTRLC() => {
                break;
            }
            Event::KeyboardCTRLR() => {
                tx.send(Action::ToggleRecording())?;
            }
            Event::KeyboardEnter() => {
                if app_state.generating {
                    continue;
                }

                let input_str = textarea.lines().join("\n");
                if input_str.trim().is_empty() {
                    continue;
                }
                textarea = prompt_textarea();

                if let Some(command) = SlashCommand::parse(&input_str) {
                    if command.is_quit() {
                        break;
                    }

                    tx.send(Action::Command(command))?;
                    continue;
                }

                tx.send(Action::SendText(input_str))?;
            }
            Event::KeyboardCharInput(input) => {
                if !app_state.generating {
                    textarea.input(input);
                }
            }
            Event::KeyboardPaste(text) => {
                if !app_state.generating {
                    textarea.insert_str(text);
                }
            }
            Event::UIScrollDown() => {
                app_state.scroll.down();
            }
            Event::UIScrollUp() => {
                app_state.scroll.up();
            }
            Event::UIScrollPageDown() => {
                app_state.scroll.down_page();
            }
            Event::UIScrollPageUp() => {
                app_state.scroll.up_page();
            }
            event => {
                app_state.handle_event(event);
            }
        }
    }

    return Ok(());
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    let _ = crossterm::execute!(io::stdout(), cursor::Show);
}

pub async fn start(
    tx: mpsc::UnboundedSender<Action>,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let stdout = io::stdout();
    let mut stdout = stdout.lock();

    enable_raw_mode()?;
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let term_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(term_backend)?;
    let mut app_state = AppState::default();

    let res = start_loop(&mut terminal, &mut app_state, tx, rx).await;

    disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    return res;
}
