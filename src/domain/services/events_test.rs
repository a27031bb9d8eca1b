use crossterm::event::Event as CrosstermEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;
use tui_textarea::Key;

use super::map_terminal_event;
use crate::domain::models::Event;

fn key(code: KeyCode, modifiers: KeyModifiers) -> Option<Event> {
    return map_terminal_event(CrosstermEvent::Key(KeyEvent::new(code, modifiers)));
}

fn ctrl(ch: char) -> Option<Event> {
    return key(KeyCode::Char(ch), KeyModifiers::CONTROL);
}

fn mouse(kind: MouseEventKind) -> Option<Event> {
    return map_terminal_event(CrosstermEvent::Mouse(MouseEvent {
        kind,
        column: 0,
        row: 0,
        modifiers: KeyModifiers::NONE,
    }));
}

#[test]
fn it_maps_hotkeys() {
    assert!(matches!(ctrl('r'), Some(Event::KeyboardCTRLR())));
    assert!(matches!(ctrl('c'), Some(Event::KeyboardCTRLC())));
    assert!(matches!(ctrl('d'), Some(Event::UIScrollPageDown())));
    assert!(matches!(ctrl('u'), Some(Event::UIScrollPageUp())));
    assert!(matches!(
        key(KeyCode::Enter, KeyModifiers::NONE),
        Some(Event::KeyboardEnter())
    ));
}

#[test]
fn it_maps_scrolling() {
    assert!(matches!(
        key(KeyCode::Up, KeyModifiers::NONE),
        Some(Event::UIScrollUp())
    ));
    assert!(matches!(
        key(KeyCode::Down, KeyModifiers::NONE),
        Some(Event::UIScrollDown())
    ));
    assert!(matches!(
        key(KeyCode::PageUp, KeyModifiers::NONE),
        Some(Event::UIScrollPageUp())
    ));
    assert!(matches!(
        mouse(MouseEventKind::ScrollDown),
        Some(Event::UIScrollDown())
    ));
    assert!(mouse(MouseEventKind::Moved).is_none());
}

#[test]
fn it_passes_plain_characters_to_the_prompt() {
    match key(KeyCode::Char('r'), KeyModifiers::NONE) {
        Some(Event::KeyboardCharInput(input)) => {
            assert!(matches!(input.key, Key::Char('r')));
            assert!(!input.ctrl);
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn it_forwards_pastes() {
    match map_terminal_event(CrosstermEvent::Paste("hola".to_string())) {
        Some(Event::KeyboardPaste(text)) => assert_eq!(text, "hola"),
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn it_ignores_focus_changes() {
    assert!(map_terminal_event(CrosstermEvent::FocusGained).is_none());
}
