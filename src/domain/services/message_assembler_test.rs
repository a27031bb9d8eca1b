use std::sync::Arc;

use super::MessageAssembler;
use super::NO_RESPONSE;
use crate::domain::models::Event;
use crate::domain::models::Role;
use crate::domain::services::fakes::context_in_session;
use crate::domain::services::fakes::drain;
use crate::domain::services::fakes::FakeBackend;

#[test]
fn it_renders_the_full_buffer_on_every_delta() {
    let (ctx, mut rx) = context_in_session(Arc::new(FakeBackend::default()), 1);
    let mut assembler = MessageAssembler::open(&ctx, 1).unwrap();

    for delta in ["A", "B", "C"] {
        assembler.on_delta(delta);
    }

    let drafts = drain(&mut rx)
        .into_iter()
        .filter_map(|event| {
            if let Event::AssistantDraft(view) = event {
                return Some(view.body);
            }
            return None;
        })
        .collect::<Vec<String>>();

    assert_eq!(drafts, vec!["<A>", "<AB>", "<ABC>"]);
}

#[test]
fn it_hides_composing_indicator_once() {
    let (ctx, mut rx) = context_in_session(Arc::new(FakeBackend::default()), 1);
    let mut assembler = MessageAssembler::open(&ctx, 1).unwrap();

    assembler.on_delta("Hel");
    assembler.on_delta("lo");

    let composing = drain(&mut rx)
        .into_iter()
        .filter(|event| return matches!(event, Event::Composing(false)))
        .count();

    assert_eq!(composing, 1);
}

#[test]
fn it_commits_with_current_time() {
    let (ctx, mut rx) = context_in_session(Arc::new(FakeBackend::default()), 1);
    let mut assembler = MessageAssembler::open(&ctx, 1).unwrap();

    assembler.on_delta("Hello");
    let message = assembler.finish().unwrap();

    assert_eq!(message.role, Role::Assistant);
    assert_eq!(message.content, "Hello");

    let store = ctx.conversation.lock().unwrap();
    assert_eq!(store.messages().len(), 1);
    assert!(!store.has_in_flight());

    let events = drain(&mut rx);
    match events.last() {
        Some(Event::AssistantCommitted(view)) => {
            assert_eq!(view.body, "<Hello>");
            assert_eq!(view.time, message.time());
        }
        other => panic!("unexpected event {other:?}"),
    }
}

#[test]
fn it_commits_placeholder_for_empty_reply() {
    let (ctx, _rx) = context_in_session(Arc::new(FakeBackend::default()), 1);
    let assembler = MessageAssembler::open(&ctx, 1).unwrap();

    let message = assembler.finish().unwrap();

    assert_eq!(message.content, NO_RESPONSE);
    assert_eq!(ctx.conversation.lock().unwrap().messages().len(), 1);
}

#[test]
fn it_discards_unfinished_reply_on_drop() {
    let (ctx, mut rx) = context_in_session(Arc::new(FakeBackend::default()), 1);
    let mut assembler = MessageAssembler::open(&ctx, 1).unwrap();

    assembler.on_delta("partial");
    drop(assembler);

    let store = ctx.conversation.lock().unwrap();
    assert!(store.messages().is_empty());
    assert!(!store.has_in_flight());

    assert!(matches!(
        drain(&mut rx).last(),
        Some(Event::AssistantDraftDiscarded())
    ));
}

#[test]
fn it_refuses_a_second_assembler() {
    let (ctx, _rx) = context_in_session(Arc::new(FakeBackend::default()), 1);
    let _first = MessageAssembler::open(&ctx, 1).unwrap();

    assert!(MessageAssembler::open(&ctx, 1).is_err());
}

#[test]
fn it_drops_deltas_after_session_switch() {
    let (ctx, mut rx) = context_in_session(Arc::new(FakeBackend::default()), 1);
    let mut assembler = MessageAssembler::open(&ctx, 1).unwrap();

    ctx.conversation.lock().unwrap().replace(Some(2), vec![]);
    drain(&mut rx);

    assembler.on_delta("late");
    assert!(assembler.finish().is_none());
    assert!(drain(&mut rx).is_empty());
    assert!(ctx.conversation.lock().unwrap().messages().is_empty());
}
