use tokio::sync::mpsc;

use super::GenerationLock;
use crate::domain::models::Event;

fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<String> {
    let mut res = vec![];
    while let Ok(event) = rx.try_recv() {
        match event {
            Event::Generating(val) => res.push(format!("generating:{val}")),
            Event::Composing(val) => res.push(format!("composing:{val}")),
            _ => res.push("other".to_string()),
        }
    }

    return res;
}

#[test]
fn it_acquires_once() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let lock = GenerationLock::new(tx);

    let guard = lock.try_acquire();
    assert!(guard.is_some());
    assert!(lock.is_held());
    assert!(lock.try_acquire().is_none());

    assert_eq!(drain(&mut rx), vec!["generating:true"]);
}

#[test]
fn it_releases_on_drop() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let lock = GenerationLock::new(tx);

    let guard = lock.try_acquire().unwrap();
    guard.composing(true);
    drop(guard);

    assert!(!lock.is_held());
    assert_eq!(
        drain(&mut rx),
        vec![
            "generating:true",
            "composing:true",
            "composing:false",
            "generating:false"
        ]
    );

    assert!(lock.try_acquire().is_some());
}

#[test]
fn it_releases_idempotently() {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let lock = GenerationLock::new(tx);

    let guard = lock.try_acquire().unwrap();
    lock.release();
    lock.release();
    drop(guard);

    assert_eq!(
        drain(&mut rx),
        vec!["generating:true", "composing:false", "generating:false"]
    );
}

#[test]
fn it_shares_state_between_clones() {
    let (tx, _rx) = mpsc::unbounded_channel::<Event>();
    let lock = GenerationLock::new(tx);
    let cloned = lock.clone();

    let _guard = cloned.try_acquire().unwrap();
    assert!(lock.is_held());
    assert!(lock.try_acquire().is_none());
}

#[test]
fn it_survives_closed_ui() {
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    drop(rx);
    let lock = GenerationLock::new(tx);

    let guard = lock.try_acquire().unwrap();
    drop(guard);
    assert!(!lock.is_held());
}
