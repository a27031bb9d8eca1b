#[cfg(test)]
#[path = "generation_lock_test.rs"]
mod tests;

use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::models::Event;

/// Process wide gate for "the assistant is producing output". There is no
/// queue: acquiring while held fails and the caller drops its request.
#[derive(Clone)]
pub struct GenerationLock {
    held: Arc<AtomicBool>,
    tx: mpsc::UnboundedSender<Event>,
}

impl GenerationLock {
    pub fn new(tx: mpsc::UnboundedSender<Event>) -> GenerationLock {
        return GenerationLock {
            held: Arc::new(AtomicBool::new(false)),
            tx,
        };
    }

    /// Takes the lock if it is free. The returned guard releases it when
    /// dropped, on every exit path of the turn that holds it.
    pub fn try_acquire(&self) -> Option<GenerationGuard> {
        if self
            .held
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("Generation already in flight, dropping request");
            return None;
        }

        // Sends only fail once the UI has shut down.
        let _ = self.tx.send(Event::Generating(true));

        return Some(GenerationGuard { lock: self.clone() });
    }

    /// Frees the lock, clearing the composing indicator and re-enabling
    /// input. Releasing a free lock does nothing.
    pub fn release(&self) {
        if !self.held.swap(false, Ordering::AcqRel) {
            return;
        }

        let _ = self.tx.send(Event::Composing(false));
        let _ = self.tx.send(Event::Generating(false));
    }

    pub fn is_held(&self) -> bool {
        return self.held.load(Ordering::Acquire);
    }
}

pub struct GenerationGuard {
    lock: GenerationLock,
}

impl GenerationGuard {
    /// Shows or hides the "assistant is composing" indicator.
    pub fn composing(&self, composing: bool) {
        let _ = self.lock.tx.send(Event::Composing(composing));
    }
}

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.lock.release();
    }
}
