use std::sync::Arc;
use std::sync::Mutex;

use tokio::sync::mpsc;

use super::ConversationStore;
use super::GenerationLock;
use crate::domain::models::BackendBox;
use crate::domain::models::Event;
use crate::domain::models::MessageView;
use crate::domain::models::RendererBox;
use crate::domain::models::Status;

/// Everything a turn needs, shared by the text and voice paths. Cloning is
/// cheap and every clone points at the same state.
#[derive(Clone)]
pub struct ChatContext {
    pub backend: BackendBox,
    pub renderer: RendererBox,
    pub lock: GenerationLock,
    pub conversation: Arc<Mutex<ConversationStore>>,
    pub tx: mpsc::UnboundedSender<Event>,
    pub stream: bool,
}

impl ChatContext {
    pub fn new(
        backend: BackendBox,
        renderer: RendererBox,
        tx: mpsc::UnboundedSender<Event>,
        stream: bool,
    ) -> ChatContext {
        return ChatContext {
            backend,
            renderer,
            lock: GenerationLock::new(tx.clone()),
            conversation: Arc::new(Mutex::new(ConversationStore::default())),
            tx,
            stream,
        };
    }

    pub fn session_id(&self) -> Option<i64> {
        return super::lock_or_recover(&self.conversation).session_id();
    }

    /// Sends an event to the UI. Once the UI is gone there is nobody left to
    /// tell, so failures are only logged.
    pub fn emit(&self, event: Event) {
        if self.tx.send(event).is_err() {
            tracing::debug!("UI closed, dropping event");
        }
    }

    pub fn notice(&self, text: &str) {
        self.emit(Event::Notice(MessageView::notice(text)));
    }

    pub fn error(&self, text: &str) {
        self.emit(Event::Notice(MessageView::error(text)));
    }

    pub fn status(&self, status: Status) {
        self.emit(Event::Status(status));
    }

    /// Re-projects the whole conversation for the UI.
    pub fn publish_conversation(&self) {
        let views = {
            let store = super::lock_or_recover(&self.conversation);
            MessageView::project_all(store.messages(), self.renderer.as_ref())
        };

        self.emit(Event::ConversationReplaced(views));
    }
}
