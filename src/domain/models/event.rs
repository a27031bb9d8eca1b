use tui_textarea::Input;

use super::MessageView;
use super::Status;

#[derive(Debug)]
pub enum Event {
    /// Show or replace the in-progress assistant reply.
    AssistantDraft(MessageView),
    /// The in-progress reply was frozen into the conversation.
    AssistantCommitted(MessageView),
    /// The in-progress reply was abandoned before completing.
    AssistantDraftDiscarded(),
    Composing(bool),
    ConversationReplaced(Vec<MessageView>),
    Generating(bool),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardCTRLR(),
    KeyboardEnter(),
    KeyboardPaste(String),
    MessageAppended(MessageView),
    Notice(MessageView),
    Recording(bool),
    /// Agent name and session id now active.
    SessionSelected(Option<String>, Option<i64>),
    Status(Status),
    UIScrollDown(),
    UIScrollPageDown(),
    UIScrollPageUp(),
    UIScrollUp(),
    UITick(),
}
