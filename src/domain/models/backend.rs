use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;

use super::Agent;
use super::AgentDraft;
use super::AgentUpdate;
use super::AudioBlob;
use super::Message;
use super::Session;

/// Raw body of a streamed reply, chunked however the transport delivered it.
pub type ByteStream = BoxStream<'static, Result<Vec<u8>>>;

pub enum VoiceReply {
    /// Synthesized spoken reply. Transcript and reply text are persisted on
    /// the platform, not returned here.
    Audio(AudioBlob),
    /// Non-success response, carrying the error text.
    Rejected(String),
}

#[async_trait]
pub trait Backend {
    async fn list_agents(&self) -> Result<Vec<Agent>>;

    async fn create_agent(&self, draft: &AgentDraft) -> Result<Agent>;

    async fn update_agent(&self, agent_id: i64, update: &AgentUpdate) -> Result<Agent>;

    async fn list_sessions(&self, agent_id: i64) -> Result<Vec<Session>>;

    async fn create_session(&self, agent_id: i64) -> Result<Session>;

    async fn list_messages(&self, session_id: i64) -> Result<Vec<Message>>;

    /// Sends a message and waits for the complete assistant reply.
    async fn send_message(&self, session_id: i64, content: &str) -> Result<Message>;

    /// Sends a message and returns the reply body as it streams in. Frames are
    /// decoded by the caller.
    async fn stream_message(&self, session_id: i64, content: &str) -> Result<ByteStream>;

    async fn send_voice(&self, session_id: i64, audio: AudioBlob) -> Result<VoiceReply>;
}

pub type BackendBox = Arc<dyn Backend + Send + Sync>;
