use std::collections::HashMap;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream;
use futures::StreamExt;
use tokio::sync::mpsc;

use super::ChatContext;
use crate::domain::models::Agent;
use crate::domain::models::AgentDraft;
use crate::domain::models::AgentUpdate;
use crate::domain::models::AudioBlob;
use crate::domain::models::AudioSink;
use crate::domain::models::Backend;
use crate::domain::models::ByteStream;
use crate::domain::models::Capture;
use crate::domain::models::CaptureBox;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::Microphone;
use crate::domain::models::Renderer;
use crate::domain::models::Session;
use crate::domain::models::VoiceReply;

pub enum FakeVoice {
    Audio(Vec<u8>),
    Rejected(String),
    Fail(String),
}

pub struct FakeBackend {
    pub agents: Mutex<Vec<Agent>>,
    pub sessions: Mutex<Vec<Session>>,
    pub messages: Mutex<HashMap<i64, Vec<Message>>>,
    pub stream_chunks: Mutex<Vec<Vec<u8>>>,
    pub stream_error: Mutex<Option<String>>,
    pub send_error: Mutex<Option<String>>,
    pub voice: Mutex<FakeVoice>,
    pub uploads: Mutex<Vec<(i64, AudioBlob)>>,
    pub sent: Mutex<Vec<(i64, String)>>,
    pub message_calls: AtomicUsize,
    pub list_message_calls: AtomicUsize,
}

impl Default for FakeBackend {
    fn default() -> FakeBackend {
        return FakeBackend {
            agents: Mutex::new(vec![agent(1, "Tutor"), agent(2, "Chef")]),
            sessions: Mutex::new(vec![session(10, 1), session(11, 1), session(20, 2)]),
            messages: Mutex::new(HashMap::new()),
            stream_chunks: Mutex::new(vec![]),
            stream_error: Mutex::new(None),
            send_error: Mutex::new(None),
            voice: Mutex::new(FakeVoice::Audio(b"ID3".to_vec())),
            uploads: Mutex::new(vec![]),
            sent: Mutex::new(vec![]),
            message_calls: AtomicUsize::new(0),
            list_message_calls: AtomicUsize::new(0),
        };
    }
}

impl FakeBackend {
    pub fn streaming(payload: &str) -> FakeBackend {
        let backend = FakeBackend::default();
        backend.set_stream(payload);
        return backend;
    }

    pub fn set_stream(&self, payload: &str) {
        *self.stream_chunks.lock().unwrap() = test_utils::chunk_bytes(payload.as_bytes(), 5);
    }

    pub fn set_messages(&self, session_id: i64, messages: Vec<Message>) {
        self.messages.lock().unwrap().insert(session_id, messages);
    }

    pub fn message_calls(&self) -> usize {
        return self.message_calls.load(Ordering::SeqCst);
    }

    pub fn upload_count(&self) -> usize {
        return self.uploads.lock().unwrap().len();
    }
}

pub fn agent(agent_id: i64, name: &str) -> Agent {
    return Agent {
        agent_id,
        name: name.to_string(),
        prompt: format!("You are {name}."),
        created_at: None,
        updated_at: None,
    };
}

pub fn session(session_id: i64, agent_id: i64) -> Session {
    return Session {
        session_id,
        agent_id,
        created_at: None,
        updated_at: None,
    };
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_agents(&self) -> Result<Vec<Agent>> {
        return Ok(self.agents.lock().unwrap().clone());
    }

    async fn create_agent(&self, draft: &AgentDraft) -> Result<Agent> {
        let mut agents = self.agents.lock().unwrap();
        let created = Agent {
            agent_id: agents.len() as i64 + 1,
            name: draft.name.to_string(),
            prompt: draft.prompt.to_string(),
            created_at: None,
            updated_at: None,
        };
        agents.push(created.clone());
        return Ok(created);
    }

    async fn update_agent(&self, agent_id: i64, update: &AgentUpdate) -> Result<Agent> {
        let mut agents = self.agents.lock().unwrap();
        let found = agents
            .iter_mut()
            .find(|e| return e.agent_id == agent_id)
            .ok_or_else(|| return anyhow!("Agent not found"))?;

        if let Some(name) = &update.name {
            found.name = name.to_string();
        }
        if let Some(prompt) = &update.prompt {
            found.prompt = prompt.to_string();
        }

        return Ok(found.clone());
    }

    async fn list_sessions(&self, agent_id: i64) -> Result<Vec<Session>> {
        return Ok(self
            .sessions
            .lock()
            .unwrap()
            .iter()
            .filter(|e| return e.agent_id == agent_id)
            .cloned()
            .collect());
    }

    async fn create_session(&self, agent_id: i64) -> Result<Session> {
        let mut sessions = self.sessions.lock().unwrap();
        let created = session(100 + sessions.len() as i64, agent_id);
        sessions.push(created.clone());
        return Ok(created);
    }

    async fn list_messages(&self, session_id: i64) -> Result<Vec<Message>> {
        self.list_message_calls.fetch_add(1, Ordering::SeqCst);
        return Ok(self
            .messages
            .lock()
            .unwrap()
            .get(&session_id)
            .cloned()
            .unwrap_or_default());
    }

    async fn send_message(&self, session_id: i64, content: &str) -> Result<Message> {
        self.message_calls.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .unwrap()
            .push((session_id, content.to_string()));

        if let Some(err) = self.send_error.lock().unwrap().clone() {
            bail!(err);
        }

        return Ok(Message::assistant(&format!("echo: {content}")));
    }

    async fn stream_message(&self, session_id: i64, content: &str) -> Result<ByteStream> {
        self.message_calls.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .unwrap()
            .push((session_id, content.to_string()));

        let mut chunks = self
            .stream_chunks
            .lock()
            .unwrap()
            .iter()
            .map(|chunk| return Ok(chunk.to_vec()))
            .collect::<Vec<Result<Vec<u8>>>>();

        if let Some(err) = self.stream_error.lock().unwrap().clone() {
            chunks.push(Err(anyhow!(err)));
        }

        return Ok(stream::iter(chunks).boxed());
    }

    async fn send_voice(&self, session_id: i64, audio: AudioBlob) -> Result<VoiceReply> {
        self.uploads.lock().unwrap().push((session_id, audio));

        match &*self.voice.lock().unwrap() {
            FakeVoice::Audio(bytes) => {
                return Ok(VoiceReply::Audio(AudioBlob::new(bytes.to_vec(), "audio/mpeg")));
            }
            FakeVoice::Rejected(text) => return Ok(VoiceReply::Rejected(text.to_string())),
            FakeVoice::Fail(err) => bail!(err.to_string()),
        }
    }
}

/// Wraps output so tests can tell rendered, escaped and raw text apart.
pub struct TaggedRenderer {}

impl Renderer for TaggedRenderer {
    fn render(&self, raw: &str) -> String {
        return format!("<{raw}>");
    }

    fn escape(&self, raw: &str) -> String {
        return format!("[{raw}]");
    }
}

pub struct FakeCapture {
    chunks: Vec<Vec<u8>>,
    released: Arc<AtomicUsize>,
}

#[async_trait]
impl Capture for FakeCapture {
    fn mime_type(&self) -> String {
        return "audio/webm".to_string();
    }

    async fn stop(&mut self) -> Result<Vec<Vec<u8>>> {
        return Ok(std::mem::take(&mut self.chunks));
    }
}

impl Drop for FakeCapture {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeMicrophone {
    pub chunks: Vec<Vec<u8>>,
    pub unavailable: bool,
    pub opened: AtomicUsize,
    pub released: Arc<AtomicUsize>,
}

impl FakeMicrophone {
    pub fn with_chunks(chunks: &[&str]) -> FakeMicrophone {
        return FakeMicrophone {
            chunks: chunks.iter().map(|e| return e.as_bytes().to_vec()).collect(),
            ..FakeMicrophone::default()
        };
    }

    pub fn unavailable() -> FakeMicrophone {
        return FakeMicrophone {
            unavailable: true,
            ..FakeMicrophone::default()
        };
    }

    pub fn opened(&self) -> usize {
        return self.opened.load(Ordering::SeqCst);
    }

    pub fn released(&self) -> usize {
        return self.released.load(Ordering::SeqCst);
    }
}

#[async_trait]
impl Microphone for FakeMicrophone {
    async fn open(&self) -> Result<CaptureBox> {
        if self.unavailable {
            bail!("Permission denied");
        }

        self.opened.fetch_add(1, Ordering::SeqCst);
        return Ok(Box::new(FakeCapture {
            chunks: self.chunks.clone(),
            released: self.released.clone(),
        }));
    }
}

#[derive(Default)]
pub struct FakeSink {
    pub played: Mutex<Vec<AudioBlob>>,
    pub fail: bool,
}

#[async_trait]
impl AudioSink for FakeSink {
    async fn play(&self, audio: AudioBlob) -> Result<()> {
        if self.fail {
            bail!("No audio output");
        }

        self.played.lock().unwrap().push(audio);
        return Ok(());
    }
}

pub fn context(backend: Arc<FakeBackend>, stream: bool) -> (ChatContext, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let ctx = ChatContext::new(backend, Arc::new(TaggedRenderer {}), tx, stream);
    return (ctx, rx);
}

/// Context with session `session_id` already open.
pub fn context_in_session(
    backend: Arc<FakeBackend>,
    session_id: i64,
) -> (ChatContext, mpsc::UnboundedReceiver<Event>) {
    let (ctx, rx) = context(backend, true);
    ctx.conversation
        .lock()
        .unwrap()
        .replace(Some(session_id), vec![]);
    return (ctx, rx);
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = vec![];
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    return events;
}

/// Status texts found in `events`, in order.
pub fn statuses(events: &[Event]) -> Vec<String> {
    return events
        .iter()
        .filter_map(|event| {
            if let Event::Status(status) = event {
                return Some(status.text.to_string());
            }
            return None;
        })
        .collect();
}

/// Bodies of inline notices found in `events`, in order.
pub fn notices(events: &[Event]) -> Vec<String> {
    return events
        .iter()
        .filter_map(|event| {
            if let Event::Notice(view) = event {
                return Some(view.body.to_string());
            }
            return None;
        })
        .collect();
}
