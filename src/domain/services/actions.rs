#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use tokio::fs;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::export_html;
use super::lock_or_recover;
use super::ChatContext;
use super::ChatService;
use super::CommandRegistry;
use super::RecordingController;
use super::RecordingPhase;
use super::StopOutcome;
use super::VoicePipeline;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::help_text;
use crate::domain::models::Action;
use crate::domain::models::Agent;
use crate::domain::models::AgentDraft;
use crate::domain::models::AgentUpdate;
use crate::domain::models::AudioSinkBox;
use crate::domain::models::Event;
use crate::domain::models::MicrophoneBox;
use crate::domain::models::RendererBox;
use crate::domain::models::Session;
use crate::domain::models::SlashCommand;

/// Splits `NAME | PROMPT` style arguments. Either side may be empty.
fn split_pipe(text: &str) -> (String, String) {
    match text.split_once('|') {
        Some((left, right)) => return (left.trim().to_string(), right.trim().to_string()),
        None => return (text.trim().to_string(), "".to_string()),
    }
}

fn parse_id(cmd: &SlashCommand, what: &str) -> Result<i64> {
    let usage = format!("Usage: {} {}", cmd.name.aliases()[0], cmd.name.usage());
    let raw = match cmd.args.first() {
        Some(raw) => raw,
        None => bail!(usage),
    };

    return raw
        .parse::<i64>()
        .with_context(|| return format!("'{raw}' is not a valid {what} id. {usage}"));
}

/// Runs everything the UI asks for: text turns, recording, and slash
/// commands. Owns which agent and session are active.
pub struct ActionsService {
    ctx: ChatContext,
    chat: ChatService,
    voice: VoicePipeline,
    recorder: RecordingController,
    exporter: RendererBox,
    registry: CommandRegistry,
    agents: Vec<Agent>,
    agent_id: Option<i64>,
    sessions: Vec<Session>,
}

impl ActionsService {
    pub fn new(
        ctx: ChatContext,
        exporter: RendererBox,
        microphone: MicrophoneBox,
        sink: AudioSinkBox,
        min_recording: Duration,
    ) -> ActionsService {
        return ActionsService {
            chat: ChatService::new(ctx.clone()),
            voice: VoicePipeline::new(ctx.clone(), sink),
            recorder: RecordingController::new(microphone, min_recording, ctx.tx.clone()),
            ctx,
            exporter,
            registry: CommandRegistry::default(),
            agents: vec![],
            agent_id: None,
            sessions: vec![],
        };
    }

    pub async fn start(mut self, rx: &mut mpsc::UnboundedReceiver<Action>) -> Result<()> {
        self.bootstrap().await;

        loop {
            let action = match rx.recv().await {
                Some(action) => action,
                None => return Ok(()),
            };

            self.handle(action).await;
        }
    }

    pub async fn handle(&mut self, action: Action) -> Option<JoinHandle<Result<()>>> {
        match action {
            Action::SendText(text) => {
                return self.chat.send_text(&text);
            }
            Action::ToggleRecording() => {
                return self.toggle_recording().await;
            }
            Action::Command(cmd) => {
                if let Err(err) = self.dispatch(&cmd).await {
                    tracing::error!(command = %cmd.name, error = ?err, "Command failed");
                    self.ctx.error(&format!("{err}"));
                }
                return None;
            }
        }
    }

    async fn dispatch(&mut self, cmd: &SlashCommand) -> Result<()> {
        let handler = match self.registry.get(cmd.name) {
            Some(handler) => handler,
            None => bail!("{} can't be used here.", cmd.name.aliases()[0]),
        };

        return handler(self, cmd).await;
    }

    /// Selects the configured agent and session, or the first of each.
    /// Failures become notices so the UI still starts.
    pub async fn bootstrap(&mut self) {
        if let Err(err) = self.bootstrap_inner().await {
            tracing::error!(error = ?err, "Failed to load agents");
            self.ctx.error(&format!(
                "Could not reach the agent platform at {}.\n\nError: {err}",
                Config::get(ConfigKey::ApiURL)
            ));
        }
    }

    async fn bootstrap_inner(&mut self) -> Result<()> {
        self.agents = self.ctx.backend.list_agents().await?;

        let preferred_agent = Config::get_id(ConfigKey::AgentID)?;
        let agent_id = preferred_agent
            .filter(|id| return self.agents.iter().any(|agent| return agent.agent_id == *id))
            .or_else(|| return self.agents.first().map(|agent| return agent.agent_id));

        let agent_id = match agent_id {
            Some(agent_id) => agent_id,
            None => {
                self.ctx
                    .notice("No agents yet. Create one with /agent-new NAME | PROMPT.");
                return Ok(());
            }
        };

        let preferred_session = Config::get_id(ConfigKey::SessionID)?;
        return self.select_agent(agent_id, preferred_session).await;
    }

    /// Makes `agent_id` active and opens `preferred_session` if it belongs to
    /// the agent, else the first session listed, else nothing.
    async fn select_agent(&mut self, agent_id: i64, preferred_session: Option<i64>) -> Result<()> {
        self.agent_id = Some(agent_id);
        self.sessions = self.ctx.backend.list_sessions(agent_id).await?;

        let session_id = preferred_session
            .filter(|id| return self.sessions.iter().any(|e| return e.session_id == *id))
            .or_else(|| return self.sessions.first().map(|e| return e.session_id));

        match session_id {
            Some(session_id) => return self.open_session(session_id).await,
            None => {
                lock_or_recover(&self.ctx.conversation).replace(None, vec![]);
                self.ctx.publish_conversation();
                self.announce_selection();
                return Ok(());
            }
        }
    }

    async fn open_session(&mut self, session_id: i64) -> Result<()> {
        let messages = self.ctx.backend.list_messages(session_id).await?;
        lock_or_recover(&self.ctx.conversation).replace(Some(session_id), messages);

        self.ctx.publish_conversation();
        self.announce_selection();

        return Ok(());
    }

    fn agent_name(&self) -> Option<String> {
        let agent_id = self.agent_id?;
        return self
            .agents
            .iter()
            .find(|agent| return agent.agent_id == agent_id)
            .map(|agent| return agent.name.to_string());
    }

    fn announce_selection(&self) {
        self.ctx
            .emit(Event::SessionSelected(self.agent_name(), self.ctx.session_id()));
    }

    pub async fn toggle_recording(&mut self) -> Option<JoinHandle<Result<()>>> {
        match self.recorder.phase().await {
            RecordingPhase::Idle => {
                self.recorder
                    .start(&self.ctx.lock, self.ctx.session_id())
                    .await;
                return None;
            }
            RecordingPhase::Recording => {
                if let StopOutcome::Captured(audio) = self.recorder.stop().await {
                    return self.voice.send(audio);
                }
                return None;
            }
            RecordingPhase::Stopping => return None,
        }
    }

    pub async fn list_agents(&mut self) -> Result<()> {
        self.agents = self.ctx.backend.list_agents().await?;
        if self.agents.is_empty() {
            self.ctx
                .notice("No agents yet. Create one with /agent-new NAME | PROMPT.");
            return Ok(());
        }

        let lines = self
            .agents
            .iter()
            .map(|agent| {
                let marker = if Some(agent.agent_id) == self.agent_id {
                    " (active)"
                } else {
                    ""
                };
                return format!("- ({}) {}{marker}", agent.agent_id, agent.name);
            })
            .collect::<Vec<String>>();

        self.ctx.notice(&format!("Agents:\n{}", lines.join("\n")));
        return Ok(());
    }

    pub async fn select_agent_command(&mut self, cmd: &SlashCommand) -> Result<()> {
        let agent_id = parse_id(cmd, "agent")?;
        self.agents = self.ctx.backend.list_agents().await?;
        if !self.agents.iter().any(|agent| return agent.agent_id == agent_id) {
            bail!("No agent with id {agent_id}. Run /agents to list them.");
        }

        let current = self.ctx.session_id();
        self.select_agent(agent_id, current).await?;

        if let Some(name) = self.agent_name() {
            self.ctx.notice(&format!("{name} has entered the chat."));
        }

        return Ok(());
    }

    pub async fn create_agent(&mut self, cmd: &SlashCommand) -> Result<()> {
        let (name, prompt) = split_pipe(&cmd.rest());
        if name.is_empty() || prompt.is_empty() {
            bail!("Name and prompt required. Usage: /agent-new NAME | PROMPT");
        }

        let agent = self
            .ctx
            .backend
            .create_agent(&AgentDraft { name, prompt })
            .await?;
        self.agents = self.ctx.backend.list_agents().await?;

        self.ctx.notice(&format!(
            "Created agent ({}) {}. Switch to it with /agent {}.",
            agent.agent_id, agent.name, agent.agent_id
        ));

        if self.agent_id.is_none() {
            self.select_agent(agent.agent_id, None).await?;
        }

        return Ok(());
    }

    pub async fn edit_agent(&mut self, cmd: &SlashCommand) -> Result<()> {
        let agent_id = parse_id(cmd, "agent")?;
        let rest = cmd.args[1..].join(" ");
        let (name, prompt) = split_pipe(&rest);

        let update = AgentUpdate {
            name: Some(name).filter(|e| return !e.is_empty()),
            prompt: Some(prompt).filter(|e| return !e.is_empty()),
        };
        if update.is_empty() {
            bail!("Nothing to change. Usage: /agent-edit AGENT_ID NAME | PROMPT");
        }

        let agent = self.ctx.backend.update_agent(agent_id, &update).await?;
        self.agents = self.ctx.backend.list_agents().await?;

        self.ctx
            .notice(&format!("Updated agent ({}) {}.", agent.agent_id, agent.name));
        if self.agent_id == Some(agent_id) {
            self.announce_selection();
        }

        return Ok(());
    }

    pub async fn list_sessions(&mut self) -> Result<()> {
        let agent_id = match self.agent_id {
            Some(agent_id) => agent_id,
            None => bail!("Select an agent first with /agent AGENT_ID."),
        };

        self.sessions = self.ctx.backend.list_sessions(agent_id).await?;
        if self.sessions.is_empty() {
            self.ctx.notice("No chats yet. Start one with /new.");
            return Ok(());
        }

        let current = self.ctx.session_id();
        let lines = self
            .sessions
            .iter()
            .map(|session| {
                let marker = if Some(session.session_id) == current {
                    " (open)"
                } else {
                    ""
                };
                return format!("- {}{marker}", session.label());
            })
            .collect::<Vec<String>>();

        self.ctx.notice(&format!("Chats:\n{}", lines.join("\n")));
        return Ok(());
    }

    pub async fn select_session_command(&mut self, cmd: &SlashCommand) -> Result<()> {
        let session_id = parse_id(cmd, "chat")?;
        let agent_id = match self.agent_id {
            Some(agent_id) => agent_id,
            None => bail!("Select an agent first with /agent AGENT_ID."),
        };

        self.sessions = self.ctx.backend.list_sessions(agent_id).await?;
        if !self.sessions.iter().any(|e| return e.session_id == session_id) {
            bail!("No chat with id {session_id} for this agent. Run /sessions to list them.");
        }

        return self.open_session(session_id).await;
    }

    pub async fn new_session(&mut self) -> Result<()> {
        let agent_id = match self.agent_id {
            Some(agent_id) => agent_id,
            None => bail!("Select an agent first with /agent AGENT_ID."),
        };

        let session = self.ctx.backend.create_session(agent_id).await?;
        self.sessions.insert(0, session.clone());

        lock_or_recover(&self.ctx.conversation).replace(Some(session.session_id), vec![]);
        self.ctx.publish_conversation();
        self.announce_selection();
        self.ctx.notice(&format!("Started {}.", session.label()));

        return Ok(());
    }

    pub async fn export(&mut self, cmd: &SlashCommand) -> Result<()> {
        let session_id = match self.ctx.session_id() {
            Some(session_id) => session_id,
            None => bail!("Select a chat first (or create a new chat)."),
        };

        let mut path = PathBuf::from(format!("parley-session-{session_id}.html"));
        if !cmd.args.is_empty() {
            path = PathBuf::from(cmd.rest());
        }

        let title = format!(
            "{} - Chat {session_id}",
            self.agent_name().unwrap_or_else(|| return "Parley".to_string())
        );
        let html = {
            let store = lock_or_recover(&self.ctx.conversation);
            export_html(&title, store.messages(), self.exporter.as_ref())
        };

        fs::write(&path, html)
            .await
            .with_context(|| return format!("Failed to write {}", path.display()))?;

        self.ctx.notice(&format!("Exported chat to {}", path.display()));
        return Ok(());
    }

    pub fn help(&self) {
        self.ctx.notice(&help_text());
    }
}
