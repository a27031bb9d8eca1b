#[cfg(test)]
#[path = "agent_platform_test.rs"]
mod tests;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use futures::TryStreamExt;
use reqwest::multipart;
use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use serde::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Agent;
use crate::domain::models::AgentDraft;
use crate::domain::models::AgentUpdate;
use crate::domain::models::AudioBlob;
use crate::domain::models::Backend;
use crate::domain::models::ByteStream;
use crate::domain::models::Message;
use crate::domain::models::Session;
use crate::domain::models::VoiceReply;

const DEFAULT_AUDIO_MIME: &str = "audio/mpeg";

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    session_id: i64,
    content: &'a str,
}

/// Body text of a failed response, or the status reason when the body is
/// empty.
async fn error_text(res: Response) -> String {
    let status = res.status();
    let body = res.text().await.unwrap_or_default();
    if !body.trim().is_empty() {
        return body;
    }

    return status
        .canonical_reason()
        .map(|reason| return reason.to_string())
        .unwrap_or_else(|| return status.to_string());
}

async fn check(res: Response, request: &str) -> Result<Response> {
    if res.status().is_success() {
        return Ok(res);
    }

    let status = res.status().as_u16();
    let text = error_text(res).await;
    tracing::error!(status = status, body = %text, request = request, "Agent platform request failed");
    bail!(text);
}

/// REST client for the agent platform.
pub struct AgentPlatform {
    url: String,
    client: reqwest::Client,
}

impl Default for AgentPlatform {
    fn default() -> AgentPlatform {
        return AgentPlatform::new(&Config::get(ConfigKey::ApiURL));
    }
}

impl AgentPlatform {
    pub fn new(url: &str) -> AgentPlatform {
        return AgentPlatform {
            url: url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        };
    }

    fn endpoint(&self, path: &str) -> String {
        return format!("{url}{path}", url = self.url);
    }
}

#[async_trait]
impl Backend for AgentPlatform {
    #[allow(clippy::implicit_return)]
    async fn list_agents(&self) -> Result<Vec<Agent>> {
        let res = self.client.get(self.endpoint("/agents")).send().await?;
        let agents = check(res, "list agents").await?.json::<Vec<Agent>>().await?;

        return Ok(agents);
    }

    #[allow(clippy::implicit_return)]
    async fn create_agent(&self, draft: &AgentDraft) -> Result<Agent> {
        let res = self
            .client
            .post(self.endpoint("/agents"))
            .json(draft)
            .send()
            .await?;
        let agent = check(res, "create agent").await?.json::<Agent>().await?;

        return Ok(agent);
    }

    #[allow(clippy::implicit_return)]
    async fn update_agent(&self, agent_id: i64, update: &AgentUpdate) -> Result<Agent> {
        let res = self
            .client
            .put(self.endpoint(&format!("/agents/{agent_id}")))
            .json(update)
            .send()
            .await?;
        let agent = check(res, "update agent").await?.json::<Agent>().await?;

        return Ok(agent);
    }

    #[allow(clippy::implicit_return)]
    async fn list_sessions(&self, agent_id: i64) -> Result<Vec<Session>> {
        let res = self
            .client
            .get(self.endpoint(&format!("/agents/{agent_id}/sessions")))
            .send()
            .await?;
        let sessions = check(res, "list sessions")
            .await?
            .json::<Vec<Session>>()
            .await?;

        return Ok(sessions);
    }

    #[allow(clippy::implicit_return)]
    async fn create_session(&self, agent_id: i64) -> Result<Session> {
        let res = self
            .client
            .post(self.endpoint(&format!("/agents/{agent_id}/sessions")))
            .send()
            .await?;
        let session = check(res, "create session").await?.json::<Session>().await?;

        return Ok(session);
    }

    #[allow(clippy::implicit_return)]
    async fn list_messages(&self, session_id: i64) -> Result<Vec<Message>> {
        let res = self
            .client
            .get(self.endpoint("/sessions/messages"))
            .query(&[("session_id", session_id)])
            .send()
            .await?;
        let messages = check(res, "list messages")
            .await?
            .json::<Vec<Message>>()
            .await?;

        return Ok(messages);
    }

    #[allow(clippy::implicit_return)]
    async fn send_message(&self, session_id: i64, content: &str) -> Result<Message> {
        let res = self
            .client
            .post(self.endpoint("/sessions/messages"))
            .json(&SendMessageRequest {
                session_id,
                content,
            })
            .send()
            .await?;
        let message = check(res, "send message").await?.json::<Message>().await?;

        return Ok(message);
    }

    #[allow(clippy::implicit_return)]
    async fn stream_message(&self, session_id: i64, content: &str) -> Result<ByteStream> {
        let res = self
            .client
            .post(self.endpoint("/sessions/messages/stream"))
            .json(&SendMessageRequest {
                session_id,
                content,
            })
            .send()
            .await?;
        let res = check(res, "stream message").await?;

        let body = res
            .bytes_stream()
            .map_ok(|chunk| return chunk.to_vec())
            .map_err(anyhow::Error::from)
            .boxed();

        return Ok(body);
    }

    #[allow(clippy::implicit_return)]
    async fn send_voice(&self, session_id: i64, audio: AudioBlob) -> Result<VoiceReply> {
        let file_name = audio.file_name();
        let part = multipart::Part::bytes(audio.bytes)
            .file_name(file_name)
            .mime_str(&audio.mime_type)?;
        let form = multipart::Form::new()
            .text("session_id", session_id.to_string())
            .part("audio", part);

        let res = self
            .client
            .post(self.endpoint("/sessions/voice"))
            .multipart(form)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status().as_u16();
            let text = error_text(res).await;
            tracing::warn!(status = status, body = %text, "Voice message rejected");
            return Ok(VoiceReply::Rejected(text));
        }

        let mime_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|val| return val.to_str().ok())
            .map(|val| return val.to_string())
            .unwrap_or_else(|| return DEFAULT_AUDIO_MIME.to_string());
        let bytes = res.bytes().await?;

        return Ok(VoiceReply::Audio(AudioBlob::new(bytes.to_vec(), &mime_type)));
    }
}
