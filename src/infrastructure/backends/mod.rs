pub mod agent_platform;

use std::sync::Arc;

use anyhow::Context;
use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendBox;

pub struct BackendManager {}

impl BackendManager {
    pub fn get() -> Result<BackendBox> {
        let url = Config::get(ConfigKey::ApiURL);
        reqwest::Url::parse(&url).with_context(|| return format!("Invalid api-url '{url}'"))?;

        return Ok(Arc::new(agent_platform::AgentPlatform::new(&url)));
    }
}
