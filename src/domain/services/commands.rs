#[cfg(test)]
#[path = "commands_test.rs"]
mod tests;

use std::collections::HashMap;

use anyhow::Result;
use futures::future::BoxFuture;
use futures::FutureExt;

use super::actions::ActionsService;
use crate::domain::models::CommandName;
use crate::domain::models::SlashCommand;

pub type CommandHandler =
    for<'a> fn(&'a mut ActionsService, &'a SlashCommand) -> BoxFuture<'a, Result<()>>;

/// Dispatch table from slash command to handler. `/quit` never reaches it,
/// the UI handles it before dispatch.
pub struct CommandRegistry {
    handlers: HashMap<CommandName, CommandHandler>,
}

impl Default for CommandRegistry {
    fn default() -> CommandRegistry {
        let mut registry = CommandRegistry::empty();
        registry.register(CommandName::Agents, agents);
        registry.register(CommandName::Agent, agent);
        registry.register(CommandName::AgentNew, agent_new);
        registry.register(CommandName::AgentEdit, agent_edit);
        registry.register(CommandName::Sessions, sessions);
        registry.register(CommandName::Session, session);
        registry.register(CommandName::New, new_session);
        registry.register(CommandName::Record, record);
        registry.register(CommandName::Export, export);
        registry.register(CommandName::Help, help);

        return registry;
    }
}

impl CommandRegistry {
    pub fn empty() -> CommandRegistry {
        return CommandRegistry {
            handlers: HashMap::new(),
        };
    }

    pub fn register(&mut self, name: CommandName, handler: CommandHandler) {
        self.handlers.insert(name, handler);
    }

    pub fn get(&self, name: CommandName) -> Option<CommandHandler> {
        return self.handlers.get(&name).copied();
    }
}

fn agents<'a>(service: &'a mut ActionsService, _: &'a SlashCommand) -> BoxFuture<'a, Result<()>> {
    return service.list_agents().boxed();
}

fn agent<'a>(service: &'a mut ActionsService, cmd: &'a SlashCommand) -> BoxFuture<'a, Result<()>> {
    return service.select_agent_command(cmd).boxed();
}

fn agent_new<'a>(
    service: &'a mut ActionsService,
    cmd: &'a SlashCommand,
) -> BoxFuture<'a, Result<()>> {
    return service.create_agent(cmd).boxed();
}

fn agent_edit<'a>(
    service: &'a mut ActionsService,
    cmd: &'a SlashCommand,
) -> BoxFuture<'a, Result<()>> {
    return service.edit_agent(cmd).boxed();
}

fn sessions<'a>(service: &'a mut ActionsService, _: &'a SlashCommand) -> BoxFuture<'a, Result<()>> {
    return service.list_sessions().boxed();
}

fn session<'a>(service: &'a mut ActionsService, cmd: &'a SlashCommand) -> BoxFuture<'a, Result<()>> {
    return service.select_session_command(cmd).boxed();
}

fn new_session<'a>(
    service: &'a mut ActionsService,
    _: &'a SlashCommand,
) -> BoxFuture<'a, Result<()>> {
    return service.new_session().boxed();
}

fn record<'a>(service: &'a mut ActionsService, _: &'a SlashCommand) -> BoxFuture<'a, Result<()>> {
    return async move {
        service.toggle_recording().await;
        return Ok(());
    }
    .boxed();
}

fn export<'a>(service: &'a mut ActionsService, cmd: &'a SlashCommand) -> BoxFuture<'a, Result<()>> {
    return service.export(cmd).boxed();
}

fn help<'a>(service: &'a mut ActionsService, _: &'a SlashCommand) -> BoxFuture<'a, Result<()>> {
    return async move {
        service.help();
        return Ok(());
    }
    .boxed();
}
