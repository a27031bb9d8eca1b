#[cfg(test)]
#[path = "slash_commands_test.rs"]
mod tests;

use strum::EnumIter;
use strum::IntoEnumIterator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum CommandName {
    Agents,
    Agent,
    AgentNew,
    AgentEdit,
    Sessions,
    Session,
    New,
    Record,
    Export,
    Help,
    Quit,
}

impl CommandName {
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            CommandName::Agents => return &["/agents", "/al"],
            CommandName::Agent => return &["/agent", "/ag"],
            CommandName::AgentNew => return &["/agent-new", "/an"],
            CommandName::AgentEdit => return &["/agent-edit", "/ae"],
            CommandName::Sessions => return &["/sessions", "/sl"],
            CommandName::Session => return &["/session", "/s"],
            CommandName::New => return &["/new", "/n"],
            CommandName::Record => return &["/record", "/rec"],
            CommandName::Export => return &["/export", "/x"],
            CommandName::Help => return &["/help", "/h"],
            CommandName::Quit => return &["/quit", "/q", "/exit"],
        }
    }

    pub fn usage(&self) -> &'static str {
        match self {
            CommandName::Agents => return "Lists all agents, marking the active one.",
            CommandName::Agent => return "[AGENT_ID] - Switches to an agent and opens its latest chat.",
            CommandName::AgentNew => return "[NAME] | [PROMPT] - Creates an agent with a system prompt.",
            CommandName::AgentEdit => return "[AGENT_ID] [NAME?] | [PROMPT?] - Renames an agent and/or replaces its prompt.",
            CommandName::Sessions => return "Lists the chats of the active agent.",
            CommandName::Session => return "[SESSION_ID] - Opens a chat of the active agent.",
            CommandName::New => return "Starts a new chat with the active agent.",
            CommandName::Record => return "Starts recording, or stops and sends the recording. Same as CTRL+R.",
            CommandName::Export => return "[PATH?] - Saves the open chat as an HTML file.",
            CommandName::Help => return "Provides this help menu.",
            CommandName::Quit => return "Exit Parley.",
        }
    }

    pub fn parse(text: &str) -> Option<CommandName> {
        return CommandName::iter().find(|name| return name.aliases().contains(&text));
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlashCommand {
    pub name: CommandName,
    pub args: Vec<String>,
}

impl SlashCommand {
    pub fn parse(text: &str) -> Option<SlashCommand> {
        let mut parts = text.split_whitespace();
        let name = CommandName::parse(parts.next()?)?;
        let args = parts
            .map(|e| return e.to_string())
            .collect::<Vec<String>>();

        return Some(SlashCommand { name, args });
    }

    pub fn is_quit(&self) -> bool {
        return self.name == CommandName::Quit;
    }

    /// Arguments joined back into a single line.
    pub fn rest(&self) -> String {
        return self.args.join(" ");
    }
}

pub fn help_text() -> String {
    let commands = CommandName::iter()
        .map(|name| {
            let aliases = name.aliases();
            let short = aliases[1..].join(", ");
            return format!("- {} ({short}) {}", aliases[0], name.usage());
        })
        .collect::<Vec<String>>()
        .join("\n");

    let hotkeys = r#"
HOTKEYS:
- Enter - Send the message, or run the slash command.
- CTRL+R - Start recording, press again to stop and send.
- Up arrow - Scroll up
- Down arrow - Scroll down
- CTRL+U - Page up
- CTRL+D - Page down
- CTRL+C - Exit Parley."#;

    return format!("COMMANDS:\n{commands}\n{hotkeys}");
}
