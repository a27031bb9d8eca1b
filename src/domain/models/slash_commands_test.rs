use super::help_text;
use super::CommandName;
use super::SlashCommand;

#[test]
fn it_parse_empty_string() {
    assert!(SlashCommand::parse("").is_none());
}

#[test]
fn it_parse_space_only() {
    assert!(SlashCommand::parse(" ").is_none());
}

#[test]
fn it_parse_single_slash() {
    assert!(SlashCommand::parse("/").is_none());
}

#[test]
fn it_parse_plain_text() {
    assert!(SlashCommand::parse("/etc/hosts is where it lives").is_none());
    assert!(SlashCommand::parse("hello /agents").is_none());
}

#[test]
fn it_parse_valid_prefix() {
    let cmd = SlashCommand::parse("/q").unwrap();
    assert_eq!(cmd.name, CommandName::Quit);
    assert!(cmd.args.is_empty());
    assert!(cmd.is_quit());
}

#[test]
fn it_is_exit() {
    assert!(SlashCommand::parse("/exit").unwrap().is_quit());
    assert!(SlashCommand::parse("/quit").unwrap().is_quit());
}

#[test]
fn it_parses_args() {
    let cmd = SlashCommand::parse("  /agent-new   Tutor |  You teach   ").unwrap();
    assert_eq!(cmd.name, CommandName::AgentNew);
    assert_eq!(cmd.args, vec!["Tutor", "|", "You", "teach"]);
    assert_eq!(cmd.rest(), "Tutor | You teach");
}

#[test]
fn it_parses_short_aliases() {
    assert_eq!(SlashCommand::parse("/al").unwrap().name, CommandName::Agents);
    assert_eq!(SlashCommand::parse("/ag 2").unwrap().name, CommandName::Agent);
    assert_eq!(SlashCommand::parse("/ae 2 x").unwrap().name, CommandName::AgentEdit);
    assert_eq!(SlashCommand::parse("/sl").unwrap().name, CommandName::Sessions);
    assert_eq!(SlashCommand::parse("/s 4").unwrap().name, CommandName::Session);
    assert_eq!(SlashCommand::parse("/n").unwrap().name, CommandName::New);
    assert_eq!(SlashCommand::parse("/rec").unwrap().name, CommandName::Record);
    assert_eq!(SlashCommand::parse("/x").unwrap().name, CommandName::Export);
    assert_eq!(SlashCommand::parse("/h").unwrap().name, CommandName::Help);
}

#[test]
fn it_lists_every_command_in_help() {
    let help = help_text();
    assert!(help.starts_with("COMMANDS:"));
    assert!(help.contains("- /agents (/al) Lists all agents, marking the active one."));
    assert!(help.contains("- /quit (/q, /exit) Exit Parley."));
    assert!(help.contains("HOTKEYS:"));
}
