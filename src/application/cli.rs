#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::env;
use std::io;
use std::path;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::help_text;
use crate::domain::models::Agent;
use crate::domain::models::AgentDraft;
use crate::domain::models::AgentUpdate;
use crate::domain::models::Session;
use crate::infrastructure::backends::BackendManager;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

pub fn log_dir() -> path::PathBuf {
    if let Ok(dir) = env::var("PARLEY_LOG_DIR") {
        return path::PathBuf::from(dir);
    }

    return dirs::cache_dir().unwrap_or_else(env::temp_dir).join("parley");
}

fn format_agent(agent: &Agent) -> String {
    let mut prompt = agent
        .prompt
        .split('\n')
        .next()
        .unwrap_or_default()
        .to_string();

    if prompt.chars().count() >= 70 {
        prompt = format!("{}...", prompt.chars().take(67).collect::<String>());
    }

    return format!("- (ID: {}) {}, Prompt: {prompt}", agent.agent_id, agent.name);
}

fn format_session(session: &Session) -> String {
    return format!("- (ID: {}) {}", session.session_id, session.label());
}

fn required_id(matches: &ArgMatches, name: &str) -> Result<i64> {
    let raw = matches
        .get_one::<String>(name)
        .ok_or_else(|| return anyhow!("--{name} is required"))?;

    return raw
        .parse::<i64>()
        .map_err(|_| return anyhow!("--{name} expects a number, got '{raw}'"));
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

async fn run_agents(matches: &ArgMatches) -> Result<()> {
    let backend = BackendManager::get()?;

    match matches.subcommand() {
        Some(("list", _)) => {
            let agents = backend.list_agents().await?;
            if agents.is_empty() {
                println!("There are no agents yet. Create one with `parley agents create`.");
            } else {
                let lines = agents.iter().map(format_agent).collect::<Vec<String>>();
                println!("{}", lines.join("\n"));
            }
        }
        Some(("create", create_matches)) => {
            let draft = AgentDraft {
                name: create_matches
                    .get_one::<String>("name")
                    .cloned()
                    .unwrap_or_default(),
                prompt: create_matches
                    .get_one::<String>("prompt")
                    .cloned()
                    .unwrap_or_default(),
            };
            let agent = backend.create_agent(&draft).await?;
            println!("Created agent {}", format_agent(&agent).trim_start_matches("- "));
        }
        Some(("edit", edit_matches)) => {
            let agent_id = required_id(edit_matches, "id")?;
            let update = AgentUpdate {
                name: edit_matches.get_one::<String>("name").cloned(),
                prompt: edit_matches.get_one::<String>("prompt").cloned(),
            };
            if update.is_empty() {
                bail!("Nothing to change. Pass --name and/or --prompt.");
            }
            let agent = backend.update_agent(agent_id, &update).await?;
            println!("Updated agent {}", format_agent(&agent).trim_start_matches("- "));
        }
        _ => {
            subcommand_agents().print_long_help()?;
        }
    }

    return Ok(());
}

async fn run_sessions(matches: &ArgMatches) -> Result<()> {
    let backend = BackendManager::get()?;
    let agent_id = match Config::get_id(ConfigKey::AgentID)? {
        Some(agent_id) => agent_id,
        None => bail!("--agent-id is required"),
    };

    match matches.subcommand() {
        Some(("list", _)) => {
            let sessions = backend.list_sessions(agent_id).await?;
            if sessions.is_empty() {
                println!("There are no chats for agent {agent_id} yet. You should start your first one!");
            } else {
                let lines = sessions.iter().map(format_session).collect::<Vec<String>>();
                println!("{}", lines.join("\n"));
            }
        }
        Some(("create", _)) => {
            let session = backend.create_session(agent_id).await?;
            println!("Created {}", session.label());
        }
        _ => {
            subcommand_sessions().print_long_help()?;
        }
    }

    return Ok(());
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Parley")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Parley with environment variable RUST_LOG=parley")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn subcommand_agents() -> Command {
    return Command::new("agents")
        .about("Manage agents on the agent platform.")
        .arg_required_else_help(true)
        .subcommand(Command::new("list").about("List all agents with their ids and prompts."))
        .subcommand(
            Command::new("create")
                .about("Create an agent with a system prompt.")
                .arg(Arg::new("name").short('n').long("name").help("Agent name").required(true))
                .arg(Arg::new("prompt").short('p').long("prompt").help("System prompt").required(true)),
        )
        .subcommand(
            Command::new("edit")
                .about("Rename an agent and/or replace its prompt.")
                .arg(Arg::new("id").short('i').long("id").help("Agent ID").required(true))
                .arg(Arg::new("name").short('n').long("name").help("New agent name"))
                .arg(Arg::new("prompt").short('p').long("prompt").help("New system prompt")),
        );
}

fn subcommand_sessions() -> Command {
    return Command::new("sessions")
        .about("Manage chats of an agent.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("list").about("List the chats of the agent passed with --agent-id."),
        )
        .subcommand(
            Command::new("create").about("Start a new chat with the agent passed with --agent-id."),
        );
}

fn arg_bool(key: ConfigKey, env: &'static str, help: &str) -> Arg {
    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env)
        .num_args(1)
        .help(format!("{help} [default: {}]", Config::default(key)))
        .value_parser(PossibleValuesParser::new(["true", "false"]))
        .global(true);
}

fn arg_string(key: ConfigKey, env: &'static str, help: &str) -> Arg {
    let mut help = help.to_string();
    let default = Config::default(key);
    if !default.is_empty() {
        help = format!("{help} [default: {default}]");
    }

    return Arg::new(key.to_string())
        .long(key.to_string())
        .env(env)
        .num_args(1)
        .help(help)
        .global(true);
}

fn subcommand_chat() -> Command {
    return Command::new("chat").about("Start chatting with an agent. This is the default.");
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") || line.starts_with("HOTKEYS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("parley")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_chat())
        .subcommand(subcommand_agents())
        .subcommand(subcommand_sessions())
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("PARLEY_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true)
        )
        .arg(arg_string(
            ConfigKey::ApiURL,
            "PARLEY_API_URL",
            "Agent platform API URL.",
        ))
        .arg(arg_string(
            ConfigKey::AgentID,
            "PARLEY_AGENT_ID",
            "Agent to select at startup. Defaults to the first agent.",
        ))
        .arg(arg_string(
            ConfigKey::SessionID,
            "PARLEY_SESSION_ID",
            "Chat to open at startup. Defaults to the agent's newest chat.",
        ))
        .arg(arg_bool(
            ConfigKey::Stream,
            "PARLEY_STREAM",
            "Stream assistant replies as they are generated.",
        ))
        .arg(arg_string(
            ConfigKey::MinRecordingMs,
            "PARLEY_MIN_RECORDING_MS",
            "Shortest recording in milliseconds that will be sent.",
        ))
        .arg(arg_string(
            ConfigKey::RecorderCommand,
            "PARLEY_RECORDER_COMMAND",
            "Program that records from the microphone and writes audio to stdout.",
        ))
        .arg(arg_string(
            ConfigKey::RecorderMimeType,
            "PARLEY_RECORDER_MIME_TYPE",
            "MIME type of the audio the recorder writes.",
        ))
        .arg(arg_string(
            ConfigKey::PlayerCommand,
            "PARLEY_PLAYER_COMMAND",
            "Program that plays audio read from stdin.",
        ));
}

pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    println!("{}", log_dir().join("debug.log").to_string_lossy());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(false);
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
        }
        Some(("agents", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            run_agents(subcmd_matches).await?;
            return Ok(false);
        }
        Some(("sessions", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            run_sessions(subcmd_matches).await?;
            return Ok(false);
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
