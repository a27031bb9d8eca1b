#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Error;
use anyhow::Result;
use domain::models::Action;
use domain::models::Event;
use infrastructure::audio::AudioManager;
use infrastructure::backends::BackendManager;
use infrastructure::renderers::html::HtmlRenderer;
use infrastructure::renderers::terminal::TerminalRenderer;
use tokio::sync::mpsc;
use tokio::task;
use yansi::Paint;

use crate::application::cli;
use crate::application::ui;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::services::actions::ActionsService;
use crate::domain::services::ChatContext;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! Parley has failed with the following app version and error.\n\nVersion: {}\nError: {:#}",
            env!("CARGO_PKG_VERSION"),
            err
        ))
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

fn build_actions_service(event_tx: mpsc::UnboundedSender<Event>) -> Result<ActionsService> {
    let ctx = ChatContext::new(
        BackendManager::get()?,
        Arc::new(TerminalRenderer::default()),
        event_tx,
        Config::get_bool(ConfigKey::Stream),
    );

    return Ok(ActionsService::new(
        ctx,
        Arc::new(HtmlRenderer::default()),
        AudioManager::microphone()?,
        AudioManager::sink()?,
        Duration::from_millis(Config::get_u64(ConfigKey::MinRecordingMs)?),
    ));
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        ui::destruct_terminal_for_panic();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let file_appender = tracing_appender::rolling::never(cli::log_dir(), "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("parley")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let ready = match cli::parse().await {
        Ok(ready) => ready,
        Err(ready_err) => {
            handle_error(ready_err);
            return;
        }
    };
    if !ready {
        process::exit(0);
    }

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let actions_service = match build_actions_service(event_tx) {
        Ok(service) => service,
        Err(err) => {
            handle_error(err);
            return;
        }
    };

    let mut background_futures = task::JoinSet::new();
    background_futures.spawn(async move {
        return actions_service.start(&mut action_rx).await;
    });

    let ui_future = ui::start(action_tx, event_rx);

    let res = tokio::select!(
        res = background_futures.join_next() => match res {
            Some(Ok(res)) => res,
            Some(Err(join_err)) => Err(Error::from(join_err)),
            None => Ok(()),
        },
        res = ui_future => res,
    );

    if let Err(err) = res {
        ui::destruct_terminal_for_panic();
        handle_error(err);
    }

    process::exit(0);
}
