use anyhow::Context;
use clap::Parser;
use std::sync::{Arc, Mutex, MutexGuard};
use tick_clock::adapters::terminal::{TerminalInput, HELP};
use tick_clock::utils::error::ErrorSeverity;
use tick_clock::utils::logger;
use tick_clock::{
    CliConfig, ClockEngine, Command, EngineHandle, SystemClock, TerminalNotifier,
    TerminalPresenter,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 載入並驗證配置
    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            let exit_code = match e.severity() {
                ErrorSeverity::Low | ErrorSeverity::High => 1,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    };

    // 初始化日誌
    if config.log_json {
        logger::init_json_logger(config.verbose, config.log_level.as_deref());
    } else {
        logger::init_cli_logger(config.verbose, config.log_level.as_deref());
    }

    tracing::info!("Starting tick-clock");
    tracing::debug!("Resolved config: {:?}", config);

    let presenter = Arc::new(Mutex::new(TerminalPresenter::new(
        config.hour_format,
        config.show_clock,
        config.json_events,
    )));

    let mut engine = ClockEngine::with_settings(
        SystemClock,
        TerminalNotifier::default(),
        config.engine_settings(),
    );
    for alarm in &config.initial_alarms {
        let command = Command::SetAlarm(*alarm);
        let dispatch = engine.dispatch(command.clone()).await;
        if let Some(text) = lock(&presenter).render_outcome(&command, &dispatch.outcome) {
            println!("{}", text);
        }
    }

    let (handle, requests) = EngineHandle::channel(64);
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();

    let printer = {
        let presenter = presenter.clone();
        tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                let line = lock(&presenter).render_event(&event);
                if let Some(line) = line {
                    println!("{}", line);
                }
            }
        })
    };

    tokio::spawn(read_commands(handle.clone(), presenter.clone()));

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, shutting down");
            let _ = handle.post(Command::Shutdown).await;
        }
    });

    engine
        .run(requests, events_tx)
        .await
        .context("clock engine stopped unexpectedly")?;

    let _ = printer.await;
    tracing::info!("✅ tick-clock stopped");
    Ok(())
}

/// Forwards typed commands to the engine until `quit` or end of input.
async fn read_commands(handle: EngineHandle, presenter: Arc<Mutex<TerminalPresenter>>) {
    println!("Type 'help' for the list of commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::debug!("stdin closed");
                break;
            }
            Err(e) => {
                tracing::error!("❌ Failed to read stdin: {}", e);
                break;
            }
        };

        let parsed = lock(&presenter).parse_line(&line);
        let command = match parsed {
            Ok(Some(TerminalInput::Command(command))) => command,
            Ok(Some(TerminalInput::Help)) => {
                println!("{}", HELP);
                continue;
            }
            Ok(None) => continue,
            Err(e) => {
                eprintln!("❌ {}", e.user_friendly_message());
                eprintln!("💡 {}", e.recovery_suggestion());
                continue;
            }
        };

        let shutdown = command == Command::Shutdown;
        match handle.send(command.clone()).await {
            Ok(outcome) => {
                if let Some(text) = lock(&presenter).render_outcome(&command, &outcome) {
                    println!("{}", text);
                }
            }
            Err(e) => {
                tracing::warn!("{}", e);
                return;
            }
        }
        if shutdown {
            return;
        }
    }

    let _ = handle.post(Command::Shutdown).await;
}

fn lock(presenter: &Mutex<TerminalPresenter>) -> MutexGuard<'_, TerminalPresenter> {
    presenter.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
