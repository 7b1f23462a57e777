mod commands;
mod config;
mod render;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use quiz_core::model::ExportRecord;
use services::sessions::export_json;
use services::{
    AppServices, Clock, QuizSession, SessionEvent, SessionLoopService, StartRequest, Transition,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing_subscriber::EnvFilter;

use crate::commands::{Command, HELP};
use crate::config::{Args, normalize_sqlite_url, prepare_sqlite_dir};
use crate::render::Screen;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(args: Args) -> anyhow::Result<()> {
    let request =
        StartRequest::from_params(args.id.as_deref(), args.mode.as_deref(), args.seed.as_deref())?;

    let db_url = normalize_sqlite_url(&args.db);
    prepare_sqlite_dir(&db_url).await?;
    tracing::debug!(db = %db_url, source = ?args.source(), "opening storage");
    let services = AppServices::new_sqlite(&db_url, &args.source(), Clock::system(), args.sub_seed())
        .await
        .with_context(|| format!("failed to open {db_url}"))?;
    let session_loop = services.session_loop();

    let mut session = session_loop.start_session(request).await?;
    println!("{}", Screen(&session.view(session_loop.clock().now())));
    println!("Type `help` for commands.");

    event_loop(&session_loop, &mut session, &args.export_dir).await
}

async fn event_loop(
    session_loop: &SessionLoopService,
    session: &mut QuizSession,
    export_dir: &Path,
) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read input")? else {
                    break;
                };
                match Command::parse(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => handle(session_loop, session, command, export_dir).await,
                    Err(err) => println!("{err}"),
                }
            }
            _ = ticker.tick(), if session.has_running_timer() => {
                let transition = session_loop.dispatch(session, SessionEvent::TimerTick).await;
                if transition == Transition::TimerExpired {
                    println!("\nTime is up.\n");
                    show(session_loop, session);
                }
            }
        }
    }
    Ok(())
}

async fn handle(
    session_loop: &SessionLoopService,
    session: &mut QuizSession,
    command: Command,
    export_dir: &Path,
) {
    let event = match command {
        Command::Select { number, choice } => {
            let Some(item) = number.checked_sub(1).and_then(|idx| session.items().get(idx)) else {
                println!("There is no question {number}.");
                return;
            };
            SessionEvent::SelectAnswer {
                question: item.id().clone(),
                choice,
            }
        }
        Command::Mode(Some(mode)) => SessionEvent::SwitchMode(mode),
        Command::Mode(None) => SessionEvent::ToggleMode,
        Command::Reveal => SessionEvent::Reveal,
        Command::Reset => SessionEvent::Reset,
        Command::Export => {
            let record = session_loop.export(session);
            match write_export(export_dir, &record).await {
                Ok(path) => println!("Results written to {}", path.display()),
                Err(err) => println!("Export failed: {err:#}"),
            }
            return;
        }
        Command::Show => return show(session_loop, session),
        Command::Help => return println!("{HELP}"),
        Command::Quit => return,
    };

    let reveal = matches!(event, SessionEvent::Reveal);
    match session_loop.dispatch(session, event).await {
        Transition::Rejected(reason) => println!("{reason}"),
        Transition::Ignored if reveal => println!("Reveal is only available in practice mode."),
        Transition::Ignored => println!("Already in {}.", session.mode().label()),
        Transition::Changed { .. } | Transition::TimerExpired => show(session_loop, session),
    }
}

fn show(session_loop: &SessionLoopService, session: &QuizSession) {
    println!("{}", Screen(&session.view(session_loop.clock().now())));
}

/// Write `{quizId}-results.json` under `dir`, creating it if needed.
async fn write_export(dir: &Path, record: &ExportRecord) -> anyhow::Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(record.file_name());
    let json = export_json(record).context("failed to encode results")?;
    tokio::fs::write(&path, json)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}

#[tokio::main]
async fn main() {
    init_tracing();
    let args = Args::parse();
    if let Err(err) = run(args).await {
        eprintln!("{err:#}");
        std::process::exit(2);
    }
}
