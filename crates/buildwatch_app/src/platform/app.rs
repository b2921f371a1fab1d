use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use buildwatch_core::{update, DashboardState, InventoryStatus, Msg};
use chrono::Local;
use log::LevelFilter;
use watch_logging::{watch_info, watch_warn, LogDestination, DEFAULT_LOG_FILE};

use super::config::{load_config, CONFIG_FILENAME};
use super::effects::EffectRunner;
use super::ui::commands::{self, Command, HELP};
use super::ui::render;

const POLL_INTERVAL: Duration = Duration::from_millis(75);

pub fn run_app() -> anyhow::Result<()> {
    let config = load_config(Path::new(CONFIG_FILENAME));
    let destination = if config.log_to_terminal {
        LogDestination::Both(DEFAULT_LOG_FILE.into())
    } else {
        LogDestination::default()
    };
    watch_logging::initialize(&destination, LevelFilter::Info);

    let runner = EffectRunner::new(config.engine_config())?;
    let mut state = DashboardState::with_builder(config.tree_builder());
    let lines = spawn_stdin_reader();

    println!("{HELP}");
    runner.start();

    loop {
        match lines.recv_timeout(POLL_INTERVAL) {
            Ok(line) => match commands::parse(&line) {
                Ok(Command::Dispatch(msg)) => state = dispatch(state, msg, &runner),
                Ok(Command::ShowDashboard) => print!("{}", render::render_dashboard(&state.view().dashboard)),
                Ok(Command::Help) => println!("{HELP}"),
                Ok(Command::Quit) => break,
                Err(err) => println!("{err}"),
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        for msg in runner.drain() {
            state = dispatch(state, msg, &runner);
        }

        if state.consume_dirty() {
            print!("{}", render::render_tree(&state.view(), Local::now()));
            io::stdout().flush()?;
        }
    }

    watch_info!("Shutting down");
    Ok(())
}

fn dispatch(state: DashboardState, msg: Msg, runner: &EffectRunner) -> DashboardState {
    let reloaded = matches!(msg, Msg::InventoryLoaded(_) | Msg::SelectionLoaded { .. });
    let (state, effects) = update(state, msg);
    runner.run(effects);
    if reloaded {
        warn_orphans(&state);
    }
    state
}

// Only meaningful once an inventory is in; before that every id looks orphaned.
fn warn_orphans(state: &DashboardState) {
    if *state.inventory() != InventoryStatus::Ready {
        return;
    }
    let orphaned = state.selection().orphaned(state.tree());
    if !orphaned.is_empty() {
        watch_warn!(
            "{} selected builds are not in the inventory: {}",
            orphaned.len(),
            orphaned.join(", ")
        );
    }
}

fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}
