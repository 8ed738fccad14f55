//! Block Bash console (default binary).
//!
//! Listens for controllers, assigns each one a game, and writes the render
//! stream to stdout. Type `start` (or just press Enter) to start the games,
//! `quit` to pause the controllers and exit. Logs go to stderr.

use std::io::BufRead;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use tracing::{info, warn};

use block_bash::adapter::{Adapter, AdapterLink};
use block_bash::engine::{Console, ConsoleCommand, ConsoleConfig, Duty, Schedule};
use block_bash::term::TextRenderer;

/// Longest sleep between loop iterations; bounds event latency
const IDLE_POLL: Duration = Duration::from_millis(10);

/// Time given to the server to flush pause signals before exit
const HALT_GRACE: Duration = Duration::from_millis(200);

type StdoutConsole = Console<TextRenderer<std::io::Stdout>, AdapterLink>;

fn main() -> Result<()> {
    init_tracing();

    let adapter = Adapter::start_from_env()?;
    info!(addr = %adapter.local_addr(), "waiting for controllers");

    let config = ConsoleConfig::from_env();
    let console = Console::new(config, TextRenderer::stdout(), adapter.link());
    let commands = spawn_command_reader();

    run(adapter, console, commands)
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Operator commands from stdin, one per line
fn spawn_command_reader() -> Receiver<ConsoleCommand> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match ConsoleCommand::parse(&line) {
                Some(cmd) => {
                    if tx.send(cmd).is_err() {
                        break;
                    }
                }
                None => warn!(input = %line.trim(), "unknown command (start, quit)"),
            }
        }
    });
    rx
}

fn run(
    mut adapter: Adapter,
    mut console: StdoutConsole,
    commands: Receiver<ConsoleCommand>,
) -> Result<()> {
    let mut schedule = Schedule::new(console.config(), Instant::now());

    loop {
        while let Some(event) = adapter.try_recv() {
            console.handle_event(event);
        }

        loop {
            match commands.try_recv() {
                Ok(ConsoleCommand::Start) => {
                    if console.start() {
                        schedule.start(Instant::now());
                    }
                }
                Ok(ConsoleCommand::Quit) => {
                    console.halt();
                    thread::sleep(HALT_GRACE);
                    return Ok(());
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        for duty in schedule.poll(Instant::now()) {
            match duty {
                Duty::AssignSlots => {
                    console.assign_slots();
                }
                Duty::Tick => console.run_frame(),
            }
        }

        let wait = schedule
            .until_next(Instant::now())
            .map_or(IDLE_POLL, |d| d.min(IDLE_POLL));
        thread::sleep(wait);
    }
}
