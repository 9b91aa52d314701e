//! crossinput -- input probe.
//!
//! Usage: `crossinput [CONFIG.toml]`
//!
//! Starts the engine, prints the set of held keys whenever it changes, and
//! exits when Escape is pressed. `RUST_LOG` controls verbosity (default info).

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

use crossinput::{Engine, EngineConfig, Key};

const REPORT_INTERVAL: Duration = Duration::from_millis(500);

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match EngineConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("crossinput: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::default(),
    };

    log::info!("crossinput v{}", env!("CARGO_PKG_VERSION"));

    let engine = Engine::new(config);
    if let Err(e) = engine.init() {
        eprintln!("crossinput: {e}");
        if cfg!(target_os = "linux") {
            eprintln!("hint: /dev/uinput and /dev/input/event* usually need root (try sudo)");
        }
        return ExitCode::FAILURE;
    }

    println!("listening; press Escape to quit");
    let mut last: Vec<Key> = Vec::new();
    while !engine.is_key_pressed(Key::ESCAPE) {
        let held: Vec<Key> = Key::ALL
            .iter()
            .copied()
            .filter(|&key| engine.is_key_pressed(key))
            .collect();
        if held != last {
            let names: Vec<&str> = held.iter().map(|&key| engine.key_name(key)).collect();
            println!("held: [{}]", names.join(", "));
            last = held;
        }
        thread::sleep(REPORT_INTERVAL);
    }

    engine.cleanup();
    println!("bye");
    ExitCode::SUCCESS
}
