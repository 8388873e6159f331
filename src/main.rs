//! Frontline: a line-oriented controller for the wargame engine.
//!
//! Reads one command per line from stdin and answers each with one JSON line
//! on stdout. Logs go to stderr.
//!
//! Usage:
//!   frontline [--config FILE] [--map FILE]

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::process;

use serde_json::json;
use tracing_subscriber::EnvFilter;

use frontline::board::{MapTemplate, Order};
use frontline::config::GameConfig;
use frontline::engine::Engine;
use frontline::protocol::parser::{parse_command, Command};
use frontline::protocol::parse_order_batch;

/// Runs the command loop, reading from stdin and writing responses to
/// stdout.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("frontline=info")),
        )
        .with_writer(io::stderr)
        .init();

    let (config, map) = match load_setup() {
        Ok(setup) => setup,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    let mut engine = match Engine::new(config, map) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("invalid map: {}", e);
            process::exit(1);
        }
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        let response = match cmd {
            Command::NewGame { seed } => {
                let reset = match seed {
                    Some(seed) => engine.reset_with_seed(seed),
                    None => engine.reset(),
                };
                match reset {
                    Ok(()) => status(&engine),
                    Err(e) => json!({ "error": e.to_string() }),
                }
            }
            Command::State => json!(engine.state()),
            Command::Summary => json!(engine.summary()),
            Command::Orders { payload } => match parse_order_batch(&payload) {
                Ok(batch) => {
                    let outcomes = engine.submit_orders(&batch.orders);
                    let skipped: Vec<_> = batch
                        .skipped
                        .iter()
                        .map(|(index, reason)| json!({ "index": index, "reason": reason }))
                        .collect();
                    json!({ "outcomes": outcomes, "skipped": skipped })
                }
                Err(e) => {
                    let error = e.to_string();
                    let outcomes = engine.submit_unreadable(&error);
                    json!({ "outcomes": outcomes, "error": error })
                }
            },
            Command::Pass => json!({ "outcomes": engine.submit_orders(&[Order::Pass]) }),
            Command::Advance => {
                engine.advance();
                status(&engine)
            }
            Command::Journal { count } => {
                let entries: Vec<_> = engine.state().journal.entries().collect();
                let skip = count.map_or(0, |n| entries.len().saturating_sub(n));
                json!(&entries[skip..])
            }
            Command::Quit => break,
        };

        if writeln!(out, "{}", response).and_then(|_| out.flush()).is_err() {
            break;
        }
    }
}

/// The clock and verdict, as reported after `newgame` and `advance`.
fn status(engine: &Engine) -> serde_json::Value {
    let state = engine.state();
    json!({
        "turn": state.turn,
        "player": state.current_player,
        "phase": state.phase,
        "event": state.active_event.as_ref().map(|e| e.describe()),
        "result": state.result,
    })
}

fn load_setup() -> Result<(GameConfig, MapTemplate), String> {
    let args: Vec<String> = env::args().collect();
    let mut config = GameConfig::default();
    let mut map = MapTemplate::standard();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        if flag != "--config" && flag != "--map" {
            return Err(format!("unknown argument: {}", flag));
        }
        i += 1;
        let path = args
            .get(i)
            .ok_or_else(|| format!("missing value for {}", flag))?;
        if flag == "--config" {
            config = GameConfig::from_json_file(path).map_err(|e| format!("{}: {}", path, e))?;
        } else {
            let text = fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
            map = MapTemplate::from_json_str(&text).map_err(|e| format!("{}: {}", path, e))?;
        }
        i += 1;
    }
    Ok((config, map))
}
