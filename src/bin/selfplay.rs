//! Self-play batch CLI.
//!
//! Plays games between two random commanders and writes one JSON record per
//! game (JSONL), followed by a summary on stderr.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --games N          Number of games to play (default: 10)
//!   --threads N        Number of parallel threads (default: 4)
//!   --seed N           Base seed; game i uses seed + i (default: 1)
//!   --max-steps N      Phases before a game is abandoned (default: 2000)
//!   --turn-limit N     Turn limit for the influence tie-break (default: 20)
//!   --event-chance P   Fluctuation event chance in percent (default: 60)
//!   --config FILE      Game configuration JSON
//!   --map FILE         Map template JSON (default: built-in map)
//!   --output FILE      Output file path (default: stdout)
//!   --quiet            Suppress progress and summary output

use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use tracing_subscriber::EnvFilter;

use frontline::board::MapTemplate;
use frontline::config::GameConfig;
use frontline::selfplay::{self, SelfPlayConfig};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("frontline=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut output_path: Option<String> = None;
    let mut map_path: Option<String> = None;
    let mut turn_limit: Option<u32> = None;
    let mut event_chance: Option<u32> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => config.num_games = value(&args, &mut i),
            "--threads" => config.threads = value(&args, &mut i),
            "--seed" => config.seed = value(&args, &mut i),
            "--max-steps" => config.max_steps = value(&args, &mut i),
            "--turn-limit" => turn_limit = Some(value(&args, &mut i)),
            "--event-chance" => event_chance = Some(value(&args, &mut i)),
            "--config" => {
                let path: String = value(&args, &mut i);
                config.game = GameConfig::from_json_file(&path).unwrap_or_else(|e| {
                    eprintln!("{}: {}", path, e);
                    process::exit(1);
                });
            }
            "--map" => map_path = Some(value(&args, &mut i)),
            "--output" => output_path = Some(value(&args, &mut i)),
            "--quiet" => config.quiet = true,
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    // Flags override the config file.
    if let Some(limit) = turn_limit {
        config.game.turn_limit = limit;
    }
    if let Some(chance) = event_chance {
        config.game.event_chance_percent = chance;
    }

    let map = match map_path {
        Some(path) => {
            let parsed = fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| MapTemplate::from_json_str(&text).map_err(|e| e.to_string()));
            match parsed {
                Ok(map) => map,
                Err(e) => {
                    eprintln!("{}: {}", path, e);
                    process::exit(1);
                }
            }
        }
        None => MapTemplate::standard(),
    };
    if let Err(e) = map.build(&config.game) {
        eprintln!("invalid map: {}", e);
        process::exit(1);
    }

    if !config.quiet {
        tracing::info!(
            games = config.num_games,
            threads = config.threads,
            seed = config.seed,
            turn_limit = config.game.turn_limit,
            "starting self-play"
        );
    }

    let start = Instant::now();
    let games = selfplay::run_self_play(&config, &map);
    let elapsed = start.elapsed();

    if !config.quiet {
        tracing::info!(
            games = games.len(),
            elapsed_s = elapsed.as_secs_f64(),
            "self-play complete"
        );
        selfplay::print_summary(&games);
    }

    let written = match &output_path {
        Some(path) => File::create(path)
            .and_then(|file| selfplay::write_jsonl(&games, &mut BufWriter::new(file))),
        None => selfplay::write_jsonl(&games, &mut BufWriter::new(io::stdout().lock())),
    };
    if let Err(e) = written {
        eprintln!("failed to write output: {}", e);
        process::exit(1);
    }
    if let (Some(path), false) = (&output_path, config.quiet) {
        tracing::info!(games = games.len(), path = %path, "wrote records");
    }
}

/// Reads the value following the flag at `args[*i]`, exiting on a missing
/// or unparsable value.
fn value<T: FromStr>(args: &[String], i: &mut usize) -> T {
    let flag = &args[*i];
    *i += 1;
    match args.get(*i).map(|v| v.parse::<T>()) {
        Some(Ok(v)) => v,
        _ => {
            eprintln!("invalid {} value", flag);
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N          Number of games to play (default: 10)");
    eprintln!("  --threads N        Number of parallel threads (default: 4)");
    eprintln!("  --seed N           Base seed; game i uses seed + i (default: 1)");
    eprintln!("  --max-steps N      Phases before a game is abandoned (default: 2000)");
    eprintln!("  --turn-limit N     Turn limit for the influence tie-break (default: 20)");
    eprintln!("  --event-chance P   Fluctuation event chance in percent (default: 60)");
    eprintln!("  --config FILE      Game configuration JSON");
    eprintln!("  --map FILE         Map template JSON (default: built-in map)");
    eprintln!("  --output FILE      Output file path (default: stdout)");
    eprintln!("  --quiet            Suppress progress and summary output");
    eprintln!("  --help             Show this help");
}
