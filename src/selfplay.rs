//! Batch self-play.
//!
//! Plays full games between two random commanders and records how each one
//! ended. Game `i` is seeded with `seed + i`, so any single game of a batch
//! can be replayed on its own.

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::time::Instant;

use serde::Serialize;

use crate::board::{Faction, MapTemplate, VictoryCondition, ALL_FACTIONS};
use crate::config::GameConfig;
use crate::decision::{DecisionSource, RandomCommander};
use crate::engine::Engine;
use crate::resolve::influence;
use crate::resolve::orders::OrderOutcome;

/// Configuration for a self-play batch.
#[derive(Debug, Clone)]
pub struct SelfPlayConfig {
    /// Number of games to play.
    pub num_games: usize,
    /// Worker threads; 1 plays sequentially.
    pub threads: usize,
    /// Base seed; game `i` uses `seed + i`.
    pub seed: u64,
    /// Phases after which an unfinished game is abandoned.
    pub max_steps: usize,
    /// Rules shared by every game. Its seed is overwritten per game.
    pub game: GameConfig,
    /// Suppress per-game progress logging.
    pub quiet: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        SelfPlayConfig {
            num_games: 10,
            threads: 4,
            seed: 1,
            max_steps: 2_000,
            game: GameConfig::default(),
            quiet: false,
        }
    }
}

/// How one game went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameRecord {
    pub game_id: usize,
    pub seed: u64,
    pub finished: bool,
    pub winner: Option<Faction>,
    pub condition: Option<VictoryCondition>,
    pub message: Option<String>,
    pub final_turn: u32,
    pub steps: usize,
    pub battles: usize,
    pub captures: usize,
    pub rejected_orders: usize,
    pub draws: u64,
    pub resources: BTreeMap<Faction, u32>,
    pub units: BTreeMap<Faction, usize>,
    pub influence: BTreeMap<Faction, u32>,
}

/// Totals over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelfPlaySummary {
    pub games: usize,
    pub blue_wins: usize,
    pub red_wins: usize,
    pub draws: usize,
    pub unfinished: usize,
    pub control: usize,
    pub decapitation: usize,
    pub influence: usize,
    pub avg_turns: f64,
    pub avg_battles: f64,
}

/// Plays one game with the given seed.
///
/// Returns `None` only if the configured map fails validation.
pub fn play_game(config: &SelfPlayConfig, map: &MapTemplate, game_id: usize) -> Option<GameRecord> {
    let seed = config.seed.wrapping_add(game_id as u64);
    let game = GameConfig {
        seed,
        ..config.game.clone()
    };
    let mut engine = match Engine::new(game, map.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            tracing::error!(error = %e, "map failed validation");
            return None;
        }
    };
    let mut blue = RandomCommander::new(seed.wrapping_mul(2));
    let mut red = RandomCommander::new(seed.wrapping_mul(2).wrapping_add(1));

    let mut steps = 0;
    let mut battles = 0;
    let mut captures = 0;
    let mut rejected_orders = 0;
    while steps < config.max_steps && !engine.is_over() {
        let source: &mut dyn DecisionSource = match engine.state().current_player {
            Faction::Blue => &mut blue,
            Faction::Red => &mut red,
        };
        for outcome in engine.step(source) {
            match outcome {
                OrderOutcome::Fought { captured, .. } => {
                    battles += 1;
                    captures += usize::from(captured);
                }
                OrderOutcome::Rejected { .. } => rejected_orders += 1,
                _ => {}
            }
        }
        steps += 1;
    }

    let state = engine.state();
    let result = state.result.as_ref();
    Some(GameRecord {
        game_id,
        seed,
        finished: result.is_some(),
        winner: result.and_then(|r| r.winner()),
        condition: result.map(|r| r.condition),
        message: result.map(|r| r.message.clone()),
        final_turn: state.turn,
        steps,
        battles,
        captures,
        rejected_orders,
        draws: engine.draws(),
        resources: ALL_FACTIONS.iter().map(|&f| (f, state.resources(f))).collect(),
        units: ALL_FACTIONS
            .iter()
            .map(|&f| (f, state.units_of(f).count()))
            .collect(),
        influence: ALL_FACTIONS.iter().map(|&f| (f, influence(state, f))).collect(),
    })
}

/// Runs a batch, producing the records in game order.
///
/// When `config.threads > 1`, games are played concurrently using rayon.
pub fn run_self_play(config: &SelfPlayConfig, map: &MapTemplate) -> Vec<GameRecord> {
    let mut games = Vec::with_capacity(config.num_games);
    run_self_play_with_callback(config, map, |game| games.push(game));
    games.sort_by_key(|g| g.game_id);
    games
}

/// Runs a batch, calling `on_game` as each game completes.
///
/// With several threads the completion order is not the game order.
pub fn run_self_play_with_callback<F>(config: &SelfPlayConfig, map: &MapTemplate, on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    if config.threads > 1 {
        run_self_play_parallel(config, map, on_game);
    } else {
        run_self_play_sequential(config, map, on_game);
    }
}

fn run_self_play_sequential<F>(config: &SelfPlayConfig, map: &MapTemplate, mut on_game: F)
where
    F: FnMut(GameRecord),
{
    for i in 0..config.num_games {
        let start = Instant::now();
        if let Some(game) = play_game(config, map, i) {
            if !config.quiet {
                log_game(&game, i + 1, config.num_games, start);
            }
            on_game(game);
        }
    }
}

fn run_self_play_parallel<F>(config: &SelfPlayConfig, map: &MapTemplate, mut on_game: F)
where
    F: FnMut(GameRecord) + Send,
{
    use rayon::prelude::*;

    let pool = match rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(error = %e, "thread pool unavailable, playing sequentially");
            return run_self_play_sequential(config, map, on_game);
        }
    };

    let completed = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<GameRecord>();

    std::thread::scope(|scope| {
        scope.spawn(|| {
            pool.install(|| {
                (0..config.num_games)
                    .into_par_iter()
                    .for_each_with(tx, |tx, i| {
                        let start = Instant::now();
                        if let Some(game) = play_game(config, map, i) {
                            if !config.quiet {
                                let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                                log_game(&game, n, config.num_games, start);
                            }
                            let _ = tx.send(game);
                        }
                    });
            });
        });

        // Completed games are delivered on this thread.
        for game in rx {
            on_game(game);
        }
    });
}

fn log_game(game: &GameRecord, n: usize, total: usize, start: Instant) {
    let outcome = match (game.finished, game.winner) {
        (false, _) => "unfinished".to_string(),
        (true, Some(w)) => format!("{} wins", w),
        (true, None) => "draw".to_string(),
    };
    tracing::info!(
        game = game.game_id,
        seed = game.seed,
        turn = game.final_turn,
        elapsed_s = start.elapsed().as_secs_f64(),
        "game {}/{}: {}",
        n,
        total,
        outcome
    );
}

/// Writes game records as JSONL (one JSON object per game, one per line).
pub fn write_jsonl<W: Write>(games: &[GameRecord], out: &mut W) -> std::io::Result<()> {
    for game in games {
        write_game_json(game, out)?;
    }
    out.flush()
}

/// Writes a single game record as one JSON line.
pub fn write_game_json<W: Write>(game: &GameRecord, out: &mut W) -> std::io::Result<()> {
    serde_json::to_writer(&mut *out, game)?;
    writeln!(out)
}

/// Aggregates a batch.
pub fn summarize(games: &[GameRecord]) -> SelfPlaySummary {
    let mut summary = SelfPlaySummary {
        games: games.len(),
        ..SelfPlaySummary::default()
    };
    let mut turns = 0u64;
    let mut battles = 0u64;
    for game in games {
        turns += u64::from(game.final_turn);
        battles += game.battles as u64;
        if !game.finished {
            summary.unfinished += 1;
            continue;
        }
        match game.winner {
            Some(Faction::Blue) => summary.blue_wins += 1,
            Some(Faction::Red) => summary.red_wins += 1,
            None => summary.draws += 1,
        }
        match game.condition {
            Some(VictoryCondition::Control) => summary.control += 1,
            Some(VictoryCondition::Decapitation) => summary.decapitation += 1,
            Some(VictoryCondition::Influence) => summary.influence += 1,
            None => {}
        }
    }
    let n = games.len().max(1) as f64;
    summary.avg_turns = turns as f64 / n;
    summary.avg_battles = battles as f64 / n;
    summary
}

/// Logs a summary of self-play results.
pub fn print_summary(games: &[GameRecord]) {
    let s = summarize(games);
    tracing::info!(
        games = s.games,
        blue_wins = s.blue_wins,
        red_wins = s.red_wins,
        draws = s.draws,
        unfinished = s.unfinished,
        "self-play summary"
    );
    tracing::info!(
        control = s.control,
        decapitation = s.decapitation,
        influence = s.influence,
        avg_turns = s.avg_turns,
        avg_battles = s.avg_battles,
        "victory conditions"
    );
}
