//! Engine state management.
//!
//! Owns the current snapshot, the configuration and map it was built from,
//! the shared random generator, and the event source. Every mutation goes
//! through here, one call at a time; callers only ever see the snapshot by
//! reference or as a clone.
//!
//! The engine owns its snapshot exclusively, so it mutates it in place with
//! the same routines behind `advance_state` and `apply_orders` instead of
//! cloning on every phase. Both paths produce identical states.

use crate::board::{Faction, GameResult, GameState, MapTemplate, Order, Phase, SetupError};
use crate::config::GameConfig;
use crate::decision::DecisionSource;
use crate::journal::EntryKind;
use crate::protocol::PhaseSummary;
use crate::resolve::events::{EventDeck, EventSource};
use crate::resolve::orders::{apply_batch, OrderOutcome};
use crate::resolve::phase::{advance_in_place, open_game};
use crate::rng::GameRng;

/// Holds the mutable state of a game session between calls.
pub struct Engine {
    config: GameConfig,
    map: MapTemplate,
    state: GameState,
    rng: GameRng,
    events: Box<dyn EventSource + Send>,
}

impl Engine {
    /// Builds a game with the standard event deck and enters the opening
    /// FLUCTUATION phase.
    pub fn new(config: GameConfig, map: MapTemplate) -> Result<Self, SetupError> {
        Engine::with_events(config, map, Box::new(EventDeck::standard()))
    }

    /// Builds a game with a custom event source.
    pub fn with_events(
        config: GameConfig,
        map: MapTemplate,
        mut events: Box<dyn EventSource + Send>,
    ) -> Result<Self, SetupError> {
        let (state, rng) = opening(&config, &map, events.as_mut())?;
        Ok(Engine {
            config,
            map,
            state,
            rng,
            events,
        })
    }

    /// Starts over from the stored configuration and map.
    ///
    /// Either the whole session is replaced or nothing changes.
    pub fn reset(&mut self) -> Result<(), SetupError> {
        let (state, rng) = opening(&self.config, &self.map, self.events.as_mut())?;
        self.state = state;
        self.rng = rng;
        tracing::info!(seed = self.config.seed, "game reset");
        Ok(())
    }

    /// Starts over with a different seed.
    pub fn reset_with_seed(&mut self, seed: u64) -> Result<(), SetupError> {
        let mut config = self.config.clone();
        config.seed = seed;
        let (state, rng) = opening(&config, &self.map, self.events.as_mut())?;
        self.config = config;
        self.state = state;
        self.rng = rng;
        tracing::info!(seed, "game reset");
        Ok(())
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn map(&self) -> &MapTemplate {
        &self.map
    }

    /// Values drawn from the shared generator since the last reset.
    pub fn draws(&self) -> u64 {
        self.rng.draws()
    }

    pub fn result(&self) -> Option<&GameResult> {
        self.state.result.as_ref()
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// What the active faction currently sees.
    pub fn summary(&self) -> PhaseSummary {
        PhaseSummary::of(&self.state)
    }

    /// Enters the next phase. Does nothing once the game is over.
    pub fn advance(&mut self) -> Phase {
        advance_in_place(&mut self.state, self.events.as_mut(), &mut self.rng);
        self.state.phase
    }

    /// Applies a batch for the active faction in the current phase.
    ///
    /// Orders are validated and applied one by one against the state left by
    /// the previous order; rejected orders change nothing. Only the first
    /// batch of an order phase is taken, later ones are rejected whole.
    pub fn submit_orders(&mut self, orders: &[Order]) -> Vec<OrderOutcome> {
        let faction = self.state.current_player;
        apply_batch(&mut self.state, faction, orders, &mut self.rng)
    }

    /// Records a batch that could not be read and takes it as a pass.
    pub fn submit_unreadable(&mut self, error: &str) -> Vec<OrderOutcome> {
        self.note_failed_decision(error);
        self.submit_orders(&[Order::Pass])
    }

    fn note_failed_decision(&mut self, error: &str) {
        let faction = self.state.current_player;
        tracing::warn!(%faction, phase = self.state.phase.name(), error, "decision failed, passing");
        self.state.note(
            Some(faction),
            EntryKind::Decision,
            format!("{} could not decide ({}) and passes", faction, error),
        );
    }

    /// Runs one full phase: asks `source` for orders if the phase takes
    /// them, applies them, then advances.
    ///
    /// A failing source counts as an explicit pass and is noted in the
    /// journal. Returns the outcomes of the applied batch.
    pub fn step(&mut self, source: &mut dyn DecisionSource) -> Vec<OrderOutcome> {
        if self.state.is_over() {
            return Vec::new();
        }
        let mut outcomes = Vec::new();
        if self.state.phase.takes_orders() {
            let summary = self.summary();
            outcomes = match source.decide(&summary) {
                Ok(orders) => self.submit_orders(&orders),
                Err(e) => self.submit_unreadable(&e.to_string()),
            };
        }
        self.advance();
        outcomes
    }

    /// Steps until the game ends or `max_steps` phases have run, routing each
    /// request to the active faction's source.
    pub fn play(
        &mut self,
        blue: &mut dyn DecisionSource,
        red: &mut dyn DecisionSource,
        max_steps: usize,
    ) -> Option<&GameResult> {
        for _ in 0..max_steps {
            if self.state.is_over() {
                break;
            }
            match self.state.current_player {
                Faction::Blue => self.step(blue),
                Faction::Red => self.step(red),
            };
        }
        self.state.result.as_ref()
    }
}

/// Builds the opening snapshot and a freshly seeded generator.
fn opening(
    config: &GameConfig,
    map: &MapTemplate,
    events: &mut dyn EventSource,
) -> Result<(GameState, GameRng), SetupError> {
    let built = map.build(config)?;
    let mut rng = GameRng::seed_from_u64(config.seed);
    let state = open_game(&built, events, &mut rng);
    tracing::debug!(seed = config.seed, nodes = state.nodes.len(), units = state.units.len(), "game opened");
    Ok((state, rng))
}
