//! Phase sequencing logic.
//!
//! Determines the next phase and advances the game state accordingly.
//!
//! Phase flow for the active faction:
//! - FLUCTUATION -> RESOURCE -> DEPLOYMENT -> ATTACK -> MANEUVER
//! - MANEUVER -> MANEUVER once more if an extra-maneuver event is pending
//! - MANEUVER -> FLUCTUATION of the other faction
//!
//! When the hand-off returns to the opening faction the turn counter grows
//! and the round boundary is evaluated; a verdict there ends the game
//! instead of entering FLUCTUATION. GAME_OVER is absorbing.

use crate::board::{Faction, GameState, Phase};
use crate::journal::EntryKind;
use crate::rng::GameRng;

use super::economy::credit_income;
use super::events::{expire_event, trigger_event, EventSource};
use super::victory::evaluate_round;

/// Computes the phase that follows `state.phase`, and whether entering it
/// flips the active faction.
pub fn next_phase(state: &GameState) -> (Phase, bool) {
    match state.phase {
        Phase::Fluctuation => (Phase::Resource, false),
        Phase::Resource => (Phase::Deployment, false),
        Phase::Deployment => (Phase::Attack, false),
        Phase::Attack => (Phase::Maneuver, false),
        Phase::Maneuver if state.extra_maneuver_pending => (Phase::Maneuver, false),
        Phase::Maneuver => (Phase::Fluctuation, true),
        Phase::GameOver => (Phase::GameOver, false),
    }
}

/// Returns a copy of `state` advanced by one phase, with the entry effects
/// of the new phase applied.
pub fn advance_state(
    state: &GameState,
    events: &mut dyn EventSource,
    rng: &mut GameRng,
) -> GameState {
    let mut next = state.clone();
    advance_in_place(&mut next, events, rng);
    next
}

/// Enters the opening FLUCTUATION of a freshly built game.
pub fn open_game(state: &GameState, events: &mut dyn EventSource, rng: &mut GameRng) -> GameState {
    let mut next = state.clone();
    next.phase = Phase::Fluctuation;
    enter_fluctuation(&mut next, events, rng);
    next
}

pub(crate) fn advance_in_place(
    state: &mut GameState,
    events: &mut dyn EventSource,
    rng: &mut GameRng,
) {
    if state.is_over() {
        return;
    }
    state.batch_taken = false;
    let (phase, flips) = next_phase(state);

    if state.phase == Phase::Maneuver && phase == Phase::Maneuver {
        state.extra_maneuver_pending = false;
        tracing::debug!(faction = %state.current_player, "extra maneuver phase");
        state.note(
            Some(state.current_player),
            EntryKind::Phase,
            format!("{} gains an extra maneuver phase", state.current_player),
        );
        return;
    }

    if flips {
        let incoming: Faction = state.current_player.opponent();
        state.current_player = incoming;
        if incoming == state.first_player {
            state.turn += 1;
            tracing::debug!(turn = state.turn, "round complete");
            if let Some(result) = evaluate_round(state) {
                state.finish(result);
                return;
            }
        }
    }

    state.phase = phase;
    tracing::debug!(
        turn = state.turn,
        faction = %state.current_player,
        phase = phase.name(),
        "phase entered"
    );
    match phase {
        Phase::Fluctuation => enter_fluctuation(state, events, rng),
        Phase::Resource => {
            let faction = state.current_player;
            credit_income(state, faction);
        }
        _ => {}
    }
}

/// FLUCTUATION entry: clear the last cycle's event, battle, and action
/// flags, then draw this cycle's event.
fn enter_fluctuation(state: &mut GameState, events: &mut dyn EventSource, rng: &mut GameRng) {
    expire_event(state);
    state.last_battle = None;
    for unit in state.units.values_mut() {
        unit.acted = false;
    }
    state.note(
        Some(state.current_player),
        EntryKind::Phase,
        format!("Turn {}: {} begins", state.turn, state.current_player),
    );
    if let Some(template) = events.draw(state, rng) {
        trigger_event(state, template, rng);
    }
}
