//! Resource collection.
//!
//! On entry to the RESOURCE phase the active faction banks the income of
//! every node it currently owns. Collection is tied to the phase entry
//! itself, so it happens exactly once per entry.

use crate::board::{Faction, GameState};
use crate::journal::EntryKind;

/// Sum of `resources_per_turn` over the nodes `faction` owns right now.
pub fn income(state: &GameState, faction: Faction) -> u32 {
    state
        .nodes_owned_by(Some(faction))
        .map(|n| n.resources_per_turn)
        .fold(0u32, u32::saturating_add)
}

/// Returns a copy of `state` with `faction`'s income credited.
pub fn collect_resources(state: &GameState, faction: Faction) -> GameState {
    let mut next = state.clone();
    credit_income(&mut next, faction);
    next
}

/// Credits income in place and returns the amount credited.
pub(crate) fn credit_income(state: &mut GameState, faction: Faction) -> u32 {
    let amount = income(state, faction);
    let total = match state.players.get_mut(&faction) {
        Some(player) => {
            player.resources = player.resources.saturating_add(amount);
            player.resources
        }
        None => return 0,
    };
    tracing::debug!(%faction, amount, total, "resources collected");
    state.note(
        Some(faction),
        EntryKind::Economy,
        format!("{} collects {} QR (bank {})", faction, amount, total),
    );
    amount
}
