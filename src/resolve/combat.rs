//! Combat resolution.
//!
//! Resolves one attack into a [`BattleReport`] by repeated dice exchanges,
//! then merges the report back into the world: casualties removed, the
//! target captured when the attacker wins it, survivors relocated, and the
//! report filed in the bounded battle history.
//!
//! Casualties are taken from the front of the committed and defending
//! lists, in declared (display) order. Every random draw in a battle is a
//! die roll recorded in the report.

use std::cmp::Ordering;

use crate::board::{
    BattleOutcome, BattleReport, CombatRound, Faction, GameState, NodeId, RoundOutcome, UnitId,
};
use crate::journal::EntryKind;
use crate::rng::{DrawPurpose, GameRng};

use super::victory;

/// Units at `target` that would defend against `attacker`, in display order.
pub fn defenders_at(state: &GameState, target: &NodeId, attacker: Faction) -> Vec<UnitId> {
    state
        .units_at(target)
        .into_iter()
        .filter(|u| u.owner != Some(attacker))
        .map(|u| u.id.clone())
        .collect()
}

/// Resolves an attack without touching the world.
///
/// `committed` must be non-empty; validation is the caller's job.
pub fn resolve_battle(
    state: &GameState,
    attacker: Faction,
    from: &NodeId,
    target: &NodeId,
    committed: &[UnitId],
    rng: &mut GameRng,
) -> BattleReport {
    let defenders = defenders_at(state, target, attacker);
    let target_node = state.node(target);
    let defender = target_node.and_then(|n| n.owner);
    let penalty = target_node.map_or(0, |n| n.defense_penalty());
    let changes_hands = defender != Some(attacker);

    let mut report = BattleReport {
        turn: state.turn,
        attacker,
        defender,
        from: from.clone(),
        target: target.clone(),
        committed: committed.to_vec(),
        initial_defenders: defenders.clone(),
        rounds: Vec::new(),
        outcome: BattleOutcome::AttackerWins,
        attacker_losses: Vec::new(),
        defender_losses: Vec::new(),
        node_captured: false,
    };

    if defenders.is_empty() {
        report.node_captured = changes_hands;
        return report;
    }

    let mut attackers_left = committed.len() as u32;
    let mut defenders_left = defenders.len() as u32;
    let mut round = 0u32;
    while attackers_left > 0 && defenders_left > 0 {
        round += 1;
        let attacker_roll = rng.roll_d6(DrawPurpose::AttackerDie);
        let defender_roll = rng.roll_d6(DrawPurpose::DefenderDie);
        let effective = defender_roll.saturating_sub(penalty).max(1);
        let outcome = match attacker_roll.cmp(&effective) {
            Ordering::Greater => {
                defenders_left -= 1;
                RoundOutcome::AttackerHits
            }
            Ordering::Less => {
                attackers_left -= 1;
                RoundOutcome::DefenderHits
            }
            Ordering::Equal => RoundOutcome::Clash,
        };
        report.rounds.push(CombatRound {
            round,
            attacker_roll,
            defender_roll,
            defender_penalty: penalty,
            outcome,
            attackers_remaining: attackers_left,
            defenders_remaining: defenders_left,
        });
    }

    report.outcome = match (attackers_left, defenders_left) {
        (0, 0) => BattleOutcome::StalemateRetreat,
        (_, 0) => BattleOutcome::AttackerWins,
        _ => BattleOutcome::DefenderWins,
    };
    let attacker_lost = committed.len() - attackers_left as usize;
    let defender_lost = defenders.len() - defenders_left as usize;
    report.attacker_losses = committed[..attacker_lost].to_vec();
    report.defender_losses = defenders[..defender_lost].to_vec();
    report.node_captured = report.outcome == BattleOutcome::AttackerWins && changes_hands;
    report
}

/// Returns a copy of `state` with `report` applied.
pub fn apply_battle(state: &GameState, report: &BattleReport) -> GameState {
    let mut next = state.clone();
    merge_battle(&mut next, report.clone());
    next
}

/// Applies a resolved battle in place.
pub(crate) fn merge_battle(state: &mut GameState, report: BattleReport) {
    for id in report.attacker_losses.iter().chain(&report.defender_losses) {
        state.units.remove(id);
    }

    let survivors: Vec<UnitId> = report.attacker_survivors().cloned().collect();
    for id in &survivors {
        if let Some(unit) = state.units.get_mut(id) {
            unit.acted = true;
        }
    }

    if report.node_captured {
        let previous = state.node(&report.target).and_then(|n| n.owner);
        if let Some(node) = state.nodes.get_mut(&report.target) {
            node.owner = Some(report.attacker);
            node.effects.clear();
        }
        if let Some(loser) = previous {
            if let Some(player) = state.players.get_mut(&loser) {
                if let Some(streak) = player.control_streaks.get_mut(&report.target) {
                    *streak = 0;
                }
            }
        }
        let mut next_slot = state.units_at(&report.target).len() as u32;
        for id in &survivors {
            if let Some(unit) = state.units.get_mut(id) {
                unit.node = report.target.clone();
                unit.slot = next_slot;
                next_slot += 1;
            }
        }
    }
    state.renumber(&report.from);
    state.renumber(&report.target);

    tracing::info!(
        attacker = %report.attacker,
        target = %report.target,
        outcome = report.outcome.as_str(),
        rounds = report.rounds.len(),
        attacker_losses = report.attacker_losses.len(),
        defender_losses = report.defender_losses.len(),
        captured = report.node_captured,
        "battle resolved"
    );
    let line = narrate(state, &report);
    state.note(Some(report.attacker), EntryKind::Battle, line);

    let decapitation = victory::decapitation(state, &report);

    let capacity = state.rules.battle_history_capacity;
    if capacity > 0 {
        while state.battle_history.len() >= capacity {
            state.battle_history.pop_front();
        }
        state.battle_history.push_back(report.clone());
    }
    state.last_battle = Some(report);

    if let Some(result) = decapitation {
        state.finish(result);
    }
}

fn narrate(state: &GameState, report: &BattleReport) -> String {
    let target = state
        .node(&report.target)
        .map_or_else(|| report.target.to_string(), |n| n.name.clone());
    let mut text = format!(
        "{} attacks {} with {} against {}: {} after {} rounds (losses {}/{})",
        report.attacker,
        target,
        report.committed.len(),
        report.initial_defenders.len(),
        report.outcome.as_str(),
        report.rounds.len(),
        report.attacker_losses.len(),
        report.defender_losses.len(),
    );
    if report.node_captured {
        text.push_str(", node captured");
    }
    text
}
