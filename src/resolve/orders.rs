//! Order validation and execution.
//!
//! Validates and applies a batch of deploy, attack, and maneuver orders for
//! the active faction. Each order stands alone: a rejected order leaves the
//! world untouched and the rest of the batch still runs. Attacks are handed
//! to the combat resolver and merged before the next order is examined.
//! A faction gets one batch per order phase; later batches are refused.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::board::{BattleOutcome, Faction, GameState, NodeId, Order, UnitId, UnitType};
use crate::journal::EntryKind;
use crate::rng::GameRng;

use super::combat;

/// Why an order was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("game is over")]
    GameOver,

    #[error("order not allowed in this phase")]
    WrongPhase,

    #[error("a batch was already submitted in this phase")]
    BatchAlreadySubmitted,

    #[error("order is malformed: {detail}")]
    Malformed { detail: String },

    #[error("unknown node '{node}'")]
    UnknownNode { node: NodeId },

    #[error("unknown unit '{unit}'")]
    UnknownUnit { unit: UnitId },

    #[error("node '{node}' is not held by the ordering faction")]
    NodeNotOwned { node: NodeId },

    #[error("unit '{unit}' does not belong to the ordering faction")]
    UnitNotOwned { unit: UnitId },

    #[error("node '{node}' has no fabrication hub")]
    NoHub { node: NodeId },

    #[error("deployment costs {cost} QR but only {available} available")]
    InsufficientFunds { cost: u32, available: u32 },

    #[error("unit '{unit}' has already acted this turn")]
    AlreadyActed { unit: UnitId },

    #[error("'{from}' and '{to}' are not adjacent")]
    NotAdjacent { from: NodeId, to: NodeId },

    #[error("unit '{unit}' is not at '{node}'")]
    NotAtNode { unit: UnitId, node: NodeId },

    #[error("attack commits no units")]
    EmptyAttack,
}

/// What happened to one order of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OrderOutcome {
    Applied,
    Fought { outcome: BattleOutcome, captured: bool },
    Passed,
    Rejected { rejection: Rejection },
}

impl OrderOutcome {
    pub fn is_rejected(&self) -> bool {
        matches!(self, OrderOutcome::Rejected { .. })
    }
}

/// Checks a deploy order and returns its total cost.
pub fn validate_deploy(
    state: &GameState,
    faction: Faction,
    unit_type: UnitType,
    node: &NodeId,
    quantity: u32,
) -> Result<u32, Rejection> {
    if quantity == 0 {
        return Err(Rejection::Malformed {
            detail: "quantity must be at least 1".to_string(),
        });
    }
    let target = state
        .node(node)
        .ok_or_else(|| Rejection::UnknownNode { node: node.clone() })?;
    if target.owner != Some(faction) {
        return Err(Rejection::NodeNotOwned { node: node.clone() });
    }
    if !target.has_hub {
        return Err(Rejection::NoHub { node: node.clone() });
    }
    let available = state.resources(faction);
    let cost = unit_type.cost().checked_mul(quantity).unwrap_or(u32::MAX);
    if cost > available {
        return Err(Rejection::InsufficientFunds { cost, available });
    }
    Ok(cost)
}

/// Checks a maneuver order.
pub fn validate_maneuver(
    state: &GameState,
    faction: Faction,
    unit_id: &UnitId,
    to: &NodeId,
) -> Result<(), Rejection> {
    let unit = state
        .unit(unit_id)
        .ok_or_else(|| Rejection::UnknownUnit { unit: unit_id.clone() })?;
    let dest = state
        .node(to)
        .ok_or_else(|| Rejection::UnknownNode { node: to.clone() })?;
    if unit.owner != Some(faction) {
        return Err(Rejection::UnitNotOwned { unit: unit_id.clone() });
    }
    if unit.acted {
        return Err(Rejection::AlreadyActed { unit: unit_id.clone() });
    }
    if !state.is_adjacent(&unit.node, to) {
        return Err(Rejection::NotAdjacent {
            from: unit.node.clone(),
            to: to.clone(),
        });
    }
    if dest.owner != Some(faction) {
        return Err(Rejection::NodeNotOwned { node: to.clone() });
    }
    Ok(())
}

/// Checks an attack order.
pub fn validate_attack(
    state: &GameState,
    faction: Faction,
    from: &NodeId,
    to: &NodeId,
    unit_ids: &[UnitId],
) -> Result<(), Rejection> {
    for node in [from, to] {
        if state.node(node).is_none() {
            return Err(Rejection::UnknownNode { node: node.clone() });
        }
    }
    if unit_ids.is_empty() {
        return Err(Rejection::EmptyAttack);
    }
    let mut seen = BTreeSet::new();
    for id in unit_ids {
        if !seen.insert(id) {
            return Err(Rejection::Malformed {
                detail: format!("unit '{}' listed twice", id),
            });
        }
    }
    if !state.is_adjacent(from, to) {
        return Err(Rejection::NotAdjacent {
            from: from.clone(),
            to: to.clone(),
        });
    }
    for id in unit_ids {
        let unit = state
            .unit(id)
            .ok_or_else(|| Rejection::UnknownUnit { unit: id.clone() })?;
        if unit.owner != Some(faction) {
            return Err(Rejection::UnitNotOwned { unit: id.clone() });
        }
        if &unit.node != from {
            return Err(Rejection::NotAtNode {
                unit: id.clone(),
                node: from.clone(),
            });
        }
        if unit.acted {
            return Err(Rejection::AlreadyActed { unit: id.clone() });
        }
    }
    Ok(())
}

/// Applies a batch for `faction` to a copy of `state`.
pub fn apply_orders(
    state: &GameState,
    faction: Faction,
    orders: &[Order],
    rng: &mut GameRng,
) -> (GameState, Vec<OrderOutcome>) {
    let mut next = state.clone();
    let outcomes = apply_batch(&mut next, faction, orders, rng);
    (next, outcomes)
}

/// Applies a batch in place and marks the phase's batch as taken.
pub(crate) fn apply_batch(
    state: &mut GameState,
    faction: Faction,
    orders: &[Order],
    rng: &mut GameRng,
) -> Vec<OrderOutcome> {
    if state.batch_taken && state.result.is_none() {
        tracing::debug!(%faction, phase = state.phase.name(), "batch refused, one already taken");
        return orders
            .iter()
            .map(|_| reject(Rejection::BatchAlreadySubmitted))
            .collect();
    }
    let outcomes = orders
        .iter()
        .map(|order| apply_order(state, faction, order, rng))
        .collect();
    if state.phase.takes_orders() {
        state.batch_taken = true;
    }
    outcomes
}

/// Validates and applies one order in place.
pub(crate) fn apply_order(
    state: &mut GameState,
    faction: Faction,
    order: &Order,
    rng: &mut GameRng,
) -> OrderOutcome {
    let outcome = execute(state, faction, order, rng);
    if let OrderOutcome::Rejected { rejection } = &outcome {
        tracing::debug!(%faction, ?order, %rejection, "order rejected");
    }
    outcome
}

fn execute(state: &mut GameState, faction: Faction, order: &Order, rng: &mut GameRng) -> OrderOutcome {
    if state.result.is_some() {
        return reject(Rejection::GameOver);
    }
    if !order.allowed_in(state.phase) {
        return reject(Rejection::WrongPhase);
    }
    match order {
        Order::Pass => OrderOutcome::Passed,
        Order::Deploy {
            unit_type,
            node_id,
            quantity,
        } => match validate_deploy(state, faction, *unit_type, node_id, *quantity) {
            Ok(cost) => {
                deploy(state, faction, *unit_type, node_id, *quantity, cost);
                OrderOutcome::Applied
            }
            Err(rejection) => reject(rejection),
        },
        Order::Maneuver { unit_id, to_node_id } => {
            match validate_maneuver(state, faction, unit_id, to_node_id) {
                Ok(()) => {
                    maneuver(state, faction, unit_id, to_node_id);
                    OrderOutcome::Applied
                }
                Err(rejection) => reject(rejection),
            }
        }
        Order::Attack {
            from_node_id,
            to_node_id,
            unit_ids,
        } => match validate_attack(state, faction, from_node_id, to_node_id, unit_ids) {
            Ok(()) => {
                let report =
                    combat::resolve_battle(state, faction, from_node_id, to_node_id, unit_ids, rng);
                let outcome = OrderOutcome::Fought {
                    outcome: report.outcome,
                    captured: report.node_captured,
                };
                combat::merge_battle(state, report);
                outcome
            }
            Err(rejection) => reject(rejection),
        },
    }
}

fn reject(rejection: Rejection) -> OrderOutcome {
    OrderOutcome::Rejected { rejection }
}

fn deploy(
    state: &mut GameState,
    faction: Faction,
    unit_type: UnitType,
    node: &NodeId,
    quantity: u32,
    cost: u32,
) {
    if let Some(player) = state.players.get_mut(&faction) {
        player.resources -= cost;
    }
    for _ in 0..quantity {
        state.spawn_unit(Some(faction), unit_type, node, true);
    }
    let name = state.node(node).map_or_else(|| node.to_string(), |n| n.name.clone());
    tracing::debug!(%faction, %unit_type, quantity, %node, cost, "deployed");
    state.note(
        Some(faction),
        EntryKind::Deploy,
        format!("{} deploys {} x {} at {} for {} QR", faction, quantity, unit_type, name, cost),
    );
}

fn maneuver(state: &mut GameState, faction: Faction, unit_id: &UnitId, to: &NodeId) {
    let slot = state.units_at(to).len() as u32;
    let Some(unit) = state.units.get_mut(unit_id) else {
        return;
    };
    let from = std::mem::replace(&mut unit.node, to.clone());
    unit.acted = true;
    unit.slot = slot;
    state.renumber(&from);
    state.renumber(to);
    tracing::debug!(%faction, unit = %unit_id, %from, %to, "maneuvered");
    state.note(
        Some(faction),
        EntryKind::Maneuver,
        format!("{} moves {} from {} to {}", faction, unit_id, from, to),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{MapTemplate, Phase};
    use crate::config::GameConfig;

    fn in_phase(phase: Phase) -> GameState {
        let mut state = MapTemplate::standard().build(&GameConfig::default()).unwrap();
        state.phase = phase;
        state
    }

    fn first_unit_at(state: &GameState, node: &str) -> UnitId {
        state.units_at(&NodeId::new(node))[0].id.clone()
    }

    fn deploy_order(unit_type: UnitType, node: &str, quantity: u32) -> Order {
        Order::Deploy {
            unit_type,
            node_id: NodeId::new(node),
            quantity,
        }
    }

    #[test]
    fn deploy_debits_and_locks_new_units() {
        let state = in_phase(Phase::Deployment);
        let mut rng = GameRng::seed_from_u64(0);
        let (next, outcomes) = apply_orders(
            &state,
            Faction::Blue,
            &[deploy_order(UnitType::Infantry, "blue_hq", 2)],
            &mut rng,
        );
        assert_eq!(outcomes, vec![OrderOutcome::Applied]);
        assert_eq!(next.resources(Faction::Blue), 4);
        let at_hq = next.units_at(&NodeId::new("blue_hq"));
        assert_eq!(at_hq.len(), 5);
        let slots: Vec<u32> = at_hq.iter().map(|u| u.slot).collect();
        assert_eq!(slots, vec![0, 1, 2, 3, 4]);
        assert!(at_hq[3].acted && at_hq[4].acted);
        assert!(!at_hq[0].acted);
    }

    #[test]
    fn deploy_rejections() {
        let state = in_phase(Phase::Deployment);
        assert_eq!(
            validate_deploy(&state, Faction::Blue, UnitType::Armor, &NodeId::new("blue_outpost"), 1),
            Err(Rejection::NoHub {
                node: NodeId::new("blue_outpost")
            })
        );
        assert_eq!(
            validate_deploy(&state, Faction::Blue, UnitType::Armor, &NodeId::new("red_hq"), 1),
            Err(Rejection::NodeNotOwned {
                node: NodeId::new("red_hq")
            })
        );
        assert_eq!(
            validate_deploy(&state, Faction::Blue, UnitType::Armor, &NodeId::new("blue_hq"), 2),
            Err(Rejection::InsufficientFunds {
                cost: 12,
                available: 10
            })
        );
        assert!(matches!(
            validate_deploy(&state, Faction::Blue, UnitType::Armor, &NodeId::new("blue_hq"), 0),
            Err(Rejection::Malformed { .. })
        ));
        assert!(matches!(
            validate_deploy(&state, Faction::Blue, UnitType::Armor, &NodeId::new("moon"), 1),
            Err(Rejection::UnknownNode { .. })
        ));
    }

    #[test]
    fn invalid_order_does_not_block_the_batch() {
        let state = in_phase(Phase::Deployment);
        let mut rng = GameRng::seed_from_u64(0);
        let (next, outcomes) = apply_orders(
            &state,
            Faction::Blue,
            &[
                deploy_order(UnitType::Armor, "blue_outpost", 1),
                Order::Pass,
                deploy_order(UnitType::Artillery, "blue_forge", 1),
            ],
            &mut rng,
        );
        assert!(outcomes[0].is_rejected());
        assert_eq!(outcomes[1], OrderOutcome::Passed);
        assert_eq!(outcomes[2], OrderOutcome::Applied);
        assert_eq!(next.resources(Faction::Blue), 6);
    }

    #[test]
    fn wrong_phase_orders_are_dropped() {
        let state = in_phase(Phase::Attack);
        let mut rng = GameRng::seed_from_u64(0);
        let (next, outcomes) = apply_orders(
            &state,
            Faction::Blue,
            &[deploy_order(UnitType::Infantry, "blue_hq", 1)],
            &mut rng,
        );
        assert_eq!(
            outcomes,
            vec![OrderOutcome::Rejected {
                rejection: Rejection::WrongPhase
            }]
        );
        assert_eq!(next, state);
    }

    #[test]
    fn maneuver_moves_and_renumbers() {
        let state = in_phase(Phase::Maneuver);
        let unit = first_unit_at(&state, "blue_hq");
        let mut rng = GameRng::seed_from_u64(0);
        let (next, outcomes) = apply_orders(
            &state,
            Faction::Blue,
            &[Order::Maneuver {
                unit_id: unit.clone(),
                to_node_id: NodeId::new("blue_forge"),
            }],
            &mut rng,
        );
        assert_eq!(outcomes, vec![OrderOutcome::Applied]);
        let moved = next.unit(&unit).unwrap();
        assert_eq!(moved.node, NodeId::new("blue_forge"));
        assert_eq!(moved.slot, 1);
        assert!(moved.acted);
        let hq_slots: Vec<u32> = next
            .units_at(&NodeId::new("blue_hq"))
            .iter()
            .map(|u| u.slot)
            .collect();
        assert_eq!(hq_slots, vec![0, 1]);
    }

    #[test]
    fn maneuver_rejections() {
        let mut state = in_phase(Phase::Maneuver);
        let unit = first_unit_at(&state, "blue_forge");
        assert!(matches!(
            validate_maneuver(&state, Faction::Blue, &unit, &NodeId::new("north_junction")),
            Err(Rejection::NodeNotOwned { .. })
        ));
        assert!(matches!(
            validate_maneuver(&state, Faction::Blue, &unit, &NodeId::new("blue_outpost")),
            Err(Rejection::NotAdjacent { .. })
        ));
        assert!(matches!(
            validate_maneuver(&state, Faction::Red, &unit, &NodeId::new("blue_hq")),
            Err(Rejection::UnitNotOwned { .. })
        ));
        if let Some(u) = state.units.get_mut(&unit) {
            u.acted = true;
        }
        assert!(matches!(
            validate_maneuver(&state, Faction::Blue, &unit, &NodeId::new("blue_hq")),
            Err(Rejection::AlreadyActed { .. })
        ));
        assert!(matches!(
            validate_maneuver(&state, Faction::Blue, &UnitId::new("ghost"), &NodeId::new("blue_hq")),
            Err(Rejection::UnknownUnit { .. })
        ));
    }

    #[test]
    fn unit_moves_only_once_per_cycle() {
        let state = in_phase(Phase::Maneuver);
        let unit = first_unit_at(&state, "blue_hq");
        let mut rng = GameRng::seed_from_u64(0);
        let (next, outcomes) = apply_orders(
            &state,
            Faction::Blue,
            &[
                Order::Maneuver {
                    unit_id: unit.clone(),
                    to_node_id: NodeId::new("blue_forge"),
                },
                Order::Maneuver {
                    unit_id: unit.clone(),
                    to_node_id: NodeId::new("blue_hq"),
                },
            ],
            &mut rng,
        );
        assert_eq!(outcomes[0], OrderOutcome::Applied);
        assert!(outcomes[1].is_rejected());
        assert_eq!(next.unit(&unit).unwrap().node, NodeId::new("blue_forge"));
    }

    #[test]
    fn attack_on_empty_node_captures() {
        let state = in_phase(Phase::Attack);
        let unit = first_unit_at(&state, "blue_forge");
        let mut rng = GameRng::seed_from_u64(0);
        let (next, outcomes) = apply_orders(
            &state,
            Faction::Blue,
            &[Order::Attack {
                from_node_id: NodeId::new("blue_forge"),
                to_node_id: NodeId::new("relay_w"),
                unit_ids: vec![unit.clone()],
            }],
            &mut rng,
        );
        assert_eq!(
            outcomes,
            vec![OrderOutcome::Fought {
                outcome: BattleOutcome::AttackerWins,
                captured: true
            }]
        );
        assert_eq!(next.node(&NodeId::new("relay_w")).unwrap().owner, Some(Faction::Blue));
        assert_eq!(next.unit(&unit).unwrap().node, NodeId::new("relay_w"));
    }

    #[test]
    fn attack_rejections() {
        let state = in_phase(Phase::Attack);
        let forge_unit = first_unit_at(&state, "blue_forge");
        let hq_unit = first_unit_at(&state, "blue_hq");
        let red_unit = first_unit_at(&state, "red_forge");
        let forge = NodeId::new("blue_forge");
        let core = NodeId::new("core");
        let relay = NodeId::new("relay_w");

        assert_eq!(
            validate_attack(&state, Faction::Blue, &forge, &relay, &[]),
            Err(Rejection::EmptyAttack)
        );
        assert!(matches!(
            validate_attack(&state, Faction::Blue, &forge, &core, &[forge_unit.clone()]),
            Err(Rejection::NotAdjacent { .. })
        ));
        assert!(matches!(
            validate_attack(&state, Faction::Blue, &forge, &relay, &[hq_unit]),
            Err(Rejection::NotAtNode { .. })
        ));
        assert!(matches!(
            validate_attack(&state, Faction::Blue, &forge, &relay, &[red_unit]),
            Err(Rejection::UnitNotOwned { .. })
        ));
        assert!(matches!(
            validate_attack(
                &state,
                Faction::Blue,
                &forge,
                &relay,
                &[forge_unit.clone(), forge_unit]
            ),
            Err(Rejection::Malformed { .. })
        ));
    }

    #[test]
    fn second_batch_in_a_phase_is_refused() {
        let state = in_phase(Phase::Deployment);
        let mut rng = GameRng::seed_from_u64(0);
        let (next, outcomes) = apply_orders(
            &state,
            Faction::Blue,
            &[deploy_order(UnitType::Infantry, "blue_hq", 1)],
            &mut rng,
        );
        assert_eq!(outcomes, vec![OrderOutcome::Applied]);
        assert!(next.batch_taken);

        let (after, outcomes) = apply_orders(
            &next,
            Faction::Blue,
            &[deploy_order(UnitType::Infantry, "blue_hq", 1), Order::Pass],
            &mut rng,
        );
        assert_eq!(
            outcomes,
            vec![
                OrderOutcome::Rejected {
                    rejection: Rejection::BatchAlreadySubmitted
                };
                2
            ]
        );
        assert_eq!(after, next);
    }

    #[test]
    fn batch_outside_order_phases_takes_nothing() {
        let state = in_phase(Phase::Resource);
        let mut rng = GameRng::seed_from_u64(0);
        let (next, outcomes) = apply_orders(&state, Faction::Blue, &[Order::Pass], &mut rng);
        assert!(outcomes[0].is_rejected());
        assert!(!next.batch_taken);
    }

    #[test]
    fn nothing_applies_after_game_over() {
        let mut state = in_phase(Phase::Deployment);
        state.result = Some(crate::board::GameResult {
            verdict: crate::board::Verdict::Draw,
            condition: crate::board::VictoryCondition::Influence,
            message: "done".to_string(),
        });
        let mut rng = GameRng::seed_from_u64(0);
        let (next, outcomes) = apply_orders(
            &state,
            Faction::Blue,
            &[deploy_order(UnitType::Infantry, "blue_hq", 1)],
            &mut rng,
        );
        assert_eq!(
            outcomes,
            vec![OrderOutcome::Rejected {
                rejection: Rejection::GameOver
            }]
        );
        assert_eq!(next, state);
    }
}
