//! Legal order generation.
//!
//! Enumerates the orders the active faction may issue in the current phase,
//! working from the [`PhaseSummary`] a decision source receives, and draws a
//! random batch from them for the built-in commander.

use std::collections::BTreeSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::board::{NodeId, Order, Phase, UnitId, UnitType};
use crate::protocol::{NodeSummary, PhaseSummary};

/// Most deploy orders a random batch will contain.
const MAX_DEPLOYS: usize = 3;

/// Chance, in percent, that a random batch commits a legal attack.
const ATTACK_CHANCE: u32 = 60;

/// Chance, in percent, that a ready unit is maneuvered.
const MANEUVER_CHANCE: u32 = 35;

fn node<'a>(summary: &'a PhaseSummary, id: &NodeId) -> Option<&'a NodeSummary> {
    summary.nodes.iter().find(|n| &n.id == id)
}

fn owns(summary: &PhaseSummary, id: &NodeId) -> bool {
    node(summary, id).is_some_and(|n| n.owner == Some(summary.faction))
}

/// Single-unit deploy orders the faction can afford right now.
pub fn legal_deploys(summary: &PhaseSummary) -> Vec<Order> {
    let mut orders = Vec::new();
    for n in &summary.nodes {
        if n.owner != Some(summary.faction) || !n.has_hub {
            continue;
        }
        for entry in &summary.catalogue {
            if entry.cost <= summary.resources {
                orders.push(Order::Deploy {
                    unit_type: entry.unit_type,
                    node_id: n.id.clone(),
                    quantity: 1,
                });
            }
        }
    }
    orders
}

/// Ready units grouped by the node they stand on, in node id order.
fn ready_by_node(summary: &PhaseSummary) -> Vec<(NodeId, Vec<UnitId>)> {
    let mut groups: Vec<(NodeId, Vec<UnitId>)> = Vec::new();
    for n in &summary.nodes {
        let ready: Vec<UnitId> = summary
            .ready_units()
            .filter(|u| u.node == n.id)
            .map(|u| u.id.clone())
            .collect();
        if !ready.is_empty() {
            groups.push((n.id.clone(), ready));
        }
    }
    groups
}

/// Attacks committing every ready unit at a node against each adjacent node
/// the faction does not own.
pub fn legal_attacks(summary: &PhaseSummary) -> Vec<Order> {
    let mut orders = Vec::new();
    for (from, ready) in ready_by_node(summary) {
        let Some(origin) = node(summary, &from) else {
            continue;
        };
        for to in &origin.adjacent {
            if owns(summary, to) {
                continue;
            }
            orders.push(Order::Attack {
                from_node_id: from.clone(),
                to_node_id: to.clone(),
                unit_ids: ready.clone(),
            });
        }
    }
    orders
}

/// Every single-unit move to an adjacent friendly node.
pub fn legal_maneuvers(summary: &PhaseSummary) -> Vec<Order> {
    let mut orders = Vec::new();
    for unit in summary.ready_units() {
        let Some(origin) = node(summary, &unit.node) else {
            continue;
        };
        for to in &origin.adjacent {
            if owns(summary, to) {
                orders.push(Order::Maneuver {
                    unit_id: unit.id.clone(),
                    to_node_id: to.clone(),
                });
            }
        }
    }
    orders
}

/// Legal orders for the summarised phase. Non-order phases yield nothing.
pub fn legal_orders(summary: &PhaseSummary) -> Vec<Order> {
    match summary.phase {
        Phase::Deployment => legal_deploys(summary),
        Phase::Attack => legal_attacks(summary),
        Phase::Maneuver => legal_maneuvers(summary),
        _ => Vec::new(),
    }
}

/// Draws a random batch for the summarised phase.
///
/// The batch stays legal when applied in order: deploys never overspend the
/// bank, each unit appears in at most one order, and each target is attacked
/// at most once. An empty draw is returned as a single `Pass`.
pub fn random_orders(summary: &PhaseSummary, rng: &mut impl Rng) -> Vec<Order> {
    let orders = match summary.phase {
        Phase::Deployment => random_deploys(summary, rng),
        Phase::Attack => random_attacks(summary, rng),
        Phase::Maneuver => random_maneuvers(summary, rng),
        _ => return Vec::new(),
    };
    if orders.is_empty() {
        vec![Order::Pass]
    } else {
        orders
    }
}

fn random_deploys(summary: &PhaseSummary, rng: &mut impl Rng) -> Vec<Order> {
    let hubs: Vec<&NodeId> = summary
        .nodes
        .iter()
        .filter(|n| n.owner == Some(summary.faction) && n.has_hub)
        .map(|n| &n.id)
        .collect();
    if hubs.is_empty() {
        return Vec::new();
    }

    let mut budget = summary.resources;
    let mut orders = Vec::new();
    while orders.len() < MAX_DEPLOYS {
        let affordable: Vec<UnitType> = summary
            .catalogue
            .iter()
            .filter(|e| e.cost <= budget)
            .map(|e| e.unit_type)
            .collect();
        let (Some(&unit_type), Some(&hub)) = (affordable.choose(rng), hubs.choose(rng)) else {
            break;
        };
        budget -= unit_type.cost();
        orders.push(Order::Deploy {
            unit_type,
            node_id: hub.clone(),
            quantity: 1,
        });
        // Keep some of the bank for later turns.
        if rng.gen_range(0..2) == 0 {
            break;
        }
    }
    orders
}

fn random_attacks(summary: &PhaseSummary, rng: &mut impl Rng) -> Vec<Order> {
    let mut candidates = legal_attacks(summary);
    candidates.shuffle(rng);

    let mut used_from = BTreeSet::new();
    let mut used_to = BTreeSet::new();
    let mut orders = Vec::new();
    for order in candidates {
        let Order::Attack {
            from_node_id,
            to_node_id,
            ..
        } = &order
        else {
            continue;
        };
        if used_from.contains(from_node_id) || used_to.contains(to_node_id) {
            continue;
        }
        if rng.gen_range(1..=100) > ATTACK_CHANCE {
            continue;
        }
        used_from.insert(from_node_id.clone());
        used_to.insert(to_node_id.clone());
        orders.push(order);
    }
    orders
}

fn random_maneuvers(summary: &PhaseSummary, rng: &mut impl Rng) -> Vec<Order> {
    let mut orders = Vec::new();
    for unit in summary.ready_units() {
        if rng.gen_range(1..=100) > MANEUVER_CHANCE {
            continue;
        }
        let Some(origin) = node(summary, &unit.node) else {
            continue;
        };
        let friendly: Vec<&NodeId> = origin.adjacent.iter().filter(|to| owns(summary, to)).collect();
        if let Some(&to) = friendly.choose(rng) {
            orders.push(Order::Maneuver {
                unit_id: unit.id.clone(),
                to_node_id: to.clone(),
            });
        }
    }
    orders
}
