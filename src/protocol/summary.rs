//! Phase-scoped summaries for decision sources.
//!
//! A summary is everything an external decision maker needs to pick orders
//! for one phase: ownership and stats of every node and unit, both banks,
//! the clock, the active event, and the unit catalogue.

use serde::Serialize;

use crate::board::{Faction, GameState, NodeEffect, NodeId, NodeKind, Phase, UnitId, UnitType, ALL_UNIT_TYPES};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeSummary {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub owner: Option<Faction>,
    pub resources_per_turn: u32,
    pub has_hub: bool,
    pub adjacent: Vec<NodeId>,
    pub effects: Vec<NodeEffect>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitSummary {
    pub id: UnitId,
    pub unit_type: UnitType,
    pub owner: Option<Faction>,
    pub node: NodeId,
    pub acted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogueEntry {
    pub unit_type: UnitType,
    pub cost: u32,
}

/// What the active faction sees when asked for orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseSummary {
    pub turn: u32,
    pub turn_limit: u32,
    pub phase: Phase,
    pub faction: Faction,
    pub resources: u32,
    pub opponent_resources: u32,
    pub active_event: Option<String>,
    pub key_junctions: Vec<NodeId>,
    pub nodes: Vec<NodeSummary>,
    pub units: Vec<UnitSummary>,
    pub catalogue: Vec<CatalogueEntry>,
}

impl PhaseSummary {
    /// Builds the summary for the active faction.
    pub fn of(state: &GameState) -> PhaseSummary {
        let faction = state.current_player;
        PhaseSummary {
            turn: state.turn,
            turn_limit: state.rules.turn_limit,
            phase: state.phase,
            faction,
            resources: state.resources(faction),
            opponent_resources: state.resources(faction.opponent()),
            active_event: state.active_event.as_ref().map(|e| e.describe()),
            key_junctions: state.key_junctions.clone(),
            nodes: state
                .nodes
                .values()
                .map(|n| NodeSummary {
                    id: n.id.clone(),
                    name: n.name.clone(),
                    kind: n.kind,
                    owner: n.owner,
                    resources_per_turn: n.resources_per_turn,
                    has_hub: n.has_hub,
                    adjacent: n.adjacent.iter().cloned().collect(),
                    effects: n.effects.clone(),
                })
                .collect(),
            units: state
                .units
                .values()
                .map(|u| UnitSummary {
                    id: u.id.clone(),
                    unit_type: u.unit_type,
                    owner: u.owner,
                    node: u.node.clone(),
                    acted: u.acted,
                })
                .collect(),
            catalogue: ALL_UNIT_TYPES
                .iter()
                .map(|&t| CatalogueEntry {
                    unit_type: t,
                    cost: t.cost(),
                })
                .collect(),
        }
    }

    /// Units of the summarised faction that can still act.
    pub fn ready_units(&self) -> impl Iterator<Item = &UnitSummary> {
        self.units
            .iter()
            .filter(move |u| u.owner == Some(self.faction) && !u.acted)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}
