//! Fluctuation event descriptors.
//!
//! A template names an effect and abstract targeting criteria. Resolving it
//! against the board at FLUCTUATION entry produces an [`ActiveEvent`] with
//! concrete targets and a record of whether the effect actually applied.

use serde::{Deserialize, Serialize};

use super::node::{Faction, NodeId};
use super::unit::UnitType;

/// The mechanical effect of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "effectType", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventEffect {
    /// Credit the target node's owner with a one-off bonus.
    ResourceNodeBonus { amount: u32 },
    /// Weaken defenders at the target and its neighbours.
    RegionalDefenseDebuff { penalty: u8 },
    /// Fabricate one unit at the active faction's first hub.
    #[serde(rename_all = "camelCase")]
    FreeUnitDeployment { unit_type: UnitType },
    /// Insert one more maneuver phase before the turn passes.
    ExtraManeuverPhase,
    /// Flavour only; has no mechanical effect.
    Narrative,
}

/// How an event picks its target node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetCriteria {
    ActivePlayerNode,
    OpponentNode,
    ActivePlayerHub,
    AnyNode,
    NoTarget,
}

/// A drawable event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTemplate {
    pub name: String,
    pub description: String,
    pub effect: EventEffect,
    pub target: TargetCriteria,
}

impl EventTemplate {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        effect: EventEffect,
        target: TargetCriteria,
    ) -> Self {
        EventTemplate {
            name: name.into(),
            description: description.into(),
            effect,
            target,
        }
    }
}

/// Whether a drawn event changed the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EventResolution {
    Applied,
    /// Surfaced to the presentation layer instead of being silently dropped.
    Unresolved { reason: String },
}

/// The event in force for the current phase cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveEvent {
    pub template: EventTemplate,
    pub faction: Faction,
    pub targets: Vec<NodeId>,
    pub resolution: EventResolution,
}

impl ActiveEvent {
    /// One-line description suitable for a decision-source summary.
    pub fn describe(&self) -> String {
        let mut text = format!("{}: {}", self.template.name, self.template.description);
        if !self.targets.is_empty() {
            let names: Vec<&str> = self.targets.iter().map(NodeId::as_str).collect();
            text.push_str(&format!(" [targets: {}]", names.join(", ")));
        }
        if let EventResolution::Unresolved { reason } = &self.resolution {
            text.push_str(&format!(" (unresolved: {})", reason));
        }
        text
    }
}
