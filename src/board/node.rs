//! Factions and map nodes.
//!
//! A node is one vertex of the contested graph. Topology (kind, income,
//! fabrication hub, adjacency) is fixed at setup; only the owner and the
//! transient effect tags change during play.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two contesting factions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    Blue,
    Red,
}

/// Both factions in seating order.
pub const ALL_FACTIONS: [Faction; 2] = [Faction::Blue, Faction::Red];

impl Faction {
    /// Returns the other faction.
    pub const fn opponent(self) -> Faction {
        match self {
            Faction::Blue => Faction::Red,
            Faction::Red => Faction::Blue,
        }
    }

    /// Short prefix used when minting unit ids.
    pub const fn code(self) -> &'static str {
        match self {
            Faction::Blue => "b",
            Faction::Red => "r",
        }
    }

    /// Human-readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Faction::Blue => "Blue",
            Faction::Red => "Red",
        }
    }

    /// Parses a faction from its lowercase name or single-letter code.
    pub fn parse(s: &str) -> Option<Faction> {
        match s.to_ascii_lowercase().as_str() {
            "blue" | "b" => Some(Faction::Blue),
            "red" | "r" => Some(Faction::Red),
            _ => None,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Formats an optional owner, rendering `None` as `Neutral`.
pub fn owner_name(owner: Option<Faction>) -> &'static str {
    owner.map_or("Neutral", Faction::name)
}

/// Identifier of a node on the map.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The strategic role of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A faction's home node. Capturing it ends the game.
    Command,
    /// A control-victory objective.
    KeyJunction,
    Regular,
}

/// A transient modifier attached to a node by a fluctuation event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum NodeEffect {
    /// The node paid out a one-off resource bonus this round.
    ResourceSurge { amount: u32 },
    /// Defenders at this node lose `penalty` from each die.
    DefenseDebuff { penalty: u8 },
}

/// A vertex of the contested graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub owner: Option<Faction>,
    pub resources_per_turn: u32,
    pub has_hub: bool,
    pub adjacent: BTreeSet<NodeId>,
    /// Set for key junctions; counted by the control-victory check.
    pub objective: bool,
    pub effects: Vec<NodeEffect>,
}

impl Node {
    /// Returns true if this node counts toward control victory.
    pub fn is_key_junction(&self) -> bool {
        self.kind == NodeKind::KeyJunction || self.objective
    }

    /// Total defender die penalty from debuff tags on this node.
    pub fn defense_penalty(&self) -> u8 {
        self.effects
            .iter()
            .map(|e| match e {
                NodeEffect::DefenseDebuff { penalty } => *penalty,
                NodeEffect::ResourceSurge { .. } => 0,
            })
            .fold(0u8, u8::saturating_add)
    }
}
