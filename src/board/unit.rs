//! Unit types and ownership.
//!
//! Represents the deployable unit catalogue, each unit's owner, and its
//! current node on the map.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::node::{Faction, NodeId};

/// The type of a military unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitType {
    #[serde(alias = "INFANTRY", alias = "Infantry")]
    Infantry,
    #[serde(alias = "ARMOR", alias = "Armor")]
    Armor,
    #[serde(alias = "ARTILLERY", alias = "Artillery")]
    Artillery,
}

/// Every deployable unit type.
pub const ALL_UNIT_TYPES: [UnitType; 3] = [UnitType::Infantry, UnitType::Armor, UnitType::Artillery];

impl UnitType {
    /// Resource cost to deploy one unit of this type.
    pub const fn cost(self) -> u32 {
        match self {
            UnitType::Infantry => 3,
            UnitType::Armor => 6,
            UnitType::Artillery => 4,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            UnitType::Infantry => "infantry",
            UnitType::Armor => "armor",
            UnitType::Artillery => "artillery",
        }
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier of a unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(pub String);

impl UnitId {
    pub fn new(id: impl Into<String>) -> Self {
        UnitId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UnitId {
    fn from(s: &str) -> Self {
        UnitId(s.to_string())
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unit on the map. Neutral garrisons have no owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub unit_type: UnitType,
    pub owner: Option<Faction>,
    pub node: NodeId,
    /// Set once the unit has deployed, moved, or attacked this cycle.
    pub acted: bool,
    /// Display order within the unit's node, starting at zero.
    pub slot: u32,
}
