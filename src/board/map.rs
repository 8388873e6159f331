//! Map templates and initial setup.
//!
//! A template lists the nodes, their starting owners, adjacency, and the
//! starting forces of both factions and of neutral garrisons. Building a
//! template validates referential integrity once and produces the opening
//! [`GameState`]; topology never changes afterwards.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::node::{Faction, Node, NodeId, NodeKind, ALL_FACTIONS};
use super::state::{GameState, Phase, Player, RuleSet};
use super::unit::UnitType;
use crate::config::GameConfig;
use crate::journal::Journal;

/// Errors detected while building a map template.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SetupError {
    #[error("duplicate node id '{0}'")]
    DuplicateNode(NodeId),

    #[error("node '{from}' lists unknown neighbour '{to}'")]
    UnknownNeighbour { from: NodeId, to: NodeId },

    #[error("node '{0}' lists itself as a neighbour")]
    SelfLoop(NodeId),

    #[error("starting units placed on unknown node '{0}'")]
    UnknownUnitNode(NodeId),

    #[error("{0} has no command node")]
    MissingCommandNode(Faction),

    #[error("{0} owns more than one command node")]
    DuplicateCommandNode(Faction),
}

/// One node of a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeTemplate {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub owner: Option<Faction>,
    #[serde(default)]
    pub resources_per_turn: u32,
    #[serde(default)]
    pub hub: bool,
    #[serde(default)]
    pub adjacent: Vec<NodeId>,
    #[serde(default)]
    pub objective: bool,
}

/// A stack of identical starting units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartingUnits {
    /// `None` places a neutral garrison.
    #[serde(default)]
    pub owner: Option<Faction>,
    pub unit_type: UnitType,
    pub node: NodeId,
    #[serde(default = "one")]
    pub count: u32,
}

fn one() -> u32 {
    1
}

/// A complete map definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapTemplate {
    pub name: String,
    pub nodes: Vec<NodeTemplate>,
    #[serde(default)]
    pub units: Vec<StartingUnits>,
    #[serde(default)]
    pub starting_resources: u32,
}

impl MapTemplate {
    /// Parses a template from JSON.
    pub fn from_json_str(json: &str) -> Result<MapTemplate, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Validates the template and produces the opening state.
    ///
    /// Adjacency is made symmetric here: an edge listed on either end is
    /// present on both.
    pub fn build(&self, config: &GameConfig) -> Result<GameState, SetupError> {
        let mut nodes: BTreeMap<NodeId, Node> = BTreeMap::new();
        for t in &self.nodes {
            if nodes.contains_key(&t.id) {
                return Err(SetupError::DuplicateNode(t.id.clone()));
            }
            let name = if t.name.is_empty() {
                t.id.to_string()
            } else {
                t.name.clone()
            };
            nodes.insert(
                t.id.clone(),
                Node {
                    id: t.id.clone(),
                    name,
                    kind: t.kind,
                    owner: t.owner,
                    resources_per_turn: t.resources_per_turn,
                    has_hub: t.hub,
                    adjacent: BTreeSet::new(),
                    objective: t.objective || t.kind == NodeKind::KeyJunction,
                    effects: Vec::new(),
                },
            );
        }

        for t in &self.nodes {
            for to in &t.adjacent {
                if to == &t.id {
                    return Err(SetupError::SelfLoop(t.id.clone()));
                }
                if !nodes.contains_key(to) {
                    return Err(SetupError::UnknownNeighbour {
                        from: t.id.clone(),
                        to: to.clone(),
                    });
                }
                if let Some(n) = nodes.get_mut(&t.id) {
                    n.adjacent.insert(to.clone());
                }
                if let Some(n) = nodes.get_mut(to) {
                    n.adjacent.insert(t.id.clone());
                }
            }
        }

        let mut players = BTreeMap::new();
        for faction in ALL_FACTIONS {
            let mut commands = nodes
                .values()
                .filter(|n| n.kind == NodeKind::Command && n.owner == Some(faction));
            let command = commands
                .next()
                .ok_or(SetupError::MissingCommandNode(faction))?;
            if commands.next().is_some() {
                return Err(SetupError::DuplicateCommandNode(faction));
            }
            players.insert(
                faction,
                Player {
                    faction,
                    resources: self.starting_resources,
                    command_node: command.id.clone(),
                    control_streaks: BTreeMap::new(),
                    deployed: 0,
                },
            );
        }

        let key_junctions: Vec<NodeId> = nodes
            .values()
            .filter(|n| n.is_key_junction())
            .map(|n| n.id.clone())
            .collect();
        for player in players.values_mut() {
            for kj in &key_junctions {
                player.control_streaks.insert(kj.clone(), 0);
            }
        }

        let mut state = GameState {
            nodes,
            units: BTreeMap::new(),
            players,
            turn: 1,
            current_player: config.first_player,
            first_player: config.first_player,
            phase: Phase::Fluctuation,
            active_event: None,
            extra_maneuver_pending: false,
            batch_taken: false,
            last_battle: None,
            battle_history: VecDeque::new(),
            key_junctions,
            rules: RuleSet {
                turn_limit: config.turn_limit,
                control_threshold: config.control_threshold,
                battle_history_capacity: config.battle_history_capacity,
                event_chance_percent: config.event_chance_percent.min(100),
            },
            result: None,
            neutral_deployed: 0,
            journal: Journal::new(config.journal_capacity),
        };

        for stack in &self.units {
            if !state.nodes.contains_key(&stack.node) {
                return Err(SetupError::UnknownUnitNode(stack.node.clone()));
            }
            for _ in 0..stack.count {
                state.spawn_unit(stack.owner, stack.unit_type, &stack.node, false);
            }
        }

        Ok(state)
    }

    /// The built-in two-front map.
    ///
    /// Each faction holds a command node, a forge, and an outpost. Two key
    /// junctions and a central core sit between them under neutral garrison.
    pub fn standard() -> MapTemplate {
        let b = Some(Faction::Blue);
        let r = Some(Faction::Red);
        let nodes = vec![
            node("blue_hq", "Blue Command", NodeKind::Command, b, 5, true, &["blue_forge", "blue_outpost"]),
            node("blue_forge", "Blue Forge", NodeKind::Regular, b, 2, true, &["north_junction", "relay_w"]),
            node("blue_outpost", "Blue Outpost", NodeKind::Regular, b, 1, false, &["south_junction", "relay_w"]),
            node("relay_w", "West Relay", NodeKind::Regular, None, 1, false, &["core"]),
            node("north_junction", "North Junction", NodeKind::KeyJunction, None, 3, false, &["core", "red_forge"]),
            node("south_junction", "South Junction", NodeKind::KeyJunction, None, 3, false, &["core", "red_outpost"]),
            node("core", "The Core", NodeKind::Regular, None, 2, true, &["relay_e"]),
            node("relay_e", "East Relay", NodeKind::Regular, None, 1, false, &["red_forge", "red_outpost"]),
            node("red_forge", "Red Forge", NodeKind::Regular, r, 2, true, &["red_hq"]),
            node("red_outpost", "Red Outpost", NodeKind::Regular, r, 1, false, &["red_hq"]),
            node("red_hq", "Red Command", NodeKind::Command, r, 5, true, &[]),
        ];
        let units = vec![
            stack(b, UnitType::Infantry, "blue_hq", 3),
            stack(b, UnitType::Armor, "blue_forge", 1),
            stack(b, UnitType::Infantry, "blue_outpost", 1),
            stack(r, UnitType::Infantry, "red_hq", 3),
            stack(r, UnitType::Armor, "red_forge", 1),
            stack(r, UnitType::Infantry, "red_outpost", 1),
            stack(None, UnitType::Infantry, "north_junction", 2),
            stack(None, UnitType::Infantry, "south_junction", 2),
            stack(None, UnitType::Artillery, "core", 1),
        ];
        MapTemplate {
            name: "Two Fronts".to_string(),
            nodes,
            units,
            starting_resources: 10,
        }
    }
}

fn node(
    id: &str,
    name: &str,
    kind: NodeKind,
    owner: Option<Faction>,
    resources_per_turn: u32,
    hub: bool,
    adjacent: &[&str],
) -> NodeTemplate {
    NodeTemplate {
        id: NodeId::new(id),
        name: name.to_string(),
        kind,
        owner,
        resources_per_turn,
        hub,
        adjacent: adjacent.iter().map(|a| NodeId::new(*a)).collect(),
        objective: false,
    }
}

fn stack(owner: Option<Faction>, unit_type: UnitType, node: &str, count: u32) -> StartingUnits {
    StartingUnits {
        owner,
        unit_type,
        node: NodeId::new(node),
        count,
    }
}
