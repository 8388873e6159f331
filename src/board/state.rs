//! Game state representation.
//!
//! Holds the complete snapshot of a game at a given point in time: the node
//! graph, the unit registry, both players, the phase clock, the active event,
//! recent battles, and the verdict once the game is over. The snapshot is
//! plain id-referenced data and round-trips through serde unchanged.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use super::event::ActiveEvent;
use super::node::{Faction, Node, NodeId};
use super::report::BattleReport;
use super::unit::{Unit, UnitId, UnitType};
use crate::journal::{EntryKind, Journal, JournalEntry};

/// The phase within a faction's half of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Fluctuation,
    Resource,
    Deployment,
    Attack,
    Maneuver,
    GameOver,
}

impl Phase {
    /// Returns true for the phases that consume an order batch.
    pub const fn takes_orders(self) -> bool {
        matches!(self, Phase::Deployment | Phase::Attack | Phase::Maneuver)
    }

    pub const fn name(self) -> &'static str {
        match self {
            Phase::Fluctuation => "FLUCTUATION",
            Phase::Resource => "RESOURCE",
            Phase::Deployment => "DEPLOYMENT",
            Phase::Attack => "ATTACK",
            Phase::Maneuver => "MANEUVER",
            Phase::GameOver => "GAME_OVER",
        }
    }
}

/// Per-faction bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub faction: Faction,
    pub resources: u32,
    pub command_node: NodeId,
    /// Consecutive qualifying round boundaries each key junction was held.
    pub control_streaks: BTreeMap<NodeId, u32>,
    /// Units minted so far; never decreases.
    pub deployed: u32,
}

impl Player {
    pub fn streak(&self, node: &NodeId) -> u32 {
        self.control_streaks.get(node).copied().unwrap_or(0)
    }
}

/// Game-wide tunables frozen into the snapshot at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    pub turn_limit: u32,
    pub control_threshold: u32,
    pub battle_history_capacity: usize,
    pub event_chance_percent: u32,
}

/// Who won, if anyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "faction", rename_all = "snake_case")]
pub enum Verdict {
    Victory(Faction),
    Draw,
}

/// Which condition ended the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VictoryCondition {
    Control,
    Decapitation,
    Influence,
}

/// The recorded end of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub verdict: Verdict,
    pub condition: VictoryCondition,
    pub message: String,
}

impl GameResult {
    pub fn winner(&self) -> Option<Faction> {
        match self.verdict {
            Verdict::Victory(f) => Some(f),
            Verdict::Draw => None,
        }
    }
}

/// Complete game snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub nodes: BTreeMap<NodeId, Node>,
    pub units: BTreeMap<UnitId, Unit>,
    pub players: BTreeMap<Faction, Player>,
    pub turn: u32,
    pub current_player: Faction,
    /// The faction that opens every turn.
    pub first_player: Faction,
    pub phase: Phase,
    pub active_event: Option<ActiveEvent>,
    pub extra_maneuver_pending: bool,
    /// Set once the active faction's batch for this phase has been applied.
    #[serde(default)]
    pub batch_taken: bool,
    pub last_battle: Option<BattleReport>,
    pub battle_history: VecDeque<BattleReport>,
    pub key_junctions: Vec<NodeId>,
    pub rules: RuleSet,
    pub result: Option<GameResult>,
    /// Counter for minting neutral garrison ids.
    pub neutral_deployed: u32,
    pub journal: Journal,
}

impl GameState {
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn unit(&self, id: &UnitId) -> Option<&Unit> {
        self.units.get(id)
    }

    pub fn player(&self, faction: Faction) -> Option<&Player> {
        self.players.get(&faction)
    }

    /// Banked resources of a faction (zero if unknown).
    pub fn resources(&self, faction: Faction) -> u32 {
        self.player(faction).map_or(0, |p| p.resources)
    }

    /// Units at a node, in display order.
    pub fn units_at(&self, node: &NodeId) -> Vec<&Unit> {
        let mut units: Vec<&Unit> = self.units.values().filter(|u| &u.node == node).collect();
        units.sort_by(|a, b| a.slot.cmp(&b.slot).then_with(|| a.id.cmp(&b.id)));
        units
    }

    /// Units owned by a faction, in id order.
    pub fn units_of(&self, faction: Faction) -> impl Iterator<Item = &Unit> {
        self.units
            .values()
            .filter(move |u| u.owner == Some(faction))
    }

    /// Nodes owned by a faction (`None` for neutral), in id order.
    pub fn nodes_owned_by(&self, owner: Option<Faction>) -> impl Iterator<Item = &Node> {
        self.nodes.values().filter(move |n| n.owner == owner)
    }

    /// Returns true if both nodes exist and share an edge.
    pub fn is_adjacent(&self, a: &NodeId, b: &NodeId) -> bool {
        self.nodes
            .get(a)
            .is_some_and(|n| n.adjacent.contains(b) && self.nodes.contains_key(b))
    }

    pub fn is_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    /// Mints the next unit id for `owner` and bumps the matching counter.
    pub(crate) fn mint_unit_id(&mut self, owner: Option<Faction>) -> UnitId {
        match owner.and_then(|f| self.players.get_mut(&f)) {
            Some(player) => {
                player.deployed += 1;
                UnitId(format!("{}-{}", player.faction.code(), player.deployed))
            }
            None => {
                self.neutral_deployed += 1;
                UnitId(format!("n-{}", self.neutral_deployed))
            }
        }
    }

    /// Creates a unit at the end of `node`'s display order.
    pub(crate) fn spawn_unit(
        &mut self,
        owner: Option<Faction>,
        unit_type: UnitType,
        node: &NodeId,
        acted: bool,
    ) -> UnitId {
        let id = self.mint_unit_id(owner);
        let slot = self.units.values().filter(|u| &u.node == node).count() as u32;
        self.units.insert(
            id.clone(),
            Unit {
                id: id.clone(),
                unit_type,
                owner,
                node: node.clone(),
                acted,
                slot,
            },
        );
        id
    }

    /// Reassigns contiguous display slots at a node, keeping relative order.
    pub(crate) fn renumber(&mut self, node: &NodeId) {
        let order: Vec<UnitId> = self.units_at(node).into_iter().map(|u| u.id.clone()).collect();
        for (slot, id) in order.iter().enumerate() {
            if let Some(unit) = self.units.get_mut(id) {
                unit.slot = slot as u32;
            }
        }
    }

    /// Appends a narration line stamped with the current turn and phase.
    pub(crate) fn note(&mut self, faction: Option<Faction>, kind: EntryKind, message: String) {
        let entry = JournalEntry {
            turn: self.turn,
            phase: self.phase,
            faction,
            kind,
            message,
        };
        self.journal.push(entry);
    }

    /// Ends the game. Later calls never overwrite the first verdict.
    pub(crate) fn finish(&mut self, result: GameResult) {
        if self.result.is_some() {
            return;
        }
        tracing::info!(message = %result.message, "game over");
        self.note(result.winner(), EntryKind::Victory, result.message.clone());
        self.result = Some(result);
        self.phase = Phase::GameOver;
    }
}
