//! Battle reports.
//!
//! A report is the complete, auditable record of one resolved attack: who
//! was committed, every dice exchange in order, and the final tally.

use serde::{Deserialize, Serialize};

use super::node::{Faction, NodeId};
use super::unit::UnitId;

/// Result of a single dice exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundOutcome {
    /// Attacker rolled higher; one defender removed.
    AttackerHits,
    /// Defender rolled higher; one attacker removed.
    DefenderHits,
    /// Equal values; nobody removed.
    Clash,
}

/// Final outcome of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    AttackerWins,
    DefenderWins,
    StalemateRetreat,
}

impl BattleOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            BattleOutcome::AttackerWins => "attacker_wins",
            BattleOutcome::DefenderWins => "defender_wins",
            BattleOutcome::StalemateRetreat => "stalemate_retreat",
        }
    }
}

/// One logged dice exchange. Counts are the survivors after the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatRound {
    pub round: u32,
    pub attacker_roll: u8,
    /// The raw defender die, before any penalty.
    pub defender_roll: u8,
    /// Penalty subtracted from the defender die (floor 1).
    pub defender_penalty: u8,
    pub outcome: RoundOutcome,
    pub attackers_remaining: u32,
    pub defenders_remaining: u32,
}

/// The full record of one resolved attack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleReport {
    pub turn: u32,
    pub attacker: Faction,
    /// Owner of the target node when the battle started.
    pub defender: Option<Faction>,
    pub from: NodeId,
    pub target: NodeId,
    pub committed: Vec<UnitId>,
    pub initial_defenders: Vec<UnitId>,
    pub rounds: Vec<CombatRound>,
    pub outcome: BattleOutcome,
    pub attacker_losses: Vec<UnitId>,
    pub defender_losses: Vec<UnitId>,
    pub node_captured: bool,
}

impl BattleReport {
    /// Committed attackers that survived the battle.
    pub fn attacker_survivors(&self) -> impl Iterator<Item = &UnitId> {
        self.committed
            .iter()
            .filter(move |id| !self.attacker_losses.contains(id))
    }

    /// Initial defenders that survived the battle.
    pub fn defender_survivors(&self) -> impl Iterator<Item = &UnitId> {
        self.initial_defenders
            .iter()
            .filter(move |id| !self.defender_losses.contains(id))
    }
}
