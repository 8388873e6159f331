//! Board representation and game-state types.
//!
//! Contains the core data structures for nodes, units, orders, events,
//! battle reports, map templates, and the overall game state.

pub mod event;
pub mod map;
pub mod node;
pub mod order;
pub mod report;
pub mod state;
pub mod unit;

pub use event::{ActiveEvent, EventEffect, EventResolution, EventTemplate, TargetCriteria};
pub use map::{MapTemplate, NodeTemplate, SetupError, StartingUnits};
pub use node::{owner_name, Faction, Node, NodeEffect, NodeId, NodeKind, ALL_FACTIONS};
pub use order::{Order, OrderKind};
pub use report::{BattleOutcome, BattleReport, CombatRound, RoundOutcome};
pub use state::{GameResult, GameState, Phase, Player, RuleSet, Verdict, VictoryCondition};
pub use unit::{Unit, UnitId, UnitType, ALL_UNIT_TYPES};
