//! Game resolution.
//!
//! Pure transitions over [`GameState`](crate::board::GameState): each public
//! entry point takes a snapshot by reference and returns the next one.
//! Covers phase sequencing, the economy, order execution, combat,
//! fluctuation events, and victory evaluation.

pub mod combat;
pub mod economy;
pub mod events;
pub mod orders;
pub mod phase;
pub mod victory;

pub use combat::{apply_battle, defenders_at, resolve_battle};
pub use economy::{collect_resources, income};
pub use events::{candidate_targets, first_hub, resolve_event, Calm, EventDeck, EventSource};
pub use orders::{
    apply_orders, validate_attack, validate_deploy, validate_maneuver, OrderOutcome, Rejection,
};
pub use phase::{advance_state, next_phase, open_game};
pub use victory::{control_winner, evaluate_round, influence, influence_verdict, update_control};
