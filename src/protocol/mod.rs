//! Text and JSON interfaces around the engine.
//!
//! This module holds the line command parser for the `frontline` binary,
//! the order batch wire format exchanged with decision sources, and the
//! phase summary those sources decide from.

pub mod batch;
pub mod parser;
pub mod summary;

pub use batch::{format_orders, parse_order_batch, BatchError, DecodedBatch};
pub use parser::{parse_command, Command};
pub use summary::{CatalogueEntry, NodeSummary, PhaseSummary, UnitSummary};
