//! Frontline wargame engine library.
//!
//! Exposes the board representation, rule resolution, decision sources,
//! order generation, and protocol modules for use by integration tests and
//! the binary entry points.

pub mod board;
pub mod config;
pub mod decision;
pub mod engine;
pub mod journal;
pub mod movegen;
pub mod protocol;
pub mod resolve;
pub mod rng;
pub mod selfplay;
