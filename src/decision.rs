//! Decision sources.
//!
//! The engine asks the active faction's source for one batch per order
//! phase. A source that fails is not fatal: the engine records the failure
//! and treats the phase as an explicit pass.

use std::collections::VecDeque;

use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::board::Order;
use crate::movegen;
use crate::protocol::{parse_order_batch, BatchError, PhaseSummary};

/// Why a source produced no usable batch.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("unreadable order batch: {0}")]
    Batch(#[from] BatchError),

    #[error("no scripted payload left")]
    Exhausted,

    #[error("decision source unavailable: {0}")]
    Unavailable(String),
}

/// Something that chooses orders for one faction.
pub trait DecisionSource {
    fn decide(&mut self, summary: &PhaseSummary) -> Result<Vec<Order>, DecisionError>;
}

impl<S: DecisionSource + ?Sized> DecisionSource for Box<S> {
    fn decide(&mut self, summary: &PhaseSummary) -> Result<Vec<Order>, DecisionError> {
        (**self).decide(summary)
    }
}

/// Replays raw JSON payloads in order, one per request.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    payloads: VecDeque<String>,
}

impl ScriptedSource {
    pub fn new<I, S>(payloads: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScriptedSource {
            payloads: payloads.into_iter().map(Into::into).collect(),
        }
    }

    pub fn push(&mut self, payload: impl Into<String>) {
        self.payloads.push_back(payload.into());
    }

    pub fn remaining(&self) -> usize {
        self.payloads.len()
    }
}

impl DecisionSource for ScriptedSource {
    fn decide(&mut self, summary: &PhaseSummary) -> Result<Vec<Order>, DecisionError> {
        let payload = self.payloads.pop_front().ok_or(DecisionError::Exhausted)?;
        let batch = parse_order_batch(&payload)?;
        if !batch.skipped.is_empty() {
            tracing::debug!(
                faction = %summary.faction,
                skipped = batch.skipped.len(),
                "scripted batch had malformed entries"
            );
        }
        Ok(batch.orders)
    }
}

/// Issues random legal orders from its own seeded generator.
#[derive(Debug, Clone)]
pub struct RandomCommander {
    rng: SmallRng,
}

impl RandomCommander {
    pub fn new(seed: u64) -> Self {
        RandomCommander {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl DecisionSource for RandomCommander {
    fn decide(&mut self, summary: &PhaseSummary) -> Result<Vec<Order>, DecisionError> {
        Ok(movegen::random_orders(summary, &mut self.rng))
    }
}
