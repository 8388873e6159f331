//! Bounded narration log.
//!
//! Collects the narration-worthy moments of a game (events, deployments,
//! battles, victories) for the presentation layer. Oldest entries are
//! evicted once the configured capacity is reached.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::board::{Faction, Phase};

/// Category of a journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Phase,
    Economy,
    Event,
    Deploy,
    Maneuver,
    Battle,
    Decision,
    Victory,
}

/// A single line of narration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub turn: u32,
    pub phase: Phase,
    pub faction: Option<Faction>,
    pub kind: EntryKind,
    pub message: String,
}

/// Append-only ring of [`JournalEntry`] values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    capacity: usize,
    entries: VecDeque<JournalEntry>,
}

impl Journal {
    pub fn new(capacity: usize) -> Self {
        Journal {
            capacity,
            entries: VecDeque::with_capacity(capacity.min(256)),
        }
    }

    pub fn push(&mut self, entry: JournalEntry) {
        if self.capacity == 0 {
            return;
        }
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    pub fn entries(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter()
    }

    pub fn last(&self) -> Option<&JournalEntry> {
        self.entries.back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
