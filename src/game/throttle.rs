//! Throttle Ledger
//!
//! Last accepted timestamp per (action kind, actor). An event is allowed
//! when at least the minimum interval has passed since the recorded one.

use std::collections::HashMap;
use std::time::Duration;
use chrono::{DateTime, Utc};

use crate::game::action::ActionKind;
use crate::game::entity::EntityId;

/// Ledger key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ThrottleKey {
    /// Action kind
    pub kind: ActionKind,
    /// Acting entity
    pub actor: EntityId,
}

impl ThrottleKey {
    /// New key.
    pub const fn new(kind: ActionKind, actor: EntityId) -> Self {
        Self { kind, actor }
    }
}

/// Last accepted event time per key.
#[derive(Clone, Debug, Default)]
pub struct ThrottleLedger {
    last: HashMap<ThrottleKey, DateTime<Utc>>,
}

impl ThrottleLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff no accepted event lies within `min_interval` before `at`.
    ///
    /// A timestamp older than the recorded one is never allowed.
    pub fn allow(&self, key: ThrottleKey, at: DateTime<Utc>, min_interval: Duration) -> bool {
        match self.last.get(&key) {
            None => true,
            Some(last) => match at.signed_duration_since(*last).to_std() {
                Ok(gap) => gap >= min_interval,
                Err(_) => false,
            },
        }
    }

    /// Record an accepted event, overwriting any previous entry.
    pub fn record(&mut self, key: ThrottleKey, at: DateTime<Utc>) {
        self.last.insert(key, at);
    }

    /// Last accepted time for a key.
    pub fn last(&self, key: ThrottleKey) -> Option<DateTime<Utc>> {
        self.last.get(&key).copied()
    }

    /// Drop every entry for an actor.
    pub fn forget(&mut self, actor: EntityId) {
        self.last.retain(|key, _| key.actor != actor);
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.last.len()
    }

    /// Is the ledger empty?
    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}
