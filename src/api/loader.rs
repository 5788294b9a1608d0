//! Load tracking for series data that arrives after chart construction.
//!
//! `create_chart` hands back one [`PendingLoad`] per series; the caller
//! fetches each payload however it likes and settles it through the chart.
//! The [`LoadBarrier`] keeps per-key state so completion and partial failure
//! are both observable, instead of a bare join that loses which load broke.

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

/// A series whose data has not been delivered yet.
///
/// `inline` is populated when the series was declared with inline data; the
/// caller settles it straight back without any fetch. `file_name` names the
/// remote resource otherwise.
#[derive(Debug, Clone)]
pub struct PendingLoad {
    pub key: String,
    pub file_name: Option<String>,
    pub inline: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Resolved,
    Failed(String),
}

impl LoadState {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Tracks every outstanding load for one chart build.
#[derive(Debug, Clone, Default)]
pub struct LoadBarrier {
    loads: IndexMap<String, LoadState>,
}

impl LoadBarrier {
    #[must_use]
    pub fn new(keys: impl IntoIterator<Item = String>) -> Self {
        Self {
            loads: keys
                .into_iter()
                .map(|key| (key, LoadState::Pending))
                .collect(),
        }
    }

    /// Marks a load as resolved. Returns `true` when this settled the final
    /// outstanding load.
    pub fn settle_ok(&mut self, key: &str) -> bool {
        self.settle(key, LoadState::Resolved)
    }

    /// Marks a load as failed with its error message. Returns `true` when
    /// this settled the final outstanding load.
    pub fn settle_err(&mut self, key: &str, message: impl Into<String>) -> bool {
        self.settle(key, LoadState::Failed(message.into()))
    }

    fn settle(&mut self, key: &str, state: LoadState) -> bool {
        match self.loads.get_mut(key) {
            Some(slot) if slot.is_pending() => {
                *slot = state;
                self.is_complete()
            }
            Some(_) => {
                warn!(load_key = key, "load settled more than once, ignoring");
                false
            }
            None => {
                warn!(load_key = key, "settling unknown load key, ignoring");
                false
            }
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.loads.values().all(|state| !state.is_pending())
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.loads.values().filter(|state| state.is_pending()).count()
    }

    #[must_use]
    pub fn state(&self, key: &str) -> Option<&LoadState> {
        self.loads.get(key)
    }

    /// Keys and messages of every failed load, in declaration order.
    #[must_use]
    pub fn errors(&self) -> Vec<(&str, &str)> {
        self.loads
            .iter()
            .filter_map(|(key, state)| match state {
                LoadState::Failed(message) => Some((key.as_str(), message.as_str())),
                _ => None,
            })
            .collect()
    }
}
