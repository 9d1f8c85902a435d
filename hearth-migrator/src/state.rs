use parse_display::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{MigratorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[display(style = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum MigrationState {
    Pending,
    Applying,
    Applied,
    RollingBack,
}

impl MigrationState {
    /// `Pending -> Applying -> Applied` and `Applied -> RollingBack -> Pending`.
    /// An interrupted `Applying` or `RollingBack` falls back to where it started.
    pub fn can_transition_to(self, next: MigrationState) -> bool {
        use MigrationState::*;

        matches!(
            (self, next),
            (Pending, Applying)
                | (Applying, Applied)
                | (Applying, Pending)
                | (Applied, RollingBack)
                | (RollingBack, Pending)
                | (RollingBack, Applied)
        )
    }
}

/// Per-call view of every registered migration's state, seeded from the
/// ledger. It only guards the transitions made within one runner call and is
/// dropped when the call returns.
#[derive(Debug, Default)]
pub(crate) struct Tracker(BTreeMap<u64, MigrationState>);

impl Tracker {
    pub(crate) fn new(states: impl IntoIterator<Item = (u64, MigrationState)>) -> Self {
        Self(states.into_iter().collect())
    }

    pub(crate) fn transition(&mut self, key: u64, next: MigrationState) -> Result<()> {
        let current = self.0.get(&key).copied().unwrap_or(MigrationState::Pending);

        if !current.can_transition_to(next) {
            return Err(MigratorError::InvalidTransition {
                key,
                from: current,
                to: next,
            });
        }

        tracing::debug!(key, from = %current, to = %next, "migration state");
        self.0.insert(key, next);

        Ok(())
    }
}
