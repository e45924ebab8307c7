use std::collections::HashSet;

use crate::game::ball::BallId;

/// Accumulates pocketing notifications for the shot currently in flight.
///
/// A ball can brush a trigger repeatedly before its body is removed, so
/// recording is set-based; the caller removes the ball from the simulation
/// synchronously on the first record and later records become no-ops.
#[derive(Debug, Default)]
pub struct PocketTracker {
    pocketed: HashSet<BallId>,
}

impl PocketTracker {
    pub fn new() -> Self {
        Self { pocketed: HashSet::new() }
    }

    /// Record a pocketed ball. Returns `true` only the first time a given
    /// ball is recorded this shot.
    pub fn record(&mut self, id: BallId) -> bool {
        self.pocketed.insert(id)
    }

    pub fn contains(&self, id: BallId) -> bool {
        self.pocketed.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.pocketed.is_empty()
    }

    /// Take the accumulated set, leaving the tracker empty for the next shot.
    pub fn drain(&mut self) -> HashSet<BallId> {
        std::mem::take(&mut self.pocketed)
    }
}
