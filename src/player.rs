//! # Trajectory playback
//!
//! [`TrajectoryPlayer`] owns a validated [`TrajectoryTable`] and a cursor. Each call to
//! [`TrajectoryPlayer::tick`] emits the row under the cursor through a [`Publisher`], then
//! advances the cursor by one.
//!
//! ## State machine
//! -----------------
//! ```text
//!            N = 0 (at construction)
//!   Idle ───────────────────────────────► Done
//!    │                                     ▲
//!    │ first tick, N > 0                   │ tick with index + 1 == N
//!    ▼                                     │
//!  Playing ───────────────────────────────-┘
//!    ▲  │ tick with index + 1 < N
//!    └──┘
//! ```
//!
//! * `Done` is terminal. Any tick in `Done` is a scheduling-contract violation and returns
//!   [`GalOrbitsError::OutOfRange`]; the cursor is left untouched.
//! * An empty table goes straight to `Done` with a single informational message and never
//!   emits anything.
//! * A tick either emits its row and advances, or fails and leaves the cursor where it was:
//!   there is no partial emission.
use tracing::{info, trace};

use crate::{
    gal_orbits_errors::GalOrbitsError,
    publisher::{Float64MultiArray, Publisher},
    trajectories::TrajectoryTable,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Done,
}

/// Result of a successful tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Row `index` was emitted, more rows remain
    Emitted { index: usize },
    /// Row `index` was the last one, the hosting process must stop scheduling ticks
    Completed { index: usize },
}

impl TickOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, TickOutcome::Completed { .. })
    }
}

#[derive(Debug, Clone)]
pub struct TrajectoryPlayer {
    table: TrajectoryTable,
    index: usize,
    state: PlaybackState,
}

impl TrajectoryPlayer {
    /// Take ownership of `table` and place the cursor on its first row.
    ///
    /// An empty table yields a player already in [`PlaybackState::Done`].
    pub fn new(table: TrajectoryTable) -> Self {
        let state = if table.is_empty() {
            info!("there is no data in the output");
            PlaybackState::Done
        } else {
            PlaybackState::Idle
        };

        TrajectoryPlayer {
            table,
            index: 0,
            state,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == PlaybackState::Done
    }

    /// Current cursor, in `[0, len]`.
    pub fn cursor(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.table.len() - self.index
    }

    pub fn table(&self) -> &TrajectoryTable {
        &self.table
    }

    /// Emit the row under the cursor and advance.
    ///
    /// Arguments
    /// ---------
    /// * `publisher`: transport receiving the row as a [`Float64MultiArray`]
    ///
    /// Return
    /// ------
    /// * [`TickOutcome::Emitted`] while rows remain, [`TickOutcome::Completed`] on the tick that
    ///   emits the last row.
    ///
    /// Errors
    /// ------
    /// * [`GalOrbitsError::OutOfRange`] when called in [`PlaybackState::Done`].
    /// * Any transport error from `publisher`; the cursor does not move in that case.
    pub fn tick<P>(&mut self, publisher: &mut P) -> Result<TickOutcome, GalOrbitsError>
    where
        P: Publisher + ?Sized,
    {
        let len = self.table.len();
        let row = match (self.state, self.table.get(self.index)) {
            (PlaybackState::Done, _) | (_, None) => {
                return Err(GalOrbitsError::OutOfRange {
                    index: self.index,
                    len,
                })
            }
            (_, Some(row)) => row,
        };

        let msg = Float64MultiArray::from(row);
        publisher.publish(&msg)?;
        trace!(index = self.index, data = ?msg.data, "published row");

        let emitted = self.index;
        self.index += 1;

        if self.index == len {
            self.state = PlaybackState::Done;
            info!("All data published successfully");
            Ok(TickOutcome::Completed { index: emitted })
        } else {
            self.state = PlaybackState::Playing;
            Ok(TickOutcome::Emitted { index: emitted })
        }
    }
}
