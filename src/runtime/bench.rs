use crate::time::SimTime;
use std::{fmt::Display, time::Instant};

/// Why a call to [`Scheduler::run`](crate::runtime::Scheduler::run) returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunOutcome {
    /// The run started without any pending events.
    Empty,
    /// All pending events were processed.
    Finished,
    /// An action requested [`stop`](crate::runtime::Scheduler::stop).
    Stopped,
    /// The configured [`RunLimit`](crate::runtime::RunLimit) was reached.
    /// The next event stays queued.
    LimitReached,
    /// The scheduler was destroyed, nothing was executed.
    Destroyed,
}

/// A run profiler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profiler {
    /// Why the run returned.
    pub outcome: RunOutcome,
    /// The simulation time at the end of the run.
    pub time: SimTime,

    time_start: Instant,
    /// The wall-clock duration of the run.
    pub duration: std::time::Duration,

    /// The number of events that where executed.
    pub event_count: usize,
    /// The number of cancelled events that were discarded.
    pub cancelled_count: usize,
}

impl Profiler {
    /// Starts the profile.
    pub(super) fn start() -> Self {
        Self {
            outcome: RunOutcome::Finished,
            time: SimTime::ZERO,
            time_start: Instant::now(),
            duration: std::time::Duration::ZERO,
            event_count: 0,
            cancelled_count: 0,
        }
    }

    /// Finishes the profile.
    pub(super) fn finish(&mut self, outcome: RunOutcome, time: SimTime) {
        self.outcome = outcome;
        self.time = time;
        self.duration = self.time_start.elapsed();
    }
}

impl Display for Profiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} at {} after event #{} ({} cancelled) in {:?}",
            self.outcome, self.time, self.event_count, self.cancelled_count, self.duration
        )
    }
}
