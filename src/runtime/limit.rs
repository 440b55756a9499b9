use crate::time::SimTime;
use std::fmt::Display;

///
/// Bounds that end a run before the future event set is exhausted.
///
/// Bounds are checked against the next live event, before it is removed
/// from the queue. The event that would cross a bound stays pending.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLimit {
    max_events: Option<usize>,
    max_time: Option<SimTime>,
}

/// The bound that ended a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitBound {
    /// The scheduler already dispatched this many events.
    EventCount(usize),
    /// The next event lies after this time.
    SimTime(SimTime),
}

impl RunLimit {
    /// A limit that never ends a run.
    pub const UNBOUNDED: RunLimit = RunLimit {
        max_events: None,
        max_time: None,
    };

    /// The maximum number of events dispatched over the scheduler's lifetime.
    #[must_use]
    pub fn max_events(&self) -> Option<usize> {
        self.max_events
    }

    /// The last instant at which events may still execute.
    #[must_use]
    pub fn max_time(&self) -> Option<SimTime> {
        self.max_time
    }

    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.max_events.is_none() && self.max_time.is_none()
    }

    // Setting a bound twice keeps the tighter one.
    pub(crate) fn with_max_events(mut self, n: usize) -> Self {
        self.max_events = Some(self.max_events.map_or(n, |m| m.min(n)));
        self
    }

    pub(crate) fn with_max_time(mut self, t: SimTime) -> Self {
        self.max_time = Some(self.max_time.map_or(t, |m| m.min(t)));
        self
    }

    /// The bound that forbids dispatching an event at `next`, after
    /// `dispatched` events were executed.
    pub(crate) fn exceeded(&self, dispatched: usize, next: SimTime) -> Option<LimitBound> {
        if let Some(n) = self.max_events.filter(|n| dispatched >= *n) {
            return Some(LimitBound::EventCount(n));
        }
        self.max_time
            .filter(|t| next > *t)
            .map(LimitBound::SimTime)
    }
}

impl Display for RunLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.max_events, self.max_time) {
            (None, None) => write!(f, "unbounded"),
            (Some(n), None) => write!(f, "max {n} events"),
            (None, Some(t)) => write!(f, "until {t}"),
            (Some(n), Some(t)) => write!(f, "max {n} events until {t}"),
        }
    }
}

impl Display for LimitBound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventCount(n) => write!(f, "{n} events dispatched"),
            Self::SimTime(t) => write!(f, "next event after {t}"),
        }
    }
}
