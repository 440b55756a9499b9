use std::fmt::Debug;

use rand::{rngs::StdRng, SeedableRng};

use crate::time::SimTime;

use super::{RunLimit, Scheduler};

/// A builder for a scheduler instance.
#[must_use]
pub struct Builder {
    pub(super) quiet: bool,
    pub(super) rng: StdRng,
    pub(super) limit: RunLimit,
}

impl Builder {
    /// Creates a new unconfigured builder, with an RNG seeded
    /// from the operating system.
    pub fn new() -> Builder {
        Builder {
            quiet: false,
            rng: StdRng::from_os_rng(),
            limit: RunLimit::UNBOUNDED,
        }
    }

    /// Creates a `Builder` with a static seeded RNG.
    pub fn seeded(seed: u64) -> Builder {
        Builder {
            quiet: false,
            rng: StdRng::seed_from_u64(seed),
            limit: RunLimit::UNBOUNDED,
        }
    }

    ///
    /// Suppresses the run summary emitted at the end of each run.
    ///
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    ///
    /// Ends runs once `max_itr` events were dispatched in total.
    /// Called twice, the smaller bound wins.
    ///
    pub fn max_itr(mut self, max_itr: usize) -> Self {
        self.limit = self.limit.with_max_events(max_itr);
        self
    }

    ///
    /// Ends runs before the first event after `max_time` (default: inf).
    /// Called twice, the earlier bound wins.
    ///
    pub fn max_time(mut self, max_time: SimTime) -> Self {
        self.limit = self.limit.with_max_time(max_time);
        self
    }

    ///
    /// Builds a new [`Scheduler`] instance, owning the given application state.
    ///
    /// # Examples
    ///
    /// ```
    /// use wave_des::prelude::*;
    ///
    /// #[derive(Debug)]
    /// struct App(usize, String);
    ///
    /// let app = App(42, String::from("Hello there!"));
    /// let rt = Builder::seeded(1).quiet().build(app);
    /// assert_eq!(rt.now(), SimTime::ZERO);
    /// ```
    pub fn build<A>(self, app: A) -> Scheduler<A> {
        Scheduler::from_builder(self, app)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("quiet", &self.quiet)
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}
