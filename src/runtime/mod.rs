//!
//! Central primitives for running a discrete event simulation.
//!
//! A [`Scheduler`] owns a future event set and the simulation clock.
//! Events are plain closures receiving `&mut Scheduler<A>`, so they can
//! schedule follow-up events, cancel pending ones or stop the run.
//! Shared simulation state lives in [`Scheduler::app`].
//!
//! ```
//! use wave_des::prelude::*;
//!
//! let mut rt = Builder::seeded(1).quiet().build(Vec::new());
//! rt.schedule(Duration::from_secs(1), |rt| {
//!     let now = rt.now();
//!     rt.app.push(now);
//!     Ok(())
//! })?;
//!
//! let profiler = rt.run().expect("no event fails");
//! assert_eq!(profiler.event_count, 1);
//! assert_eq!(rt.app, vec![SimTime::from(1.0)]);
//! # Ok::<(), SchedulerError>(())
//! ```

use crate::time::{Duration, SimTime};
use rand::{distr::StandardUniform, prelude::Distribution, rngs::StdRng, Rng};
use std::{
    any::type_name,
    fmt::{Debug, Display},
    mem,
};

mod event;
pub use self::event::*;

mod context;
pub use self::context::*;

mod limit;
pub use self::limit::*;

mod bench;
pub use self::bench::*;

mod builder;
pub use self::builder::*;

mod error;
pub use self::error::*;

mod periodic;
pub use self::periodic::*;

///
/// The central managment point for a discrete event simulation.
///
/// Events execute one at a time, in strict `(time, id)` order where `id`
/// is the insertion sequence. Two events scheduled for the same instant
/// therefore execute in the order they were scheduled, independent of
/// their context or the call depth they were scheduled from.
///
pub struct Scheduler<A = ()> {
    /// The contained application state, shared by all events.
    pub app: A,

    now: SimTime,
    state: State,
    stop_requested: bool,
    context: Option<ContextId>,

    // Rt limits
    limit: RunLimit,

    event_id: EventId,
    itr: usize,

    // Misc
    quiet: bool,
    rng: StdRng,

    future_event_set: FutureEventSet<A>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Ready,
    Running,
    Destroyed,
}

impl<A> Scheduler<A> {
    ///
    /// Creates a scheduler with default options.
    ///
    pub fn new(app: A) -> Self {
        Builder::new().build(app)
    }

    pub(super) fn from_builder(builder: Builder, app: A) -> Self {
        Self {
            app,

            now: SimTime::ZERO,
            state: State::Ready,
            stop_requested: false,
            context: None,

            limit: builder.limit,

            event_id: 0,
            itr: 0,

            quiet: builder.quiet,
            rng: builder.rng,

            future_event_set: FutureEventSet::new(),
        }
    }

    ///
    /// Returns the current simulation time.
    ///
    /// Before the first event was dispatched this is [`SimTime::ZERO`].
    ///
    #[must_use]
    pub fn now(&self) -> SimTime {
        self.now
    }

    ///
    /// Returns the context of the currently executing event, or `None`
    /// if called outside of an event or from an event without context.
    ///
    #[must_use]
    pub fn context(&self) -> Option<ContextId> {
        self.context
    }

    ///
    /// Returns the number of events that were scheduled on this [`Scheduler`] instance.
    ///
    #[inline]
    #[must_use]
    pub fn num_events_scheduled(&self) -> usize {
        usize::try_from(self.event_id).unwrap_or(usize::MAX)
    }

    ///
    /// Returns the number of events that were recieved & handled on this [`Scheduler`] instance.
    ///
    #[must_use]
    pub fn num_events_dispatched(&self) -> usize {
        self.itr
    }

    ///
    /// Returns the number of cancelled events discarded so far.
    ///
    #[must_use]
    pub fn num_events_cancelled(&self) -> usize {
        self.future_event_set.num_discarded()
    }

    ///
    /// Returns the number of events that are queued and not cancelled.
    ///
    #[must_use]
    pub fn num_events_pending(&self) -> usize {
        self.future_event_set.len_pending()
    }

    /// Whether [`destroy`](Self::destroy) was called.
    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.state == State::Destroyed
    }

    ///
    /// Returns a random instance of `T`, drawn from the scheduler's rng.
    ///
    pub fn random<T>(&mut self) -> T
    where
        StandardUniform: Distribution<T>,
    {
        self.rng.random::<T>()
    }

    ///
    /// Samples a random instance of type `T` from the distribution `D`.
    ///
    pub fn sample<T, D>(&mut self, distr: D) -> T
    where
        D: Distribution<T>,
    {
        self.rng.sample::<T, D>(distr)
    }

    ///
    /// Returns the scheduler's rng.
    ///
    pub fn rng(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

impl<A> Scheduler<A> {
    ///
    /// Schedules `action` to be executed in `delay` time units.
    ///
    /// The event inherits the context of the currently executing event.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidDelay`] if `delay` is negative, or
    /// [`SchedulerError::EngineStopped`] if the scheduler was destroyed.
    ///
    pub fn schedule<F>(&mut self, delay: Duration, action: F) -> Result<EventHandle, SchedulerError>
    where
        F: FnOnce(&mut Scheduler<A>) -> Result<(), RuntimeError> + 'static,
    {
        self.insert(self.context, delay, Box::new(action))
    }

    ///
    /// Schedules `action` in `delay` time units, executing on behalf
    /// of `context`.
    ///
    /// # Errors
    ///
    /// See [`schedule`](Self::schedule).
    ///
    pub fn schedule_with_context<F>(
        &mut self,
        context: impl Into<ContextId>,
        delay: Duration,
        action: F,
    ) -> Result<EventHandle, SchedulerError>
    where
        F: FnOnce(&mut Scheduler<A>) -> Result<(), RuntimeError> + 'static,
    {
        self.insert(Some(context.into()), delay, Box::new(action))
    }

    ///
    /// Schedules `action` in `delay` time units without a context,
    /// even when called from an event that has one.
    ///
    /// # Errors
    ///
    /// See [`schedule`](Self::schedule).
    ///
    pub fn schedule_detached<F>(
        &mut self,
        delay: Duration,
        action: F,
    ) -> Result<EventHandle, SchedulerError>
    where
        F: FnOnce(&mut Scheduler<A>) -> Result<(), RuntimeError> + 'static,
    {
        self.insert(None, delay, Box::new(action))
    }

    ///
    /// Schedules `action` for the current instant. It runs after all
    /// events already queued for this instant.
    ///
    /// # Errors
    ///
    /// See [`schedule`](Self::schedule).
    ///
    pub fn schedule_now<F>(&mut self, action: F) -> Result<EventHandle, SchedulerError>
    where
        F: FnOnce(&mut Scheduler<A>) -> Result<(), RuntimeError> + 'static,
    {
        self.schedule(Duration::ZERO, action)
    }

    ///
    /// Schedules `action` at the absolute time `time`.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidDelay`] if `time` lies in the past,
    /// carrying the negative difference, or [`Duration::MIN`] if the
    /// difference is not representable.
    ///
    pub fn schedule_at<F>(&mut self, time: SimTime, action: F) -> Result<EventHandle, SchedulerError>
    where
        F: FnOnce(&mut Scheduler<A>) -> Result<(), RuntimeError> + 'static,
    {
        let delay = time
            .since_epoch()
            .checked_sub(self.now.since_epoch())
            .ok_or(SchedulerError::InvalidDelay(Duration::MIN))?;
        self.schedule(delay, action)
    }

    ///
    /// Schedules a typed [`Event`] in `delay` time units.
    ///
    /// # Errors
    ///
    /// See [`schedule`](Self::schedule).
    ///
    pub fn schedule_event(
        &mut self,
        delay: Duration,
        event: impl Event<A>,
    ) -> Result<EventHandle, SchedulerError>
    where
        A: 'static,
    {
        self.schedule(delay, move |rt| event.handle(rt))
    }

    fn insert(
        &mut self,
        context: Option<ContextId>,
        delay: Duration,
        action: Action<A>,
    ) -> Result<EventHandle, SchedulerError> {
        if self.state == State::Destroyed {
            return Err(SchedulerError::EngineStopped);
        }
        if delay.is_negative() {
            return Err(SchedulerError::InvalidDelay(delay));
        }
        let time = self
            .now
            .checked_add(delay)
            .ok_or(SchedulerError::InvalidDelay(delay))?;

        let node = EventNode {
            time,
            id: self.event_id,
            context,
            action,
        };
        self.event_id += 1;

        let handle = node.handle();
        tracing::trace!(id = handle.id, t = %time, "scheduled event");
        self.future_event_set.add(node);
        Ok(handle)
    }

    ///
    /// Cancels a pending event. Returns whether the event was pending.
    ///
    /// Cancelling an event that already fired, or was already cancelled,
    /// has no effect.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::EngineStopped`] if the scheduler was destroyed.
    ///
    pub fn cancel(&mut self, handle: &EventHandle) -> Result<bool, SchedulerError> {
        if self.state == State::Destroyed {
            return Err(SchedulerError::EngineStopped);
        }
        let cancelled = self.future_event_set.cancel(handle.id);
        if cancelled {
            tracing::trace!(id = handle.id, "cancelled event");
        }
        Ok(cancelled)
    }

    ///
    /// Whether the referenced event is still queued and not cancelled.
    ///
    #[must_use]
    pub fn is_pending(&self, handle: &EventHandle) -> bool {
        self.future_event_set.is_pending(handle.id)
    }

    ///
    /// Whether the referenced event fired or was cancelled.
    ///
    #[must_use]
    pub fn is_expired(&self, handle: &EventHandle) -> bool {
        !self.is_pending(handle)
    }

    ///
    /// The time left until the referenced event fires, or
    /// [`Duration::ZERO`] if it is no longer pending.
    ///
    #[must_use]
    pub fn delay_left(&self, handle: &EventHandle) -> Duration {
        if self.is_pending(handle) {
            handle.time.since_epoch().saturating_sub_non_negative(self.now.since_epoch())
        } else {
            Duration::ZERO
        }
    }

    ///
    /// Requests the active run to return once the current event
    /// has been processed. Calling `stop` multiple times is equivalent
    /// to calling it once. Has no effect on subsequent runs.
    ///
    pub fn stop(&mut self) {
        if !self.stop_requested {
            tracing::debug!(t = %self.now, "stop requested");
        }
        self.stop_requested = true;
    }

    ///
    /// Drops all pending events without executing them.
    ///
    /// Afterwards [`schedule`](Self::schedule) and [`cancel`](Self::cancel)
    /// fail with [`SchedulerError::EngineStopped`].
    ///
    pub fn destroy(&mut self) {
        let dropped = self.future_event_set.clear();
        self.state = State::Destroyed;
        tracing::debug!(t = %self.now, dropped, "scheduler destroyed");
    }

    /// Runs the simulation until no events are left, [`stop`](Self::stop)
    /// was called or the configured [`RunLimit`] applies.
    ///
    /// A run can be resumed by calling `run` again.
    ///
    /// # Errors
    ///
    /// Returns the error of the first event action that failed. The failed
    /// event is consumed, all other events remain queued.
    ///
    /// # Panics
    ///
    /// Panics if called from within an event of the same scheduler.
    pub fn run(&mut self) -> Result<Profiler, RuntimeError> {
        assert_ne!(
            self.state,
            State::Running,
            "Scheduler::run can not be called from within an event"
        );

        let mut profiler = Profiler::start();
        if self.state == State::Destroyed {
            tracing::warn!("run called on a destroyed scheduler");
            profiler.finish(RunOutcome::Destroyed, self.now);
            return Ok(profiler);
        }

        let itr_start = self.itr;
        let cancelled_start = self.num_events_cancelled();
        let empty = self.future_event_set.len_pending() == 0;

        tracing::debug!(
            t = %self.now,
            pending = self.future_event_set.len_pending(),
            queued = self.future_event_set.len(),
            limit = %self.limit,
            "starting run on {}",
            self.future_event_set.descriptor()
        );

        self.state = State::Running;
        self.stop_requested = false;

        let outcome = loop {
            if self.state == State::Destroyed {
                break RunOutcome::Destroyed;
            }
            if self.stop_requested {
                break RunOutcome::Stopped;
            }
            match self.dispatch_event() {
                Ok(Some(outcome)) => break outcome,
                Ok(None) => {}
                Err(e) => {
                    self.leave_running();
                    self.context = None;
                    return Err(e);
                }
            }
        };
        self.leave_running();

        let outcome = if empty && outcome == RunOutcome::Finished {
            RunOutcome::Empty
        } else {
            outcome
        };

        profiler.event_count = self.itr - itr_start;
        profiler.cancelled_count = self.num_events_cancelled() - cancelled_start;
        profiler.finish(outcome, self.now);

        if !self.quiet {
            tracing::info!("{profiler}");
        }
        Ok(profiler)
    }

    fn leave_running(&mut self) {
        if self.state == State::Running {
            self.state = State::Ready;
        }
    }

    /// Processes the next event in the future event set by calling its action.
    /// Returns `Some(outcome)` if the run should end.
    fn dispatch_event(&mut self) -> Result<Option<RunOutcome>, RuntimeError> {
        let Some((time, id)) = self.future_event_set.peek_next() else {
            return Ok(Some(RunOutcome::Finished));
        };

        if let Some(bound) = self.limit.exceeded(self.itr, time) {
            tracing::debug!(id, t = %time, "limit reached: {bound}");
            return Ok(Some(RunOutcome::LimitReached));
        }

        let Some(node) = self.future_event_set.fetch_next() else {
            return Ok(Some(RunOutcome::Finished));
        };

        self.itr += 1;

        // Let this be the only position where the clock is changed
        self.now = node.time;
        let prev_context = mem::replace(&mut self.context, node.context);

        let span = tracing::trace_span!(
            "event",
            id = node.id,
            t = %node.time,
            ctx = tracing::field::Empty
        );
        if let Some(ctx) = node.context {
            span.record("ctx", ctx.as_u32());
        }
        let _guard = span.enter();

        let id = node.id;
        let result = (node.action)(self);
        self.context = prev_context;

        if let Err(e) = result {
            tracing::error!(id, "event failed: {e}");
            return Err(e);
        }
        Ok(None)
    }
}

impl<A: Default> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new(A::default())
    }
}

impl<A> Debug for Scheduler<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Scheduler<{}> {{ now: {} (itr {} / {}) scheduled: {} pending: {} }}",
            type_name::<A>(),
            self.now,
            self.num_events_dispatched(),
            self.limit,
            self.num_events_scheduled(),
            self.num_events_pending()
        )
    }
}

impl<A> Display for Scheduler<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}
