use super::{ContextId, EventHandle, RuntimeError, Scheduler, SchedulerError};
use crate::time::Duration;
use std::{cell::RefCell, rc::Rc};

///
/// A repeating event that reschedules itself after each execution,
/// like a traffic generator emitting `count` packets spaced by
/// `interval`.
///
/// ```
/// use wave_des::prelude::*;
///
/// let mut rt = Builder::seeded(1).quiet().build(Vec::new());
/// Periodic::new(Duration::from_millis(100))
///     .count(3)
///     .start(&mut rt, |rt, n| {
///         let now = rt.now();
///         rt.app.push((n, now));
///         Ok(())
///     })?;
///
/// rt.run().expect("no tick fails");
/// assert_eq!(rt.app.len(), 3);
/// assert_eq!(rt.app[2], (2, SimTime::from(0.2)));
/// # Ok::<(), SchedulerError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Periodic {
    interval: Duration,
    start_in: Duration,
    count: Option<usize>,
    context: Option<ContextId>,
}

#[derive(Debug, Default)]
struct PeriodicState {
    next: Option<EventHandle>,
    fired: usize,
    cancelled: bool,
    finished: bool,
}

/// Controls a running [`Periodic`] chain.
#[derive(Debug, Clone)]
pub struct PeriodicHandle {
    state: Rc<RefCell<PeriodicState>>,
}

impl Periodic {
    /// A generator that ticks every `interval`, forever, starting now.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            start_in: Duration::ZERO,
            count: None,
            context: None,
        }
    }

    /// Limits the generator to `n` ticks.
    pub fn count(mut self, n: usize) -> Self {
        self.count = Some(n);
        self
    }

    /// Delays the first tick by `delay`.
    pub fn start_in(mut self, delay: Duration) -> Self {
        self.start_in = delay;
        self
    }

    /// Executes all ticks on behalf of `context`.
    pub fn context(mut self, context: impl Into<ContextId>) -> Self {
        self.context = Some(context.into());
        self
    }

    ///
    /// Schedules the first tick. `f` receives the zero-based tick index.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::InvalidDelay`] if the interval or the start
    /// delay is negative, [`SchedulerError::EngineStopped`] if the scheduler
    /// was destroyed.
    ///
    pub fn start<A, F>(self, rt: &mut Scheduler<A>, f: F) -> Result<PeriodicHandle, SchedulerError>
    where
        A: 'static,
        F: FnMut(&mut Scheduler<A>, usize) -> Result<(), RuntimeError> + 'static,
    {
        if self.interval.is_negative() {
            return Err(SchedulerError::InvalidDelay(self.interval));
        }

        let state = Rc::new(RefCell::new(PeriodicState::default()));
        if self.count == Some(0) {
            state.borrow_mut().finished = true;
            return Ok(PeriodicHandle { state });
        }

        let st = state.clone();
        let action = move |rt: &mut Scheduler<A>| tick(rt, f, self, st);
        let handle = match self.context {
            Some(ctx) => rt.schedule_with_context(ctx, self.start_in, action)?,
            None => rt.schedule(self.start_in, action)?,
        };
        state.borrow_mut().next = Some(handle);

        Ok(PeriodicHandle { state })
    }
}

fn tick<A, F>(
    rt: &mut Scheduler<A>,
    mut f: F,
    periodic: Periodic,
    state: Rc<RefCell<PeriodicState>>,
) -> Result<(), RuntimeError>
where
    A: 'static,
    F: FnMut(&mut Scheduler<A>, usize) -> Result<(), RuntimeError> + 'static,
{
    let n = {
        let mut s = state.borrow_mut();
        s.next = None;
        s.fired += 1;
        s.fired - 1
    };

    // A failed tick ends the chain.
    if let Err(e) = f(rt, n) {
        state.borrow_mut().finished = true;
        return Err(e);
    }

    let again = {
        let s = state.borrow();
        !s.cancelled && periodic.count.map_or(true, |count| s.fired < count)
    };
    if !again || rt.is_destroyed() {
        state.borrow_mut().finished = true;
        return Ok(());
    }

    // Inherits the context of this tick.
    let st = state.clone();
    let handle = rt.schedule(periodic.interval, move |rt| tick(rt, f, periodic, st))?;
    state.borrow_mut().next = Some(handle);
    Ok(())
}

impl PeriodicHandle {
    ///
    /// Stops the chain. The pending tick is cancelled, a tick that is
    /// currently executing completes but does not reschedule itself.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::EngineStopped`] if the scheduler was destroyed.
    ///
    pub fn cancel<A>(&self, rt: &mut Scheduler<A>) -> Result<(), SchedulerError> {
        let next = {
            let mut s = self.state.borrow_mut();
            s.cancelled = true;
            s.finished = s.next.is_some() || s.finished;
            s.next.take()
        };
        if let Some(handle) = next {
            rt.cancel(&handle)?;
        }
        Ok(())
    }

    /// The number of ticks that were executed so far.
    #[must_use]
    pub fn fired(&self) -> usize {
        self.state.borrow().fired
    }

    /// Whether more ticks will follow. This is `false` once the chain was
    /// cancelled, reached its count or a tick returned an error.
    #[must_use]
    pub fn is_active(&self) -> bool {
        let s = self.state.borrow();
        !s.cancelled && !s.finished
    }

    /// The handle of the next pending tick.
    #[must_use]
    pub fn next_tick(&self) -> Option<EventHandle> {
        self.state.borrow().next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::*;

    #[test]
    fn fires_count_times() {
        let mut rt = Builder::seeded(0).quiet().build(Vec::new());
        let handle = Periodic::new(Duration::from_secs(1))
            .start_in(Duration::from_millis(500))
            .count(3)
            .start(&mut rt, |rt, n| {
                let now = rt.now();
                rt.app.push((n, now));
                Ok(())
            })
            .unwrap();

        assert!(handle.is_active());
        rt.run().unwrap();
        assert_eq!(
            rt.app,
            vec![
                (0, SimTime::from(0.5)),
                (1, SimTime::from(1.5)),
                (2, SimTime::from(2.5)),
            ]
        );
        assert_eq!(handle.fired(), 3);
        assert!(!handle.is_active());
        assert_eq!(handle.next_tick(), None);
    }

    #[test]
    fn zero_count_schedules_nothing() {
        let mut rt = Builder::seeded(0).quiet().build(());
        let handle = Periodic::new(Duration::from_secs(1))
            .count(0)
            .start(&mut rt, |_, _| Ok(()))
            .unwrap();
        assert!(!handle.is_active());
        assert_eq!(rt.num_events_pending(), 0);
    }

    #[test]
    fn cancel_from_outside_stops_chain() {
        let mut rt = Builder::seeded(0).quiet().build(0usize);
        let handle = Periodic::new(Duration::from_secs(1))
            .start(&mut rt, |rt, _| {
                rt.app += 1;
                Ok(())
            })
            .unwrap();

        let h = handle.clone();
        rt.schedule(Duration::from_millis(2_500), move |rt| {
            h.cancel(rt)?;
            Ok(())
        })
        .unwrap();

        rt.run().unwrap();
        // ticks at 0, 1, 2
        assert_eq!(rt.app, 3);
        assert_eq!(handle.fired(), 3);
        assert!(!handle.is_active());
        assert_eq!(rt.num_events_cancelled(), 1);
    }

    #[test]
    fn cancel_from_inside_tick() {
        let mut rt = Builder::seeded(0).quiet().build(None::<PeriodicHandle>);
        let handle = Periodic::new(Duration::from_millis(100))
            .context(ContextId::new(4))
            .start(&mut rt, |rt, n| {
                assert_eq!(rt.context(), Some(ContextId::new(4)));
                if n == 1 {
                    if let Some(h) = rt.app.take() {
                        h.cancel(rt)?;
                    }
                }
                Ok(())
            })
            .unwrap();
        rt.app = Some(handle.clone());

        rt.run().unwrap();
        assert_eq!(handle.fired(), 2);
        assert_eq!(rt.now(), SimTime::from(0.1));
    }

    #[test]
    fn rejects_negative_interval() {
        let mut rt = Builder::seeded(0).quiet().build(());
        let err = Periodic::new(Duration::from_secs(-1))
            .start(&mut rt, |_, _| Ok(()))
            .unwrap_err();
        assert_eq!(err, SchedulerError::InvalidDelay(Duration::from_secs(-1)));
    }

    #[test]
    fn failing_tick_ends_chain() {
        #[derive(Debug, thiserror::Error)]
        #[error("generator broke")]
        struct Broken;

        let mut rt = Builder::seeded(0).quiet().build(0usize);
        let handle = Periodic::new(Duration::from_secs(1))
            .count(5)
            .start(&mut rt, |rt, n| {
                rt.app += 1;
                if n == 1 {
                    return Err(Broken.into());
                }
                Ok(())
            })
            .unwrap();

        let err = rt.run().unwrap_err();
        assert!(err.downcast_ref::<Broken>().is_some());
        assert_eq!(handle.fired(), 2);
        assert!(!handle.is_active());
        assert_eq!(handle.next_tick(), None);

        // nothing left to resume
        let profiler = rt.run().unwrap();
        assert_eq!(profiler.event_count, 0);
        assert_eq!(rt.app, 2);
        assert!(!handle.is_active());
    }
}
