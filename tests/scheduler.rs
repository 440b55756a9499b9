use std::{cell::RefCell, rc::Rc};
use wave_des::prelude::*;

/// The application state: a journal of executed events.
#[derive(Debug, Default)]
struct App {
    event_list: Vec<(SimTime, &'static str)>,
}

fn record(name: &'static str) -> impl FnOnce(&mut Scheduler<App>) -> Result<(), RuntimeError> {
    move |rt| {
        let now = rt.now();
        rt.app.event_list.push((now, name));
        Ok(())
    }
}

fn names(rt: &Scheduler<App>) -> Vec<&'static str> {
    rt.app.event_list.iter().map(|(_, name)| *name).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RepeatWithDelay {
    delay: Duration,
    repeat: usize,
    repeat_limit: usize,
}

impl Event<App> for RepeatWithDelay {
    fn handle(mut self, rt: &mut Scheduler<App>) -> Result<(), RuntimeError> {
        let now = rt.now();
        rt.app.event_list.push((now, "repeat"));
        if self.repeat < self.repeat_limit {
            let delay = self.delay;
            self.repeat += 1;
            rt.schedule_event(delay, self)?;
        }
        Ok(())
    }
}

#[test]
fn zero_event_runtime() {
    let mut rt = Builder::seeded(1).quiet().build(App::default());
    let profiler = rt.run().unwrap();
    assert_eq!(profiler.outcome, RunOutcome::Empty);
    assert_eq!(profiler.event_count, 0);
    assert_eq!(rt.now(), SimTime::ZERO);
}

#[test]
fn one_event_repeats() {
    let mut rt = Builder::seeded(1).quiet().build(App::default());
    rt.schedule_event(
        Duration::ZERO,
        RepeatWithDelay {
            delay: Duration::from_secs(1),
            repeat: 0,
            repeat_limit: 15,
        },
    )
    .unwrap();

    let profiler = rt.run().unwrap();
    assert_eq!(profiler.outcome, RunOutcome::Finished);
    assert_eq!(profiler.event_count, 16);
    assert_eq!(profiler.time, SimTime::from(15.0));
    assert_eq!(rt.app.event_list.last(), Some(&(SimTime::from(15.0), "repeat")));
}

#[test]
fn equal_times_keep_call_order() {
    let mut rt = Builder::seeded(1).quiet().build(App::default());
    rt.schedule(Duration::from_secs(1), record("A")).unwrap();
    rt.schedule(Duration::from_secs(1), record("B")).unwrap();
    rt.schedule(Duration::from_millis(500), record("C")).unwrap();
    rt.run().unwrap();

    assert_eq!(names(&rt), vec!["C", "A", "B"]);
    assert_eq!(
        rt.app.event_list,
        vec![
            (SimTime::from(0.5), "C"),
            (SimTime::from(1.0), "A"),
            (SimTime::from(1.0), "B"),
        ]
    );
}

#[test]
fn order_independent_of_context() {
    let mut rt = Builder::seeded(1).quiet().build(App::default());
    rt.schedule_with_context(ContextId::new(9), Duration::from_secs(1), record("first"))
        .unwrap();
    rt.schedule_with_context(ContextId::new(1), Duration::from_secs(1), record("second"))
        .unwrap();
    rt.schedule(Duration::from_secs(1), record("third")).unwrap();
    rt.run().unwrap();
    assert_eq!(names(&rt), vec!["first", "second", "third"]);
}

#[test]
fn execution_order_sorted_by_fire_time() {
    let delays = [7_i64, 3, 3, 9, 0, 1, 7, 2, 0, 5];
    let mut rt = Builder::seeded(1).quiet().build(Vec::new());
    for (i, d) in delays.iter().enumerate() {
        rt.schedule(Duration::from_millis(*d), move |rt| {
            let now = rt.now();
            rt.app.push((now, i));
            Ok(())
        })
        .unwrap();
    }
    rt.run().unwrap();

    let mut expected: Vec<(SimTime, usize)> = delays
        .iter()
        .enumerate()
        .map(|(i, d)| (SimTime::ZERO + Duration::from_millis(*d), i))
        .collect();
    expected.sort();
    assert_eq!(rt.app, expected);
}

#[test]
fn zero_delay_runs_after_earlier_ids() {
    let mut rt = Builder::seeded(1).quiet().build(App::default());
    rt.schedule(Duration::from_secs(1), |rt| {
        record("A")(rt)?;
        rt.schedule(Duration::ZERO, |rt| {
            record("A.0")(rt)?;
            rt.schedule_now(record("A.0.0"))?;
            Ok(())
        })?;
        rt.schedule(Duration::ZERO, record("A.1"))?;
        Ok(())
    })
    .unwrap();
    rt.schedule(Duration::from_secs(1), record("B")).unwrap();
    rt.schedule(Duration::from_secs(1), record("C")).unwrap();

    rt.run().unwrap();
    assert_eq!(names(&rt), vec!["A", "B", "C", "A.0", "A.1", "A.0.0"]);
    assert!(rt.app.event_list.iter().all(|(t, _)| *t == SimTime::from(1.0)));
}

#[test]
fn now_equals_schedule_time_plus_delay() {
    let mut rt = Builder::seeded(1).quiet().build(Vec::new());
    rt.schedule(Duration::from_millis(250), |rt| {
        let at_schedule = rt.now();
        for d in [0, 1, 40, 1_000] {
            let d = Duration::from_millis(d);
            rt.schedule(d, move |rt| {
                let ok = rt.now() == at_schedule + d;
                rt.app.push(ok);
                Ok(())
            })?;
        }
        Ok(())
    })
    .unwrap();
    rt.run().unwrap();
    assert_eq!(rt.app, vec![true; 4]);
}

#[test]
fn cancel_before_and_after_firing() {
    let mut rt = Builder::seeded(1).quiet().build(App::default());
    let a = rt.schedule(Duration::from_secs(1), record("A")).unwrap();
    let b = rt.schedule(Duration::from_secs(2), record("B")).unwrap();

    assert!(rt.cancel(&b).unwrap());
    assert!(!rt.cancel(&b).unwrap());

    let profiler = rt.run().unwrap();
    assert_eq!(names(&rt), vec!["A"]);
    assert_eq!(profiler.cancelled_count, 1);
    // fired already, no error
    assert_eq!(rt.cancel(&a), Ok(false));
}

#[test]
fn cancel_from_within_event() {
    let handles = Rc::new(RefCell::new(Vec::new()));
    let mut rt = Builder::seeded(1).quiet().build(App::default());

    let h = handles.clone();
    rt.schedule(Duration::from_secs(1), move |rt| {
        for handle in h.borrow().iter() {
            rt.cancel(handle)?;
        }
        Ok(())
    })
    .unwrap();
    let victim = rt.schedule(Duration::from_secs(1), record("same instant")).unwrap();
    let later = rt.schedule(Duration::from_secs(5), record("later")).unwrap();
    handles.borrow_mut().extend([victim, later]);
    rt.schedule(Duration::from_secs(3), record("survivor")).unwrap();

    rt.run().unwrap();
    assert_eq!(names(&rt), vec!["survivor"]);
    assert_eq!(rt.num_events_cancelled(), 2);
    assert_eq!(rt.now(), SimTime::from(3.0));
}

#[test]
fn negative_delay_is_rejected() {
    let mut rt = Builder::seeded(1).quiet().build(App::default());
    let err = rt
        .schedule(Duration::from_millis(-1), record("never"))
        .unwrap_err();
    assert_eq!(err, SchedulerError::InvalidDelay(Duration::from_millis(-1)));
    assert_eq!(rt.num_events_pending(), 0);

    rt.schedule(Duration::from_secs(2), |rt| {
        let err = rt.schedule_at(SimTime::from(1.0), |_| Ok(())).unwrap_err();
        assert_eq!(err, SchedulerError::InvalidDelay(Duration::from_secs(-1)));
        Ok(())
    })
    .unwrap();
    rt.run().unwrap();
}

#[test]
fn destroy_discards_pending_events() {
    let mut rt = Builder::seeded(1).quiet().build(App::default());
    let a = rt.schedule(Duration::from_secs(1), record("A")).unwrap();
    rt.schedule(Duration::from_secs(2), record("B")).unwrap();

    rt.destroy();
    assert!(rt.is_destroyed());
    assert_eq!(rt.num_events_pending(), 0);
    assert_eq!(
        rt.schedule(Duration::from_secs(1), record("C")).unwrap_err(),
        SchedulerError::EngineStopped
    );
    assert_eq!(rt.cancel(&a), Err(SchedulerError::EngineStopped));

    let profiler = rt.run().unwrap();
    assert_eq!(profiler.outcome, RunOutcome::Destroyed);
    assert!(rt.app.event_list.is_empty());
}

#[test]
fn destroy_from_within_event() {
    let mut rt = Builder::seeded(1).quiet().build(App::default());
    rt.schedule(Duration::from_secs(1), |rt| {
        rt.destroy();
        Ok(())
    })
    .unwrap();
    rt.schedule(Duration::from_secs(2), record("B")).unwrap();

    let profiler = rt.run().unwrap();
    assert_eq!(profiler.outcome, RunOutcome::Destroyed);
    assert_eq!(profiler.event_count, 1);
    assert!(rt.is_destroyed());
    assert!(rt.app.event_list.is_empty());
    assert_eq!(rt.now(), SimTime::from(1.0));
}

#[test]
fn stop_before_run_is_ignored() {
    let mut rt = Builder::seeded(1).quiet().build(App::default());
    rt.schedule(Duration::from_secs(1), record("A")).unwrap();
    rt.stop();
    let profiler = rt.run().unwrap();
    assert_eq!(profiler.outcome, RunOutcome::Finished);
    assert_eq!(names(&rt), vec!["A"]);
}

#[test]
fn event_count_limit() {
    let mut rt = Builder::seeded(1).quiet().max_itr(2).build(App::default());
    for name in ["A", "B", "C"] {
        rt.schedule(Duration::from_secs(1), record(name)).unwrap();
    }
    let profiler = rt.run().unwrap();
    assert_eq!(profiler.outcome, RunOutcome::LimitReached);
    assert_eq!(names(&rt), vec!["A", "B"]);
    assert_eq!(rt.num_events_pending(), 1);
}

#[test]
fn cancelled_events_are_skipped_before_limits() {
    let mut rt = Builder::seeded(1)
        .quiet()
        .max_time(SimTime::from(4.0))
        .build(App::default());
    rt.schedule(Duration::from_secs(1), record("A")).unwrap();
    let b = rt.schedule(Duration::from_secs(3), record("B")).unwrap();
    rt.schedule(Duration::from_secs(5), record("C")).unwrap();
    rt.cancel(&b).unwrap();

    let profiler = rt.run().unwrap();
    assert_eq!(profiler.outcome, RunOutcome::LimitReached);
    assert_eq!(profiler.cancelled_count, 1);
    assert_eq!(names(&rt), vec!["A"]);
    assert_eq!(rt.now(), SimTime::from(1.0));

    // the discarded event did not move the clock
    rt.schedule(Duration::from_secs(1), record("D")).unwrap();
    rt.run().unwrap();
    assert_eq!(names(&rt), vec!["A", "D"]);
    assert_eq!(rt.num_events_pending(), 1);
}

#[test]
fn action_errors_propagate() {
    #[derive(Debug, thiserror::Error)]
    #[error("radio on fire")]
    struct RadioError;

    let mut rt = Builder::seeded(1).quiet().build(App::default());
    rt.schedule(Duration::from_secs(1), |_| Err(RadioError.into()))
        .unwrap();
    rt.schedule(Duration::from_secs(2), record("B")).unwrap();

    let err = rt.run().unwrap_err();
    assert!(err.downcast_ref::<RadioError>().is_some());
    assert_eq!(err.to_string(), "radio on fire");
    assert_eq!(rt.now(), SimTime::from(1.0));

    // resuming continues with the remaining events
    rt.run().unwrap();
    assert_eq!(names(&rt), vec!["B"]);
}

#[test]
fn same_seed_same_trajectory() {
    fn simulate(seed: u64) -> Vec<(SimTime, u32)> {
        let mut rt = Builder::seeded(seed).quiet().build(Vec::new());
        for _ in 0..20 {
            let delay = Duration::from_millis(rt.random::<u8>().into());
            rt.schedule(delay, |rt| {
                let now = rt.now();
                let value = rt.random();
                rt.app.push((now, value));
                Ok(())
            })
            .unwrap();
        }
        rt.run().unwrap();
        rt.app
    }

    assert_eq!(simulate(42), simulate(42));
    assert_ne!(simulate(42), simulate(43));
}
