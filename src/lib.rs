//!
//! A deterministic discrete event scheduler for vehicular network
//! simulations, together with channel observation statistics.
//!
//! # Scheduling
//!
//! The [`Scheduler`](runtime::Scheduler) processes events in strict
//! `(time, insertion order)` sequence. Each event is a closure receiving
//! the scheduler itself, so it may schedule follow-up events, cancel
//! pending ones or stop the run. Events carry an optional
//! [`ContextId`](runtime::ContextId) that names the entity (e.g. a node)
//! they execute on behalf of. Events scheduled from within an event inherit
//! its context.
//!
//! ```
//! use wave_des::prelude::*;
//!
//! let mut rt = Builder::seeded(7).quiet().build(ChannelStats::default());
//!
//! // Broadcast every 100ms from node 1, ten times.
//! Periodic::new(Duration::from_millis(100))
//!     .context(ContextId::new(1))
//!     .count(10)
//!     .start(&mut rt, |rt, _| {
//!         rt.app.increment_tx_packet_count();
//!         rt.app.increment_expected(1)?;
//!         if rt.random::<f64>() < 0.9 {
//!             rt.app.increment_in_range(1)?;
//!         }
//!         Ok(())
//!     })?;
//!
//! let profiler = rt.run().expect("no event fails");
//! assert_eq!(profiler.event_count, 10);
//! assert_eq!(rt.app.tx_packet_count(), 10);
//! assert!(rt.app.pdr(1)? <= 1.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Statistics
//!
//! [`ChannelStats`](stats::ChannelStats) tracks expected and in-range
//! receptions per observation slot and derives packet delivery ratios.
//! [`IttTable`](stats::IttTable) maps a channel busy ratio onto a
//! transmit rate.
//!
//! # Logging
//!
//! All components log through [`tracing`](https://docs.rs/tracing).
//! [`tracing::init`] installs a subscriber that prints the simulation time
//! and context of the emitting event.
//!
//! # Features
//!
//! | Feature | Description                                                        |
//! |---------|--------------------------------------------------------------------|
//! | serde   | Serialization of time primitives, contexts and statistics (default). |

#![warn(missing_debug_implementations)]

pub mod prelude;

pub mod runtime;
pub mod stats;
pub mod time;
pub mod tracing;
