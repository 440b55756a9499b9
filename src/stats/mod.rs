//!
//! Channel observation counters.
//!
//! A [`ChannelStats`] instance tracks, for a fixed number of observation
//! slots (e.g. distance bands around a transmitter), how many receptions were
//! expected and how many actually arrived while in range. From these counters
//! the packet delivery ratio (PDR) of each slot is derived, both for the
//! current measurement window and cumulatively.
//!
//! Slots are addressed **1-based**, `1..=slot_count()`.
//!
//! ```
//! use wave_des::stats::ChannelStats;
//!
//! let mut stats = ChannelStats::default();
//! for _ in 0..10 {
//!     stats.increment_expected(1)?;
//! }
//! for _ in 0..7 {
//!     stats.increment_in_range(1)?;
//! }
//! assert_eq!(stats.pdr(1)?, 0.7);
//! # Ok::<(), wave_des::stats::StatsError>(())
//! ```
#![allow(clippy::cast_precision_loss)]

use thiserror::Error;

mod rate;
pub use rate::*;

/// The number of slots used by [`ChannelStats::default`].
pub const DEFAULT_SLOT_COUNT: usize = 10;

/// An error raised by slot based accessors of [`ChannelStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatsError {
    /// The slot index lies outside of `1..=slots`.
    #[error("invalid slot {slot}: expected a slot in 1..={slots}")]
    InvalidSlot {
        /// The rejected slot index.
        slot: usize,
        /// The number of configured slots.
        slots: usize,
    },
}

/// The counters of a single observation slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SlotCounters {
    /// Expected receptions in the current window.
    pub expected: u64,
    /// In-range receptions in the current window.
    pub in_range: u64,
    /// Expected receptions since the last [`reset_window`](ChannelStats::reset_window).
    pub total_expected: u64,
    /// In-range receptions since the last [`reset_window`](ChannelStats::reset_window).
    pub total_in_range: u64,
}

impl SlotCounters {
    /// The windowed delivery ratio, clamped to `[0, 1]`.
    #[must_use]
    pub fn pdr(&self) -> f64 {
        ratio(self.in_range, self.expected)
    }

    /// The cumulative delivery ratio, clamped to `[0, 1]`.
    #[must_use]
    pub fn cumulative_pdr(&self) -> f64 {
        ratio(self.total_in_range, self.total_expected)
    }
}

// Late in-range receipts from moving nodes may overshoot the expectation.
fn ratio(in_range: u64, expected: u64) -> f64 {
    if expected == 0 {
        return 0.0;
    }
    (in_range as f64 / expected as f64).min(1.0)
}

///
/// Per-slot reception counters plus global packet and byte counters
/// of a simulated channel.
///
/// The object is a plain value. Inside a simulation it is usually placed
/// in the scheduler's application state, so that every event can update it.
///
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelStats {
    slots: Vec<SlotCounters>,

    tx_packets: u64,
    tx_bytes: u64,
    rx_packets: u64,

    logging: bool,
}

impl ChannelStats {
    /// Creates a new instance with `slots` observation slots.
    ///
    /// Zero slots is valid: the packet counters still work, every slot
    /// accessor returns [`StatsError::InvalidSlot`]. A deserialized
    /// instance with an empty slot list behaves the same.
    #[must_use]
    pub fn new(slots: usize) -> Self {
        Self {
            slots: vec![SlotCounters::default(); slots],
            tx_packets: 0,
            tx_bytes: 0,
            rx_packets: 0,
            logging: false,
        }
    }

    /// The number of configured slots.
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    ///
    /// Returns the counters of `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidSlot`] if `slot` is not in `1..=slot_count()`.
    ///
    pub fn slot(&self, slot: usize) -> Result<&SlotCounters, StatsError> {
        let slots = self.slots.len();
        slot.checked_sub(1)
            .and_then(|i| self.slots.get(i))
            .ok_or(StatsError::InvalidSlot { slot, slots })
    }

    fn slot_mut(&mut self, slot: usize) -> Result<&mut SlotCounters, StatsError> {
        let slots = self.slots.len();
        slot.checked_sub(1)
            .and_then(|i| self.slots.get_mut(i))
            .ok_or(StatsError::InvalidSlot { slot, slots })
    }

    /// Iterates over all slots, yielding their 1-based index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &SlotCounters)> {
        self.slots.iter().enumerate().map(|(i, c)| (i + 1, c))
    }

    ///
    /// Records one expected reception for `slot`, in both the
    /// windowed and the cumulative counter.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidSlot`] if `slot` is out of range.
    ///
    pub fn increment_expected(&mut self, slot: usize) -> Result<(), StatsError> {
        let logging = self.logging;
        let counters = self.slot_mut(slot)?;
        counters.expected += 1;
        counters.total_expected += 1;
        if logging {
            tracing::trace!(slot, expected = counters.expected, "expected reception");
        }
        Ok(())
    }

    ///
    /// Records one in-range reception for `slot`, in both the
    /// windowed and the cumulative counter.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidSlot`] if `slot` is out of range.
    ///
    pub fn increment_in_range(&mut self, slot: usize) -> Result<(), StatsError> {
        let logging = self.logging;
        let counters = self.slot_mut(slot)?;
        counters.in_range += 1;
        counters.total_in_range += 1;
        if logging {
            tracing::trace!(slot, in_range = counters.in_range, "in-range reception");
        }
        Ok(())
    }

    /// Windowed expected receptions of `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidSlot`] if `slot` is out of range.
    pub fn expected(&self, slot: usize) -> Result<u64, StatsError> {
        self.slot(slot).map(|c| c.expected)
    }

    /// Windowed in-range receptions of `slot`.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidSlot`] if `slot` is out of range.
    pub fn in_range(&self, slot: usize) -> Result<u64, StatsError> {
        self.slot(slot).map(|c| c.in_range)
    }

    /// Overrides the windowed expected counter. The cumulative counter is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidSlot`] if `slot` is out of range.
    pub fn set_expected(&mut self, slot: usize, n: u64) -> Result<(), StatsError> {
        self.slot_mut(slot)?.expected = n;
        Ok(())
    }

    /// Overrides the windowed in-range counter. The cumulative counter is untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidSlot`] if `slot` is out of range.
    pub fn set_in_range(&mut self, slot: usize, n: u64) -> Result<(), StatsError> {
        self.slot_mut(slot)?.in_range = n;
        Ok(())
    }

    ///
    /// The packet delivery ratio of the current window: `in_range / expected`,
    /// `0.0` without expectations, clamped to `1.0`.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidSlot`] if `slot` is out of range.
    ///
    pub fn pdr(&self, slot: usize) -> Result<f64, StatsError> {
        self.slot(slot).map(SlotCounters::pdr)
    }

    ///
    /// The packet delivery ratio over the cumulative counters.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidSlot`] if `slot` is out of range.
    ///
    pub fn cumulative_pdr(&self, slot: usize) -> Result<f64, StatsError> {
        self.slot(slot).map(SlotCounters::cumulative_pdr)
    }

    ///
    /// Zeroes the **cumulative** counters of `slot`.
    ///
    /// The windowed counters keep their values, so [`pdr`](Self::pdr) is
    /// unaffected while [`cumulative_pdr`](Self::cumulative_pdr) restarts.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError::InvalidSlot`] if `slot` is out of range.
    ///
    pub fn reset_window(&mut self, slot: usize) -> Result<(), StatsError> {
        let counters = self.slot_mut(slot)?;
        counters.total_expected = 0;
        counters.total_in_range = 0;
        if self.logging {
            tracing::debug!(slot, "reset cumulative counters");
        }
        Ok(())
    }

    /// Records one transmitted packet.
    pub fn increment_tx_packet_count(&mut self) {
        self.tx_packets += 1;
    }

    /// Records `bytes` transmitted bytes.
    pub fn increment_tx_bytes(&mut self, bytes: u64) {
        self.tx_bytes += bytes;
    }

    /// Records one received packet.
    pub fn increment_rx_packet_count(&mut self) {
        self.rx_packets += 1;
    }

    #[must_use]
    pub fn tx_packet_count(&self) -> u64 {
        self.tx_packets
    }

    #[must_use]
    pub fn tx_byte_count(&self) -> u64 {
        self.tx_bytes
    }

    #[must_use]
    pub fn rx_packet_count(&self) -> u64 {
        self.rx_packets
    }

    /// Overrides the transmitted packet counter, e.g. when restoring a checkpoint.
    pub fn set_tx_packet_count(&mut self, count: u64) {
        self.tx_packets = count;
    }

    /// Overrides the received packet counter.
    pub fn set_rx_packet_count(&mut self, count: u64) {
        self.rx_packets = count;
    }

    /// Enables trace output for counter updates.
    pub fn set_logging(&mut self, logging: bool) {
        self.logging = logging;
    }

    #[must_use]
    pub fn logging(&self) -> bool {
        self.logging
    }
}

impl Default for ChannelStats {
    fn default() -> Self {
        Self::new(DEFAULT_SLOT_COUNT)
    }
}
