use crate::time::Duration;
use std::fmt::Display;

///
/// The ratio `elapsed / window` in percent, e.g. the spread between the
/// first and the last status message of a broadcast round relative to the
/// broadcast interval.
///
/// Returns `None` if `window` is not positive.
///
/// ```
/// # use wave_des::{stats::channel_busy_ratio, time::Duration};
/// let cbr = channel_busy_ratio(Duration::from_millis(105), Duration::from_millis(100));
/// assert!((cbr.unwrap() - 105.0).abs() < 1e-9);
/// ```
#[must_use]
pub fn channel_busy_ratio(elapsed: Duration, window: Duration) -> Option<f64> {
    if window <= Duration::ZERO {
        return None;
    }
    Some(elapsed.as_secs_f64() / window.as_secs_f64() * 100.0)
}

/// A transmit configuration derived from a channel busy ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RateChoice {
    /// The data rate in kilobit per second.
    pub data_rate_kbps: u32,
    /// The time between two consecutive transmissions.
    pub inter_transmit: Duration,
}

impl RateChoice {
    #[must_use]
    pub const fn new(data_rate_kbps: u32, inter_transmit: Duration) -> Self {
        Self {
            data_rate_kbps,
            inter_transmit,
        }
    }

    /// The data rate in the `"15Kb/s"` notation.
    #[must_use]
    pub fn data_rate_label(&self) -> String {
        format!("{}Kb/s", self.data_rate_kbps)
    }
}

impl Display for RateChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}Kb/s every {}", self.data_rate_kbps, self.inter_transmit)
    }
}

///
/// A strategy mapping a channel busy ratio (percent) to a [`RateChoice`].
///
/// Any `Fn(f64) -> Option<RateChoice>` is a selector.
///
pub trait RateSelector {
    /// Picks a rate for `busy_ratio`, or `None` to keep the current one.
    fn select(&self, busy_ratio: f64) -> Option<RateChoice>;
}

impl<F> RateSelector for F
where
    F: Fn(f64) -> Option<RateChoice>,
{
    fn select(&self, busy_ratio: f64) -> Option<RateChoice> {
        self(busy_ratio)
    }
}

/// A single open interval `(lower, upper)` of an [`IttTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateBucket {
    pub lower: f64,
    pub upper: f64,
    pub choice: RateChoice,
}

impl RateBucket {
    fn contains(&self, value: f64) -> bool {
        self.lower < value && value < self.upper
    }
}

///
/// A bucket table of inter-transmit times. The busier the channel,
/// the lower the data rate and the longer the inter-transmit time.
///
/// Buckets are open intervals. Values on a bucket boundary, zero,
/// negative values and `NaN` select nothing.
///
/// ```
/// # use wave_des::stats::{IttTable, RateSelector};
/// # use wave_des::time::Duration;
/// let table = IttTable::default();
/// let choice = table.select(105.0).unwrap();
/// assert_eq!(choice.data_rate_label(), "15Kb/s");
/// assert_eq!(choice.inter_transmit, Duration::from_millis(107));
/// assert_eq!(table.select(110.0), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct IttTable {
    buckets: Vec<RateBucket>,
}

impl IttTable {
    /// Creates a table from custom buckets. Overlapping buckets
    /// resolve to the first match.
    #[must_use]
    pub fn new(buckets: Vec<RateBucket>) -> Self {
        Self { buckets }
    }

    /// The buckets of this table.
    #[must_use]
    pub fn buckets(&self) -> &[RateBucket] {
        &self.buckets
    }
}

impl Default for IttTable {
    fn default() -> Self {
        const TABLE: [(f64, f64, u32, i64); 11] = [
            (0.0, 60.0, 20, 80),
            (60.0, 70.0, 19, 84),
            (70.0, 80.0, 18, 89),
            (80.0, 90.0, 17, 94),
            (90.0, 100.0, 16, 100),
            (100.0, 110.0, 15, 107),
            (110.0, 120.0, 14, 114),
            (120.0, 130.0, 13, 123),
            (130.0, 140.0, 12, 133),
            (140.0, 150.0, 11, 145),
            (150.0, f64::INFINITY, 9, 160),
        ];

        Self::new(
            TABLE
                .iter()
                .map(|&(lower, upper, kbps, itt)| RateBucket {
                    lower,
                    upper,
                    choice: RateChoice::new(kbps, Duration::from_millis(itt)),
                })
                .collect(),
        )
    }
}

impl RateSelector for IttTable {
    fn select(&self, busy_ratio: f64) -> Option<RateChoice> {
        self.buckets
            .iter()
            .find(|b| b.contains(busy_ratio))
            .map(|b| b.choice)
    }
}
