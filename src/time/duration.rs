use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

const NANOS_PER_SEC: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const NANOS_PER_MICRO: i64 = 1_000;

///
/// A signed span of simulated time with nanosecond resolution.
///
/// Unlike [`std::time::Duration`] this type may be negative, so that
/// a scheduler can reject negative delays instead of saturating them.
///
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Duration(i64);

impl Duration {
    /// A duration of zero time.
    pub const ZERO: Duration = Duration(0);
    /// The greatest representable duration.
    pub const MAX: Duration = Duration(i64::MAX);
    /// The smallest (most negative) representable duration.
    pub const MIN: Duration = Duration(i64::MIN);

    /// Creates a new duration from whole seconds and additional nanoseconds.
    #[must_use]
    pub const fn new(secs: i64, nanos: u32) -> Self {
        Duration(secs * NANOS_PER_SEC + nanos as i64)
    }

    #[must_use]
    pub const fn from_secs(secs: i64) -> Self {
        Duration(secs * NANOS_PER_SEC)
    }

    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Duration(millis * NANOS_PER_MILLI)
    }

    #[must_use]
    pub const fn from_micros(micros: i64) -> Self {
        Duration(micros * NANOS_PER_MICRO)
    }

    #[must_use]
    pub const fn from_nanos(nanos: i64) -> Self {
        Duration(nanos)
    }

    /// Creates a duration from a floating point number of seconds,
    /// rounded to the nearest nanosecond.
    ///
    /// # Panics
    ///
    /// Panics if `secs` is not finite.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_secs_f64(secs: f64) -> Self {
        assert!(secs.is_finite(), "cannot convert non-finite value to Duration");
        Duration((secs * NANOS_PER_SEC as f64).round() as i64)
    }

    /// The total number of nanoseconds in this span.
    #[must_use]
    pub const fn as_nanos(&self) -> i64 {
        self.0
    }

    /// The number of whole seconds, truncated towards zero.
    #[must_use]
    pub const fn as_secs(&self) -> i64 {
        self.0 / NANOS_PER_SEC
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_secs_f64(&self) -> f64 {
        self.0 as f64 / NANOS_PER_SEC as f64
    }

    #[must_use]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn checked_add(self, rhs: Duration) -> Option<Duration> {
        match self.0.checked_add(rhs.0) {
            Some(v) => Some(Duration(v)),
            None => None,
        }
    }

    #[must_use]
    pub const fn checked_sub(self, rhs: Duration) -> Option<Duration> {
        match self.0.checked_sub(rhs.0) {
            Some(v) => Some(Duration(v)),
            None => None,
        }
    }

    /// Subtraction that clamps at zero instead of going negative.
    #[must_use]
    pub fn saturating_sub_non_negative(self, rhs: Duration) -> Duration {
        Duration(self.0.saturating_sub(rhs.0).max(0))
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Self::Output {
        self.checked_add(rhs).expect("overflow when adding durations")
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub for Duration {
    type Output = Duration;

    fn sub(self, rhs: Duration) -> Self::Output {
        self.checked_sub(rhs)
            .expect("overflow when subtracting durations")
    }
}

impl SubAssign for Duration {
    fn sub_assign(&mut self, rhs: Duration) {
        *self = *self - rhs;
    }
}

impl Neg for Duration {
    type Output = Duration;

    fn neg(self) -> Self::Output {
        Duration(-self.0)
    }
}

impl Mul<i64> for Duration {
    type Output = Duration;

    fn mul(self, rhs: i64) -> Self::Output {
        Duration(
            self.0
                .checked_mul(rhs)
                .expect("overflow when multiplying duration"),
        )
    }
}

impl From<std::time::Duration> for Duration {
    fn from(value: std::time::Duration) -> Self {
        Duration(i64::try_from(value.as_nanos()).unwrap_or(i64::MAX))
    }
}

// FMT

impl Debug for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_negative() {
            write!(f, "-")?;
        }
        Debug::fmt(&std::time::Duration::from_nanos(self.0.unsigned_abs()), f)
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_agree() {
        let five_seconds = Duration::from_secs(5);
        assert_eq!(five_seconds, Duration::from_millis(5_000));
        assert_eq!(five_seconds, Duration::from_micros(5_000_000));
        assert_eq!(five_seconds, Duration::from_nanos(5_000_000_000));
        assert_eq!(Duration::new(10, 7), Duration::from_secs(10) + Duration::from_nanos(7));
        assert_eq!(Duration::from_secs_f64(0.5), Duration::from_millis(500));
    }

    #[test]
    fn negative_spans() {
        let d = Duration::from_millis(100) - Duration::from_millis(300);
        assert!(d.is_negative());
        assert_eq!(d, -Duration::from_millis(200));
        assert_eq!(format!("{d}"), "-200ms");
        assert_eq!(
            Duration::from_millis(100).saturating_sub_non_negative(Duration::from_secs(1)),
            Duration::ZERO
        );
    }

    #[test]
    fn display() {
        assert_eq!(Duration::from_secs(100).to_string(), "100s");
        assert_eq!(Duration::from_millis(1500).to_string(), "1.5s");
        assert_eq!((Duration::from_micros(3) * 2).to_string(), "6µs");
    }
}
