//!
//! Temporal quantification in a simulation context.
//!
//! A [`SimTime`] is a point on the simulated time axis, measured as a
//! [`Duration`] since the epoch [`SimTime::ZERO`]. Both are backed by a
//! signed nanosecond count.
//!
//! ```rust
//! # use wave_des::time::*;
//! let t = SimTime::ZERO + Duration::from_millis(1_500);
//! assert_eq!(t, SimTime::from(1.5));
//! assert_eq!(t - SimTime::from(0.5), Duration::from_secs(1));
//! ```

mod duration;
pub use duration::*;

#[cfg(feature = "serde")]
use serde::{de::Visitor, Deserialize, Serialize};

use std::fmt::{Debug, Display};
use std::ops::{Add, AddAssign, Deref, Sub, SubAssign};

///
/// A specific point of time in the simulation.
///
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime(Duration);

impl SimTime {
    /// The simulation epoch.
    pub const ZERO: SimTime = SimTime(Duration::ZERO);
    /// The smallest valid instance of a [`SimTime`].
    pub const MIN: SimTime = SimTime(Duration::ZERO);
    /// The greatest instance of a [`SimTime`].
    pub const MAX: SimTime = SimTime(Duration::MAX);

    ///
    /// Constructs an instance of `SimTime` from a give duration since `SimTime::ZERO`.
    ///
    #[must_use]
    pub const fn from_duration(duration: Duration) -> Self {
        Self(duration)
    }

    /// The span between the epoch and this instant.
    #[must_use]
    pub const fn since_epoch(&self) -> Duration {
        self.0
    }

    /// Returns the amount of time elapsed from another instant to this one.
    /// The result is negative if `earlier` is in fact later.
    #[must_use]
    pub fn duration_since(&self, earlier: SimTime) -> Duration {
        self.0 - earlier.0
    }

    /// Returns `Some(t)` where `t` is the time `self + duration` if `t` can be
    /// represented, `None` otherwise.
    #[must_use]
    pub fn checked_add(&self, duration: Duration) -> Option<SimTime> {
        self.0.checked_add(duration).map(SimTime)
    }

    #[must_use]
    pub fn checked_sub(&self, duration: Duration) -> Option<SimTime> {
        self.0.checked_sub(duration).map(SimTime)
    }

    ///
    /// Makes an equallity check with an error margin.
    ///
    #[must_use]
    pub fn eq_approx(&self, other: SimTime, error: Duration) -> bool {
        let diff = self.duration_since(other);
        diff < error && -diff < error
    }
}

// OPS

impl Add<Duration> for SimTime {
    type Output = SimTime;

    fn add(self, rhs: Duration) -> Self::Output {
        self.checked_add(rhs)
            .expect("Overflow when adding Duration to SimTime")
    }
}

impl AddAssign<Duration> for SimTime {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Sub<Duration> for SimTime {
    type Output = SimTime;

    fn sub(self, rhs: Duration) -> Self::Output {
        self.checked_sub(rhs)
            .expect("Overflow when substracting Duration from SimTime")
    }
}

impl SubAssign<Duration> for SimTime {
    fn sub_assign(&mut self, rhs: Duration) {
        *self = *self - rhs;
    }
}

impl Sub<SimTime> for SimTime {
    type Output = Duration;

    fn sub(self, rhs: SimTime) -> Self::Output {
        self.duration_since(rhs)
    }
}

// CMP

impl PartialEq<f64> for SimTime {
    fn eq(&self, other: &f64) -> bool {
        let diff = (self.0.as_secs_f64() - *other).abs();
        diff < f64::EPSILON
    }
}

// DEREF

impl Deref for SimTime {
    type Target = Duration;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// FMT

impl Debug for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for SimTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

// FROM

impl From<SimTime> for f64 {
    fn from(this: SimTime) -> Self {
        this.0.as_secs_f64()
    }
}

impl From<f64> for SimTime {
    fn from(value: f64) -> Self {
        SimTime(Duration::from_secs_f64(value))
    }
}

impl From<Duration> for SimTime {
    fn from(value: Duration) -> Self {
        SimTime(value)
    }
}

// Serialize

#[cfg(feature = "serde")]
impl Serialize for SimTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        if serializer.is_human_readable() {
            serializer.serialize_f64(self.as_secs_f64())
        } else {
            serializer.serialize_i64(self.as_nanos())
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for SimTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SimTimeVisitor;
        impl Visitor<'_> for SimTimeVisitor {
            type Value = SimTime;
            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a floating point number of seconds or integer nanoseconds")
            }

            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if !v.is_finite() {
                    return Err(E::custom("SimTime must be finite"));
                }
                Ok(SimTime::from(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(SimTime(Duration::from_nanos(v)))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                i64::try_from(v)
                    .map(|v| SimTime(Duration::from_nanos(v)))
                    .map_err(|_| E::custom("SimTime out of range"))
            }
        }

        if deserializer.is_human_readable() {
            deserializer.deserialize_any(SimTimeVisitor)
        } else {
            deserializer.deserialize_i64(SimTimeVisitor)
        }
    }
}
