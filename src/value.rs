//! Statistic values with an explicit unbounded sentinel.
//!
//! Zero variance makes several ratios (Cp, Cpk, F) mathematically
//! unbounded. Instead of letting an `f64` silently become infinite, the
//! engines return [`StatValue::Unbounded`], which serializes as `"+inf"`.

use std::cmp::Ordering;
use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Wire form of the unbounded sentinel.
pub const UNBOUNDED_TOKEN: &str = "+inf";

/// A finite statistic or the explicit "+∞" sentinel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatValue {
    /// An ordinary finite value.
    Finite(f64),
    /// The ratio is unbounded because its denominator is zero.
    Unbounded,
}

impl StatValue {
    /// `numerator / denominator`, or [`StatValue::Unbounded`] when the
    /// denominator is not strictly positive.
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator > 0.0 {
            StatValue::Finite(numerator / denominator)
        } else {
            StatValue::Unbounded
        }
    }

    /// The finite value, or `None` for the sentinel.
    pub fn finite(self) -> Option<f64> {
        match self {
            StatValue::Finite(v) => Some(v),
            StatValue::Unbounded => None,
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, StatValue::Unbounded)
    }

    /// `true` if the value is at least `threshold` (the sentinel always is).
    pub fn at_least(self, threshold: f64) -> bool {
        match self {
            StatValue::Finite(v) => v >= threshold,
            StatValue::Unbounded => true,
        }
    }

    /// The smaller of two values; the sentinel only wins against itself.
    pub fn min(self, other: StatValue) -> StatValue {
        match (self, other) {
            (StatValue::Finite(a), StatValue::Finite(b)) => StatValue::Finite(a.min(b)),
            (StatValue::Finite(a), StatValue::Unbounded) => StatValue::Finite(a),
            (StatValue::Unbounded, StatValue::Finite(b)) => StatValue::Finite(b),
            (StatValue::Unbounded, StatValue::Unbounded) => StatValue::Unbounded,
        }
    }
}

impl PartialOrd for StatValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (StatValue::Finite(a), StatValue::Finite(b)) => a.partial_cmp(b),
            (StatValue::Finite(_), StatValue::Unbounded) => Some(Ordering::Less),
            (StatValue::Unbounded, StatValue::Finite(_)) => Some(Ordering::Greater),
            (StatValue::Unbounded, StatValue::Unbounded) => Some(Ordering::Equal),
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Finite(v) => write!(f, "{v:.3}"),
            StatValue::Unbounded => f.write_str(UNBOUNDED_TOKEN),
        }
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Finite(v)
    }
}

impl Serialize for StatValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StatValue::Finite(v) => serializer.serialize_f64(*v),
            StatValue::Unbounded => serializer.serialize_str(UNBOUNDED_TOKEN),
        }
    }
}

impl<'de> Deserialize<'de> for StatValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StatVisitor;

        impl Visitor<'_> for StatVisitor {
            type Value = StatValue;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a number or \"{UNBOUNDED_TOKEN}\"")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<StatValue, E> {
                Ok(StatValue::Finite(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<StatValue, E> {
                Ok(StatValue::Finite(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<StatValue, E> {
                Ok(StatValue::Finite(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<StatValue, E> {
                if v == UNBOUNDED_TOKEN {
                    Ok(StatValue::Unbounded)
                } else {
                    Err(E::invalid_value(de::Unexpected::Str(v), &self))
                }
            }
        }

        deserializer.deserialize_any(StatVisitor)
    }
}
