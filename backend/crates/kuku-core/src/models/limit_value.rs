use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire value of the "no limit" sentinel.
pub const UNLIMITED_SENTINEL: i64 = -1;

/// One cell of the plan limit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LimitValue {
    /// Passes regardless of usage.
    Unlimited,
    /// Passes while usage is strictly below the bound.
    Count(u64),
    /// On/off feature flag; usage is irrelevant.
    Feature(bool),
}

impl LimitValue {
    /// Pure allow/deny predicate over the current usage.
    pub fn permits(&self, current_usage: u64) -> bool {
        match self {
            Self::Unlimited => true,
            Self::Count(max) => current_usage < *max,
            Self::Feature(enabled) => *enabled,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// Numeric bound for count limits.
    pub fn count(&self) -> Option<u64> {
        match self {
            Self::Count(max) => Some(*max),
            _ => None,
        }
    }
}

impl std::fmt::Display for LimitValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unlimited => f.write_str("unlimited"),
            Self::Count(max) => write!(f, "{max}"),
            Self::Feature(true) => f.write_str("included"),
            Self::Feature(false) => f.write_str("not included"),
        }
    }
}

impl Serialize for LimitValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unlimited => serializer.serialize_i64(UNLIMITED_SENTINEL),
            Self::Count(max) => serializer.serialize_u64(*max),
            Self::Feature(enabled) => serializer.serialize_bool(*enabled),
        }
    }
}

impl<'de> Deserialize<'de> for LimitValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LimitValueVisitor)
    }
}

struct LimitValueVisitor;

impl Visitor<'_> for LimitValueVisitor {
    type Value = LimitValue;

    fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str("a non-negative count, -1 for unlimited, or a boolean")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<LimitValue, E> {
        Ok(LimitValue::Feature(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<LimitValue, E> {
        Ok(LimitValue::Count(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<LimitValue, E> {
        match v {
            UNLIMITED_SENTINEL => Ok(LimitValue::Unlimited),
            v if v >= 0 => Ok(LimitValue::Count(v as u64)),
            _ => Err(E::custom(format!("invalid limit value {v}"))),
        }
    }
}
