//! Lenient numeric coercion for tracking and shot-log fields.
//!
//! Upstream archives are inconsistent about types: clocks arrive as
//! numbers, numeric strings, `null`, or garbage, and ids arrive as numbers
//! or zero-padded strings (`"0021500001"`). Clock values that cannot be
//! coerced become missing, never zero. Ids that cannot be coerced are a
//! deserialization error.

use serde::de::{Error, IgnoredAny};
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(u64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

/// Coerce a raw clock reading to a finite number, or `None` if it is missing.
///
/// Accepts anything `str::parse::<f64>` accepts after trimming; rejects
/// NaN and infinities.
#[must_use]
pub fn clock_from_str(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a raw id to an unsigned integer.
///
/// Integral floats (`2.0`) are accepted; leading zeros are dropped.
#[must_use]
pub fn id_from_str(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    trimmed
        .parse::<u64>()
        .ok()
        .or_else(|| trimmed.parse::<f64>().ok().and_then(integral))
}

fn integral(value: f64) -> Option<u64> {
    if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u64::MAX as f64 {
        Some(value as u64)
    } else {
        None
    }
}

impl RawNumber {
    fn into_clock(self) -> Option<f64> {
        match self {
            RawNumber::Int(v) => Some(v as f64),
            RawNumber::Float(v) => Some(v).filter(|v| v.is_finite()),
            RawNumber::Text(s) => clock_from_str(&s),
            RawNumber::Other(_) => None,
        }
    }

    fn into_id(self) -> Option<u64> {
        match self {
            RawNumber::Int(v) => Some(v),
            RawNumber::Float(v) => integral(v),
            RawNumber::Text(s) => id_from_str(&s),
            RawNumber::Other(_) => None,
        }
    }
}

pub(crate) fn optional_clock<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(RawNumber::into_clock))
}

pub(crate) fn optional_id<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<RawNumber>::deserialize(deserializer)?;
    Ok(raw.and_then(RawNumber::into_id))
}

pub(crate) fn required_id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    optional_id(deserializer)?.ok_or_else(|| D::Error::custom("expected a non-negative integer id"))
}

pub(crate) fn required_quarter<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let id = required_id(deserializer)?;
    u8::try_from(id).map_err(|_| D::Error::custom(format!("quarter {id} out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "optional_clock")]
        clock: Option<f64>,
        #[serde(default, deserialize_with = "optional_id")]
        id: Option<u64>,
    }

    fn sample(json: &str) -> Sample {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn clock_accepts_numbers_and_numeric_strings() {
        assert_eq!(sample(r#"{"clock": 12.5}"#).clock, Some(12.5));
        assert_eq!(sample(r#"{"clock": 12}"#).clock, Some(12.0));
        assert_eq!(sample(r#"{"clock": " 7.25 "}"#).clock, Some(7.25));
    }

    #[test]
    fn clock_garbage_is_missing_not_zero() {
        assert_eq!(sample(r#"{"clock": null}"#).clock, None);
        assert_eq!(sample(r#"{"clock": "n/a"}"#).clock, None);
        assert_eq!(sample(r#"{"clock": "NaN"}"#).clock, None);
        assert_eq!(sample(r#"{"clock": [1, 2]}"#).clock, None);
        assert_eq!(sample(r#"{}"#).clock, None);
    }

    #[test]
    fn id_accepts_zero_padded_strings() {
        assert_eq!(sample(r#"{"id": "0021500001"}"#).id, Some(21_500_001));
        assert_eq!(sample(r#"{"id": 4.0}"#).id, Some(4));
        assert_eq!(sample(r#"{"id": 4.5}"#).id, None);
    }

    #[test]
    fn str_helpers() {
        assert_eq!(clock_from_str("inf"), None);
        assert_eq!(clock_from_str(""), None);
        assert_eq!(id_from_str("1610612744"), Some(1_610_612_744));
        assert_eq!(id_from_str("-3"), None);
    }
}
