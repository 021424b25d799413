use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Whole Kenyan shillings.
///
/// MPESA only moves whole shillings, so there is no minor unit. The backend
/// echoes form input back, so deserialization accepts integers, floats
/// (rounded half away from zero) and numeric strings.
///
/// ```rust
/// use api_types::Shillings;
///
/// assert_eq!(Shillings::new(1250).to_string(), "KES 1,250");
/// assert_eq!("2,500".parse::<Shillings>().unwrap().value(), 2500);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Shillings(i64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseShillingsError {
    #[error("empty amount")]
    Empty,
    #[error("invalid amount: {0}")]
    Invalid(String),
}

impl Shillings {
    pub const ZERO: Shillings = Shillings(0);

    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[must_use]
    pub fn checked_add(self, rhs: Shillings) -> Option<Shillings> {
        self.0.checked_add(rhs.0).map(Shillings)
    }

    /// Grouped digits without the currency prefix (`1,250`).
    #[must_use]
    pub fn grouped(self) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
        if self.0 < 0 {
            out.push('-');
        }
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }

    fn from_float(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        let rounded = value.round();
        if rounded < i64::MIN as f64 || rounded > i64::MAX as f64 {
            return None;
        }
        Some(Self(rounded as i64))
    }
}

impl fmt::Display for Shillings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KES {}", self.grouped())
    }
}

impl From<i64> for Shillings {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<Shillings> for i64 {
    fn from(value: Shillings) -> Self {
        value.0
    }
}

impl FromStr for Shillings {
    type Err = ParseShillingsError;

    /// Accepts `250`, `2,500`, `250.50` (rounded) and an optional `KES`/`Ksh`
    /// prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let trimmed = ["KES", "Ksh", "KSh", "ksh", "kes"]
            .iter()
            .find_map(|prefix| trimmed.strip_prefix(prefix))
            .unwrap_or(trimmed)
            .trim();
        if trimmed.is_empty() {
            return Err(ParseShillingsError::Empty);
        }

        let cleaned: String = trimmed.chars().filter(|ch| *ch != ',').collect();
        if let Ok(value) = cleaned.parse::<i64>() {
            return Ok(Self(value));
        }
        cleaned
            .parse::<f64>()
            .ok()
            .and_then(Self::from_float)
            .ok_or_else(|| ParseShillingsError::Invalid(s.to_string()))
    }
}

impl Serialize for Shillings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawNumber {
    fn into_shillings<E: de::Error>(self) -> Result<Option<Shillings>, E> {
        match self {
            Self::Int(value) => Ok(Some(Shillings(value))),
            Self::Float(value) => Shillings::from_float(value)
                .map(Some)
                .ok_or_else(|| E::custom(format!("amount out of range: {value}"))),
            Self::Text(text) => match text.parse::<Shillings>() {
                Ok(value) => Ok(Some(value)),
                Err(ParseShillingsError::Empty) => Ok(None),
                Err(err) => Err(E::custom(err)),
            },
        }
    }
}

impl<'de> Deserialize<'de> for Shillings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        RawNumber::deserialize(deserializer)?
            .into_shillings()?
            .ok_or_else(|| de::Error::custom("empty amount"))
    }
}

/// `deserialize_with` helper for optional amounts: `null`, a missing field and
/// `""` all become `None`.
pub fn lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Shillings>, D::Error> {
    match Option::<RawNumber>::deserialize(deserializer)? {
        Some(raw) => raw.into_shillings(),
        None => Ok(None),
    }
}

/// Same leniency for small counters (units, year).
pub fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u32>, D::Error> {
    let Some(amount) = lenient(deserializer)? else {
        return Ok(None);
    };
    u32::try_from(amount.value())
        .map(Some)
        .map_err(|_| de::Error::custom(format!("count out of range: {}", amount.value())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Holder {
        #[serde(default, deserialize_with = "lenient")]
        amount: Option<Shillings>,
    }

    fn holder(json: &str) -> Option<Shillings> {
        serde_json::from_str::<Holder>(json).unwrap().amount
    }

    #[test]
    fn display_groups_thousands() {
        assert_eq!(Shillings::new(0).to_string(), "KES 0");
        assert_eq!(Shillings::new(250).to_string(), "KES 250");
        assert_eq!(Shillings::new(1250).to_string(), "KES 1,250");
        assert_eq!(Shillings::new(1_000_000).to_string(), "KES 1,000,000");
        assert_eq!(Shillings::new(-4500).to_string(), "KES -4,500");
    }

    #[test]
    fn parse_accepts_prefix_commas_and_decimals() {
        assert_eq!("250".parse::<Shillings>().unwrap().value(), 250);
        assert_eq!(" KES 2,500 ".parse::<Shillings>().unwrap().value(), 2500);
        assert_eq!("99.5".parse::<Shillings>().unwrap().value(), 100);
        assert_eq!("".parse::<Shillings>(), Err(ParseShillingsError::Empty));
        assert!("abc".parse::<Shillings>().is_err());
    }

    #[test]
    fn lenient_field_handles_every_backend_shape() {
        assert_eq!(holder(r#"{"amount": 300}"#), Some(Shillings::new(300)));
        assert_eq!(holder(r#"{"amount": 300.4}"#), Some(Shillings::new(300)));
        assert_eq!(holder(r#"{"amount": "300"}"#), Some(Shillings::new(300)));
        assert_eq!(holder(r#"{"amount": ""}"#), None);
        assert_eq!(holder(r#"{"amount": null}"#), None);
        assert_eq!(holder(r#"{}"#), None);
        assert!(serde_json::from_str::<Holder>(r#"{"amount": "x"}"#).is_err());
    }

    #[test]
    fn serializes_as_plain_integer() {
        assert_eq!(serde_json::to_string(&Shillings::new(250)).unwrap(), "250");
    }
}
