use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};

/// Shapes a `createdAt` value comes in: RFC3339 / `YYYY-MM-DD` text, epoch
/// seconds or milliseconds, or a serialized Firestore timestamp.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Epoch(i64),
    Text(String),
    Firestore {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(default, alias = "_nanoseconds", alias = "nanos")]
        nanoseconds: u32,
    },
}

// Anything above this is a millisecond epoch (year 33658 in seconds).
const MILLIS_THRESHOLD: i64 = 1_000_000_000_000;

impl RawTimestamp {
    fn into_utc(self) -> Option<DateTime<Utc>> {
        match self {
            Self::Epoch(value) if value.abs() >= MILLIS_THRESHOLD => {
                DateTime::from_timestamp_millis(value)
            }
            Self::Epoch(value) => DateTime::from_timestamp(value, 0),
            Self::Firestore {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(seconds, nanoseconds),
            Self::Text(text) => parse_text(&text),
        }
    }
}

fn parse_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Unparseable timestamps become `None` instead of failing the whole record.
pub fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    Ok(Option::<RawTimestamp>::deserialize(deserializer)
        .ok()
        .flatten()
        .and_then(RawTimestamp::into_utc))
}
