use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp layout used by the sample store.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One observation of the external counter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(rename = "timestamp", with = "timestamp")]
    pub time: NaiveDateTime,
    #[serde(rename = "number")]
    pub value: f64,
}

impl Sample {
    pub fn new(time: NaiveDateTime, value: f64) -> Self {
        Self { time, value }
    }
}

/// Parses a store timestamp, accepting the space separated layout as well as ISO 8601.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
        .or_else(|_| text.parse::<NaiveDateTime>())
        .ok()
}

/// Stable sort by time; samples sharing a timestamp keep their arrival order.
pub fn sort_by_time(samples: &mut [Sample]) {
    samples.sort_by_key(|s| s.time);
}

pub(crate) mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::{TIMESTAMP_FORMAT, parse_timestamp};

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&time.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_timestamp(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp `{text}`")))
    }
}
