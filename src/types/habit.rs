use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// Status for days with no recorded entry
pub const NO_DATA: &str = "no-data";

/// Opaque per-day status label supplied by the habit bot (e.g. "done")
///
/// Kept as an open string: the bot may introduce new categories at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StatusCode(String);

impl StatusCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn no_data() -> Self {
        Self(NO_DATA.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_no_data(&self) -> bool {
        self.0 == NO_DATA
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sparse date -> status mapping, at most one status per calendar date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusMap(BTreeMap<NaiveDate, StatusCode>);

impl StatusMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, date: NaiveDate, status: StatusCode) {
        self.0.insert(date, status);
    }

    pub fn get(&self, date: NaiveDate) -> Option<&StatusCode> {
        self.0.get(&date)
    }

    /// Status for `date`, falling back to `NO_DATA`
    pub fn status_or_no_data(&self, date: NaiveDate) -> StatusCode {
        self.get(date).cloned().unwrap_or_else(StatusCode::no_data)
    }

    /// Earliest date with a recorded status
    pub fn min_date(&self) -> Option<NaiveDate> {
        self.0.keys().next().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build from the raw service payload `{"YYYY-MM-DD": "status", ...}`.
    ///
    /// Keys that are not dates and non-string values are skipped. Keys that
    /// normalize to the same date resolve to the later key in key order.
    pub fn from_json_value(value: serde_json::Value) -> std::result::Result<Self, String> {
        let serde_json::Value::Object(object) = value else {
            return Err("calendar payload is not a JSON object".to_string());
        };

        let raw: BTreeMap<String, serde_json::Value> = object.into_iter().collect();
        let mut map = Self::new();
        for (key, value) in raw {
            let Some(date) = parse_date_key(&key) else {
                tracing::warn!(key = %key, "skipping calendar entry with invalid date key");
                continue;
            };
            match value {
                serde_json::Value::String(status) => map.insert(date, StatusCode::new(status)),
                other => {
                    tracing::warn!(key = %key, value = %other, "skipping non-string status");
                }
            }
        }
        Ok(map)
    }
}

impl FromIterator<(NaiveDate, StatusCode)> for StatusMap {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, StatusCode)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn parse_date_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d").ok()
}

/// Opaque habit identifier; the service sends numbers or strings
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct HabitId(String);

impl HabitId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for HabitId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Int(i64),
            Float(f64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Int(n) => Self(n.to_string()),
            RawId::Float(n) => Self(n.to_string()),
            RawId::Text(s) => Self(s),
        })
    }
}

/// A habit as listed by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    pub id: HabitId,
    #[serde(rename = "text")]
    pub label: String,
}

/// Envelope of `GET /api/users/{id}/habit`
#[derive(Debug, Default, Deserialize)]
pub struct HabitListResponse {
    #[serde(default)]
    pub habits: Vec<Habit>,
}

/// Numeric chat-platform user id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(i64);

impl UserId {
    /// Zero is treated as "no user", like an absent id
    pub fn new(id: i64) -> Option<Self> {
        (id != 0).then_some(Self(id))
    }

    /// Parse a decimal id from a launch parameter
    pub fn parse(raw: &str) -> Option<Self> {
        raw.trim().parse::<i64>().ok().and_then(Self::new)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
