use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Timestamp layout for `StoredRecord::date`: local time, microsecond precision.
pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Form fields as received from the HTTP layer, in submission order.
///
/// A repeated field name keeps its first value and its first position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormSubmission {
    fields: Vec<(String, String)>,
}

impl FormSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field unless one with the same name is already present.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if self.get(&name).is_none() {
            self.fields.push((name, value.into()));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for FormSubmission
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = FormSubmission::new();
        for (k, v) in iter {
            form.insert(k, v);
        }
        form
    }
}

/// A submitted message after ingestion, ready for the persistence sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub date: String,
    pub username: String,
    pub message: String,
}

impl StoredRecord {
    pub fn new(date: DateTime<Local>, username: String, message: String) -> Self {
        Self {
            date: format_record_date(date),
            username,
            message,
        }
    }
}

pub fn format_record_date(date: DateTime<Local>) -> String {
    date.format(RECORD_DATE_FORMAT).to_string()
}
