//! Lecture and notification records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One lecture or notification as delivered by the upstream.
///
/// The schema belongs to the upstream and is not validated; accessors look
/// up the field names observed in practice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Value);

impl Record {
    /// Wraps a raw JSON value.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the underlying JSON value.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the record, returning the JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns a non-empty string field.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    fn first_field(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.field(name))
    }

    /// Lecture title.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.first_field(&["lectureName", "name", "title"])
    }

    /// Batch (course) name.
    #[must_use]
    pub fn batch_name(&self) -> Option<&str> {
        self.first_field(&["batchName", "batch"])
    }

    /// Thumbnail image URL.
    #[must_use]
    pub fn thumbnail(&self) -> Option<&str> {
        self.first_field(&["thumbnail", "image", "imageUrl"])
    }

    /// Watch link.
    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.first_field(&["link", "url"])
    }

    /// Notification text.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.first_field(&["message", "text", "body", "title"])
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Self(value)
    }
}
