//! Cache data models.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use lectern_upstream::{Category, Record};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Cached lists for every category plus the time of the last refresh.
///
/// Every category is always present; an unknown or never-fetched category
/// holds an empty list.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    categories: BTreeMap<Category, Arc<[Record]>>,
    last_updated: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// An empty snapshot that has never been refreshed.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            categories: Category::ALL
                .into_iter()
                .map(|category| (category, Arc::from(Vec::new())))
                .collect(),
            last_updated: None,
        }
    }

    /// Records cached for `category`.
    #[must_use]
    pub fn records(&self, category: Category) -> &[Record] {
        match self.categories.get(&category) {
            Some(records) => records.as_ref(),
            None => &[],
        }
    }

    /// Shared handle to the records cached for `category`.
    #[must_use]
    pub fn shared(&self, category: Category) -> Arc<[Record]> {
        self.categories
            .get(&category)
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::new()))
    }

    /// Time of the last refresh that obtained a credential.
    #[must_use]
    pub const fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Total number of cached records across categories.
    #[must_use]
    pub fn total(&self) -> usize {
        self.categories.values().map(|records| records.len()).sum()
    }

    /// Replaces one category's list.
    pub(crate) fn replace(&mut self, category: Category, records: Vec<Record>) {
        self.categories.insert(category, Arc::from(records));
    }

    /// Records a completed refresh.
    ///
    /// Timestamps never move backwards: if `now` is not after the previous
    /// value the stored time advances by one microsecond instead.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let stamp = match self.last_updated {
            Some(previous) if now <= previous => previous + chrono::TimeDelta::microseconds(1),
            _ => now,
        };
        self.last_updated = Some(stamp);
        stamp
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Serialized as `{"live": [...], "up": [...], "completed": [...],
/// "notifications": [...], "lastUpdated": "..."|null}`.
impl Serialize for Snapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Category::ALL.len() + 1))?;
        for category in Category::ALL {
            map.serialize_entry(category.wire_name(), self.records(category))?;
        }
        map.serialize_entry("lastUpdated", &self.last_updated)?;
        map.end()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_empty_has_every_category() {
        let snapshot = Snapshot::empty();
        for category in Category::ALL {
            assert!(snapshot.records(category).is_empty());
        }
        assert_eq!(snapshot.last_updated(), None);
        assert_eq!(snapshot.total(), 0);
    }

    #[test]
    fn test_serialized_shape() {
        let mut snapshot = Snapshot::empty();
        snapshot.replace(Category::Upcoming, vec![Record::new(json!({ "title": "A" }))]);
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        snapshot.touch(at);

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            value,
            json!({
                "live": [],
                "up": [{ "title": "A" }],
                "completed": [],
                "notifications": [],
                "lastUpdated": "2025-01-02T03:04:05Z"
            })
        );
    }

    #[test]
    fn test_touch_is_monotonic() {
        let mut snapshot = Snapshot::empty();
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

        let first = snapshot.touch(at);
        let second = snapshot.touch(at);
        let third = snapshot.touch(at - chrono::TimeDelta::seconds(5));

        assert!(second > first);
        assert!(third > second);
    }
}
