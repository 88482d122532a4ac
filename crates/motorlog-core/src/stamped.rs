// Timestamped storage envelope shared by the dictionary cache and the
// offline mirrors. Persisted as `{ "data": ..., "savedAt": "<rfc3339>" }`.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stamped<T> {
    pub data: T,
    pub saved_at: DateTime<Utc>,
}

impl<T> Stamped<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            saved_at: Utc::now(),
        }
    }

    /// `true` while `now - saved_at` is strictly below `max_age`.
    ///
    /// A `saved_at` in the future (clock moved backwards) counts as fresh.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        match (now - self.saved_at).to_std() {
            Ok(age) => age < max_age,
            Err(_) => true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);

    #[test]
    fn freshness_boundary() {
        let now = Utc::now();
        let entry = |hours| Stamped {
            data: (),
            saved_at: now - TimeDelta::hours(hours),
        };
        assert!(entry(23).is_fresh_at(now, DAY));
        assert!(!entry(24).is_fresh_at(now, DAY));
        assert!(!entry(25).is_fresh_at(now, DAY));
        assert!(entry(-1).is_fresh_at(now, DAY));
    }

    #[test]
    fn wire_format_uses_saved_at_camel_case() {
        let entry = Stamped {
            data: vec![1, 2],
            saved_at: "2026-03-01T10:00:00Z".parse().unwrap(),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["savedAt"], "2026-03-01T10:00:00Z");
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }
}
