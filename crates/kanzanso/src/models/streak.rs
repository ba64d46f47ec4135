//! User-defined habit streaks.

use chrono::{DateTime, Days, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Document;
use crate::validate;

/// A habit the user completes once a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    /// Unique id.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Habit name.
    pub name: String,
    /// Longer explanation.
    pub description: Option<String>,
    /// Habit type, such as `meditation` or `exercise`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Consecutive days completed.
    pub current_count: u32,
    /// Best run so far.
    pub highest_count: u32,
    /// Days the streak was completed.
    pub streak_dates: Vec<DateTime<Utc>>,
    /// Most recent completion.
    pub last_completed_date: Option<DateTime<Utc>>,
    /// When it was created.
    pub created_at: DateTime<Utc>,
    /// When it was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Document for Streak {
    const COLLECTION: &'static str = "streaks";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }
}

impl Streak {
    /// Start a streak with zero counts.
    #[must_use]
    pub fn new(id: String, user_id: String, draft: StreakDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            name: draft.name,
            description: draft.description,
            kind: draft.kind,
            current_count: 0,
            highest_count: 0,
            streak_dates: Vec::new(),
            last_completed_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark the streak done for the day of `now`.
    ///
    /// Returns `false` if it was already completed that day, in which case
    /// nothing changes.
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        let today = now.date_naive();
        let last_day = self.last_completed_date.map(|d| d.date_naive());

        if last_day == Some(today) {
            return false;
        }

        let continues = last_day
            .zip(today.checked_sub_days(Days::new(1)))
            .is_some_and(|(last, yesterday)| last == yesterday);

        if continues {
            self.current_count += 1;
        } else {
            self.current_count = 1;
        }
        self.highest_count = self.highest_count.max(self.current_count);

        self.streak_dates.push(now);
        self.last_completed_date = Some(now);
        self.updated_at = now;
        true
    }
}

/// Payload for creating or renaming a [`Streak`].
#[derive(Debug, Clone, Deserialize)]
pub struct StreakDraft {
    /// Habit name.
    pub name: String,
    /// Longer explanation.
    pub description: Option<String>,
    /// Habit type, such as `meditation` or `exercise`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl StreakDraft {
    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate::required("name", &self.name, 100)?;
        validate::optional_max_len("description", self.description.as_deref(), 500)?;
        validate::required("type", &self.kind, 50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn streak(now: DateTime<Utc>) -> Streak {
        let draft = StreakDraft {
            name: "Morning walk".to_string(),
            description: None,
            kind: "exercise".to_string(),
        };
        Streak::new("s1".to_string(), "u1".to_string(), draft, now)
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_first_completion() {
        let mut s = streak(at(1, 8));
        assert!(s.complete(at(1, 9)));
        assert_eq!(s.current_count, 1);
        assert_eq!(s.highest_count, 1);
        assert_eq!(s.streak_dates.len(), 1);
        assert_eq!(s.last_completed_date, Some(at(1, 9)));
    }

    #[test]
    fn test_same_day_is_noop() {
        let mut s = streak(at(1, 8));
        s.complete(at(1, 9));
        assert!(!s.complete(at(1, 23)));
        assert_eq!(s.current_count, 1);
        assert_eq!(s.streak_dates.len(), 1);
    }

    #[test]
    fn test_consecutive_days_increment() {
        let mut s = streak(at(1, 8));
        s.complete(at(1, 23));
        s.complete(at(2, 0));
        s.complete(at(3, 12));
        assert_eq!(s.current_count, 3);
        assert_eq!(s.highest_count, 3);
    }

    #[test]
    fn test_gap_resets_but_keeps_highest() {
        let mut s = streak(at(1, 8));
        s.complete(at(1, 9));
        s.complete(at(2, 9));
        s.complete(at(5, 9));
        assert_eq!(s.current_count, 1);
        assert_eq!(s.highest_count, 2);
        assert_eq!(s.streak_dates.len(), 3);
    }

    #[test]
    fn test_month_boundary_counts_as_yesterday() {
        let end_of_feb = Utc.with_ymd_and_hms(2025, 2, 28, 22, 0, 0).unwrap();
        let mut s = streak(end_of_feb - Duration::days(1));
        s.complete(end_of_feb);
        s.complete(at(1, 6));
        assert_eq!(s.current_count, 2);
    }

    #[test]
    fn test_type_field_name() {
        let s = streak(at(1, 8));
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["type"], "exercise");
        assert_eq!(json["currentCount"], 0);
    }
}
