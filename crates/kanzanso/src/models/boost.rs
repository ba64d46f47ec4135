//! Daily Boost records: challenges, insights and the per-user activity log.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::Document;

/// Things a user can do that Daily Boost keeps a "last done" date for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityKind {
    /// Writing a journal entry.
    Journal,
    /// Recording a mood.
    Mood,
    /// Taking a quiz.
    Quiz,
    /// A mindfulness session.
    Meditation,
    /// Completing a to-do item.
    Todo,
    /// Listening to a playlist.
    Playlist,
}

impl ActivityKind {
    /// Map a challenge category to the activity it exercises.
    ///
    /// Matching ignores case. Categories without a tracked date (such as
    /// `Growth`) map to `None`.
    #[must_use]
    pub fn from_category(category: &str) -> Option<Self> {
        match category.to_lowercase().as_str() {
            "journal" => Some(Self::Journal),
            "mood" => Some(Self::Mood),
            "assessment" => Some(Self::Quiz),
            "mindfulness" => Some(Self::Meditation),
            "to-do" => Some(Self::Todo),
            "playlist" => Some(Self::Playlist),
            _ => None,
        }
    }
}

/// One generated challenge. Challenges expire at the next UTC midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyChallenge {
    /// Unique id.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Short instruction.
    pub title: String,
    /// What to do and why.
    pub description: String,
    /// Challenge category, such as `Journal` or `Mindfulness`.
    pub category: String,
    /// 1 easy to 3 hard.
    pub difficulty: u8,
    /// App route that starts the activity.
    pub link: String,
    /// Done.
    pub completed: bool,
    /// Percent done, 0 to 100.
    pub progress: u8,
    /// When it was generated.
    pub created_at: DateTime<Utc>,
    /// When it was completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Next UTC midnight after creation.
    pub expires_at: DateTime<Utc>,
}

impl Document for DailyChallenge {
    const COLLECTION: &'static str = "daily_challenges";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }
}

impl DailyChallenge {
    /// Not completed and not yet expired.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.expires_at > now
    }

    /// Completed on the calendar day of `now`.
    #[must_use]
    pub fn completed_on(&self, now: DateTime<Utc>) -> bool {
        self.completed_at
            .is_some_and(|at| at.date_naive() == now.date_naive())
    }

    /// Mark done. Returns `false` if it already was.
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(now);
        self.progress = 100;
        true
    }
}

/// A piece of advice that unlocks as challenges are completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
    /// Unique id.
    pub id: String,
    /// Owning user.
    pub user_id: String,
    /// Short heading.
    pub title: String,
    /// The advice itself.
    pub content: String,
    /// Where the advice comes from.
    pub source: String,
    /// Topic, such as `mood` or `sleep`.
    pub category: String,
    /// Visible to the user.
    pub is_unlocked: bool,
    /// When it was created or last unlocked.
    pub created_at: DateTime<Utc>,
}

impl Document for Insight {
    const COLLECTION: &'static str = "insights";

    fn id(&self) -> &str {
        &self.id
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }
}

/// Per-user activity log. Stored under the user's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    /// Owning user, also the document id.
    pub user_id: String,
    /// Last journal entry.
    pub last_journal_date: Option<DateTime<Utc>>,
    /// Last quiz taken.
    pub last_quiz_date: Option<DateTime<Utc>>,
    /// Last mindfulness session.
    pub last_meditation_date: Option<DateTime<Utc>>,
    /// Last mood recorded.
    pub last_mood_entry_date: Option<DateTime<Utc>>,
    /// Last to-do completed.
    pub last_todo_completion_date: Option<DateTime<Utc>>,
    /// Last playlist used.
    pub last_playlist_date: Option<DateTime<Utc>>,
    /// Consecutive days with a completed challenge.
    pub current_streak: u32,
    /// Best streak so far.
    pub longest_streak: u32,
    /// Last day that counted toward the streak.
    pub last_streak_date: Option<DateTime<Utc>>,
    /// All challenges ever completed.
    pub total_challenges_completed: u32,
    /// Insights unlocked so far.
    pub insights_unlocked: u32,
    /// Completions per challenge category.
    pub activity_counts: BTreeMap<String, u32>,
    /// Last change.
    pub updated_at: DateTime<Utc>,
}

impl Document for UserActivity {
    const COLLECTION: &'static str = "user_activity";

    fn id(&self) -> &str {
        &self.user_id
    }

    fn owner_id(&self) -> Option<&str> {
        Some(&self.user_id)
    }
}

fn is_yesterday(day: NaiveDate, now: DateTime<Utc>) -> bool {
    now.date_naive().checked_sub_days(Days::new(1)) == Some(day)
}

impl UserActivity {
    /// An empty log.
    #[must_use]
    pub fn new(user_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            last_journal_date: None,
            last_quiz_date: None,
            last_meditation_date: None,
            last_mood_entry_date: None,
            last_todo_completion_date: None,
            last_playlist_date: None,
            current_streak: 0,
            longest_streak: 0,
            last_streak_date: None,
            total_challenges_completed: 0,
            insights_unlocked: 0,
            activity_counts: BTreeMap::new(),
            updated_at: now,
        }
    }

    /// Last time the given activity happened.
    #[must_use]
    pub fn last(&self, kind: ActivityKind) -> Option<DateTime<Utc>> {
        match kind {
            ActivityKind::Journal => self.last_journal_date,
            ActivityKind::Mood => self.last_mood_entry_date,
            ActivityKind::Quiz => self.last_quiz_date,
            ActivityKind::Meditation => self.last_meditation_date,
            ActivityKind::Todo => self.last_todo_completion_date,
            ActivityKind::Playlist => self.last_playlist_date,
        }
    }

    /// Note that `kind` happened at `now`.
    pub fn touch(&mut self, kind: ActivityKind, now: DateTime<Utc>) {
        let slot = match kind {
            ActivityKind::Journal => &mut self.last_journal_date,
            ActivityKind::Mood => &mut self.last_mood_entry_date,
            ActivityKind::Quiz => &mut self.last_quiz_date,
            ActivityKind::Meditation => &mut self.last_meditation_date,
            ActivityKind::Todo => &mut self.last_todo_completion_date,
            ActivityKind::Playlist => &mut self.last_playlist_date,
        };
        *slot = Some(now);
        self.updated_at = now;
    }

    /// Account for a completed challenge of `category`.
    pub fn record_completion(&mut self, category: &str, now: DateTime<Utc>) {
        if let Some(kind) = ActivityKind::from_category(category) {
            self.touch(kind, now);
        }
        *self
            .activity_counts
            .entry(category.to_string())
            .or_default() += 1;
        self.total_challenges_completed += 1;
        self.advance_streak(now);
        self.updated_at = now;
    }

    /// Extend, keep or restart the daily completion streak.
    pub fn advance_streak(&mut self, now: DateTime<Utc>) {
        match self.last_streak_date.map(|d| d.date_naive()) {
            None => {
                self.current_streak = 1;
                self.longest_streak = 1;
            }
            Some(day) if day == now.date_naive() => return,
            Some(day) if is_yesterday(day, now) => {
                self.current_streak += 1;
                self.longest_streak = self.longest_streak.max(self.current_streak);
            }
            Some(_) => self.current_streak = 1,
        }
        self.last_streak_date = Some(now);
    }
}

/// Summary shown on the Daily Boost page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostStats {
    /// Current challenge streak in days.
    pub streak: u32,
    /// Share of today's challenges completed.
    pub completion_percentage: u32,
    /// Unlocked insights.
    pub insights_count: usize,
    /// All challenges ever completed.
    pub total_challenges_completed: u32,
    /// Ids of challenges completed today.
    pub completed_today: Vec<String>,
}

/// Progress report for one challenge.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    /// Challenge to update.
    pub challenge_id: String,
    /// New percentage. Clamped to 0..=100.
    pub progress: i64,
}
