//! Resource types stored by kanzanso and the payloads that create or change them.
//!
//! All types serialize with camelCase field names, which is also the shape
//! stored in the document table.

pub mod boost;
pub mod gratitude;
pub mod journal;
pub mod mood;
pub mod playlist;
pub mod quiz;
pub mod quote;
pub mod streak;
pub mod todo;
pub mod user;
pub mod weather;

pub use boost::{ActivityKind, BoostStats, DailyChallenge, Insight, ProgressUpdate, UserActivity};
pub use gratitude::{GratitudeDraft, GratitudeEntry, GratitudePatch, GratitudeStats};
pub use journal::{JournalDraft, JournalEntry, JournalPatch};
pub use mood::{MoodDraft, MoodEntry, MoodPatch};
pub use playlist::{Playlist, PlaylistDraft, Track};
pub use quiz::{
    ProgressChart, ProgressReport, ProgressSeries, Question, QuestionDraft, QuizResult,
    QuizResultDraft, QuizSubmission, QuizType, Recommendation, MAX_OPTION_SCORE, MAX_QUIZ_SCORE,
    QUIZ_TYPES,
};
pub use quote::{FavoriteDraft, FavoriteQuote, Quote, QuoteDraft};
pub use streak::{Streak, StreakDraft};
pub use todo::{SubTask, TodoDraft, TodoItem, TodoPatch};
pub use user::{LoginRequest, LoginResponse, NewUser, User, UserUpdate, UserView};
pub use weather::{WeatherMood, WeatherMoodDraft};

/// Generate a fresh document id.
#[must_use]
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_id_is_unique_uuid() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
        assert!(uuid::Uuid::parse_str(&a).is_ok());
    }
}
