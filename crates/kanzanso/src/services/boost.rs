//! Daily Boost: challenge generation, completion, streaks and insights.

use std::collections::HashSet;

use chrono::{DateTime, Days, Duration, NaiveTime, Utc};
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::{
    new_id, ActivityKind, BoostStats, DailyChallenge, Insight, ProgressUpdate, UserActivity,
};
use crate::storage::Storage;

/// Challenges a user should have available at any time.
pub const CHALLENGES_PER_DAY: usize = 5;

/// An insight unlocks every this many completed challenges.
pub const INSIGHT_INTERVAL: u32 = 5;

/// Blueprint of a challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    /// Short title, unique among templates.
    pub title: &'static str,
    /// What to do.
    pub description: &'static str,
    /// Category, mapped to an activity by [`ActivityKind::from_category`].
    pub category: &'static str,
    /// 1 (easy) to 3 (hard).
    pub difficulty: u8,
    /// Page of the web client where the challenge can be done.
    pub link: &'static str,
}

const JOURNAL: [Template; 3] = [
    Template {
        title: "Reconnect with Journaling",
        description: "It's been a while! Write a journal entry about what's been on your mind lately.",
        category: "Journal",
        difficulty: 2,
        link: "../know_yourself/index.html#journal",
    },
    Template {
        title: "Emotion Deep Dive",
        description: "Write a journal entry and tag an emotion you rarely acknowledge.",
        category: "Journal",
        difficulty: 3,
        link: "../know_yourself/index.html#journal",
    },
    Template {
        title: "Gratitude Reflection",
        description: "Write down three things you're grateful for today in your journal.",
        category: "Journal",
        difficulty: 1,
        link: "../know_yourself/index.html#gratitude",
    },
];

const TODO: [Template; 3] = [
    Template {
        title: "Task Kickstart",
        description: "Complete any two tasks from your to-do list today.",
        category: "To-Do",
        difficulty: 2,
        link: "../to_do_list/index.html",
    },
    Template {
        title: "Priority Focus",
        description: "Complete any task with a priority score above 7.",
        category: "To-Do",
        difficulty: 3,
        link: "../to_do_list/index.html",
    },
    Template {
        title: "Self-Care Task",
        description: "Add and complete one self-care task to your to-do list.",
        category: "To-Do",
        difficulty: 1,
        link: "../to_do_list/index.html",
    },
];

const MOOD_CHECK: Template = Template {
    title: "Mood Tracker",
    description: "Record your mood for today and note what influenced it.",
    category: "Mood",
    difficulty: 1,
    link: "../know_yourself/index.html#mood-tracker",
};

const QUIZ_CHECK: Template = Template {
    title: "Mental Health Check-in",
    description: "Take a quick mental health assessment to see how you're doing.",
    category: "Assessment",
    difficulty: 2,
    link: "../mental_health_quiz/index.html",
};

const MEDITATION: [Template; 2] = [
    Template {
        title: "Quick Meditation",
        description: "Take 3 minutes for a quick mindfulness meditation.",
        category: "Mindfulness",
        difficulty: 1,
        link: "../meditation/index.html",
    },
    Template {
        title: "Breathing Exercise",
        description: "Practice deep breathing for 5 minutes to reduce stress.",
        category: "Mindfulness",
        difficulty: 1,
        link: "../meditation/index.html",
    },
];

const FILLERS: [Template; 3] = [
    Template {
        title: "Music Therapy",
        description: "Listen to today's recommended mood track and rate how it made you feel.",
        category: "Playlist",
        difficulty: 1,
        link: "../playlist/index.html",
    },
    Template {
        title: "Inspirational Quote",
        description: "Find a quote that resonates with you today and save it to your favorites.",
        category: "Growth",
        difficulty: 1,
        link: "../know_yourself/index.html#motivation",
    },
    Template {
        title: "Mindful Break",
        description: "Take a 10-minute break away from screens to reset your mind.",
        category: "Mindfulness",
        difficulty: 2,
        link: "../meditation/index.html",
    },
];

/// `(title, content, source, category)` of the insights every user starts with.
const DEFAULT_INSIGHTS: [(&str, &str, &str, &str); 5] = [
    (
        "Your Growth Journey",
        "Consistent small steps lead to meaningful progress. Keep going!",
        "Daily Boost",
        "general",
    ),
    (
        "Self-Understanding",
        "Regular self-assessment helps track your mental wellbeing. Keep checking in with yourself.",
        "Mental Health Quiz",
        "quiz",
    ),
    (
        "Emotional Patterns",
        "Your mood tends to improve after journaling. Consider making it a regular practice.",
        "Mood Tracker",
        "mood",
    ),
    (
        "Productivity Insight",
        "You complete more tasks when you break them into smaller steps. Try this approach more often.",
        "To-Do List",
        "todo",
    ),
    (
        "Mindfulness Impact",
        "Regular meditation sessions correlate with improved mood scores in your tracking data.",
        "Meditation",
        "meditation",
    ),
];

/// True if `last` is absent or older than `days` before `now`.
fn stale(last: Option<DateTime<Utc>>, days: i64, now: DateTime<Utc>) -> bool {
    last.is_none_or(|at| at < now - Duration::days(days))
}

/// Pick the templates for a fresh set of challenges, in priority order.
///
/// The conditional picks come first, followed by the whole filler pool in
/// random order, so callers can skip titles they already have and still fill
/// up to [`CHALLENGES_PER_DAY`].
pub fn candidate_templates<R: Rng + ?Sized>(
    activity: &UserActivity,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<Template> {
    let mut picks = Vec::with_capacity(CHALLENGES_PER_DAY + FILLERS.len());

    if stale(activity.last(ActivityKind::Journal), 2, now) {
        picks.extend(JOURNAL.choose(rng).copied());
    }

    picks.extend(TODO.choose(rng).copied());

    if stale(activity.last(ActivityKind::Quiz), 5, now) {
        picks.push(QUIZ_CHECK);
    } else {
        picks.push(MOOD_CHECK);
    }

    // Meditated within the last three days: nothing to suggest.
    if stale(activity.last(ActivityKind::Meditation), 3, now) {
        picks.extend(MEDITATION.choose(rng).copied());
    }

    let mut fillers = FILLERS;
    fillers.shuffle(rng);
    picks.extend(fillers);
    picks
}

/// Start of the next UTC day.
#[must_use]
pub fn next_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    let tomorrow = now
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap_or(now.date_naive());
    tomorrow.and_time(NaiveTime::MIN).and_utc()
}

fn instantiate(template: &Template, user_id: &str, now: DateTime<Utc>) -> DailyChallenge {
    DailyChallenge {
        id: new_id(),
        user_id: user_id.to_string(),
        title: template.title.to_string(),
        description: template.description.to_string(),
        category: template.category.to_string(),
        difficulty: template.difficulty,
        link: template.link.to_string(),
        completed: false,
        progress: 0,
        created_at: now,
        completed_at: None,
        expires_at: next_midnight(now),
    }
}

/// Load the user's activity log, creating it on first use.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn activity(storage: &Storage, user_id: &str, now: DateTime<Utc>) -> Result<UserActivity> {
    storage.exclusive(|| load_activity(storage, user_id, now))
}

fn load_activity(storage: &Storage, user_id: &str, now: DateTime<Utc>) -> Result<UserActivity> {
    if let Some(activity) = storage.get::<UserActivity>(user_id)? {
        return Ok(activity);
    }
    debug!(user_id, "creating activity log");
    let activity = UserActivity::new(user_id, now);
    storage.save(&activity)?;
    Ok(activity)
}

/// Note that the user did something outside of Daily Boost.
///
/// Only the matching "last done" date changes.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn record_activity(
    storage: &Storage,
    user_id: &str,
    kind: ActivityKind,
    now: DateTime<Utc>,
) -> Result<()> {
    storage.exclusive(|| {
        let mut log = load_activity(storage, user_id, now)?;
        log.touch(kind, now);
        storage.save(&log)
    })?;
    debug!(user_id, ?kind, "recorded activity");
    Ok(())
}

fn active_challenges(
    storage: &Storage,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<DailyChallenge>> {
    Ok(storage
        .list_owned::<DailyChallenge>(user_id)?
        .into_iter()
        .filter(|c| c.is_active(now))
        .collect())
}

/// The user's active challenges, topped up to [`CHALLENGES_PER_DAY`].
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn challenges(storage: &Storage, user_id: &str) -> Result<Vec<DailyChallenge>> {
    challenges_at(storage, user_id, Utc::now(), &mut rand::rng())
}

/// [`challenges`] at a given time with a given random source.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn challenges_at<R: Rng + ?Sized>(
    storage: &Storage,
    user_id: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Vec<DailyChallenge>> {
    storage.exclusive(|| top_up(storage, user_id, now, rng))
}

fn top_up<R: Rng + ?Sized>(
    storage: &Storage,
    user_id: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Vec<DailyChallenge>> {
    let mut active = active_challenges(storage, user_id, now)?;
    if active.len() >= CHALLENGES_PER_DAY {
        return Ok(active);
    }

    let log = load_activity(storage, user_id, now)?;
    let mut taken: HashSet<String> = active.iter().map(|c| c.title.clone()).collect();
    let missing = CHALLENGES_PER_DAY - active.len();

    let fresh: Vec<DailyChallenge> = candidate_templates(&log, now, rng)
        .into_iter()
        .filter(|t| taken.insert(t.title.to_string()))
        .take(missing)
        .map(|t| instantiate(&t, user_id, now))
        .collect();

    storage.save_all(&fresh)?;
    info!(user_id, generated = fresh.len(), "generated daily challenges");

    active.extend(fresh);
    Ok(active)
}

/// Mark a challenge completed and credit the user.
///
/// Completing an already completed challenge returns it unchanged.
///
/// # Errors
///
/// Returns an error if the challenge does not exist, belongs to another
/// user, or storage fails.
pub fn complete(storage: &Storage, user_id: &str, challenge_id: &str) -> Result<DailyChallenge> {
    complete_at(storage, user_id, challenge_id, Utc::now(), &mut rand::rng())
}

/// [`complete`] at a given time with a given random source.
///
/// # Errors
///
/// See [`complete`].
pub fn complete_at<R: Rng + ?Sized>(
    storage: &Storage,
    user_id: &str,
    challenge_id: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<DailyChallenge> {
    storage.exclusive(|| complete_challenge(storage, user_id, challenge_id, now, rng))
}

fn complete_challenge<R: Rng + ?Sized>(
    storage: &Storage,
    user_id: &str,
    challenge_id: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<DailyChallenge> {
    let mut challenge: DailyChallenge =
        super::owned(storage, user_id, challenge_id, "challenge")?;
    if !challenge.complete(now) {
        debug!(challenge_id, "challenge already completed");
        return Ok(challenge);
    }
    storage.save(&challenge)?;
    credit_completion(storage, user_id, &challenge.category, now, rng)?;
    info!(user_id, challenge_id, title = %challenge.title, "challenge completed");
    Ok(challenge)
}

/// Set a challenge's progress, completing it at 100.
///
/// # Errors
///
/// See [`complete`].
pub fn update_progress(
    storage: &Storage,
    user_id: &str,
    update: &ProgressUpdate,
) -> Result<DailyChallenge> {
    update_progress_at(storage, user_id, update, Utc::now(), &mut rand::rng())
}

/// [`update_progress`] at a given time with a given random source.
///
/// # Errors
///
/// See [`complete`].
pub fn update_progress_at<R: Rng + ?Sized>(
    storage: &Storage,
    user_id: &str,
    update: &ProgressUpdate,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<DailyChallenge> {
    // Clamped to 0..=100, so the cast is lossless.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let progress = update.progress.clamp(0, 100) as u8;

    storage.exclusive(|| {
        if progress == 100 {
            return complete_challenge(storage, user_id, &update.challenge_id, now, rng);
        }
        let mut challenge: DailyChallenge =
            super::owned(storage, user_id, &update.challenge_id, "challenge")?;
        if challenge.completed {
            return Ok(challenge);
        }
        challenge.progress = progress;
        storage.save(&challenge)?;
        debug!(challenge_id = %challenge.id, progress, "challenge progress updated");
        Ok(challenge)
    })
}

fn credit_completion<R: Rng + ?Sized>(
    storage: &Storage,
    user_id: &str,
    category: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<()> {
    let mut log = load_activity(storage, user_id, now)?;
    log.record_completion(category, now);

    if log.total_challenges_completed % INSIGHT_INTERVAL == 0 {
        unlock_insight(storage, user_id, now, rng)?;
        log.insights_unlocked += 1;
    }
    storage.save(&log)
}

/// Unlock one random locked insight. When none is left locked, a fresh set
/// of defaults is created first.
fn unlock_insight<R: Rng + ?Sized>(
    storage: &Storage,
    user_id: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<Insight> {
    let mut locked: Vec<Insight> = storage
        .list_owned::<Insight>(user_id)?
        .into_iter()
        .filter(|i| !i.is_unlocked)
        .collect();
    if locked.is_empty() {
        locked = default_insights(user_id, now);
        storage.save_all(&locked)?;
        debug!(user_id, "created default insights");
    }

    let mut insight = locked
        .choose(rng)
        .cloned()
        .ok_or_else(|| Error::internal("no insight available to unlock"))?;
    insight.is_unlocked = true;
    insight.created_at = now;
    storage.save(&insight)?;
    info!(user_id, title = %insight.title, "insight unlocked");
    Ok(insight)
}

fn default_insights(user_id: &str, now: DateTime<Utc>) -> Vec<Insight> {
    DEFAULT_INSIGHTS
        .iter()
        .map(|(title, content, source, category)| Insight {
            id: new_id(),
            user_id: user_id.to_string(),
            title: (*title).to_string(),
            content: (*content).to_string(),
            source: (*source).to_string(),
            category: (*category).to_string(),
            is_unlocked: false,
            created_at: now,
        })
        .collect()
}

/// Unlocked insights, newest first.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn insights(storage: &Storage, user_id: &str) -> Result<Vec<Insight>> {
    let mut unlocked: Vec<Insight> = storage
        .list_owned::<Insight>(user_id)?
        .into_iter()
        .filter(|i| i.is_unlocked)
        .collect();
    super::newest_first(&mut unlocked, |i| i.created_at);
    Ok(unlocked)
}

/// Daily summary for the user.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn stats(storage: &Storage, user_id: &str) -> Result<BoostStats> {
    stats_at(storage, user_id, Utc::now())
}

/// [`stats`] at a given time.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn stats_at(storage: &Storage, user_id: &str, now: DateTime<Utc>) -> Result<BoostStats> {
    let log = activity(storage, user_id, now)?;
    let challenges = storage.list_owned::<DailyChallenge>(user_id)?;

    let completed_today: Vec<String> = challenges
        .iter()
        .filter(|c| c.completed && c.completed_on(now))
        .map(|c| c.id.clone())
        .collect();
    let active = challenges.iter().filter(|c| c.is_active(now)).count();

    let total = active + completed_today.len();
    let completion_percentage = if total == 0 {
        0
    } else {
        // At most 100.
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::cast_sign_loss)]
        let pct = (completed_today.len() as f64 / total as f64 * 100.0).round() as u32;
        pct
    };

    Ok(BoostStats {
        streak: log.current_streak,
        completion_percentage,
        insights_count: insights(storage, user_id)?.len(),
        total_challenges_completed: log.total_challenges_completed,
        completed_today,
    })
}

/// Fail on an empty challenge id in a progress update.
///
/// # Errors
///
/// Returns [`Error::Validation`] for a blank id.
pub fn validate_progress(update: &ProgressUpdate) -> Result<()> {
    if update.challenge_id.trim().is_empty() {
        return Err(Error::validation("challengeId", "must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn storage() -> Storage {
        Storage::open_in_memory().unwrap()
    }

    #[test]
    fn test_new_user_gets_five_distinct_challenges() {
        let storage = storage();
        let list = challenges_at(&storage, "u1", at(10, 9), &mut rng()).unwrap();
        assert_eq!(list.len(), CHALLENGES_PER_DAY);

        let titles: HashSet<_> = list.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles.len(), CHALLENGES_PER_DAY);

        // Fresh user: journal, to-do, quiz and meditation, plus one filler
        let categories: Vec<_> = list.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(categories[0], "Journal");
        assert_eq!(categories[1], "To-Do");
        assert_eq!(categories[2], "Assessment");
        assert_eq!(categories[3], "Mindfulness");

        for challenge in &list {
            assert_eq!(challenge.expires_at, at(11, 0));
            assert_eq!(challenge.progress, 0);
        }
    }

    #[test]
    fn test_second_call_returns_same_set() {
        let storage = storage();
        let first = challenges_at(&storage, "u1", at(10, 9), &mut rng()).unwrap();
        let second = challenges_at(&storage, "u1", at(10, 12), &mut rng()).unwrap();
        let ids = |v: &[DailyChallenge]| v.iter().map(|c| c.id.clone()).collect::<HashSet<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_recent_activity_changes_selection() {
        let now = at(10, 9);
        let mut log = UserActivity::new("u1", now);
        log.touch(ActivityKind::Journal, now - Duration::days(1));
        log.touch(ActivityKind::Quiz, now - Duration::days(1));
        log.touch(ActivityKind::Meditation, now - Duration::hours(5));

        let picks = candidate_templates(&log, now, &mut rng());
        assert_eq!(picks[0].category, "To-Do");
        assert_eq!(picks[1], MOOD_CHECK);
        // The rest is the filler pool
        assert_eq!(picks.len(), 2 + FILLERS.len());
    }

    #[test]
    fn test_stale_activity_thresholds() {
        let now = at(10, 9);
        assert!(stale(None, 2, now));
        assert!(stale(Some(now - Duration::days(3)), 2, now));
        assert!(!stale(Some(now - Duration::days(2)), 2, now));
    }

    #[test]
    fn test_top_up_skips_active_titles() {
        let storage = storage();
        let now = at(10, 9);
        let list = challenges_at(&storage, "u1", now, &mut rng()).unwrap();

        complete_at(&storage, "u1", &list[0].id, now, &mut rng()).unwrap();
        complete_at(&storage, "u1", &list[1].id, now, &mut rng()).unwrap();

        let topped = challenges_at(&storage, "u1", now, &mut rng()).unwrap();
        assert_eq!(topped.len(), CHALLENGES_PER_DAY);
        let titles: HashSet<_> = topped.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles.len(), CHALLENGES_PER_DAY);
        assert!(topped.iter().all(|c| !c.completed));
    }

    #[test]
    fn test_expired_challenges_are_replaced() {
        let storage = storage();
        let first = challenges_at(&storage, "u1", at(10, 9), &mut rng()).unwrap();
        let next_day = challenges_at(&storage, "u1", at(11, 9), &mut rng()).unwrap();
        assert_eq!(next_day.len(), CHALLENGES_PER_DAY);
        assert!(next_day.iter().all(|c| first.iter().all(|f| f.id != c.id)));
    }

    #[test]
    fn test_complete_updates_activity() {
        let storage = storage();
        let now = at(10, 9);
        let list = challenges_at(&storage, "u1", now, &mut rng()).unwrap();
        let journal = &list[0];

        let done = complete_at(&storage, "u1", &journal.id, now, &mut rng()).unwrap();
        assert!(done.completed);
        assert_eq!(done.progress, 100);
        assert_eq!(done.completed_at, Some(now));

        let log = activity(&storage, "u1", now).unwrap();
        assert_eq!(log.total_challenges_completed, 1);
        assert_eq!(log.last_journal_date, Some(now));
        assert_eq!(log.activity_counts.get("Journal"), Some(&1));
        assert_eq!(log.current_streak, 1);
    }

    #[test]
    fn test_complete_is_idempotent() {
        let storage = storage();
        let now = at(10, 9);
        let list = challenges_at(&storage, "u1", now, &mut rng()).unwrap();

        complete_at(&storage, "u1", &list[0].id, now, &mut rng()).unwrap();
        let again = complete_at(&storage, "u1", &list[0].id, at(10, 11), &mut rng()).unwrap();
        assert_eq!(again.completed_at, Some(now));

        let log = activity(&storage, "u1", now).unwrap();
        assert_eq!(log.total_challenges_completed, 1);
    }

    #[test]
    fn test_complete_checks_owner() {
        let storage = storage();
        let list = challenges_at(&storage, "u1", at(10, 9), &mut rng()).unwrap();
        let err = complete_at(&storage, "u2", &list[0].id, at(10, 9), &mut rng()).unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        let err = complete_at(&storage, "u1", "missing", at(10, 9), &mut rng()).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_fifth_completion_unlocks_an_insight() {
        let storage = storage();
        let now = at(10, 9);
        let list = challenges_at(&storage, "u1", now, &mut rng()).unwrap();

        for challenge in &list[..4] {
            complete_at(&storage, "u1", &challenge.id, now, &mut rng()).unwrap();
        }
        assert!(insights(&storage, "u1").unwrap().is_empty());

        complete_at(&storage, "u1", &list[4].id, now, &mut rng()).unwrap();
        let unlocked = insights(&storage, "u1").unwrap();
        assert_eq!(unlocked.len(), 1);
        assert_eq!(storage.list_owned::<Insight>("u1").unwrap().len(), 5);

        let log = activity(&storage, "u1", now).unwrap();
        assert_eq!(log.insights_unlocked, 1);
    }

    #[test]
    fn test_concurrent_completions_are_all_credited() {
        let storage = storage();
        let now = at(10, 9);
        let list = challenges_at(&storage, "u1", now, &mut rng()).unwrap();

        std::thread::scope(|scope| {
            for (seed, challenge) in (0u64..).zip(&list) {
                let storage = &storage;
                scope.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(seed);
                    complete_at(storage, "u1", &challenge.id, now, &mut rng).unwrap();
                    record_activity(storage, "u1", ActivityKind::Journal, now).unwrap();
                });
            }
        });

        let log = activity(&storage, "u1", now).unwrap();
        assert_eq!(log.total_challenges_completed, 5);
        assert_eq!(log.insights_unlocked, 1);
        assert_eq!(log.last_journal_date, Some(now));
        assert_eq!(insights(&storage, "u1").unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_top_ups_generate_one_set() {
        let storage = storage();
        let now = at(10, 9);

        std::thread::scope(|scope| {
            for seed in 0..4 {
                let storage = &storage;
                scope.spawn(move || {
                    let mut rng = StdRng::seed_from_u64(seed);
                    challenges_at(storage, "u1", now, &mut rng).unwrap();
                });
            }
        });

        let stored = storage.list_owned::<DailyChallenge>("u1").unwrap();
        assert_eq!(stored.len(), CHALLENGES_PER_DAY);
    }

    #[test]
    fn test_unlocking_after_all_unlocked_adds_defaults() {
        let storage = storage();
        let now = at(10, 9);
        let mut all = default_insights("u1", now);
        for insight in &mut all {
            insight.is_unlocked = true;
        }
        storage.save_all(&all).unwrap();

        let unlocked = unlock_insight(&storage, "u1", now, &mut rng()).unwrap();
        assert!(all.iter().all(|i| i.id != unlocked.id));

        let stored = storage.list_owned::<Insight>("u1").unwrap();
        assert_eq!(stored.len(), DEFAULT_INSIGHTS.len() * 2);
        assert_eq!(
            stored.iter().filter(|i| i.is_unlocked).count(),
            DEFAULT_INSIGHTS.len() + 1
        );
    }

    #[test]
    fn test_progress_clamps_and_completes() {
        let storage = storage();
        let now = at(10, 9);
        let list = challenges_at(&storage, "u1", now, &mut rng()).unwrap();

        let update = ProgressUpdate {
            challenge_id: list[1].id.clone(),
            progress: -20,
        };
        let c = update_progress_at(&storage, "u1", &update, now, &mut rng()).unwrap();
        assert_eq!(c.progress, 0);
        assert!(!c.completed);

        let update = ProgressUpdate {
            challenge_id: list[1].id.clone(),
            progress: 250,
        };
        let c = update_progress_at(&storage, "u1", &update, now, &mut rng()).unwrap();
        assert!(c.completed);
        assert_eq!(c.progress, 100);
        assert_eq!(
            activity(&storage, "u1", now).unwrap().total_challenges_completed,
            1
        );
    }

    #[test]
    fn test_stats() {
        let storage = storage();
        let now = at(10, 9);
        let empty = stats_at(&storage, "u1", now).unwrap();
        assert_eq!(empty.completion_percentage, 0);

        let list = challenges_at(&storage, "u1", now, &mut rng()).unwrap();
        complete_at(&storage, "u1", &list[0].id, now, &mut rng()).unwrap();
        complete_at(&storage, "u1", &list[1].id, now, &mut rng()).unwrap();

        let stats = stats_at(&storage, "u1", now).unwrap();
        assert_eq!(stats.completion_percentage, 40);
        assert_eq!(stats.streak, 1);
        assert_eq!(stats.total_challenges_completed, 2);
        assert_eq!(stats.completed_today.len(), 2);
        assert!(stats.completed_today.contains(&list[0].id));
    }

    #[test]
    fn test_record_activity_touches_date_only() {
        let storage = storage();
        let now = at(10, 9);
        record_activity(&storage, "u1", ActivityKind::Mood, now).unwrap();
        let log = activity(&storage, "u1", now).unwrap();
        assert_eq!(log.last_mood_entry_date, Some(now));
        assert_eq!(log.total_challenges_completed, 0);
        assert_eq!(log.current_streak, 0);
    }

    #[test]
    fn test_next_midnight() {
        assert_eq!(next_midnight(at(10, 0)), at(11, 0));
        assert_eq!(next_midnight(at(10, 23)), at(11, 0));
    }
}
