//! Demo data for a fresh database.
//!
//! Reference collections (quotes, weather moods, quiz questions) are embedded
//! as JSON and loaded whenever their collection is empty. The demo account and
//! its todos and journal entries are only created when no user exists yet.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use crate::models::{
    JournalDraft, NewUser, Question, QuestionDraft, Quote, QuoteDraft, SubTask, TodoDraft, User,
    WeatherMood, WeatherMoodDraft,
};
use crate::services::{journal, quiz, quotes, todos, users, weather};
use crate::storage::{Document, Storage};

const QUOTES_JSON: &str = include_str!("../data/quotes.json");
const WEATHER_MOODS_JSON: &str = include_str!("../data/weather_moods.json");
const QUESTIONS_JSON: &str = include_str!("../data/questions.json");

/// What a seeding run inserted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    /// The demo account was created.
    pub demo_user: bool,
    /// Demo todo items.
    pub todos: usize,
    /// Demo journal entries.
    pub journal_entries: usize,
    /// Quotes loaded.
    pub quotes: usize,
    /// Weather mood suggestions loaded.
    pub weather_moods: usize,
    /// Quiz questions loaded.
    pub questions: usize,
}

impl SeedReport {
    /// Whether anything was inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Seed the database if `seed.enabled` is set.
///
/// # Errors
///
/// Returns an error if the embedded data is malformed or storage fails.
pub fn run(storage: &Storage, config: &Config) -> Result<SeedReport> {
    if !config.seed.enabled {
        debug!("seeding disabled");
        return Ok(SeedReport::default());
    }
    run_at(storage, config, Utc::now())
}

/// Seed unconditionally, dating the demo data relative to `now`.
///
/// # Errors
///
/// See [`run`].
pub fn run_at(storage: &Storage, config: &Config, now: DateTime<Utc>) -> Result<SeedReport> {
    let mut report = SeedReport {
        quotes: load_quotes(storage)?,
        weather_moods: load_weather_moods(storage)?,
        questions: load_questions(storage)?,
        ..SeedReport::default()
    };

    if storage.count::<User>()? == 0 {
        let user = users::register_with_id(
            storage,
            config.auth.demo_user_id.clone(),
            &NewUser {
                name: config.seed.demo_name.clone(),
                email: config.seed.demo_email.clone(),
                password: config.seed.demo_password.clone(),
            },
            now,
        )?;
        report.demo_user = true;
        report.todos = seed_todos(storage, &user.id, now)?;
        report.journal_entries = seed_journal(storage, &user.id, now)?;
    } else {
        debug!("users present, skipping demo account");
    }

    if report.is_empty() {
        debug!("nothing to seed");
    } else {
        info!(
            demo_user = report.demo_user,
            quotes = report.quotes,
            weather_moods = report.weather_moods,
            questions = report.questions,
            "database seeded"
        );
    }
    Ok(report)
}

fn is_empty<T: Document>(storage: &Storage) -> Result<bool> {
    Ok(storage.count::<T>()? == 0)
}

fn load_quotes(storage: &Storage) -> Result<usize> {
    if !is_empty::<Quote>(storage)? {
        return Ok(0);
    }
    let drafts: Vec<QuoteDraft> = serde_json::from_str(QUOTES_JSON)?;
    let count = drafts.len();
    for draft in drafts {
        quotes::create(storage, draft)?;
    }
    Ok(count)
}

fn load_weather_moods(storage: &Storage) -> Result<usize> {
    if !is_empty::<WeatherMood>(storage)? {
        return Ok(0);
    }
    let drafts: Vec<WeatherMoodDraft> = serde_json::from_str(WEATHER_MOODS_JSON)?;
    let count = drafts.len();
    for draft in drafts {
        weather::create(storage, draft)?;
    }
    Ok(count)
}

fn load_questions(storage: &Storage) -> Result<usize> {
    if !is_empty::<Question>(storage)? {
        return Ok(0);
    }
    let drafts: Vec<QuestionDraft> = serde_json::from_str(QUESTIONS_JSON)?;
    let count = drafts.len();
    for draft in drafts {
        quiz::create_question(storage, draft)?;
    }
    Ok(count)
}

fn sub_task(text: &str, completed: bool) -> SubTask {
    SubTask {
        id: String::new(),
        text: text.to_string(),
        completed,
    }
}

fn tags(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

fn seed_todos(storage: &Storage, user_id: &str, now: DateTime<Utc>) -> Result<usize> {
    let drafts = vec![
        TodoDraft {
            text: "Complete project documentation".to_string(),
            tags: tags(&["work", "documentation"]),
            due_date: Some(now + Duration::days(3)),
            has_reminder: true,
            reminder_time: Some(now + Duration::days(2)),
            priority: Some(3),
            sub_tasks: vec![
                sub_task("Write introduction", true),
                sub_task("Create diagrams", false),
            ],
            color: Some("#4caf50".to_string()),
            notes: Some("Include all the requirements and design decisions".to_string()),
            ..TodoDraft::default()
        },
        TodoDraft {
            text: "Go grocery shopping".to_string(),
            tags: tags(&["personal"]),
            due_date: Some(now + Duration::days(1)),
            priority: Some(2),
            sub_tasks: vec![
                sub_task("Buy vegetables", false),
                sub_task("Buy fruits", false),
                sub_task("Buy milk", false),
            ],
            color: Some("#2196f3".to_string()),
            notes: Some("Check for discounts on dairy products".to_string()),
            ..TodoDraft::default()
        },
        TodoDraft {
            text: "Exercise for 30 minutes".to_string(),
            completed: true,
            tags: tags(&["health"]),
            priority: Some(1),
            color: Some("#f44336".to_string()),
            ..TodoDraft::default()
        },
    ];

    let count = drafts.len();
    for draft in drafts {
        todos::create(storage, user_id, draft)?;
    }
    Ok(count)
}

fn seed_journal(storage: &Storage, user_id: &str, now: DateTime<Utc>) -> Result<usize> {
    let entries = [
        (
            0,
            "Today was a good day",
            "I accomplished a lot today and felt productive. The weather was nice and I went for a walk in the park.",
            "happy",
            "sunny",
            8,
            "My supportive friends",
        ),
        (
            2,
            "Feeling stressed",
            "Work has been overwhelming lately. I need to find better ways to manage my time and reduce stress.",
            "anxious",
            "cloudy",
            4,
            "Having a job I can grow in",
        ),
        (
            5,
            "Weekend reflections",
            "Had a relaxing weekend. Spent time with family and caught up on some reading.",
            "calm",
            "rainy",
            6,
            "Quiet moments",
        ),
    ];

    let count = entries.len();
    for (days_ago, title, content, mood, weather, motivation, gratitude) in entries {
        let draft = JournalDraft {
            title: Some(title.to_string()),
            content: content.to_string(),
            mood: Some(mood.to_string()),
            weather: Some(weather.to_string()),
            motivation_level: Some(motivation),
            gratitude: Some(gratitude.to_string()),
            ..JournalDraft::default()
        };
        journal::create_at(storage, user_id, draft, now - Duration::days(days_ago))?;
    }
    Ok(count)
}
