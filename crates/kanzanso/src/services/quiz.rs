//! Quiz questions, scoring and result history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{boost, existing, owned};
use crate::error::{Error, Result};
use crate::models::{
    new_id, ActivityKind, ProgressChart, ProgressReport, ProgressSeries, Question, QuestionDraft,
    QuizResult, QuizResultDraft, QuizSubmission, QuizType, Recommendation, User, MAX_QUIZ_SCORE,
    QUIZ_TYPES,
};
use crate::storage::Storage;

const QUESTION: &str = "question";
const RESULT: &str = "quiz result";

/// User ids with this prefix belong to the quiz page's guest mode.
pub const GUEST_PREFIX: &str = "demo-";

/// How many results [`latest`] returns.
pub const LATEST_LIMIT: usize = 5;

const PROGRESS_WEEKS: usize = 4;
const SAMPLE_PROGRESS: [u32; PROGRESS_WEEKS] = [7, 6, 8, 7];
const MOOD_CATEGORY: &str = "mood";

/// Wire names of every quiz type.
#[must_use]
pub fn quiz_types() -> Vec<&'static str> {
    QUIZ_TYPES.iter().map(|t| t.as_str()).collect()
}

// === Questions ===

/// All questions.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn questions(storage: &Storage) -> Result<Vec<Question>> {
    storage.list::<Question>()
}

/// Question by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if there is no such question.
pub fn question(storage: &Storage, id: &str) -> Result<Question> {
    existing(storage, id, QUESTION)
}

/// Questions tagged with `quizType`.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn by_quiz_type(storage: &Storage, quiz_type: &str) -> Result<Vec<Question>> {
    Ok(questions(storage)?
        .into_iter()
        .filter(|q| q.quiz_type == quiz_type)
        .collect())
}

/// Questions in a category.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn by_category(storage: &Storage, category: &str) -> Result<Vec<Question>> {
    storage.find_by_field::<Question>(None, "category", &category)
}

/// The questions to ask for a quiz type, chosen by category.
///
/// The initial assessment asks every question outside the focused
/// categories. Focused quizzes ask their own category. Unknown types ask
/// the mood questions.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn questions_for_type(storage: &Storage, quiz_type: &str) -> Result<Vec<Question>> {
    match QuizType::parse(quiz_type) {
        Some(QuizType::InitialAssessment) => Ok(questions(storage)?
            .into_iter()
            .filter(|q| {
                QuizType::parse(&q.category)
                    .is_none_or(|t| t == QuizType::InitialAssessment)
            })
            .collect()),
        Some(focused) => by_category(storage, focused.as_str()),
        None => by_category(storage, MOOD_CATEGORY),
    }
}

/// Store a question.
///
/// # Errors
///
/// Returns a validation error for bad input or a storage error.
pub fn create_question(storage: &Storage, draft: QuestionDraft) -> Result<Question> {
    draft.validate()?;
    let question = Question {
        id: new_id(),
        text: draft.text,
        options: draft.options,
        scores: draft.scores,
        category: draft.category,
        quiz_type: draft
            .quiz_type
            .unwrap_or_else(|| QuizType::InitialAssessment.as_str().to_string()),
    };
    storage.save(&question)?;
    info!(question_id = %question.id, category = %question.category, "question created");
    Ok(question)
}

/// Replace a question. The quiz type only changes when given.
///
/// # Errors
///
/// Returns a validation error, [`Error::NotFound`], or a storage error.
pub fn update_question(storage: &Storage, id: &str, draft: QuestionDraft) -> Result<Question> {
    draft.validate()?;
    let mut question = question(storage, id)?;
    question.text = draft.text;
    question.options = draft.options;
    question.scores = draft.scores;
    question.category = draft.category;
    if let Some(quiz_type) = draft.quiz_type {
        question.quiz_type = quiz_type;
    }
    storage.save(&question)?;
    debug!(question_id = %id, "question updated");
    Ok(question)
}

/// Delete a question.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if there is no such question.
pub fn delete_question(storage: &Storage, id: &str) -> Result<()> {
    if !storage.delete::<Question>(id)? {
        return Err(Error::not_found(QUESTION, id));
    }
    info!(question_id = %id, "question deleted");
    Ok(())
}

// === Scoring ===

/// Score a submission and store the result. Counts as quiz activity.
///
/// # Errors
///
/// Returns [`Error::NotFound`] for an unknown question and
/// [`Error::BadRequest`] for an option index outside the question or a
/// total above [`MAX_QUIZ_SCORE`].
pub fn submit(storage: &Storage, user_id: &str, submission: QuizSubmission) -> Result<QuizResult> {
    submit_at(storage, user_id, submission, Utc::now())
}

/// [`submit`] at a fixed time.
///
/// # Errors
///
/// See [`submit`].
pub fn submit_at(
    storage: &Storage,
    user_id: &str,
    submission: QuizSubmission,
    now: DateTime<Utc>,
) -> Result<QuizResult> {
    let mut category_scores: BTreeMap<String, u32> = BTreeMap::new();
    let mut total = 0u32;

    for (question_id, &choice) in &submission.answers {
        let question = question(storage, question_id)?;
        let score = usize::try_from(choice)
            .ok()
            .and_then(|i| question.scores.get(i))
            .copied()
            .ok_or_else(|| {
                Error::bad_request(format!("invalid option index for question: {question_id}"))
            })?;
        let category = category_scores.entry(question.category).or_default();
        *category = category.checked_add(score).ok_or_else(score_overflow)?;
        total = total.checked_add(score).ok_or_else(score_overflow)?;
    }
    if total > MAX_QUIZ_SCORE {
        return Err(score_overflow());
    }

    let quiz_type = QuizType::parse(&submission.quiz_type).unwrap_or(QuizType::InitialAssessment);
    let result = QuizResult {
        id: new_id(),
        user_id: user_id.to_string(),
        quiz_type: submission.quiz_type,
        score: total,
        category_scores,
        interpretation: Some(quiz_type.interpret(total).to_string()),
        recommendations: None,
        taken_at: now,
    };
    storage.save(&result)?;
    info!(user_id, quiz_type = %result.quiz_type, score = total, "quiz submitted");
    boost::record_activity(storage, user_id, ActivityKind::Quiz, now)?;
    Ok(result)
}

fn score_overflow() -> Error {
    Error::bad_request(format!("quiz total must not exceed {MAX_QUIZ_SCORE}"))
}

// === Results ===

fn result_from_draft(user_id: &str, draft: QuizResultDraft, now: DateTime<Utc>) -> Result<QuizResult> {
    draft.validate()?;
    let score = u32::try_from(draft.score)
        .map_err(|_| Error::validation("score", "must be between 0 and 100"))?;
    Ok(QuizResult {
        id: new_id(),
        user_id: user_id.to_string(),
        quiz_type: draft.quiz_type,
        score,
        category_scores: draft.category_scores,
        interpretation: draft.interpretation,
        recommendations: draft.recommendations,
        taken_at: now,
    })
}

/// Whether `user_id` is a guest or has no account.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn is_guest(storage: &Storage, user_id: &str) -> Result<bool> {
    Ok(user_id.starts_with(GUEST_PREFIX) || !storage.exists::<User>(user_id)?)
}

/// Store a result scored by the client. Counts as quiz activity.
///
/// # Errors
///
/// Returns a validation error, [`Error::NotFound`] if the user does not
/// exist, or a storage error.
pub fn record_result(storage: &Storage, user_id: &str, draft: QuizResultDraft) -> Result<QuizResult> {
    let now = Utc::now();
    let result = result_from_draft(user_id, draft, now)?;
    if !storage.exists::<User>(user_id)? {
        return Err(Error::not_found("user", user_id));
    }
    storage.save(&result)?;
    info!(user_id, quiz_type = %result.quiz_type, score = result.score, "quiz result recorded");
    boost::record_activity(storage, user_id, ActivityKind::Quiz, now)?;
    Ok(result)
}

/// Echo a result for a guest without storing it.
///
/// # Errors
///
/// Returns a validation error for bad input.
pub fn guest_result(user_id: &str, draft: QuizResultDraft) -> Result<QuizResult> {
    let now = Utc::now();
    let mut result = result_from_draft(user_id, draft, now)?;
    result.id = format!("{GUEST_PREFIX}{}", now.timestamp_millis());
    Ok(result)
}

/// The user's results, newest first.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn results(storage: &Storage, user_id: &str) -> Result<Vec<QuizResult>> {
    let mut results = storage.list_owned::<QuizResult>(user_id)?;
    super::newest_first(&mut results, |r| r.taken_at);
    Ok(results)
}

/// The user's results of one quiz type, newest first.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn results_by_type(storage: &Storage, user_id: &str, quiz_type: &str) -> Result<Vec<QuizResult>> {
    let mut results = storage.find_by_field::<QuizResult>(Some(user_id), "quizType", &quiz_type)?;
    super::newest_first(&mut results, |r| r.taken_at);
    Ok(results)
}

/// The user's most recent result of one quiz type.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if the user has no result of that type.
pub fn latest_by_type(storage: &Storage, user_id: &str, quiz_type: &str) -> Result<QuizResult> {
    results_by_type(storage, user_id, quiz_type)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::not_found(RESULT, quiz_type))
}

/// The user's [`LATEST_LIMIT`] most recent results. Guests get none.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn latest(storage: &Storage, user_id: &str) -> Result<Vec<QuizResult>> {
    if is_guest(storage, user_id)? {
        return Ok(Vec::new());
    }
    let mut results = results(storage, user_id)?;
    results.truncate(LATEST_LIMIT);
    Ok(results)
}

/// One of the user's results.
///
/// # Errors
///
/// Returns not found or forbidden errors, or a storage error.
pub fn result(storage: &Storage, user_id: &str, id: &str) -> Result<QuizResult> {
    owned(storage, user_id, id, RESULT)
}

/// Delete one of the user's results.
///
/// # Errors
///
/// Returns not found or forbidden errors, or a storage error.
pub fn delete_result(storage: &Storage, user_id: &str, id: &str) -> Result<()> {
    owned::<QuizResult>(storage, user_id, id, RESULT)?;
    storage.delete::<QuizResult>(id)?;
    info!(user_id, result_id = %id, "quiz result deleted");
    Ok(())
}

/// Chart of the four most recent scores.
///
/// Guests get a fixed sample series.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn progress(storage: &Storage, user_id: &str) -> Result<ProgressReport> {
    let (message, data) = if is_guest(storage, user_id)? {
        ("Sample progress data for demo user", SAMPLE_PROGRESS.to_vec())
    } else {
        let mut scores: Vec<u32> = results(storage, user_id)?
            .iter()
            .take(PROGRESS_WEEKS)
            .map(|r| r.score)
            .collect();
        scores.resize(PROGRESS_WEEKS, 0);
        ("Progress tracking from your quiz history", scores)
    };

    Ok(ProgressReport {
        user_id: user_id.to_string(),
        message: message.to_string(),
        data: ProgressChart {
            labels: (1..=PROGRESS_WEEKS).map(|week| format!("Week {week}")).collect(),
            datasets: vec![ProgressSeries {
                label: "Overall Score".to_string(),
                data,
            }],
        },
    })
}

/// Suggested next steps, the same for every user.
#[must_use]
pub fn recommendations() -> Vec<Recommendation> {
    [
        (
            "Practice mindfulness meditation for 10 minutes daily",
            "../meditation/index.html",
        ),
        (
            "Track your mood in the mood tracker",
            "../know_yourself/index.html#mood-tracker",
        ),
        (
            "Set small, achievable goals in your to-do list",
            "../to_do_list/index.html",
        ),
    ]
    .into_iter()
    .map(|(text, link)| Recommendation {
        text: text.to_string(),
        link: link.to_string(),
    })
    .collect()
}
