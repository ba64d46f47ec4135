//! Quiz types, questions, submissions and results.
//!
//! `/api/quiz-results/{userId}/...` routes are public and answer guests
//! (ids starting with `demo-` or without an account) with empty or sample
//! data instead of errors.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};

use super::AppState;
use crate::auth::AuthUser;
use crate::error::Result;
use crate::models::{
    ProgressReport, Question, QuestionDraft, QuizResult, QuizResultDraft, QuizSubmission,
    Recommendation,
};
use crate::services::quiz;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/quiz-types", get(quiz_types))
        .route("/quiz-questions", get(list_questions))
        .route("/quiz-questions/type/{quiz_type}", get(questions_by_quiz_type))
        .route("/quiz-questions/category/{category}", get(questions_by_category))
        .route("/quiz/questions", get(list_questions).post(create_question))
        .route("/quiz/questions/type/{quiz_type}", get(questions_for_type))
        .route(
            "/quiz/questions/{id}",
            get(show_question).put(update_question).delete(delete_question),
        )
        .route("/quiz/submit", post(submit))
}

pub(super) fn result_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(my_results).post(record))
        .route("/type/{quiz_type}", get(my_results_by_type))
        .route("/type/{quiz_type}/latest", get(my_latest_by_type))
        .route("/result/{id}", get(show_result).delete(delete_result))
        .route("/{user_id}", get(user_results).post(record_for_user))
        .route("/{user_id}/type/{quiz_type}", get(user_results_by_type))
        .route("/{user_id}/latest", get(user_latest))
        .route("/{user_id}/progress", get(user_progress))
        .route("/{user_id}/recommendations", get(user_recommendations))
}

async fn quiz_types() -> Json<Vec<&'static str>> {
    Json(quiz::quiz_types())
}

// === Questions ===

async fn list_questions(State(state): State<AppState>) -> Result<Json<Vec<Question>>> {
    quiz::questions(&state.storage).map(Json)
}

async fn questions_by_quiz_type(
    State(state): State<AppState>,
    Path(quiz_type): Path<String>,
) -> Result<Json<Vec<Question>>> {
    quiz::by_quiz_type(&state.storage, &quiz_type).map(Json)
}

async fn questions_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<Vec<Question>>> {
    quiz::by_category(&state.storage, &category).map(Json)
}

async fn questions_for_type(
    State(state): State<AppState>,
    Path(quiz_type): Path<String>,
) -> Result<Json<Vec<Question>>> {
    quiz::questions_for_type(&state.storage, &quiz_type).map(Json)
}

async fn show_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Question>> {
    quiz::question(&state.storage, &id).map(Json)
}

async fn create_question(
    State(state): State<AppState>,
    Json(draft): Json<QuestionDraft>,
) -> Result<(StatusCode, Json<Question>)> {
    let question = quiz::create_question(&state.storage, draft)?;
    Ok((StatusCode::CREATED, Json(question)))
}

async fn update_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(draft): Json<QuestionDraft>,
) -> Result<Json<Question>> {
    quiz::update_question(&state.storage, &id, draft).map(Json)
}

async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    quiz::delete_question(&state.storage, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn submit(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(submission): Json<QuizSubmission>,
) -> Result<(StatusCode, Json<QuizResult>)> {
    let result = quiz::submit(&state.storage, caller.id(), submission)?;
    Ok((StatusCode::CREATED, Json(result)))
}

// === Results for the caller ===

async fn record(
    State(state): State<AppState>,
    caller: AuthUser,
    Json(draft): Json<QuizResultDraft>,
) -> Result<(StatusCode, Json<QuizResult>)> {
    let result = quiz::record_result(&state.storage, caller.id(), draft)?;
    Ok((StatusCode::CREATED, Json(result)))
}

async fn my_results(
    State(state): State<AppState>,
    caller: AuthUser,
) -> Result<Json<Vec<QuizResult>>> {
    quiz::results(&state.storage, caller.id()).map(Json)
}

async fn my_results_by_type(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(quiz_type): Path<String>,
) -> Result<Json<Vec<QuizResult>>> {
    quiz::results_by_type(&state.storage, caller.id(), &quiz_type).map(Json)
}

async fn my_latest_by_type(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(quiz_type): Path<String>,
) -> Result<Json<QuizResult>> {
    quiz::latest_by_type(&state.storage, caller.id(), &quiz_type).map(Json)
}

async fn show_result(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<QuizResult>> {
    quiz::result(&state.storage, caller.id(), &id).map(Json)
}

async fn delete_result(
    State(state): State<AppState>,
    caller: AuthUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    quiz::delete_result(&state.storage, caller.id(), &id)?;
    Ok(StatusCode::NO_CONTENT)
}

// === Results by user id ===

async fn record_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(draft): Json<QuizResultDraft>,
) -> Result<(StatusCode, Json<QuizResult>)> {
    let result = if quiz::is_guest(&state.storage, &user_id)? {
        quiz::guest_result(&user_id, draft)?
    } else {
        quiz::record_result(&state.storage, &user_id, draft)?
    };
    Ok((StatusCode::CREATED, Json(result)))
}

async fn user_results(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<QuizResult>>> {
    if quiz::is_guest(&state.storage, &user_id)? {
        return Ok(Json(Vec::new()));
    }
    quiz::results(&state.storage, &user_id).map(Json)
}

async fn user_results_by_type(
    State(state): State<AppState>,
    Path((user_id, quiz_type)): Path<(String, String)>,
) -> Result<Json<Vec<QuizResult>>> {
    if quiz::is_guest(&state.storage, &user_id)? {
        return Ok(Json(Vec::new()));
    }
    quiz::results_by_type(&state.storage, &user_id, &quiz_type).map(Json)
}

async fn user_latest(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<QuizResult>>> {
    quiz::latest(&state.storage, &user_id).map(Json)
}

async fn user_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ProgressReport>> {
    quiz::progress(&state.storage, &user_id).map(Json)
}

async fn user_recommendations(Path(_user_id): Path<String>) -> Json<Vec<Recommendation>> {
    Json(quiz::recommendations())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    async fn add_question(app: &TestApp, category: &str) -> String {
        let (status, question) = app
            .call(
                "POST",
                "/api/quiz/questions",
                None,
                Some(json!({
                    "text": "How often do you feel on edge?",
                    "options": ["Never", "Sometimes", "Often"],
                    "scores": [0, 2, 4],
                    "category": category,
                    "quizType": "anxiety_focused"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        question["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_quiz_types() {
        let app = TestApp::new();
        let (status, types) = app.call("GET", "/api/quiz-types", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            types,
            json!([
                "initial_assessment",
                "weekly_checkin",
                "anxiety_focused",
                "depression_focused",
                "daily_mood"
            ])
        );
    }

    #[tokio::test]
    async fn test_question_lookups() {
        let app = TestApp::new();
        add_question(&app, "anxiety_focused").await;
        add_question(&app, "sleep").await;

        let (_, by_tag) = app
            .call("GET", "/api/quiz-questions/type/anxiety_focused", None, None)
            .await;
        assert_eq!(by_tag.as_array().unwrap().len(), 2);

        let (_, by_category) = app
            .call("GET", "/api/quiz/questions/type/anxiety_focused", None, None)
            .await;
        assert_eq!(by_category.as_array().unwrap().len(), 1);

        let (_, initial) = app
            .call("GET", "/api/quiz/questions/type/initial_assessment", None, None)
            .await;
        assert_eq!(initial[0]["category"], "sleep");
    }

    #[tokio::test]
    async fn test_submit_and_history() {
        let app = TestApp::new();
        let (user_id, token) = app.user("quiz@example.com");
        let question = add_question(&app, "anxiety_focused").await;

        let submission = json!({"quizType": "anxiety_focused", "answers": {question.clone(): 2}});
        let (status, _) = app
            .call("POST", "/api/quiz/submit", None, Some(submission.clone()))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, result) = app
            .call("POST", "/api/quiz/submit", Some(&token), Some(submission))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(result["score"], 4);
        assert_eq!(result["categoryScores"]["anxiety_focused"], 4);
        assert!(result["interpretation"]
            .as_str()
            .unwrap()
            .starts_with("MINIMAL ANXIETY"));

        let (status, _) = app
            .call(
                "POST",
                "/api/quiz/submit",
                Some(&token),
                Some(json!({"quizType": "anxiety_focused", "answers": {question: 3}})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, latest) = app
            .call("GET", "/api/quiz-results/type/anxiety_focused/latest", Some(&token), None)
            .await;
        assert_eq!(latest["id"], result["id"]);

        let (_, history) = app
            .call("GET", &format!("/api/quiz-results/{user_id}"), None, None)
            .await;
        assert_eq!(history.as_array().unwrap().len(), 1);

        let (_, progress) = app
            .call("GET", &format!("/api/quiz-results/{user_id}/progress"), None, None)
            .await;
        assert_eq!(progress["data"]["datasets"][0]["data"], json!([4, 0, 0, 0]));
    }

    #[tokio::test]
    async fn test_guest_results() {
        let app = TestApp::new();
        let draft = json!({"quizType": "daily_mood", "score": 6});

        let (status, echoed) = app
            .call("POST", "/api/quiz-results/demo-42", None, Some(draft))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(echoed["id"].as_str().unwrap().starts_with("demo-"));

        let (_, results) = app.call("GET", "/api/quiz-results/demo-42", None, None).await;
        assert_eq!(results, Value::Array(Vec::new()));

        let (_, progress) = app
            .call("GET", "/api/quiz-results/demo-42/progress", None, None)
            .await;
        assert_eq!(progress["message"], "Sample progress data for demo user");
        assert_eq!(progress["data"]["datasets"][0]["data"], json!([7, 6, 8, 7]));

        let (_, recommendations) = app
            .call("GET", "/api/quiz-results/demo-42/recommendations", None, None)
            .await;
        assert_eq!(recommendations.as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_result_ownership() {
        let app = TestApp::new();
        let (_, owner) = app.user("owner@example.com");
        let (_, other) = app.user("other@example.com");

        let (status, result) = app
            .call(
                "POST",
                "/api/quiz-results",
                Some(&owner),
                Some(json!({"quizType": "weekly_checkin", "score": 12})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let uri = format!("/api/quiz-results/result/{}", result["id"].as_str().unwrap());
        let (status, _) = app.call("GET", &uri, Some(&other), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app.call("DELETE", &uri, Some(&owner), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
