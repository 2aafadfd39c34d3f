use axum::{
    extract::{Json, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json as AxumJson},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{self, AuthenticatedAdmin};
use crate::db::{self, models::normalize_answer, models::Quiz, models::QuizSubmission, SubmissionInsert};
use crate::error::ApiError;
use crate::stats;
use crate::AppState;

#[derive(Deserialize)]
pub struct VerifyPasswordRequest {
    pub quiz_id: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SubmitQuizRequest {
    pub quiz_id: String,
    pub name: String,
    pub phone_number: String,
    pub congregation: String,
    pub selected_answer: String,
}

#[derive(Deserialize)]
pub struct CreateQuizRequest {
    pub title: String,
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    pub correct_answer: String,
    pub password: String,
    #[serde(default)]
    pub is_active: bool,
}

/// The quiz the public site is currently running, without its password or
/// answer key.
pub async fn active_quiz(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let quiz = db::active_quiz(&state.db)
        .await
        .map_err(ApiError::from_db)?
        .ok_or(ApiError::NoActiveQuiz)?;
    Ok(AxumJson(json!({ "success": true, "quiz": quiz.public_view() })))
}

/// Check a quiz password and, when it matches, hand out a short-lived access
/// token the submit endpoint requires. The comparison happens here so the
/// password never travels to the browser.
pub async fn verify_password(
    State(state): State<AppState>,
    Json(req): Json<VerifyPasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.quiz_id.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::validation("Quiz ID and password are required"));
    }
    let quiz = db::get_quiz(&state.db, &req.quiz_id)
        .await
        .map_err(ApiError::from_db)?
        .ok_or(ApiError::NotFound("Quiz"))?;
    if !quiz.is_active {
        return Err(ApiError::NoActiveQuiz);
    }
    if quiz.password != req.password {
        return Err(ApiError::Unauthorized("Incorrect password"));
    }

    let access_token =
        auth::create_quiz_access_token(&quiz.id).map_err(ApiError::Internal)?;
    Ok(AxumJson(json!({
        "success": true,
        "access_token": access_token,
        "expires_in": 600,
    })))
}

pub async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.trim();
    let phone_number = req.phone_number.trim();
    let congregation = req.congregation.trim();
    if name.is_empty() || phone_number.is_empty() || congregation.is_empty() {
        return Err(ApiError::validation(
            "Name, phone number and congregation are required",
        ));
    }
    let selected_answer = normalize_answer(&req.selected_answer)
        .ok_or_else(|| ApiError::validation("Selected answer must be A, B, C or D"))?;

    let quiz = db::get_quiz(&state.db, &req.quiz_id)
        .await
        .map_err(ApiError::from_db)?
        .ok_or(ApiError::NotFound("Quiz"))?;
    if !quiz.is_active {
        return Err(ApiError::validation("Quiz is not currently active"));
    }

    let token = auth::extract_token_from_headers(&headers)
        .ok_or(ApiError::Unauthorized("Quiz access token required"))?;
    if auth::validate_quiz_access_token(&token, &quiz.id).is_err() {
        return Err(ApiError::Unauthorized("Quiz access token invalid"));
    }

    let submission = QuizSubmission {
        id: Uuid::new_v4().to_string(),
        quiz_id: quiz.id.clone(),
        name: name.to_string(),
        phone_number: phone_number.to_string(),
        congregation: congregation.to_string(),
        selected_answer,
        submitted_at: Utc::now(),
    };
    match db::add_quiz_submission(&state.db, &submission)
        .await
        .map_err(ApiError::from_db)?
    {
        SubmissionInsert::Inserted => {}
        SubmissionInsert::Duplicate => return Err(ApiError::DuplicateSubmission),
    }

    // Deliberately silent on correctness; results come out when the quiz ends.
    Ok((
        StatusCode::CREATED,
        AxumJson(json!({
            "success": true,
            "submission_id": submission.id,
            "message": "Answer received. Results will be published once the quiz closes.",
        })),
    ))
}

/// Per-quiz totals for quizzes that have ended. Open quizzes stay out of this
/// list so nothing leaks early.
pub async fn results(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let quizzes = db::list_quizzes(&state.db)
        .await
        .map_err(ApiError::from_db)?;
    let mut results = Vec::new();
    for quiz in quizzes.into_iter().filter(|q| !q.is_active) {
        let submissions = db::list_submissions(&state.db, Some(&quiz.id))
            .await
            .map_err(ApiError::from_db)?;
        let correct = submissions
            .iter()
            .filter(|s| s.selected_answer.eq_ignore_ascii_case(&quiz.correct_answer))
            .count();
        results.push(json!({
            "id": quiz.id,
            "title": quiz.title,
            "question": quiz.question,
            "correct_answer": quiz.correct_answer,
            "submissions_count": submissions.len(),
            "correct_submissions_count": correct,
        }));
    }
    Ok(AxumJson(json!({ "success": true, "results": results })))
}

pub async fn congregation_stats(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let quizzes = db::list_quizzes(&state.db)
        .await
        .map_err(ApiError::from_db)?;
    let submissions = db::list_submissions(&state.db, None)
        .await
        .map_err(ApiError::from_db)?;
    let leaderboard = stats::congregation_leaderboard(&quizzes, &submissions);
    Ok(AxumJson(json!({ "success": true, "leaderboard": leaderboard })))
}

pub async fn list_quizzes(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let quizzes = db::list_quizzes(&state.db)
        .await
        .map_err(ApiError::from_db)?;
    Ok(AxumJson(json!({ "success": true, "quizzes": quizzes })))
}

pub async fn create_quiz(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(req): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let fields = [
        &req.title,
        &req.question,
        &req.option_a,
        &req.option_b,
        &req.option_c,
        &req.option_d,
        &req.password,
    ];
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(ApiError::validation("All quiz fields are required"));
    }
    let correct_answer = normalize_answer(&req.correct_answer)
        .ok_or_else(|| ApiError::validation("Correct answer must be A, B, C or D"))?;

    let quiz = Quiz {
        id: Uuid::new_v4().to_string(),
        title: req.title,
        question: req.question,
        option_a: req.option_a,
        option_b: req.option_b,
        option_c: req.option_c,
        option_d: req.option_d,
        correct_answer,
        password: req.password,
        is_active: req.is_active,
        created_at: Utc::now(),
    };
    db::add_quiz(&state.db, &quiz)
        .await
        .map_err(ApiError::from_db)?;

    Ok((
        StatusCode::CREATED,
        AxumJson(json!({
            "success": true,
            "quiz": quiz,
            "message": "Quiz created successfully",
        })),
    ))
}

pub async fn end_quiz(
    Path(id): Path<String>,
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let found = db::end_quiz(&state.db, &id)
        .await
        .map_err(ApiError::from_db)?;
    if !found {
        return Err(ApiError::NotFound("Quiz"));
    }
    Ok(AxumJson(json!({
        "success": true,
        "message": "Quiz ended successfully",
    })))
}

pub async fn delete_quiz(
    Path(id): Path<String>,
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let found = db::delete_quiz(&state.db, &id)
        .await
        .map_err(ApiError::from_db)?;
    if !found {
        return Err(ApiError::NotFound("Quiz"));
    }
    Ok(AxumJson(json!({
        "success": true,
        "message": "Quiz deleted successfully",
    })))
}
