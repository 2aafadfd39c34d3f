use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthenticatedAdmin;
use crate::db::{self, models::Testimonial, TestimonialPatch};
use crate::error::ApiError;
use crate::lifecycle::{EntityKind, Visibility};
use crate::routes::{self, DeleteParams, ScopeParams};
use crate::AppState;

fn default_rating() -> i64 {
    5
}

#[derive(Deserialize)]
pub struct CreateTestimonialRequest {
    pub name: String,
    #[serde(default)]
    pub position: String,
    pub content: String,
    #[serde(default = "default_rating")]
    pub rating: i64,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Deserialize)]
pub struct UpdateTestimonialRequest {
    pub name: Option<String>,
    pub position: Option<String>,
    pub content: Option<String>,
    pub rating: Option<i64>,
    pub is_featured: Option<bool>,
}

fn check_rating(rating: i64) -> Result<(), ApiError> {
    if !(1..=5).contains(&rating) {
        return Err(ApiError::validation("Rating must be between 1 and 5"));
    }
    Ok(())
}

pub async fn list_testimonials(
    State(state): State<AppState>,
    Query(params): Query<ScopeParams>,
) -> Result<impl IntoResponse, ApiError> {
    let testimonials = db::list_testimonials(&state.db, params.scope)
        .await
        .map_err(ApiError::from_db)?;
    Ok(AxumJson(json!({ "success": true, "testimonials": testimonials })))
}

pub async fn create_testimonial(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(req): Json<CreateTestimonialRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() || req.content.trim().is_empty() {
        return Err(ApiError::validation("Name and content are required"));
    }
    check_rating(req.rating)?;

    let testimonial = Testimonial {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        position: req.position,
        content: req.content,
        rating: req.rating,
        is_featured: req.is_featured,
        visibility: Visibility::Visible,
        created_at: Utc::now(),
    };
    db::add_testimonial(&state.db, &testimonial)
        .await
        .map_err(ApiError::from_db)?;

    Ok((
        StatusCode::CREATED,
        AxumJson(json!({
            "success": true,
            "testimonial": testimonial,
            "message": "Testimonial created successfully",
        })),
    ))
}

pub async fn update_testimonial(
    Path(id): Path<String>,
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(req): Json<UpdateTestimonialRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(rating) = req.rating {
        check_rating(rating)?;
    }
    let patch = TestimonialPatch {
        name: req.name,
        position: req.position,
        content: req.content,
        rating: req.rating,
        is_featured: req.is_featured,
    };
    let found = db::update_testimonial(&state.db, &id, &patch)
        .await
        .map_err(ApiError::from_db)?;
    if !found {
        return Err(ApiError::NotFound("Testimonial"));
    }
    let testimonial = db::get_testimonial(&state.db, &id)
        .await
        .map_err(ApiError::from_db)?
        .ok_or(ApiError::NotFound("Testimonial"))?;
    Ok(AxumJson(json!({
        "success": true,
        "testimonial": testimonial,
        "message": "Testimonial updated successfully",
    })))
}

pub async fn delete_testimonial(
    Path(id): Path<String>,
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = routes::parse_delete_scope(&params)?;
    routes::delete_entity(&state.db, EntityKind::Testimonial, &id, scope).await
}

pub async fn restore_testimonial(
    Path(id): Path<String>,
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<impl IntoResponse, ApiError> {
    routes::restore_entity(&state.db, EntityKind::Testimonial, &id).await
}
