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
use crate::db::{self, models::MinistryRegistration};
use crate::error::ApiError;
use crate::lifecycle::{EntityKind, Visibility};
use crate::routes::{self, DeleteParams, ScopeParams};
use crate::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub ministry: String,
    pub congregation: String,
}

pub async fn list_registrations(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(params): Query<ScopeParams>,
) -> Result<impl IntoResponse, ApiError> {
    let registrations = db::list_registrations(&state.db, params.scope)
        .await
        .map_err(ApiError::from_db)?;
    Ok(AxumJson(json!({ "success": true, "registrations": registrations })))
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty()
        || req.ministry.trim().is_empty()
        || req.congregation.trim().is_empty()
    {
        return Err(ApiError::validation(
            "Name, ministry and congregation are required",
        ));
    }

    let registration = MinistryRegistration {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        email: req.email,
        phone: req.phone,
        ministry: req.ministry,
        congregation: req.congregation,
        is_approved: false,
        visibility: Visibility::Visible,
        created_at: Utc::now(),
    };
    db::add_registration(&state.db, &registration)
        .await
        .map_err(ApiError::from_db)?;

    Ok((
        StatusCode::CREATED,
        AxumJson(json!({
            "success": true,
            "registration": registration,
            "message": "Ministry registration submitted successfully",
        })),
    ))
}

pub async fn approve_registration(
    Path(id): Path<String>,
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<impl IntoResponse, ApiError> {
    let found = db::approve_registration(&state.db, &id)
        .await
        .map_err(ApiError::from_db)?;
    if !found {
        return Err(ApiError::NotFound("Ministry registration"));
    }
    let registration = db::get_registration(&state.db, &id)
        .await
        .map_err(ApiError::from_db)?
        .ok_or(ApiError::NotFound("Ministry registration"))?;
    Ok(AxumJson(json!({
        "success": true,
        "registration": registration,
        "message": "Ministry registration approved",
    })))
}

pub async fn delete_registration(
    Path(id): Path<String>,
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = routes::parse_delete_scope(&params)?;
    routes::delete_entity(&state.db, EntityKind::MinistryRegistration, &id, scope).await
}

pub async fn restore_registration(
    Path(id): Path<String>,
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<impl IntoResponse, ApiError> {
    routes::restore_entity(&state.db, EntityKind::MinistryRegistration, &id).await
}
