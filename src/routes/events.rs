use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json as AxumJson},
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::AuthenticatedAdmin;
use crate::db::{self, models::Event, EventPatch};
use crate::error::ApiError;
use crate::lifecycle::{EntityKind, Visibility};
use crate::routes::{self, DeleteParams, ScopeParams};
use crate::AppState;

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub location: String,
    pub image: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub attendees: Option<i64>,
    pub status: Option<String>,
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<ScopeParams>,
) -> Result<impl IntoResponse, ApiError> {
    let events = db::list_events(&state.db, params.scope)
        .await
        .map_err(ApiError::from_db)?;
    Ok(AxumJson(json!({ "success": true, "events": events })))
}

pub async fn create_event(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(req): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::validation("Event title is required"));
    }

    let now = Utc::now();
    let event = Event {
        id: Uuid::new_v4().to_string(),
        title: req.title,
        description: req.description,
        date: req.date,
        time: req.time,
        location: req.location,
        image: req.image,
        attendees: 0,
        status: "active".to_string(),
        event_type: Event::event_type_on(req.date, now.date_naive()).to_string(),
        visibility: Visibility::Visible,
        created_at: now,
    };
    db::add_event(&state.db, &event)
        .await
        .map_err(ApiError::from_db)?;

    Ok((
        StatusCode::CREATED,
        AxumJson(json!({
            "success": true,
            "event": event,
            "message": "Event created successfully",
        })),
    ))
}

pub async fn update_event(
    Path(id): Path<String>,
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(req): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = EventPatch {
        title: req.title,
        description: req.description,
        date: req.date,
        time: req.time,
        location: req.location,
        image: req.image,
        attendees: req.attendees,
        status: req.status,
    };
    let found = db::update_event(&state.db, &id, &patch)
        .await
        .map_err(ApiError::from_db)?;
    if !found {
        return Err(ApiError::NotFound("Event"));
    }
    let event = db::get_event(&state.db, &id)
        .await
        .map_err(ApiError::from_db)?
        .ok_or(ApiError::NotFound("Event"))?;
    Ok(AxumJson(json!({
        "success": true,
        "event": event,
        "message": "Event updated successfully",
    })))
}

pub async fn delete_event(
    Path(id): Path<String>,
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = routes::parse_delete_scope(&params)?;
    routes::delete_entity(&state.db, EntityKind::Event, &id, scope).await
}

pub async fn restore_event(
    Path(id): Path<String>,
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<impl IntoResponse, ApiError> {
    routes::restore_entity(&state.db, EntityKind::Event, &id).await
}
