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
use crate::db::{self, models::TeamMember, TeamMemberPatch};
use crate::error::ApiError;
use crate::lifecycle::{EntityKind, Visibility};
use crate::routes::{self, DeleteParams, ScopeParams};
use crate::AppState;

fn default_position_order() -> i64 {
    999
}

#[derive(Deserialize)]
pub struct CreateTeamMemberRequest {
    pub name: String,
    pub position: String,
    #[serde(default)]
    pub congregation: String,
    #[serde(default)]
    pub quote: String,
    pub image: Option<String>,
    #[serde(default)]
    pub is_council: bool,
    #[serde(default = "default_position_order")]
    pub position_order: i64,
}

#[derive(Deserialize)]
pub struct UpdateTeamMemberRequest {
    pub name: Option<String>,
    pub position: Option<String>,
    pub congregation: Option<String>,
    pub quote: Option<String>,
    pub image: Option<String>,
    pub is_council: Option<bool>,
    pub position_order: Option<i64>,
}

pub async fn list_team_members(
    State(state): State<AppState>,
    Query(params): Query<ScopeParams>,
) -> Result<impl IntoResponse, ApiError> {
    let members = db::list_team_members(&state.db, params.scope)
        .await
        .map_err(ApiError::from_db)?;
    Ok(AxumJson(json!({ "success": true, "team_members": members })))
}

pub async fn create_team_member(
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(req): Json<CreateTeamMemberRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() || req.position.trim().is_empty() {
        return Err(ApiError::validation("Name and position are required"));
    }

    let member = TeamMember {
        id: Uuid::new_v4().to_string(),
        name: req.name,
        position: req.position,
        congregation: req.congregation,
        quote: req.quote,
        image: req.image,
        is_council: req.is_council,
        position_order: req.position_order,
        visibility: Visibility::Visible,
        created_at: Utc::now(),
    };
    db::add_team_member(&state.db, &member)
        .await
        .map_err(ApiError::from_db)?;

    Ok((
        StatusCode::CREATED,
        AxumJson(json!({
            "success": true,
            "team_member": member,
            "message": "Team member created successfully",
        })),
    ))
}

pub async fn update_team_member(
    Path(id): Path<String>,
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Json(req): Json<UpdateTeamMemberRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = TeamMemberPatch {
        name: req.name,
        position: req.position,
        congregation: req.congregation,
        quote: req.quote,
        image: req.image,
        is_council: req.is_council,
        position_order: req.position_order,
    };
    let found = db::update_team_member(&state.db, &id, &patch)
        .await
        .map_err(ApiError::from_db)?;
    if !found {
        return Err(ApiError::NotFound("Team member"));
    }
    let member = db::get_team_member(&state.db, &id)
        .await
        .map_err(ApiError::from_db)?
        .ok_or(ApiError::NotFound("Team member"))?;
    Ok(AxumJson(json!({
        "success": true,
        "team_member": member,
        "message": "Team member updated successfully",
    })))
}

pub async fn delete_team_member(
    Path(id): Path<String>,
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
    Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, ApiError> {
    let scope = routes::parse_delete_scope(&params)?;
    routes::delete_entity(&state.db, EntityKind::TeamMember, &id, scope).await
}

pub async fn restore_team_member(
    Path(id): Path<String>,
    State(state): State<AppState>,
    _admin: AuthenticatedAdmin,
) -> Result<impl IntoResponse, ApiError> {
    routes::restore_entity(&state.db, EntityKind::TeamMember, &id).await
}
