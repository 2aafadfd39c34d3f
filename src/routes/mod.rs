use axum::response::{IntoResponse, Json as AxumJson};
use serde::Deserialize;
use serde_json::json;

use crate::db::{self, DbPool};
use crate::error::ApiError;
use crate::lifecycle::{DeleteScope, EntityKind, ListScope};

pub mod donations;
pub mod events;
pub mod ministries;
pub mod quizzes;
pub mod team;
pub mod testimonials;

#[derive(Deserialize)]
pub struct ScopeParams {
    #[serde(default)]
    pub scope: ListScope,
}

#[derive(Deserialize)]
pub struct DeleteParams {
    #[serde(rename = "type")]
    pub scope: Option<String>,
}

/// The delete endpoints insist on an explicit scope; there is no default and
/// nothing else is accepted.
pub(crate) fn parse_delete_scope(params: &DeleteParams) -> Result<DeleteScope, ApiError> {
    match params.scope.as_deref() {
        Some(raw) => DeleteScope::parse(raw).ok_or_else(|| {
            ApiError::validation(format!(
                "Unknown delete type '{raw}'; use type=dashboard or type=both"
            ))
        }),
        None => Err(ApiError::validation(
            "Deleting requires an explicit type=dashboard or type=both",
        )),
    }
}

/// Apply one of the two deletion scopes to an entity and describe the result
/// the way the dashboard confirms it.
pub(crate) async fn delete_entity(
    pool: &DbPool,
    kind: EntityKind,
    id: &str,
    scope: DeleteScope,
) -> Result<impl IntoResponse, ApiError> {
    let (found, message) = match scope {
        DeleteScope::Dashboard => (
            db::hide_from_dashboard(pool, kind, id)
                .await
                .map_err(ApiError::from_db)?,
            format!(
                "{} deleted from dashboard only (still on the main website)",
                kind.label()
            ),
        ),
        DeleteScope::Both => (
            db::remove_entity(pool, kind, id)
                .await
                .map_err(ApiError::from_db)?,
            format!(
                "{} permanently deleted from both dashboard and main website",
                kind.label()
            ),
        ),
    };
    if !found {
        return Err(ApiError::NotFound(kind.label()));
    }
    Ok(AxumJson(json!({ "success": true, "message": message })))
}

pub(crate) async fn restore_entity(
    pool: &DbPool,
    kind: EntityKind,
    id: &str,
) -> Result<impl IntoResponse, ApiError> {
    let found = db::restore_entity(pool, kind, id)
        .await
        .map_err(ApiError::from_db)?;
    if !found {
        return Err(ApiError::NotFound(kind.label()));
    }
    Ok(AxumJson(json!({
        "success": true,
        "message": format!("{} restored successfully", kind.label()),
    })))
}
