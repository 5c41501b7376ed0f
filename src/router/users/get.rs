//! Read-only user lookups.

use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::AppState;
use crate::error::Result;
use crate::router::users::CurrentUser;
use crate::user::PublicUser;

/// Every account, redacted. No pagination.
pub async fn all(
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicUser>>> {
    Ok(Json(state.users().find_all().await?))
}

/// The authenticated caller's own account.
pub async fn me(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<PublicUser>> {
    Ok(Json(state.users().find_by_username(&current.username).await?))
}

/// Administrative lookup by path parameter.
pub async fn by_username(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PublicUser>> {
    Ok(Json(state.users().find_by_username(&username).await?))
}
