//! Flip the account `active` flag.

use axum::extract::State;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::Result;
use crate::router::users::CurrentUser;
use crate::user::PublicUser;

/// Mark the caller's account active. Deleted accounts stay off for good.
pub async fn enable(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<PublicUser>> {
    Ok(Json(state.users().enable(&current.username).await?))
}

/// Mark the caller's account inactive. Idempotent.
pub async fn disable(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<PublicUser>> {
    Ok(Json(state.users().disable(&current.username).await?))
}
