//! Account removal, recoverable and not.

use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::AppState;
use crate::error::Result;
use crate::router::users::CurrentUser;
use crate::user::PublicUser;

/// Soft delete of the caller's own account: PII is scrubbed in place and the
/// row stays. The name notwithstanding, the scrub is irreversible.
pub async fn soft(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<PublicUser>> {
    Ok(Json(state.users().soft_delete(&current.username).await?))
}

/// Hard delete by path parameter: the row is removed permanently and rows
/// referencing it elsewhere are left dangling.
pub async fn hard(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<PublicUser>> {
    Ok(Json(state.users().hard_delete(&username).await?))
}
