//! Update user profile data.

use axum::extract::State;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::router::users::CurrentUser;
use crate::user::{PublicUser, UpdateProfile};

/// Merge the submitted profile fields into the caller's account. Identity,
/// credential and lifecycle fields are not part of [`UpdateProfile`], so
/// attempts to send them are dropped at deserialization.
pub async fn handler(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Valid(changes): Valid<UpdateProfile>,
) -> Result<Json<PublicUser>> {
    let user = state.users().update(&current.username, changes).await?;

    Ok(Json(user))
}
