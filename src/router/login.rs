use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::auth::Authenticator;
use crate::error::Result;
use crate::router::Valid;

#[derive(Debug, Deserialize, Validate)]
pub struct Body {
    #[validate(length(min = 2, max = 30, message = "Username must be 2 to 30 characters long."))]
    username: String,
    #[validate(length(min = 1, message = "Password is required."))]
    password: String,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub access_token: String,
}

/// Handler to login: verify the credential pair, then issue a bearer token.
/// Issuance marks the account active.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<Json<Response>> {
    let auth = Authenticator::new(
        state.users(),
        Arc::clone(&state.crypto),
        state.token.clone(),
    );

    let identity = auth.verify(&body.username, &body.password).await?;
    let access_token = auth.issue(&identity).await?;

    Ok(Json(Response { access_token }))
}
