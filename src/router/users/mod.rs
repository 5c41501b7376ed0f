//! Users-related HTTP API.
mod active;
mod delete;
mod get;
mod update;

use axum::extract::{Request, State};
use axum::http::{HeaderMap, header};
use axum::response::Response;
use axum::routing::{get, patch};
use axum::{Router, middleware};

use crate::error::Result;
use crate::{AppState, ServerError};

const BEARER: &str = "Bearer ";

/// Identity taken from a verified bearer token.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
}

fn decode_bearer(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<CurrentUser> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ServerError::Unauthorized)?;
    let token = token.strip_prefix(BEARER).unwrap_or(token);

    let claims = state
        .token
        .decode(token)
        .map_err(|_| ServerError::Unauthorized)?;

    Ok(CurrentUser {
        id: claims.sub,
        username: claims.username,
    })
}

/// Custom middleware for authentification. `@me` routes operate on the
/// identity inside the token, never on a client-supplied one.
async fn auth(
    State(state): State<AppState>,
    mut req: Request,
    next: middleware::Next,
) -> Result<Response> {
    let user = decode_bearer(&state, req.headers())?;
    req.extensions_mut().insert::<CurrentUser>(user);

    Ok(next.run(req).await)
}

/// Gate for the path-parameter routes. Unless the instance explicitly opted
/// into open admin routes, a valid bearer token is required; no ownership
/// check beyond that exists.
async fn admin(
    State(state): State<AppState>,
    req: Request,
    next: middleware::Next,
) -> Result<Response> {
    if !state.config.admin.open {
        decode_bearer(&state, req.headers())?;
    }

    Ok(next.run(req).await)
}

pub fn router(state: AppState) -> Router<AppState> {
    let me = Router::new()
        // `GET /users/@me` goes to `get`. Authorization required.
        .route(
            "/@me",
            get(get::me).patch(update::handler).delete(delete::soft),
        )
        // `PATCH /users/@me/enable` and `/disable` flip the active flag.
        .route("/@me/enable", patch(active::enable))
        .route("/@me/disable", patch(active::disable))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth));

    let by_username = Router::new()
        // `GET /users/:USERNAME` and `DELETE /users/:USERNAME`.
        .route("/{username}", get(get::by_username).delete(delete::hard))
        .route_layer(middleware::from_fn_with_state(state, admin));

    Router::new()
        // `GET /users` lists every account, `POST /users` registers one.
        .route("/", get(get::all).post(super::create::handler))
        .merge(me)
        .merge(by_username)
}
