use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::router::Valid;
use crate::user::{NewUser, PublicUser};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[validate(length(min = 2, max = 200, message = "Name must be 2 to 200 characters long."))]
    name: String,
    #[validate(length(min = 2, max = 30, message = "Username must be 2 to 30 characters long."))]
    username: String,
    #[validate(email(message = "Email must be formatted."))]
    email: String,
    #[validate(length(
        min = 8,
        max = 255,
        message = "Password must contain at least 8 characters."
    ))]
    password: String,
    birth_date: NaiveDate,
    #[validate(length(min = 11, max = 14, message = "Cpf must be 11 to 14 characters long."))]
    cpf: String,
    #[validate(url(message = "Profile photo must be a URL."))]
    profile_photo: Option<String>,
    cep: Option<String>,
    country: Option<String>,
    state: Option<String>,
    city: Option<String>,
    neighborhood: Option<String>,
    address: Option<String>,
    phone_number: Option<String>,
}

impl From<Body> for NewUser {
    fn from(body: Body) -> Self {
        Self {
            name: body.name,
            username: body.username,
            email: body.email,
            password: body.password,
            cpf: body.cpf,
            birth_date: body.birth_date,
            profile_photo: body.profile_photo,
            cep: body.cep,
            country: body.country,
            state: body.state,
            city: body.city,
            neighborhood: body.neighborhood,
            address: body.address,
            phone_number: body.phone_number,
        }
    }
}

/// Handler to create user. Registration is for anonymous callers: a request
/// that already carries an Authorization header is refused.
pub async fn handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<PublicUser>)> {
    if headers.contains_key(header::AUTHORIZATION) {
        return Err(ServerError::conflict(
            "Cannot register while authenticated",
        ));
    }

    let user = state.users().create(body.into()).await?;

    Ok((StatusCode::CREATED, Json(user)))
}
