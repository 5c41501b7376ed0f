//! Error handler for contas.

use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::Error as SQLxError;
use thiserror::Error;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Axum(#[from] JsonRejection),

    #[error("SQL request failed: {0}")]
    Sql(#[from] SQLxError),

    #[error("{message}")]
    Conflict { message: String },

    #[error("user not found")]
    NotFound,

    #[error("invalid 'Authorization' header")]
    Unauthorized,

    /// Credential verification failure. Deliberately carries no detail about
    /// which part of the credential was wrong.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("token signing failed")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("internal server error, {details}")]
    Internal {
        details: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl ServerError {
    /// Conflict with a message naming the violated constraint.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    r#type: Option<String>,
    title: String,
    status: u16,
    detail: String,
    instance: Option<String>,
    errors: Option<Vec<FieldError>>,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `title` field.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Add detailed error.
    pub fn details(mut self, description: &str) -> Self {
        self.detail = description.into();
        self
    }

    /// Automatically add errors field.
    pub fn errors(mut self, errors: &ValidationErrors) -> Self {
        self.errors = Some(parse_validation_errors(errors));
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(self) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            r#type: None,
            title: "Internal server error.".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: String::default(),
            instance: None,
            errors: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn parse_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| FieldError {
                field: field.to_string(),
                message: issue.to_string(),
            })
        })
        .collect()
}

/// Translate a unique-index violation into the message of the constraint it
/// guards. Concurrent registrations can both pass the application-level
/// existence checks; the partial indexes are the backstop.
fn unique_violation_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("users_username_live") => "Username already exists",
        Some("users_email_live") => "Email already exists",
        Some("users_cpf_live") => "Cpf already exists",
        _ => "Account data conflicts with an existing user",
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default()
            .title("There were validation errors with your request.")
            .details(&self.to_string())
            .status(StatusCode::BAD_REQUEST);

        let response = match &self {
            ServerError::Validation(validation_errors) => response.errors(validation_errors),

            ServerError::Conflict { message } => response
                .title("Conflicting account data.")
                .details(message)
                .status(StatusCode::CONFLICT),

            ServerError::NotFound => response
                .title("User not found.")
                .details("No account matches the requested identity.")
                .status(StatusCode::NOT_FOUND),

            ServerError::Unauthorized => response
                .title("Missing or invalid 'Authorization' header.")
                .status(StatusCode::UNAUTHORIZED),

            ServerError::InvalidCredentials => response
                .title("Invalid credentials.")
                .details("Username or password is incorrect.")
                .status(StatusCode::UNAUTHORIZED),

            ServerError::Sql(err) => match err.as_database_error() {
                Some(db_err) if db_err.is_unique_violation() => response
                    .title("Conflicting account data.")
                    .details(unique_violation_message(db_err.constraint()))
                    .status(StatusCode::CONFLICT),
                _ => {
                    tracing::error!(error = %err, "SQL request failed");
                    ResponseError::default()
                },
            },

            ServerError::Token(err) => {
                tracing::error!(error = %err, "token signing failed");
                ResponseError::default()
            },

            ServerError::Internal { details, source } => {
                tracing::error!(source = ?source, %details, "server returned 500 status");

                ResponseError::default()
            },

            _ => response,
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "type": null,
                "title": "Internal server error.",
                "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "detail": null,
                "instance": null,
                "errors": null,
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_message() {
        assert_eq!(
            unique_violation_message(Some("users_username_live")),
            "Username already exists"
        );
        assert_eq!(
            unique_violation_message(Some("users_cpf_live")),
            "Cpf already exists"
        );
        assert_eq!(
            unique_violation_message(None),
            "Account data conflicts with an existing user"
        );
    }

    #[test]
    fn test_status_mapping() {
        let response = ServerError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = ServerError::conflict("Username test already exists")
            .into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = ServerError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = ServerError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
