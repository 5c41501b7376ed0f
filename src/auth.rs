//! Credential verification and token issuance.

use std::sync::Arc;

use crate::crypto::PasswordManager;
use crate::error::{Result, ServerError};
use crate::token::TokenManager;
use crate::user::UserService;

/// A verified account identity. Carries no credential material.
#[derive(Clone, Debug, PartialEq)]
pub struct Identity {
    pub id: String,
    pub username: String,
}

/// Turns credentials into identities, and identities into bearer tokens.
pub struct Authenticator {
    users: UserService,
    pwd: Arc<PasswordManager>,
    token: TokenManager,
}

impl Authenticator {
    /// Create a new [`Authenticator`].
    pub fn new(
        users: UserService,
        pwd: Arc<PasswordManager>,
        token: TokenManager,
    ) -> Self {
        Self { users, pwd, token }
    }

    /// Check a submitted credential pair against stored state.
    ///
    /// Side-effect free. Absent user, username mismatch, hash mismatch and
    /// soft-deleted account all collapse into the same
    /// [`ServerError::InvalidCredentials`]; responses never say which part
    /// of the credential was wrong.
    pub async fn verify(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity> {
        let Some(user) = self.users.find_with_credentials(username).await?
        else {
            return Err(ServerError::InvalidCredentials);
        };

        if user.deleted || user.username != username {
            return Err(ServerError::InvalidCredentials);
        }

        self.pwd
            .verify_password(password, &user.password)
            .map_err(|_| ServerError::InvalidCredentials)?;

        Ok(Identity {
            id: user.id,
            username: user.username,
        })
    }

    /// Sign a bearer token for a verified identity, then mark the account
    /// active. Two explicit steps: signing failures are fatal, and a NotFound
    /// from the enable step (the account was hard-deleted since `verify`)
    /// fails the whole login.
    pub async fn issue(&self, identity: &Identity) -> Result<String> {
        let token = self.token.create(&identity.id, &identity.username)?;
        self.users.enable(&identity.username).await?;

        tracing::info!(user_id = %identity.id, "session token issued");
        Ok(token)
    }
}
