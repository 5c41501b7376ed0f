//! Manage json web tokens.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Token lifetime in seconds.
pub const EXPIRATION_TIME: u64 = 60 * 15; // 15 minutes.

/// Pieces of information asserted on a JWT.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Claims {
    /// Recipients that the JWT is intended for.
    pub aud: String,
    /// Identifies the expiration time on or after which the JWT must not be
    /// accepted for processing.
    pub exp: u64,
    /// Identifies the time at which the JWT was issued.
    pub iat: u64,
    /// Identifies the organization that issued the JWT.
    pub iss: String,
    /// User ID.
    pub sub: String,
    /// Account username the token was issued to.
    pub username: String,
}

/// Manage JWT tokens.
#[derive(Clone)]
pub struct TokenManager {
    algorithm: Algorithm,
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    name: String,
    audience: String,
}

impl TokenManager {
    /// Create a new [`TokenManager`] instance.
    pub fn new(name: &str, secret: &str) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            name: name.to_owned(),
            audience: name.to_owned(),
        }
    }

    /// Set `audience` field on JWT.
    pub fn audience(&mut self, audience: &str) {
        self.audience = audience.to_owned();
    }

    /// Create a new signed token for a user.
    pub fn create(&self, user_id: &str, username: &str) -> Result<String> {
        let time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|err| crate::error::ServerError::Internal {
                details: "system clock before unix epoch".to_owned(),
                source: Some(Box::new(err)),
            })?
            .as_secs();
        let header = Header::new(self.algorithm);
        let claims = Claims {
            aud: self.audience.clone(),
            exp: time + EXPIRATION_TIME,
            iat: time,
            iss: self.name.clone(),
            sub: user_id.to_owned(),
            username: username.to_owned(),
        };

        Ok(encode(&header, &claims, &self.encoding_key)?)
    }

    /// Decode and check a token.
    pub fn decode(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_audience(&[&self.audience]);

        Ok(decode::<Claims>(token, &self.decoding_key, &validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    const SECRET: &str = "test-secret-key-for-unit-tests";

    #[test]
    fn test_create_and_decode() {
        let manager = TokenManager::new("https://account.example.com/", SECRET);
        let token = manager.create("d41d8cd98f00b204", "alice").unwrap();

        let claims = manager.decode(&token).unwrap();
        assert_eq!(claims.sub, "d41d8cd98f00b204");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.iss, "https://account.example.com/");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = TokenManager::new("https://account.example.com/", SECRET);
        let token = manager.create("d41d8cd98f00b204", "alice").unwrap();

        let other = TokenManager::new("https://account.example.com/", "wrong");
        assert!(other.decode(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let manager = TokenManager::new("https://account.example.com/", SECRET);
        assert!(manager.decode("invalid.token.string").is_err());
    }

    #[test]
    fn test_expiry_in_the_future() {
        let manager = TokenManager::new("https://account.example.com/", SECRET);
        let token = manager.create("d41d8cd98f00b204", "alice").unwrap();
        let claims = manager.decode(&token).unwrap();

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();
        assert!(claims.exp > now);
        assert!(claims.exp <= now + EXPIRATION_TIME + 10);
    }
}
