use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rand::RngCore;
use sqlx::{Pool, Postgres};

use crate::crypto::PasswordManager;
use crate::error::{Result, ServerError};
use crate::user::{PublicUser, UpdateProfile, User, UserRepository};

/// Generated identifiers are 16 random bytes, hex-encoded.
pub const ID_LENGTH: usize = 32;

const ADULT_AGE: u32 = 18;

/// Registration data, already validated at the boundary.
#[derive(Clone, Debug, Default)]
pub struct NewUser {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub cpf: String,
    pub birth_date: NaiveDate,
    pub profile_photo: Option<String>,
    pub cep: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

/// User lifecycle manager.
#[derive(Clone)]
pub struct UserService {
    pub repo: UserRepository,
    pwd: Arc<PasswordManager>,
}

fn generate_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Whether someone born on `birth_date` is of age on `today`.
fn is_adult(birth_date: NaiveDate, today: NaiveDate) -> bool {
    today
        .years_since(birth_date)
        .is_some_and(|age| age >= ADULT_AGE)
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(pool: Pool<Postgres>, pwd: Arc<PasswordManager>) -> Self {
        Self {
            repo: UserRepository::new(pool),
            pwd,
        }
    }

    /// Register a new account.
    ///
    /// Username, email and cpf must be free among non-deleted users; rows a
    /// soft delete left behind do not reserve them. Registrants must be of
    /// age. The check-then-insert sequence is not atomic, so the storage
    /// unique indexes back it up.
    pub async fn create(&self, new: NewUser) -> Result<PublicUser> {
        if let Some(user) = self.repo.find_by_username(&new.username).await? {
            if !user.deleted {
                return Err(ServerError::conflict(format!(
                    "Username {} already exists",
                    new.username
                )));
            }
        }

        let emails = self.repo.find_by_email(&new.email).await?;
        if emails.iter().any(|user| !user.deleted) {
            return Err(ServerError::conflict(format!(
                "Email {} already exists",
                new.email
            )));
        }

        let cpfs = self.repo.find_by_cpf(&new.cpf).await?;
        if cpfs.iter().any(|user| !user.deleted) {
            return Err(ServerError::conflict(format!(
                "Cpf {} already exists",
                new.cpf
            )));
        }

        if !is_adult(new.birth_date, Utc::now().date_naive()) {
            return Err(ServerError::conflict(
                "User must be at least 18 years old",
            ));
        }

        let password = self.pwd.hash_password(&new.password).map_err(|err| {
            ServerError::Internal {
                details: "password hashing failed".to_owned(),
                source: Some(Box::new(err)),
            }
        })?;

        let now = Utc::now();
        let user = User {
            id: generate_id(),
            username: new.username,
            name: new.name,
            password,
            email: new.email,
            cpf: new.cpf,
            birth_date: new.birth_date,
            profile_photo: new.profile_photo,
            cep: new.cep,
            country: new.country,
            state: new.state,
            city: new.city,
            neighborhood: new.neighborhood,
            address: new.address,
            phone_number: new.phone_number,
            active: false,
            deleted: false,
            created_at: now,
            updated_at: now,
        };

        let user = self.repo.insert(&user).await?;
        tracing::info!(user_id = %user.id, "user created");

        Ok(user.into())
    }

    /// Every account, redacted. No pagination.
    pub async fn find_all(&self) -> Result<Vec<PublicUser>> {
        let users = self.repo.find_all().await?;
        Ok(users.into_iter().map(Into::into).collect())
    }

    /// Redacted lookup by username.
    pub async fn find_by_username(&self, username: &str) -> Result<PublicUser> {
        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(ServerError::NotFound)?;

        Ok(user.into())
    }

    /// Lookup that keeps the password hash. Credential verification only;
    /// every other caller goes through [`Self::find_by_username`].
    pub async fn find_with_credentials(
        &self,
        username: &str,
    ) -> Result<Option<User>> {
        self.repo.find_by_username(username).await
    }

    /// Update mutable profile fields. Everything else on the wire payload is
    /// already gone by the time [`UpdateProfile`] exists.
    pub async fn update(
        &self,
        username: &str,
        changes: UpdateProfile,
    ) -> Result<PublicUser> {
        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(ServerError::NotFound)?;

        let user = self.repo.update(&changes.apply(user)).await?;
        Ok(user.into())
    }

    /// Soft delete: scrub PII, mark deleted, keep the row.
    ///
    /// Read-modify-write without a guard; last writer wins on races.
    pub async fn soft_delete(&self, username: &str) -> Result<PublicUser> {
        let user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(ServerError::NotFound)?;

        let user = self.repo.update(&user.scrub()).await?;
        tracing::info!(user_id = %user.id, "user soft-deleted");

        Ok(user.into())
    }

    /// Hard delete: the row is gone for good.
    pub async fn hard_delete(&self, username: &str) -> Result<PublicUser> {
        let user = self
            .repo
            .delete(username)
            .await?
            .ok_or(ServerError::NotFound)?;
        tracing::warn!(user_id = %user.id, "user hard-deleted");

        Ok(user.into())
    }

    /// Mark the account active. Fails with NotFound for absent or deleted
    /// users; a deleted account can never be re-activated.
    pub async fn enable(&self, username: &str) -> Result<PublicUser> {
        self.set_active(username, true).await
    }

    /// Mark the account inactive. Same NotFound rules as [`Self::enable`].
    pub async fn disable(&self, username: &str) -> Result<PublicUser> {
        self.set_active(username, false).await
    }

    async fn set_active(
        &self,
        username: &str,
        active: bool,
    ) -> Result<PublicUser> {
        let mut user = self
            .repo
            .find_by_username(username)
            .await?
            .ok_or(ServerError::NotFound)?;

        if user.deleted {
            return Err(ServerError::NotFound);
        }

        user.active = active;
        let user = self.repo.update(&user).await?;

        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    #[test]
    fn test_is_adult_boundaries() {
        let born = date(2000, 6, 15);

        // 18th birthday.
        assert!(is_adult(born, date(2018, 6, 15)));
        // The day before.
        assert!(!is_adult(born, date(2018, 6, 14)));
        // Well past.
        assert!(is_adult(born, date(2026, 1, 1)));
        // Seventeen, whatever the calendar distance looks like.
        assert!(!is_adult(date(2008, 8, 7), date(2026, 8, 6)));
        // Birth date in the future.
        assert!(!is_adult(date(2030, 1, 1), date(2026, 8, 6)));
    }

    #[test]
    fn test_generated_id_shape() {
        let id = generate_id();

        assert_eq!(id.len(), ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(id, generate_id());
    }
}
