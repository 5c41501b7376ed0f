//! Handle database requests.

use sqlx::{Pool, Postgres};

use crate::error::Result;
use crate::user::User;

const USER_COLUMNS: &str = "id, username, name, password, email, cpf, \
    birth_date, profile_photo, cep, country, state, city, neighborhood, \
    address, phone_number, active, deleted, created_at, updated_at";

#[derive(Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Insert [`User`] into database.
    ///
    /// The partial unique indexes on username/email/cpf are the backstop for
    /// concurrent registrations that both passed the existence checks.
    pub async fn insert(&self, user: &User) -> Result<User> {
        let query = format!(
            r#"INSERT INTO users ({USER_COLUMNS})
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                        $13, $14, $15, $16, $17, $18, $19)
                RETURNING {USER_COLUMNS}"#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(&user.id)
            .bind(&user.username)
            .bind(&user.name)
            .bind(&user.password)
            .bind(&user.email)
            .bind(&user.cpf)
            .bind(user.birth_date)
            .bind(&user.profile_photo)
            .bind(&user.cep)
            .bind(&user.country)
            .bind(&user.state)
            .bind(&user.city)
            .bind(&user.neighborhood)
            .bind(&user.address)
            .bind(&user.phone_number)
            .bind(user.active)
            .bind(user.deleted)
            .bind(user.created_at)
            .bind(user.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find a user using the `username` field.
    ///
    /// A username can appear on several rows once accounts get soft-deleted;
    /// the live row wins, then the most recent deleted one.
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>> {
        let query = format!(
            r#"SELECT {USER_COLUMNS} FROM users
                WHERE username = $1
                ORDER BY deleted ASC, created_at DESC
                LIMIT 1"#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Every user row, soft-deleted ones included.
    pub async fn find_all(&self) -> Result<Vec<User>> {
        let query = format!(
            r#"SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"#
        );

        let users = sqlx::query_as::<_, User>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// All rows matching an `email`, deleted or not.
    pub async fn find_by_email(&self, email: &str) -> Result<Vec<User>> {
        let query =
            format!(r#"SELECT {USER_COLUMNS} FROM users WHERE email = $1"#);

        let users = sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// All rows matching a `cpf`, deleted or not.
    pub async fn find_by_cpf(&self, cpf: &str) -> Result<Vec<User>> {
        let query =
            format!(r#"SELECT {USER_COLUMNS} FROM users WHERE cpf = $1"#);

        let users = sqlx::query_as::<_, User>(&query)
            .bind(cpf)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Write the full row back, stamping `updated_at`.
    pub async fn update(&self, user: &User) -> Result<User> {
        let query = format!(
            r#"UPDATE users
                SET name = $1, password = $2, email = $3, birth_date = $4,
                    profile_photo = $5, cep = $6, country = $7, state = $8,
                    city = $9, neighborhood = $10, address = $11,
                    phone_number = $12, active = $13, deleted = $14,
                    updated_at = NOW()
                WHERE id = $15
                RETURNING {USER_COLUMNS}"#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(&user.name)
            .bind(&user.password)
            .bind(&user.email)
            .bind(user.birth_date)
            .bind(&user.profile_photo)
            .bind(&user.cep)
            .bind(&user.country)
            .bind(&user.state)
            .bind(&user.city)
            .bind(&user.neighborhood)
            .bind(&user.address)
            .bind(&user.phone_number)
            .bind(user.active)
            .bind(user.deleted)
            .bind(&user.id)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    /// Permanently remove the row a username resolves to. Rows referencing
    /// the user elsewhere are left dangling.
    pub async fn delete(&self, username: &str) -> Result<Option<User>> {
        let query = format!(
            r#"DELETE FROM users
                WHERE id = (
                    SELECT id FROM users
                    WHERE username = $1
                    ORDER BY deleted ASC, created_at DESC
                    LIMIT 1
                )
                RETURNING {USER_COLUMNS}"#
        );

        let user = sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }
}
