mod repository;
mod service;

pub use repository::*;
pub use service::*;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Sentinel written over PII fields by a soft delete.
pub const SCRUBBED: &str = "[deleted]";

/// User as saved on database.
///
/// Never serialized across the boundary directly; handlers return
/// [`PublicUser`].
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct User {
    pub id: String,
    pub username: String,
    pub name: String,
    #[serde(skip)]
    pub password: String,
    pub email: String,
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
    pub active: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Soft-delete projection. Destroys PII: the password hash is cleared and
    /// contact fields are overwritten with [`SCRUBBED`]. Irreversible and
    /// idempotent.
    pub fn scrub(mut self) -> Self {
        self.password = String::default();
        self.email = SCRUBBED.to_owned();
        self.phone_number = self.phone_number.map(|_| SCRUBBED.to_owned());
        self.profile_photo = self.profile_photo.map(|_| SCRUBBED.to_owned());
        self.active = false;
        self.deleted = true;
        self
    }
}

/// User as returned across the system boundary.
///
/// There is no password field here, so no code path can leak the hash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub name: String,
    pub email: String,
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
    pub active: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            email: user.email,
            cpf: user.cpf,
            birth_date: user.birth_date,
            profile_photo: user.profile_photo,
            cep: user.cep,
            country: user.country,
            state: user.state,
            city: user.city,
            neighborhood: user.neighborhood,
            address: user.address,
            phone_number: user.phone_number,
            active: user.active,
            deleted: user.deleted,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Mutable profile fields for the general update path.
///
/// Identity (`username`, `email`, `cpf`), credential and lifecycle fields are
/// absent on purpose: a payload carrying them deserializes without the
/// attempted mutation instead of merging it.
#[derive(Clone, Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfile {
    #[validate(length(min = 2, max = 200, message = "Name must be 2 to 200 characters long."))]
    pub name: Option<String>,
    #[validate(url(message = "Profile photo must be a URL."))]
    pub profile_photo: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub cep: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
}

impl UpdateProfile {
    /// Merge the provided fields into `user`. Everything not listed here is
    /// untouched, whatever the caller sent on the wire.
    pub fn apply(self, mut user: User) -> User {
        if let Some(name) = self.name {
            user.name = name;
        }
        if let Some(photo) = self.profile_photo {
            user.profile_photo = Some(photo);
        }
        if let Some(birth_date) = self.birth_date {
            user.birth_date = birth_date;
        }
        if let Some(cep) = self.cep {
            user.cep = Some(cep);
        }
        if let Some(country) = self.country {
            user.country = Some(country);
        }
        if let Some(state) = self.state {
            user.state = Some(state);
        }
        if let Some(city) = self.city {
            user.city = Some(city);
        }
        if let Some(neighborhood) = self.neighborhood {
            user.neighborhood = Some(neighborhood);
        }
        if let Some(address) = self.address {
            user.address = Some(address);
        }
        if let Some(phone_number) = self.phone_number {
            user.phone_number = Some(phone_number);
        }
        user
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "d41d8cd98f00b204e9800998ecf8427e".into(),
            username: "alice".into(),
            name: "Alice Souza".into(),
            password: "$argon2id$fake".into(),
            email: "alice@example.com".into(),
            cpf: "52998224725".into(),
            birth_date: NaiveDate::from_ymd_opt(1990, 4, 2).unwrap(),
            profile_photo: Some("https://example.com/a.png".into()),
            phone_number: Some("+55 11 91234-5678".into()),
            active: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_scrub_destroys_pii() {
        let scrubbed = user().scrub();

        assert!(scrubbed.password.is_empty());
        assert_eq!(scrubbed.email, SCRUBBED);
        assert_eq!(scrubbed.phone_number.as_deref(), Some(SCRUBBED));
        assert_eq!(scrubbed.profile_photo.as_deref(), Some(SCRUBBED));
        assert!(!scrubbed.active);
        assert!(scrubbed.deleted);

        // Non-sensitive profile data survives.
        assert_eq!(scrubbed.username, "alice");
        assert_eq!(scrubbed.cpf, "52998224725");
    }

    #[test]
    fn test_scrub_is_idempotent() {
        let once = user().scrub();
        let twice = once.clone().scrub();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_public_user_has_no_password_key() {
        let json = serde_json::to_value(PublicUser::from(user())).unwrap();
        let object = json.as_object().unwrap();

        assert!(!object.contains_key("password"));
        assert_eq!(object["username"], "alice");
        assert_eq!(object["birthDate"], "1990-04-02");
    }

    #[test]
    fn test_user_serde_skips_password() {
        let json = serde_json::to_value(user()).unwrap();
        assert!(!json.as_object().unwrap().contains_key("password"));
    }

    #[test]
    fn test_update_cannot_carry_restricted_fields() {
        let changes: UpdateProfile = serde_json::from_value(serde_json::json!({
            "name": "New Name",
            "cpf": "00000000000",
            "username": "mallory",
            "password": "hunter2",
            "deleted": true
        }))
        .unwrap();

        let updated = changes.apply(user());

        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.cpf, "52998224725");
        assert_eq!(updated.username, "alice");
        assert_eq!(updated.password, "$argon2id$fake");
        assert!(!updated.deleted);
    }

    #[test]
    fn test_update_changes_only_provided_fields() {
        let changes: UpdateProfile =
            serde_json::from_value(serde_json::json!({ "city": "Recife" }))
                .unwrap();

        let before = user();
        let updated = changes.apply(before.clone());

        assert_eq!(updated.city.as_deref(), Some("Recife"));
        assert_eq!(updated.name, before.name);
        assert_eq!(updated.email, before.email);
        assert_eq!(updated.birth_date, before.birth_date);
    }
}
