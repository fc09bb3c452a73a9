use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

/// User record in the database. Deliberately not `Serialize`: callers only
/// ever see [`PublicUser`](crate::auth::dto::PublicUser).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String, // Argon2 PHC string
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub date_of_birth: Date,
    pub ssn: String,
    pub created_at: OffsetDateTime,
}

/// Fields accepted on insert; `id` and `created_at` come from the store.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub date_of_birth: Date,
    pub ssn: String,
}
