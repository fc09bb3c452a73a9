use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo_types::User;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Request body for sign-in. Absent and `null` fields both deserialize as
/// `None` so the service answers with its own envelope.
#[derive(Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Request body for sign-up. Only these fields reach the store; absent ones
/// default to empty and are reported by field name.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(with = "iso_date::option")]
    pub date_of_birth: Option<time::Date>,
    pub ssn: String,
}

/// Public projection of a user: every field except the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(with = "iso_date")]
    pub date_of_birth: time::Date,
    pub ssn: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            address: user.address.clone(),
            city: user.city.clone(),
            state: user.state.clone(),
            postal_code: user.postal_code.clone(),
            date_of_birth: user.date_of_birth,
            ssn: user.ssn.clone(),
            created_at: user.created_at,
        }
    }
}
