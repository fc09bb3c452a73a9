use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::CookieJar;

use super::{
    claims::SessionClaims,
    handlers::ACCESS_COOKIE,
    jwt::SessionKeys,
    services::{session_details, AuthError},
};
use crate::state::AppState;

/// Reads and validates the access-token cookie, yielding its claims.
pub struct SessionUser(pub SessionClaims);

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let keys = SessionKeys::from_ref(state);
        let claims = session_details(&keys, jar.get(ACCESS_COOKIE).map(|c| c.value()))?;
        Ok(SessionUser(claims))
    }
}
