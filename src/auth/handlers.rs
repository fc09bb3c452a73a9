use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;
use tracing::{info, instrument};

use crate::{
    auth::{
        claims::SessionClaims,
        dto::{PublicUser, SignInRequest, SignUpRequest},
        extractors::SessionUser,
        jwt::{SessionKeys, TokenPair},
        services::{self, AuthError},
    },
    envelope::Envelope,
    extract::JsonBody,
    state::AppState,
};

pub const ACCESS_COOKIE: &str = "access-token";
pub const REFRESH_COOKIE: &str = "refresh-token";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/session", get(session))
        .route("/auth/refresh", post(refresh))
        .route("/auth/sign-out", post(sign_out))
}

fn session_cookie(name: &'static str, value: String, max_age: Duration, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(max_age)
        .build()
}

fn with_session(jar: CookieJar, tokens: TokenPair, keys: &SessionKeys, secure: bool) -> CookieJar {
    jar.add(session_cookie(ACCESS_COOKIE, tokens.access, keys.access_ttl, secure))
        .add(session_cookie(REFRESH_COOKIE, tokens.refresh, keys.refresh_ttl, secure))
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignUpRequest>,
) -> Result<(StatusCode, Json<Envelope<PublicUser>>), AuthError> {
    let user = services::sign_up(state.users.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(Envelope::success(user, "Signed up successfully")),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(payload): JsonBody<SignInRequest>,
) -> Result<(CookieJar, Json<Envelope<PublicUser>>), AuthError> {
    let keys = SessionKeys::from_ref(&state);
    let (user, tokens) = services::sign_in(state.users.as_ref(), &keys, payload).await?;
    let jar = with_session(jar, tokens, &keys, state.config.cookie_secure);
    Ok((jar, Json(Envelope::success(user, "Logged in successfully"))))
}

#[instrument(skip_all)]
pub async fn session(SessionUser(claims): SessionUser) -> Json<Envelope<SessionClaims>> {
    Json(Envelope::success(claims, "Obtained details successfully"))
}

#[instrument(skip(state, jar))]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Envelope<SessionClaims>>), AuthError> {
    let keys = SessionKeys::from_ref(&state);
    let token = jar.get(REFRESH_COOKIE).map(|c| c.value().to_owned());
    let (claims, tokens) = services::refresh_session(&keys, token.as_deref())?;
    let jar = with_session(jar, tokens, &keys, state.config.cookie_secure);
    Ok((jar, Json(Envelope::success(claims, "Session refreshed successfully"))))
}

#[instrument(skip_all)]
pub async fn sign_out(jar: CookieJar) -> (CookieJar, Json<Envelope<()>>) {
    let jar = jar
        .remove(Cookie::build(ACCESS_COOKIE).path("/"))
        .remove(Cookie::build(REFRESH_COOKIE).path("/"));
    info!("session cookies cleared");
    (jar, Json(Envelope::success((), "Logged out successfully")))
}
