use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{error, info, warn};

use crate::{
    auth::{
        claims::{SessionClaims, TokenKind},
        dto::{PublicUser, SignInRequest, SignUpRequest},
        jwt::{SessionKeys, TokenError, TokenPair},
        password::{hash_password, verify_password, PasswordError},
        repo::{StoreError, UserStore},
        repo_types::NewUser,
    },
    envelope::{Envelope, ErrorMarker},
};

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Email and password are required")]
    MissingCredentials,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("Invalid email")]
    InvalidEmail,
    #[error("Password must be at least 8 characters")]
    WeakPassword,
    #[error("Could not find user with the email")]
    UserNotFound,
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Token expired, please login again!")]
    TokenExpired,
    /// A signing secret is missing. The message never says which one.
    #[error("Internal server error")]
    Misconfigured,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingCredentials
            | AuthError::MissingField(_)
            | AuthError::InvalidEmail
            | AuthError::WeakPassword => StatusCode::BAD_REQUEST,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::InvalidPassword | AuthError::Unauthorized | AuthError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::Store(StoreError::DuplicateEmail) => StatusCode::CONFLICT,
            AuthError::Misconfigured
            | AuthError::Password(_)
            | AuthError::Store(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn envelope<T>(&self) -> Envelope<T> {
        match self {
            AuthError::TokenExpired => {
                Envelope::error_with(self.to_string(), ErrorMarker::TokenExpired)
            }
            _ => Envelope::error(self.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.envelope::<()>())).into_response()
    }
}

fn signing_error(e: TokenError) -> AuthError {
    match e {
        TokenError::MissingSecret(kind) => {
            error!(kind = %kind, "jwt signing secret not configured");
            AuthError::Misconfigured
        }
        other => {
            error!(error = %other, "jwt signing failed");
            AuthError::Internal(other.into())
        }
    }
}

fn verification_error(e: TokenError) -> AuthError {
    match e {
        TokenError::MissingSecret(kind) => {
            error!(kind = %kind, "jwt verification secret not configured");
            AuthError::Misconfigured
        }
        other => {
            warn!(error = %other, "invalid or expired token");
            AuthError::TokenExpired
        }
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Verifies credentials and signs a fresh token pair over the user's
/// public projection.
pub async fn sign_in(
    users: &dyn UserStore,
    keys: &SessionKeys,
    req: SignInRequest,
) -> Result<(PublicUser, TokenPair), AuthError> {
    let email = req.email.as_deref().map(normalize_email).unwrap_or_default();
    let password = req.password.unwrap_or_default();
    if email.is_empty() || password.is_empty() {
        warn!("sign-in without email or password");
        return Err(AuthError::MissingCredentials);
    }

    let user = match users.find_by_email(&email).await? {
        Some(u) => u,
        None => {
            warn!(email = %email, "sign-in unknown email");
            return Err(AuthError::UserNotFound);
        }
    };

    if !verify_password(&password, &user.password_hash)? {
        warn!(user_id = %user.id, "sign-in invalid password");
        return Err(AuthError::InvalidPassword);
    }

    let public = PublicUser::from(&user);
    let tokens = keys.issue(&public).map_err(signing_error)?;
    info!(user_id = %public.id, "user signed in");
    Ok((public, tokens))
}

pub async fn sign_up(users: &dyn UserStore, req: SignUpRequest) -> Result<PublicUser, AuthError> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        warn!(email = %email, "sign-up invalid email");
        return Err(AuthError::InvalidEmail);
    }
    if req.password.chars().count() < 8 {
        return Err(AuthError::WeakPassword);
    }

    let required = [
        ("first_name", &req.first_name),
        ("last_name", &req.last_name),
        ("address", &req.address),
        ("city", &req.city),
        ("state", &req.state),
        ("postal_code", &req.postal_code),
        ("ssn", &req.ssn),
    ];
    if let Some(&(name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
        return Err(AuthError::MissingField(name));
    }
    let date_of_birth = req
        .date_of_birth
        .ok_or(AuthError::MissingField("date_of_birth"))?;

    let password_hash = hash_password(&req.password)?;
    let created = users
        .create(NewUser {
            email,
            password_hash,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            address: req.address.trim().to_string(),
            city: req.city.trim().to_string(),
            state: req.state.trim().to_string(),
            postal_code: req.postal_code.trim().to_string(),
            date_of_birth,
            ssn: req.ssn.trim().to_string(),
        })
        .await
        .map_err(|e| {
            match &e {
                StoreError::DuplicateEmail => warn!("sign-up duplicate email"),
                StoreError::Database(db) => error!(error = %db, "create user failed"),
            }
            e
        })?;

    info!(user_id = %created.id, "user signed up");
    Ok(PublicUser::from(&created))
}

/// Decodes the access token from the current session.
pub fn session_details(
    keys: &SessionKeys,
    access_token: Option<&str>,
) -> Result<SessionClaims, AuthError> {
    let token = access_token.ok_or(AuthError::Unauthorized)?;
    keys.verify(token, TokenKind::Access)
        .map_err(verification_error)
}

/// Decodes the refresh token and signs a new pair from its user claims.
pub fn refresh_session(
    keys: &SessionKeys,
    refresh_token: Option<&str>,
) -> Result<(SessionClaims, TokenPair), AuthError> {
    let token = refresh_token.ok_or(AuthError::TokenExpired)?;
    keys.ensure_complete().map_err(signing_error)?;
    let claims = keys
        .verify(token, TokenKind::Refresh)
        .map_err(verification_error)?;
    let tokens = keys.issue(&claims.user).map_err(signing_error)?;
    info!(user_id = %claims.user.id, "session refreshed");
    Ok((claims, tokens))
}
