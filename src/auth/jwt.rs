use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{
    auth::{
        claims::{SessionClaims, TokenKind},
        dto::PublicUser,
    },
    config::{JwtConfig, MAX_TTL_MINUTES},
    state::AppState,
};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("{0} signing secret is not configured")]
    MissingSecret(TokenKind),
    #[error("expected a {expected} token")]
    WrongKind { expected: TokenKind },
    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

#[derive(Clone)]
struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: Option<&str>) -> Option<Self> {
        secret.map(|s| Self {
            encoding: EncodingKey::from_secret(s.as_bytes()),
            decoding: DecodingKey::from_secret(s.as_bytes()),
        })
    }
}

/// Freshly signed access and refresh tokens.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Signing keys for both token kinds, built from config per request.
#[derive(Clone)]
pub struct SessionKeys {
    access: Option<KeyPair>,
    refresh: Option<KeyPair>,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

// Config loading already rejects out-of-range values.
fn bounded_ttl(minutes: i64) -> Duration {
    Duration::minutes(minutes.clamp(1, MAX_TTL_MINUTES))
}

impl SessionKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            access: KeyPair::from_secret(cfg.access_secret.as_deref()),
            refresh: KeyPair::from_secret(cfg.refresh_secret.as_deref()),
            access_ttl: bounded_ttl(cfg.access_ttl_minutes),
            refresh_ttl: bounded_ttl(cfg.refresh_ttl_minutes),
        }
    }

    fn keys(&self, kind: TokenKind) -> Result<&KeyPair, TokenError> {
        let keys = match kind {
            TokenKind::Access => self.access.as_ref(),
            TokenKind::Refresh => self.refresh.as_ref(),
        };
        keys.ok_or(TokenError::MissingSecret(kind))
    }

    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    /// Checks that both secrets are present without signing anything.
    pub fn ensure_complete(&self) -> Result<(), TokenError> {
        self.keys(TokenKind::Access)?;
        self.keys(TokenKind::Refresh)?;
        Ok(())
    }

    pub(crate) fn sign_with_ttl(
        &self,
        user: &PublicUser,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let keys = self.keys(kind)?;
        let now = OffsetDateTime::now_utc();
        let claims = SessionClaims {
            user: user.clone(),
            kind,
            iat: now.unix_timestamp() as usize,
            exp: (now + ttl).unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding)?;
        debug!(user_id = %user.id, kind = %kind, "jwt signed");
        Ok(token)
    }

    pub fn sign(&self, user: &PublicUser, kind: TokenKind) -> Result<String, TokenError> {
        self.sign_with_ttl(user, kind, self.ttl(kind))
    }

    /// Signs both tokens; fails before signing either if a secret is missing.
    pub fn issue(&self, user: &PublicUser) -> Result<TokenPair, TokenError> {
        self.ensure_complete()?;
        Ok(TokenPair {
            access: self.sign(user, TokenKind::Access)?,
            refresh: self.sign(user, TokenKind::Refresh)?,
        })
    }

    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<SessionClaims, TokenError> {
        let keys = self.keys(kind)?;
        let data = decode::<SessionClaims>(token, &keys.decoding, &Validation::default())?;
        if data.claims.kind != kind {
            return Err(TokenError::WrongKind { expected: kind });
        }
        debug!(user_id = %data.claims.user.id, kind = %kind, "jwt verified");
        Ok(data.claims)
    }
}
