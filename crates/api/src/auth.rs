//! Session tokens and the authenticated-user extractor.
//!
//! A session is an HS256 JWT carried in the `token` cookie. Clients that
//! cannot send cookies may pass the same token as `Authorization: Bearer`.

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use store::Store;
use thiserror::Error;

use crate::error::ApiError;
use crate::state::AppState;

/// Name of the session cookie.
pub const TOKEN_COOKIE: &str = "token";

/// Errors from issuing or verifying a session.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no session token")]
    MissingToken,

    #[error("invalid session token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),

    #[error("session identity must include an email")]
    MissingEmail,

    #[error("failed to sign session token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Claims stored in a session token.
///
/// Identity fields other than the email ride along in `extra` and come back
/// unchanged when the token is verified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keys and cookie policy for sessions.
pub struct SessionKeys {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
    secure: bool,
}

impl SessionKeys {
    /// Creates session keys from a shared secret.
    ///
    /// `secure` selects production cookies (`Secure`, `SameSite=None`).
    pub fn new(secret: &[u8], ttl: Duration, secure: bool) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation: Validation::default(),
            ttl,
            secure,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a session for the identity posted by the client.
    ///
    /// The identity must carry a non-empty `email` string. Any `iat` or
    /// `exp` the client sent is replaced.
    pub fn issue(&self, mut identity: Map<String, Value>) -> Result<String, AuthError> {
        let email = match identity.remove("email") {
            Some(Value::String(email)) if !email.trim().is_empty() => email,
            _ => return Err(AuthError::MissingEmail),
        };
        identity.remove("iat");
        identity.remove("exp");

        let now = Utc::now();
        let claims = Claims {
            email,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            extra: identity,
        };
        encode(&Header::default(), &claims, &self.encoding_key).map_err(AuthError::Signing)
    }

    /// Checks a token's signature and expiry and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(AuthError::InvalidToken)
    }

    /// Builds the cookie that carries a freshly issued token.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        let builder = Cookie::build((TOKEN_COOKIE, token))
            .path("/")
            .http_only(true)
            .max_age(cookie::time::Duration::seconds(self.ttl.num_seconds()));

        if self.secure {
            builder.secure(true).same_site(SameSite::None).build()
        } else {
            builder.same_site(SameSite::Strict).build()
        }
    }

    /// Builds a cookie that tells the browser to drop the session.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.session_cookie(String::new());
        cookie.make_removal();
        cookie
    }
}

/// Finds the session token on a request: the cookie first, then a bearer header.
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let from_cookie = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == TOKEN_COOKIE && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string());

    from_cookie.or_else(|| {
        headers
            .get(AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    })
}

/// The verified identity behind a request.
///
/// Handlers that take an `AuthUser` are never called for requests without
/// a valid session; those get 401 instead.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub email: String,
    pub claims: Claims,
}

impl<S> FromRequestParts<Arc<AppState<S>>> for AuthUser
where
    S: Store + 'static,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_headers(&parts.headers).ok_or(AuthError::MissingToken)?;
        let claims = state.sessions.verify(&token)?;
        Ok(AuthUser {
            email: claims.email.clone(),
            claims,
        })
    }
}
