//! Caller authentication with HS256 JSON Web Tokens.
//!
//! Tokens are issued by the user service. They are accepted from the
//! `Authorization: Bearer` header or the `authToken` cookie, and the raw
//! credential is kept so it can be forwarded to the product service.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use checkout::{AUTH_COOKIE, CallerCredential};
use common::UserId;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Claims carried by a user token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Expiry as seconds since the Unix epoch.
    pub exp: u64,
}

/// Verification key for user tokens.
#[derive(Clone)]
pub struct JwtKeys {
    decoding: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys").finish_non_exhaustive()
    }
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            validation: Arc::new(Validation::new(Algorithm::HS256)),
        }
    }

    /// Verifies a token and returns its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
    }
}

/// An authenticated caller.
#[derive(Debug, Clone)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Option<String>,
    /// The credential as presented, for forwarding.
    pub credential: CallerCredential,
}

fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let (token, credential) = match header.as_deref().and_then(bearer_token) {
            Some(token) => (
                token.to_string(),
                CallerCredential {
                    authorization: header.clone(),
                    auth_token_cookie: None,
                },
            ),
            None => {
                let jar = CookieJar::from_headers(&parts.headers);
                let token = jar
                    .get(AUTH_COOKIE)
                    .map(|c| c.value().to_string())
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| {
                        metrics::counter!("auth_rejections_total", "reason" => "missing")
                            .increment(1);
                        ApiError::Unauthorized("Access denied. No token provided.")
                    })?;
                (token.clone(), CallerCredential::cookie(token))
            }
        };

        let claims = keys.verify(&token).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            metrics::counter!("auth_rejections_total", "reason" => "invalid").increment(1);
            ApiError::Unauthorized("Invalid token.")
        })?;

        Ok(Caller {
            user_id: UserId::new(claims.id),
            role: claims.role,
            credential,
        })
    }
}
