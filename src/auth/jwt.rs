use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, error::ApiError, state::AppState};

/// Signed assertion of identity: who, when issued, when it stops working.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

/// Signing material derived once from config and shared read-only across
/// requests. Rotating the secret invalidates every outstanding token.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtKeys {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    /// Mint a token for `user_id`. Pure function of (user id, now, secret);
    /// nothing is persisted.
    pub fn sign(&self, user_id: i64) -> Result<String, ApiError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + self.ttl;
        let claims = Claims {
            sub: user_id,
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(e.into()))?;
        debug!(user_id, "token signed");
        Ok(token)
    }

    /// Verify signature, expiry, issuer and audience. Expiry is the only
    /// failure reported as `ExpiredToken`; everything else is `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let mut validation = Validation::default();
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_audience(std::slice::from_ref(&self.audience));
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => {
                debug!(user_id = data.claims.sub, "token verified");
                Ok(data.claims)
            }
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => {
                Err(ApiError::ExpiredToken)
            }
            Err(_) => Err(ApiError::InvalidToken),
        }
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.jwt)
    }
}

/// The authenticated caller, resolved from the bearer token before any
/// handler runs. A rejection here means the handler is never invoked and no
/// store access happens for the request.
pub struct AuthUser(pub i64);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthenticated)?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or(ApiError::InvalidToken)?;
        let claims = keys.verify(token)?;
        Ok(AuthUser(claims.sub))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys(secret: &str) -> JwtKeys {
        JwtKeys::new(&JwtConfig {
            secret: secret.into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes: 5,
        })
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys("secret-a");
        let token = keys.sign(42).expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rotated_secret_invalidates_outstanding_tokens() {
        let old_keys = make_keys("secret-old");
        let new_keys = make_keys("secret-new");
        let token = old_keys.sign(7).expect("sign");
        assert!(matches!(
            new_keys.verify(&token),
            Err(ApiError::InvalidToken)
        ));
    }

    #[test]
    fn garbage_token_is_invalid_not_expired() {
        let keys = make_keys("secret-a");
        assert!(matches!(
            keys.verify("not.a.jwt"),
            Err(ApiError::InvalidToken)
        ));
        assert!(matches!(keys.verify(""), Err(ApiError::InvalidToken)));
    }

    #[test]
    fn expired_token_reports_expiry() {
        let keys = make_keys("secret-a");
        // Hand-roll claims whose exp is well past the default leeway.
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: 7,
            iat: (now - Duration::minutes(10)).unix_timestamp() as usize,
            exp: (now - Duration::minutes(5)).unix_timestamp() as usize,
            iss: "test-issuer".into(),
            aud: "test-aud".into(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).expect("encode");
        assert!(matches!(keys.verify(&token), Err(ApiError::ExpiredToken)));
    }

    #[test]
    fn wrong_issuer_or_audience_is_rejected() {
        let keys = make_keys("secret-a");
        let other = JwtKeys::new(&JwtConfig {
            secret: "secret-a".into(),
            issuer: "someone-else".into(),
            audience: "someone-elses-users".into(),
            ttl_minutes: 5,
        });
        let token = other.sign(7).expect("sign");
        assert!(matches!(keys.verify(&token), Err(ApiError::InvalidToken)));
    }
}
