//! JWT authentication module.
//!
//! Bearer tokens carry the tenant id as `sub`. The middleware turns a valid
//! token into a [`TenantContext`] request extension; handlers never see a
//! request without one.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use stockbook_core::TenantId;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (tenant id)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Issues and validates HS256 tokens with one secret.
pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime_secs: i64,
}

impl TokenManager {
    pub fn new(secret: &str, lifetime_secs: i64) -> Self {
        TokenManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime_secs,
        }
    }

    /// Generate a token for a tenant.
    pub fn issue(&self, tenant_id: &TenantId) -> ApiResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: tenant_id.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.lifetime_secs)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!(error = %e, "Failed to generate token");
            ApiError::internal()
        })
    }

    /// Validate a token and return the tenant it names.
    pub fn validate(&self, token: &str) -> ApiResult<TenantId> {
        let claims = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?
            .claims;

        TenantId::new(claims.sub).map_err(|_| ApiError::unauthorized("Invalid token subject"))
    }
}

/// Tenant of the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext(pub TenantId);

impl TenantContext {
    pub fn tenant_id(&self) -> &TenantId {
        &self.0
    }
}

/// Rejects requests without a valid bearer token.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())?;
    let tenant_id = state.tokens.validate(token)?;

    debug!(tenant = %tenant_id, path = %req.uri().path(), "Authenticated request");
    req.extensions_mut().insert(TenantContext(tenant_id));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> ApiResult<&str> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Missing bearer token"))?;

    let token = header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .unwrap_or_default();

    if token.is_empty() {
        return Err(ApiError::unauthorized("Missing bearer token"));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_roundtrip() {
        let manager = TokenManager::new("test-secret", 3600);
        let tenant = TenantId::new("acme").unwrap();

        let token = manager.issue(&tenant).unwrap();
        assert_eq!(manager.validate(&token).unwrap(), tenant);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let tenant = TenantId::new("acme").unwrap();
        let token = TokenManager::new("one", 3600).issue(&tenant).unwrap();

        let err = TokenManager::new("two", 3600).validate(&token).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::Unauthorized);
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = TokenManager::new("test-secret", -600);
        let token = manager.issue(&TenantId::new("acme").unwrap()).unwrap();
        assert!(manager.validate(&token).is_err());
    }

    #[test]
    fn test_extract_bearer() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer(&headers).unwrap(), "abc.def");
    }
}
