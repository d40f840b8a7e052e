use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{JwtConfig, rbac};
use crate::errors::AppError;

/// Claims read from an identity-provider access token.
///
/// `iss` and `aud` are checked by the verifier, not carried here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Identity-provider uid
    pub sub: String,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Authenticated caller, inserted into request extensions by
/// [`bearer_auth_middleware`](super::bearer_auth_middleware).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub email: Option<String>,
    pub role: Option<String>,
    pub permissions: Vec<String>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(rbac::ADMIN_ROLE)
    }

    /// Whether this caller holds `required` (a `domain:action` string).
    pub fn can(&self, required: &str) -> bool {
        rbac::permits(self.role.as_deref(), &self.permissions, required)
    }
}

impl From<AccessClaims> for Principal {
    fn from(claims: AccessClaims) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email,
            role: claims.role,
            permissions: claims.permissions,
        }
    }
}

/// HS256 verifier for access tokens. Cheap to clone.
#[derive(Clone)]
pub struct TokenVerifier {
    key: Arc<DecodingKey>,
    validation: Arc<Validation>,
}

impl TokenVerifier {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = config.leeway_secs;

        if let Some(ref issuer) = config.issuer {
            validation.set_issuer(&[issuer]);
        }

        match config.audience {
            Some(ref audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            key: Arc::new(DecodingKey::from_secret(config.secret.as_bytes())),
            validation: Arc::new(validation),
        }
    }

    /// Verify signature, expiry and the configured issuer/audience.
    pub fn verify(&self, token: &str) -> Result<Principal, AppError> {
        let data = decode::<AccessClaims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Token verification failed");
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::Unauthorized("Token expired".to_string()),
                ErrorKind::InvalidIssuer | ErrorKind::InvalidAudience => {
                    AppError::Unauthorized("Token not issued for this service".to_string())
                }
                _ => AppError::Unauthorized("Invalid token".to_string()),
            }
        })?;

        Ok(data.claims.into())
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}
