use core_config::{ConfigError, FromEnv, env_optional, env_parse_or, env_required};

/// Bearer-token verification settings.
///
/// Environment variables:
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `JWT_ISSUER` (optional, checked against `iss` when set)
/// - `JWT_AUDIENCE` (optional, checked against `aud` when set)
/// - `JWT_LEEWAY_SECS` (default 30)
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// HS256 shared secret
    pub secret: String,
    pub issuer: Option<String>,
    pub audience: Option<String>,
    /// Clock skew tolerated on `exp`
    pub leeway_secs: u64,
}

impl JwtConfig {
    pub const MIN_SECRET_LEN: usize = 32;

    /// Build a config from a secret, rejecting short ones.
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        check_secret(&secret)?;
        Ok(Self {
            secret,
            issuer: None,
            audience: None,
            leeway_secs: 30,
        })
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }
}

fn check_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.len() < JwtConfig::MIN_SECRET_LEN {
        return Err(ConfigError::ParseError {
            key: "JWT_SECRET".to_string(),
            details: format!(
                "must be at least {} characters (got {}). Generate one with: openssl rand -base64 32",
                JwtConfig::MIN_SECRET_LEN,
                secret.len()
            ),
        });
    }
    Ok(())
}

impl FromEnv for JwtConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let secret = env_required("JWT_SECRET")?;
        check_secret(&secret)?;

        Ok(Self {
            secret,
            issuer: env_optional("JWT_ISSUER"),
            audience: env_optional("JWT_AUDIENCE"),
            leeway_secs: env_parse_or("JWT_LEEWAY_SECS", 30)?,
        })
    }
}
