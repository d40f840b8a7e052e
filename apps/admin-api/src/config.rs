use axum_helpers::{CorsConfig, JwtConfig};
use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::mongodb::MongoConfig;

pub use core_config::Environment;

/// Settings for the admin API, composed from the shared config pieces
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub environment: Environment,
    pub server: ServerConfig,
    pub mongodb: MongoConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            mongodb: MongoConfig::from_env()?,
            jwt: JwtConfig::from_env()?,
            cors: CorsConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "this-is-a-valid-secret-with-32-chars!";

    #[test]
    fn test_from_env() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("MONGODB_DATABASE", Some("catalog")),
                ("JWT_SECRET", Some(SECRET)),
                ("JWT_ISSUER", Some("https://securetoken.example.com/shop")),
                ("CORS_ALLOWED_ORIGIN", Some("http://localhost:5173, https://admin.example.com")),
                ("PORT", Some("9000")),
                ("APP_ENV", Some("production")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.app.name, "admin_api");
                assert_eq!(config.server.port, 9000);
                assert_eq!(config.mongodb.database(), "catalog");
                assert!(config.environment.is_production());
                assert_eq!(config.cors.allowed_origins.len(), 2);
                assert_eq!(
                    config.jwt.issuer.as_deref(),
                    Some("https://securetoken.example.com/shop")
                );
            },
        );
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("MONGODB_DATABASE", Some("catalog")),
                ("JWT_SECRET", Some("short")),
                ("CORS_ALLOWED_ORIGIN", Some("http://localhost:5173")),
            ],
            || assert!(Config::from_env().is_err()),
        );
    }

    #[test]
    fn test_cors_origin_required() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("MONGODB_DATABASE", Some("catalog")),
                ("JWT_SECRET", Some(SECRET)),
                ("CORS_ALLOWED_ORIGIN", None),
            ],
            || assert!(Config::from_env().is_err()),
        );
    }
}
