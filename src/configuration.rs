use chrono::Duration;

use crate::error::ConfigError as InvalidSettings;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub jwt: JwtSettings,
    pub polka: PolkaSettings,
}

/// Deployment kind; destructive admin endpoints only exist on `dev`
#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Dev,
    Prod,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    pub platform: Platform,
    /// Directory served under `/app`
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_static_dir() -> String {
    "./public".to_string()
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }
}

/// JWT authentication settings
#[derive(serde::Deserialize, Clone)]
pub struct JwtSettings {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,   // seconds
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,  // seconds
}

fn default_access_token_expiry() -> i64 {
    60 * 60
}

fn default_refresh_token_expiry() -> i64 {
    60 * 24 * 60 * 60
}

impl JwtSettings {
    pub fn access_token_ttl(&self) -> Duration {
        Duration::seconds(self.access_token_expiry)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::seconds(self.refresh_token_expiry)
    }
}

/// Payment provider webhook settings
#[derive(serde::Deserialize, Clone)]
pub struct PolkaSettings {
    pub api_key: String,
}

impl Settings {
    /// Reject settings that would silently weaken authentication
    pub fn validate(&self) -> Result<(), InvalidSettings> {
        if self.jwt.secret.trim().is_empty() {
            return Err(InvalidSettings::MissingRequired("jwt.secret".to_string()));
        }
        if self.polka.api_key.trim().is_empty() {
            return Err(InvalidSettings::MissingRequired("polka.api_key".to_string()));
        }
        if self.jwt.access_token_expiry <= 0 {
            return Err(InvalidSettings::InvalidValue(
                "jwt.access_token_expiry must be positive".to_string(),
            ));
        }
        if self.jwt.refresh_token_expiry <= 0 {
            return Err(InvalidSettings::InvalidValue(
                "jwt.refresh_token_expiry must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Load `configuration.yaml` (optional) and `APP_*` environment overrides,
/// e.g. `APP_JWT__SECRET` or `APP_APPLICATION__PORT`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
