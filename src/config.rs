use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::num::{NonZeroU32, NonZeroU64, NonZeroUsize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to load configuration")]
pub struct Error(#[from] Box<figment::Error>);

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "Config::default_address")]
    pub address: IpAddr,
    #[serde(default = "Config::default_port")]
    pub port: u16,
    /// Number of HTTP workers. Left to actix-web when unset.
    #[serde(default)]
    pub workers: Option<NonZeroUsize>,
    #[serde(default)]
    pub db: Database,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Database {
    /// SQLite connection URL.
    ///
    /// **Environment variables**:
    /// - `USERS_API_DB_URL` or `DATABASE_URL`
    #[serde(default = "Database::default_url")]
    pub url: String,
    /// **Environment variables**:
    /// - `USERS_API_DB_MAX_CONNECTIONS`
    #[serde(default = "Database::default_max_connections")]
    pub max_connections: NonZeroU32,
    /// How long a request may wait for a pooled connection.
    ///
    /// **Environment variables**:
    /// - `USERS_API_DB_TIMEOUT_SECS`
    #[serde(default = "Database::default_timeout_secs")]
    pub timeout_secs: NonZeroU64,
    /// **Environment variables**:
    /// - `USERS_API_DB_CREATE_IF_MISSING`
    #[serde(default = "Database::default_create_if_missing")]
    pub create_if_missing: bool,
}

impl Config {
    const DEFAULT_CONFIG_FILE: &'static str = "users-api.toml";
    const DEFAULT_PORT: u16 = 3000;

    pub fn load() -> Result<Self, Error> {
        dotenvy::dotenv().ok();
        Self::figment().extract().map_err(|e| Error(Box::new(e)))
    }

    pub(crate) fn figment() -> figment::Figment {
        use figment::{
            providers::{Env, Format, Toml},
            Figment,
        };

        Figment::new()
            .merge(Toml::file(Self::DEFAULT_CONFIG_FILE))
            .merge(Env::prefixed("USERS_API_").map(|v| match v.as_str() {
                "DB_MAX_CONNECTIONS" => "db.max_connections".into(),
                "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),
                "DB_CREATE_IF_MISSING" => "db.create_if_missing".into(),
                _ => v.as_str().replace('_', ".").into(),
            }))
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL"])
                    .map(|_| "db.url".into()),
            )
    }

    const fn default_address() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    const fn default_port() -> u16 {
        Self::DEFAULT_PORT
    }
}

impl Database {
    const DEFAULT_URL: &'static str = "sqlite://users.db";
    const DEFAULT_MAX_CONNECTIONS: u32 = 5;
    const DEFAULT_TIMEOUT_SECS: u64 = 5;

    fn default_url() -> String {
        Self::DEFAULT_URL.to_string()
    }

    // Required by serde
    const fn default_max_connections() -> NonZeroU32 {
        match NonZeroU32::new(Self::DEFAULT_MAX_CONNECTIONS) {
            Some(n) => n,
            None => panic!("DEFAULT_MAX_CONNECTIONS is accidentally set to 0"),
        }
    }

    const fn default_timeout_secs() -> NonZeroU64 {
        match NonZeroU64::new(Self::DEFAULT_TIMEOUT_SECS) {
            Some(n) => n,
            None => panic!("DEFAULT_TIMEOUT_SECS is accidentally set to 0"),
        }
    }

    const fn default_create_if_missing() -> bool {
        true
    }
}

impl Default for Database {
    fn default() -> Self {
        Self {
            url: Self::default_url(),
            max_connections: Self::default_max_connections(),
            timeout_secs: Self::default_timeout_secs(),
            create_if_missing: Self::default_create_if_missing(),
        }
    }
}
