use {
    std::{env, fmt, net::SocketAddr, str::FromStr, time::Duration},
    thiserror::Error,
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process-wide settings, read once at startup and passed down explicitly.
#[derive(Clone)]
pub struct Config {
    pub webhook_secret: String,
    pub api_keys: Vec<String>,
    /// `None` runs on the in-memory store.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub db_max_connections: u32,
    pub request_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env` but reads through `lookup`, so tests need not
    /// touch the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let webhook_secret = lookup("PAYLITE_WEBHOOK_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("PAYLITE_WEBHOOK_SECRET"))?;

        let api_keys = parse_api_keys(
            &lookup("PAYLITE_API_KEYS").ok_or(ConfigError::Missing("PAYLITE_API_KEYS"))?,
        );
        if api_keys.is_empty() {
            return Err(ConfigError::Invalid {
                name: "PAYLITE_API_KEYS",
                reason: "no keys listed".into(),
            });
        }

        let database_url = lookup("DATABASE_URL").filter(|s| !s.is_empty());

        let bind_addr = parse_or("PAYLITE_BIND_ADDR", lookup("PAYLITE_BIND_ADDR"), || {
            SocketAddr::from_str(DEFAULT_BIND_ADDR).map_err(|e| ConfigError::Invalid {
                name: "PAYLITE_BIND_ADDR",
                reason: e.to_string(),
            })
        })?;
        let db_max_connections = parse_or(
            "PAYLITE_DB_MAX_CONNECTIONS",
            lookup("PAYLITE_DB_MAX_CONNECTIONS"),
            || Ok(DEFAULT_MAX_CONNECTIONS),
        )?;
        let timeout_secs: u64 = parse_or(
            "PAYLITE_REQUEST_TIMEOUT_SECS",
            lookup("PAYLITE_REQUEST_TIMEOUT_SECS"),
            || Ok(DEFAULT_REQUEST_TIMEOUT_SECS),
        )?;

        Ok(Self {
            webhook_secret,
            api_keys,
            database_url,
            bind_addr,
            db_max_connections,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }
}

fn parse_api_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_or<T>(
    name: &'static str,
    raw: Option<String>,
    default: impl FnOnce() -> Result<T, ConfigError>,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => default(),
        Some(v) => v.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("webhook_secret", &"<redacted>")
            .field("api_keys", &format_args!("<{} redacted>", self.api_keys.len()))
            .field("database_url", &self.database_url.as_ref().map(|_| "<set>"))
            .field("bind_addr", &self.bind_addr)
            .field("db_max_connections", &self.db_max_connections)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
