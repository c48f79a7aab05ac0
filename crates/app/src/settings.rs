use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";
const ENV_PREFIX: &str = "PENNYWISE";

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

/// Where the ledger lives.
///
/// In TOML: `database = "memory"` or `database = { sqlite = "pennywise.db" }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    /// HMAC key for bearer tokens.
    pub secret: String,
    pub token_ttl_secs: i64,
    /// Argon2id memory cost in KiB.
    pub hash_memory_kib: u32,
    /// Argon2id time cost.
    pub hash_passes: u32,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Option<Server>,
    pub auth: Auth,
}

impl Settings {
    /// Load `settings.toml` (optional) and `PENNYWISE__*` environment
    /// variables, e.g. `PENNYWISE__AUTH__SECRET`.
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings: Settings = config::Config::builder()
            .set_default("app.level", "info")?
            .set_default("auth.secret", "")?
            .set_default("auth.token_ttl_secs", 3600)?
            .set_default("auth.hash_memory_kib", 19_456)?
            .set_default("auth.hash_passes", 2)?
            .add_source(config::File::with_name(DEFAULT_CONFIG_PATH).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        if settings.auth.secret.is_empty() {
            return Err(config::ConfigError::Message(
                "auth.secret must be set".to_string(),
            ));
        }
        if settings.auth.token_ttl_secs <= 0 {
            return Err(config::ConfigError::Message(
                "auth.token_ttl_secs must be > 0".to_string(),
            ));
        }
        Ok(settings)
    }
}
