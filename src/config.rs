use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_oracle_timeout_secs")]
    pub oracle_timeout_secs: u64,
    #[serde(default = "default_translation_temperature")]
    pub translation_temperature: f32,
    #[serde(default = "default_translation_max_tokens")]
    pub translation_max_tokens: u32,
    #[serde(default = "default_search_max_tokens")]
    pub search_max_tokens: u32,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default)]
    pub dedupe_search_results: bool,
    /// Unset means Postgres when a host is configured, SQLite otherwise.
    #[serde(default)]
    pub store_backend: Option<StoreBackend>,
    #[serde(default)]
    pub postgres: PostgresConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Sqlite,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "sqlite" => Ok(Self::Sqlite),
            other => anyhow::bail!("unknown store backend {:?}", other),
        }
    }
}

/// Connection settings for the Postgres product table. Unset fields fall
/// back to the driver's defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostgresConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default = "default_pg_port")]
    pub port: u16,
    #[serde(default = "default_pg_tls")]
    pub tls: bool,
    #[serde(default = "default_pg_max_connections")]
    pub max_connections: u32,
}

fn default_pg_port() -> u16 {
    5432
}

fn default_pg_tls() -> bool {
    true
}

fn default_pg_max_connections() -> u32 {
    5
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            host: None,
            user: None,
            password: None,
            database: None,
            port: default_pg_port(),
            tls: default_pg_tls(),
            max_connections: default_pg_max_connections(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_database_path() -> PathBuf {
    AppConfig::data_dir().join("catalog.db")
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_oracle_timeout_secs() -> u64 {
    10
}

fn default_translation_temperature() -> f32 {
    0.7
}

fn default_translation_max_tokens() -> u32 {
    100
}

fn default_search_max_tokens() -> u32 {
    60
}

fn default_currency_symbol() -> String {
    "₹".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_path: default_database_path(),
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            model: default_model(),
            oracle_timeout_secs: default_oracle_timeout_secs(),
            translation_temperature: default_translation_temperature(),
            translation_max_tokens: default_translation_max_tokens(),
            search_max_tokens: default_search_max_tokens(),
            currency_symbol: default_currency_symbol(),
            dedupe_search_results: false,
            store_backend: None,
            postgres: PostgresConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".product-catalog")
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.json")
    }

    pub fn data_dir() -> PathBuf {
        Self::config_dir().join("data")
    }

    /// Defaults, then the JSON config file (if any), then environment variables.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path).await?,
            None => {
                let default_file = Self::config_file();
                if default_file.exists() {
                    Self::from_file(&default_file).await?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    async fn from_file(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Environment overrides. `lookup` is injected so tests don't touch the process env.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = parse_env("PORT", &port)?;
        }
        if let Some(path) = lookup("DATABASE_PATH") {
            self.database_path = PathBuf::from(path);
        }
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.openai_api_key = Some(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.openai_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.model = model;
        }
        if let Some(secs) = lookup("ORACLE_TIMEOUT_SECS") {
            self.oracle_timeout_secs = parse_env("ORACLE_TIMEOUT_SECS", &secs)?;
        }
        if let Some(symbol) = lookup("CURRENCY_SYMBOL") {
            self.currency_symbol = symbol;
        }
        if let Some(flag) = lookup("DEDUPE_SEARCH_RESULTS") {
            self.dedupe_search_results = parse_env("DEDUPE_SEARCH_RESULTS", &flag)?;
        }
        if let Some(backend) = lookup("STORE_BACKEND") {
            self.store_backend = Some(backend.parse()?);
        }

        let pg = &mut self.postgres;
        if let Some(host) = lookup("PGHOST").filter(|h| !h.trim().is_empty()) {
            pg.host = Some(host);
        }
        if let Some(user) = lookup("PGUSER") {
            pg.user = Some(user);
        }
        if let Some(password) = lookup("PGPASSWORD") {
            pg.password = Some(password);
        }
        if let Some(database) = lookup("PGDATABASE") {
            pg.database = Some(database);
        }
        if let Some(port) = lookup("PGPORT") {
            pg.port = parse_env("PGPORT", &port)?;
        }
        if let Some(mode) = lookup("PGSSLMODE") {
            pg.tls = !mode.trim().eq_ignore_ascii_case("disable");
        }
        Ok(())
    }

    pub fn store_backend(&self) -> StoreBackend {
        match self.store_backend {
            Some(backend) => backend,
            None if self.postgres.host.is_some() => StoreBackend::Postgres,
            None => StoreBackend::Sqlite,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_env<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("invalid value for {}: {:?}", key, raw))
}
