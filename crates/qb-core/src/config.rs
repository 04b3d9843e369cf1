use std::path::PathBuf;

use serde::Deserialize;

/// Prefix of every configuration variable, e.g. `QUIZBANK_DATABASE_URL`
pub const ENV_PREFIX: &str = "QUIZBANK_";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub const fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct CoreConfig {
    #[serde(default)]
    pub env: Environment,
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Directory holding bundled assets such as the default bank
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    /// File name of the bundled default bank inside `assets_dir`
    #[serde(default = "default_bank_asset")]
    pub default_bank_asset: String,
    /// Display name given to the bundled default bank
    #[serde(default = "default_bank_name")]
    pub default_bank_name: String,
}

fn default_database_url() -> String {
    "sqlite://quizbank.db?mode=rwc".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_bank_asset() -> String {
    "default_bank.json".to_string()
}

fn default_bank_name() -> String {
    "Default bank".to_string()
}

impl CoreConfig {
    /// Load from `QUIZBANK_*` environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::prefixed(ENV_PREFIX).from_env()
    }

    /// Load from explicit `(key, value)` pairs using the same variable names.
    pub fn from_iter<I>(vars: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::prefixed(ENV_PREFIX).from_iter(vars)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            env: Environment::default(),
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            assets_dir: default_assets_dir(),
            default_bank_asset: default_bank_asset(),
            default_bank_name: default_bank_name(),
        }
    }
}
