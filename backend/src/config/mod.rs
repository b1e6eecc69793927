use dotenv::dotenv;
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_STORAGE_KEY: &str = "realEstateProperties";

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// JSON-RPC endpoint of the wallet provider. No provider when unset.
    #[serde(default)]
    pub wallet_rpc_url: Option<String>,
    /// Hex chain id reported by the provider, e.g. `0x1`.
    #[serde(default)]
    pub wallet_chain_id: Option<String>,
}

fn default_port() -> u16 {
    8080
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".movabl")
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv().ok(); // Load .env file if present
        config::Config::builder()
            .add_source(config::Environment::default().try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            storage_dir: default_storage_dir(),
            storage_key: default_storage_key(),
            wallet_rpc_url: None,
            wallet_chain_id: None,
        }
    }
}
