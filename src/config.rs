use std::path::Path;

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub tensor: TensorConfig,
    pub solana: SolanaConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TensorConfig {
    pub base_url: String,
    pub bid_limit: u32,
    pub mint_limit: u32,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolanaConfig {
    pub rpc_url: String,
    pub confirm_timeout_seconds: u64,
    pub confirm_poll_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub log_level: String,
}

/// Secrets loaded exclusively from environment variables.
/// Not serializable, not stored in config files.
pub struct Secrets {
    pub tensor_api_key: SecretString,
    pub private_key: SecretString,
}

impl Secrets {
    /// Both credentials are required; a missing variable fails here,
    /// before any network activity.
    pub fn from_env() -> Result<Self> {
        let tensor_api_key = std::env::var("TENSOR_API_KEY")
            .context("TENSOR_API_KEY not found in environment variables")?;
        let private_key = std::env::var("PRIVATE_KEY")
            .context("PRIVATE_KEY not found in environment variables")?;

        Ok(Self {
            tensor_api_key: SecretString::from(tensor_api_key),
            private_key: SecretString::from(private_key),
        })
    }
}

impl AppConfig {
    /// Load configuration from config/default.toml, overlaying environment variables for secrets.
    pub fn load() -> Result<(Self, Secrets)> {
        dotenvy::dotenv().ok();

        let config_path = Path::new("config/default.toml");
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: AppConfig =
            toml::from_str(&contents).context("Failed to parse config/default.toml")?;

        let secrets = Secrets::from_env()?;

        Ok((config, secrets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_config() {
        let contents = std::fs::read_to_string("config/default.toml")
            .expect("config/default.toml should exist");
        let config: AppConfig = toml::from_str(&contents).expect("should parse");
        assert_eq!(
            config.tensor.base_url,
            "https://api.mainnet.tensordev.io/api/v1"
        );
        assert_eq!(config.tensor.bid_limit, 5);
        assert_eq!(config.tensor.mint_limit, 3);
        assert_eq!(config.solana.rpc_url, "https://api.mainnet-beta.solana.com");
    }
}
