use crate::api::{callisto, dexscreener, replicate};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TOKEN_ADDRESS: &str = "418QJC9cHmUXYFDEg78bAZE765WS4PX9Kxwznx2Hpump";
pub const DEFAULT_TOKEN_NAME: &str = "bubbacat";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub market_data: MarketDataConfig,
    pub resolver: ResolverConfig,
    pub dca: DcaConfig,
    pub image: ImageConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct MarketDataConfig {
    pub base_url: String,
    pub chart_base_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ResolverConfig {
    pub chain: String,
    pub default_address: String,
    pub default_name: String,
    pub aliases: HashMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DcaConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ImageConfig {
    pub base_url: String,
    pub model: String,
    pub api_token: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 15 }
    }
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            base_url: dexscreener::API_BASE_URL.to_string(),
            chart_base_url: dexscreener::CHART_BASE_URL.to_string(),
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        let aliases = [
            ("wif", "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm"),
            ("ai16z", "HeLp6NuQkmYB4pYWo2zYs22mESHXPQYzXbB8n4V98jwC"),
        ]
        .into_iter()
        .map(|(symbol, address)| (symbol.to_string(), address.to_string()))
        .collect();

        Self {
            chain: "solana".to_string(),
            default_address: DEFAULT_TOKEN_ADDRESS.to_string(),
            default_name: DEFAULT_TOKEN_NAME.to_string(),
            aliases,
        }
    }
}

impl Default for DcaConfig {
    fn default() -> Self {
        Self {
            base_url: callisto::API_BASE_URL.to_string(),
            api_key: None,
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: replicate::API_BASE_URL.to_string(),
            model: replicate::DEFAULT_MODEL.to_string(),
            api_token: None,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        fs::write(path, config_str)?;
        Ok(())
    }

    /// Secrets from the environment win over the file.
    pub fn apply_env(&mut self) {
        if let Ok(key) = env::var("CALLISTO_API_KEY") {
            if !key.is_empty() {
                self.dca.api_key = Some(key);
            }
        }
        if let Ok(token) = env::var("REPLICATE_API_TOKEN") {
            if !token.is_empty() {
                self.image.api_token = Some(token);
            }
        }
    }
}
