use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub portfolio: PortfolioConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub prices: PricesConfig,
    #[serde(default)]
    pub protocols: ProtocolsConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Multi-chain wallet data provider (positions and transactions)
#[derive(Debug, Deserialize, Clone)]
pub struct PortfolioConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.zerion.io/v1".to_string(),
            api_key: String::new(),
        }
    }
}

/// Token metadata provider (search, tags, logos)
#[derive(Debug, Deserialize, Clone)]
pub struct MetadataConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            base_url: "https://lite-api.jup.ag/tokens/v2".to_string(),
            api_key: String::new(),
        }
    }
}

/// Price aggregator (prices, global market, trending)
#[derive(Debug, Deserialize, Clone)]
pub struct PricesConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
}

impl Default for PricesConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            api_key: String::new(),
        }
    }
}

/// DApp TVL data
#[derive(Debug, Deserialize, Clone)]
pub struct ProtocolsConfig {
    pub base_url: String,
}

impl Default for ProtocolsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.llama.fi".to_string(),
        }
    }
}

/// OpenAI-compatible chat completions endpoint
#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 800,
            temperature: 0.4,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub max_capacity: u64,
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1000,
            ttl_seconds: 60,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    pub timeout_seconds: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { timeout_seconds: 15 }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = AppConfig::default();

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("portfolio.base_url", defaults.portfolio.base_url)?
            .set_default("portfolio.api_key", "")?
            .set_default("metadata.base_url", defaults.metadata.base_url)?
            .set_default("metadata.api_key", "")?
            .set_default("prices.base_url", defaults.prices.base_url)?
            .set_default("prices.api_key", "")?
            .set_default("protocols.base_url", defaults.protocols.base_url)?
            .set_default("llm.base_url", defaults.llm.base_url)?
            .set_default("llm.api_key", "")?
            .set_default("llm.model", defaults.llm.model)?
            .set_default("llm.max_tokens", defaults.llm.max_tokens as i64)?
            .set_default("llm.temperature", defaults.llm.temperature as f64)?
            .set_default("cache.max_capacity", defaults.cache.max_capacity as i64)?
            .set_default("cache.ttl_seconds", defaults.cache.ttl_seconds as i64)?
            .set_default("upstream.timeout_seconds", defaults.upstream.timeout_seconds as i64)?
            // Load from config file if it exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (SONAR__LLM__API_KEY, etc.)
            // Double underscore separator keeps keys like api_key intact
            .add_source(
                Environment::with_prefix("SONAR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// `abcd...wxyz` preview of a secret for startup logs.
pub fn mask_key(key: &str) -> String {
    if key.is_empty() {
        "EMPTY".to_string()
    } else if key.chars().count() > 8 {
        let chars: Vec<char> = key.chars().collect();
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}
