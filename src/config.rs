//! Configuration management for the Lectern client

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    pub base_url: String,
    pub covers_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    /// Collection holding the per-user documents.
    pub user_collection: String,
    /// When set, registration emails must end with this domain.
    pub email_domain: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AggregatorConfig {
    /// Upper bound on simultaneous primary fetches.
    pub max_in_flight: usize,
    /// Per-fetch timeout in seconds; absent means wait indefinitely.
    pub fetch_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BrowseConfig {
    pub subjects: Vec<String>,
    pub home_limit: usize,
    pub browse_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub aggregator: AggregatorConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default").required(false))
            // Layer on the environment-specific file
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add environment variables (with prefix LECTERN_)
            .add_source(
                Environment::with_prefix("LECTERN")
                    .separator("_")
                    .try_parsing(true),
            )
            // Override catalog base from CATALOG_BASE_URL env var if present
            .set_override_option("catalog.base_url", env::var("CATALOG_BASE_URL").ok())?
            // Override backend base from BACKEND_BASE_URL env var if present
            .set_override_option("backend.base_url", env::var("BACKEND_BASE_URL").ok())?
            .build()?;

        config.try_deserialize()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            backend: BackendConfig::default(),
            aggregator: AggregatorConfig::default(),
            browse: BrowseConfig::default(),
            http: HttpConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openlibrary.org".to_string(),
            covers_url: "https://covers.openlibrary.org".to_string(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9099".to_string(),
            user_collection: "students".to_string(),
            email_domain: None,
        }
    }
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 12,
            fetch_timeout_secs: Some(30),
        }
    }
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            subjects: [
                "archaeology",
                "art",
                "biology",
                "chemistry",
                "fiction",
                "finance",
                "maths",
                "physics",
                "programming",
                "psychology",
                "political_science",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            home_limit: 10,
            browse_limit: 200,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("lectern-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
