//! Runtime configuration.
//!
//! [`Config`] is read from the environment once at startup. The product
//! catalog ([`ProductConfig`]) is the single source of generated language and
//! is loaded separately, then shared read-only.

mod product;

pub use product::{MaxChars, ProductConfig, ProofPoint};
pub(crate) use product::contains_dash;

use std::env;
use std::path::PathBuf;

use crate::error::AppError;
use crate::research::VerticalPainLibrary;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Langbase settings; `None` when no API key is set
    pub langbase: Option<LangbaseConfig>,
    /// SQLite settings
    pub database: DatabaseConfig,
    /// Log level and format
    pub logging: LoggingConfig,
    /// HTTP timeout and retry settings
    pub request: RequestConfig,
    /// Langbase pipe names
    pub pipes: PipeConfig,
    /// Catalog and library overrides
    pub catalog: CatalogPaths,
    /// Feedback gates
    pub feedback: FeedbackConfig,
}

/// Langbase API configuration
#[derive(Debug, Clone)]
pub struct LangbaseConfig {
    /// Langbase API key
    pub api_key: String,
    /// Langbase API base URL
    pub base_url: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite database file path
    pub path: PathBuf,
    /// Maximum pooled connections
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter
    pub level: String,
    /// Log output format
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    /// Human-readable output
    Pretty,
    /// One JSON object per line
    Json,
}

/// HTTP request configuration
#[derive(Debug, Clone)]
pub struct RequestConfig {
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Maximum retry attempts
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

/// Langbase pipe names used for optional refinement
#[derive(Debug, Clone)]
pub struct PipeConfig {
    /// Pipe that re-ranks pains
    pub pain_refiner: String,
    /// Pipe that polishes rendered messages
    pub message_polish: String,
}

/// Optional overrides for the built-in static libraries
#[derive(Debug, Clone, Default)]
pub struct CatalogPaths {
    /// Product catalog JSON file
    pub product_config: Option<PathBuf>,
    /// Vertical pain library JSON file
    pub vertical_pains: Option<PathBuf>,
    /// Sender name replacing the catalog's
    pub sender_name: Option<String>,
}

/// Feedback aggregation window
#[derive(Debug, Clone)]
pub struct FeedbackConfig {
    /// Sends a bucket needs before it can win
    pub min_sample: usize,
    /// Look-back window in days
    pub window_days: i64,
}

const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let langbase = env::var("LANGBASE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|api_key| LangbaseConfig {
                api_key,
                base_url: env::var("LANGBASE_BASE_URL")
                    .unwrap_or_else(|_| "https://api.langbase.com".to_string()),
            });

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/outreach.db".to_string()),
            ),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        };

        let level = env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string())
            .to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(AppError::Config {
                message: format!(
                    "LOG_LEVEL must be one of {}, got '{}'",
                    VALID_LOG_LEVELS.join(", "),
                    level
                ),
            });
        }

        let logging = LoggingConfig {
            level,
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let request = RequestConfig {
            timeout_ms: env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30000),
            max_retries: env::var("MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            retry_delay_ms: env::var("RETRY_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1000),
        };
        if request.timeout_ms == 0 {
            return Err(AppError::Config {
                message: "REQUEST_TIMEOUT_MS must be positive".to_string(),
            });
        }

        let pipes = PipeConfig {
            pain_refiner: env::var("PIPE_PAIN_REFINER")
                .unwrap_or_else(|_| "pain-refiner-v1".to_string()),
            message_polish: env::var("PIPE_MESSAGE_POLISH")
                .unwrap_or_else(|_| "message-polish-v1".to_string()),
        };

        let catalog = CatalogPaths {
            product_config: env::var("PRODUCT_CONFIG_PATH").ok().map(PathBuf::from),
            vertical_pains: env::var("VERTICAL_PAINS_PATH").ok().map(PathBuf::from),
            sender_name: env::var("SENDER_NAME").ok().filter(|s| !s.trim().is_empty()),
        };

        let feedback = FeedbackConfig {
            min_sample: env::var("FEEDBACK_MIN_SAMPLE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            window_days: env::var("FEEDBACK_WINDOW_DAYS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(90),
        };

        Ok(Config {
            langbase,
            database,
            logging,
            request,
            pipes,
            catalog,
            feedback,
        })
    }

    /// Load the product catalog named by the environment, or the built-in one.
    pub fn load_product_config(&self) -> Result<ProductConfig, AppError> {
        let mut catalog = match &self.catalog.product_config {
            Some(path) => ProductConfig::from_path(path)?,
            None => ProductConfig::builtin(),
        };
        if let Some(sender) = &self.catalog.sender_name {
            catalog.sender = sender.clone();
        }
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load the vertical pain library named by the environment, or the
    /// built-in one.
    pub fn load_vertical_pains(&self) -> Result<VerticalPainLibrary, AppError> {
        Ok(match &self.catalog.vertical_pains {
            Some(path) => VerticalPainLibrary::from_path(path)?,
            None => VerticalPainLibrary::builtin(),
        })
    }
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30000,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            pain_refiner: "pain-refiner-v1".to_string(),
            message_polish: "message-polish-v1".to_string(),
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            min_sample: 5,
            window_days: 90,
        }
    }
}
