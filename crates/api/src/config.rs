//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `PRODUCT_SERVICE_URL` / `RECOMMENDATION_SERVICE_URL` /
///   `REVIEW_SERVICE_URL` — downstream base URLs (default:
///   `"http://127.0.0.1:3000"`, the single-process deployment)
/// - `PUBLISH_POOL_SIZE` — publisher worker count (default: `10`)
/// - `PUBLISH_QUEUE_DEPTH` — per-worker queue capacity (default: `100`)
/// - `REQUEST_TIMEOUT_MS` — downstream HTTP timeout (default: `2000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub product_service_url: String,
    pub recommendation_service_url: String,
    pub review_service_url: String,
    pub publish_pool_size: usize,
    pub publish_queue_depth: usize,
    pub request_timeout_ms: u64,
    pub log_level: String,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: env_or("HOST", "0.0.0.0"),
            port: env_parse_or("PORT", 3000),
            product_service_url: env_or("PRODUCT_SERVICE_URL", "http://127.0.0.1:3000"),
            recommendation_service_url: env_or(
                "RECOMMENDATION_SERVICE_URL",
                "http://127.0.0.1:3000",
            ),
            review_service_url: env_or("REVIEW_SERVICE_URL", "http://127.0.0.1:3000"),
            publish_pool_size: env_parse_or("PUBLISH_POOL_SIZE", 10),
            publish_queue_depth: env_parse_or("PUBLISH_QUEUE_DEPTH", 100),
            request_timeout_ms: env_parse_or("REQUEST_TIMEOUT_MS", 2000),
            log_level: env_or("RUST_LOG", "info"),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            product_service_url: "http://127.0.0.1:3000".to_string(),
            recommendation_service_url: "http://127.0.0.1:3000".to_string(),
            review_service_url: "http://127.0.0.1:3000".to_string(),
            publish_pool_size: 10,
            publish_queue_depth: 100,
            request_timeout_ms: 2000,
            log_level: "info".to_string(),
        }
    }
}
