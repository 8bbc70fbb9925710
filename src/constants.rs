use std::time::Duration;

pub const API_ENDPOINT: &str = "https://api.tinify.com";
pub const SHRINK_PATH: &str = "/shrink";
pub const AUTH_USERNAME: &str = "api";

pub const MIN_API_KEY_LENGTH: usize = 5;

pub const ENV_API_KEY: &str = "TINIFY_API_KEY";
pub const ENV_PROXY: &str = "TINIFY_PROXY";
pub const ENV_ENDPOINT: &str = "TINIFY_API_ENDPOINT";
pub const ENV_DEBUG: &str = "TINIFY_API_DEBUG";

pub const DEFAULT_LOG_LEVEL: &str = "error";

// Transport tuning; the pool outlives individual requests.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
pub const POOL_MAX_IDLE_PER_HOST: usize = 100;

pub const HEADER_LOCATION: &str = "location";
pub const HEADER_COMPRESSION_COUNT: &str = "compression-count";
pub const HEADER_IMAGE_WIDTH: &str = "image-width";
pub const HEADER_IMAGE_HEIGHT: &str = "image-height";
pub const HEADER_CONTENT_LENGTH: &str = "content-length";
pub const HEADER_CONTENT_TYPE: &str = "content-type";

pub const JSON_MEDIA_TYPE: &str = "application/json";

/// File mode for written results on Unix.
pub const OUTPUT_FILE_MODE: u32 = 0o644;

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg} [{elapsed_precise}]";
pub const SPINNER_TICK: Duration = Duration::from_millis(100);

// Common output message prefixes
pub const SUCCESS_PREFIX: &str = "✅";
pub const WARNING_PREFIX: &str = "⚠️";
pub const ERROR_PREFIX: &str = "❌";
