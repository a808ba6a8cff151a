// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "promgate";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "promgate.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "PROMGATE_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "PROMGATE_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "PROMGATE_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "PROMGATE_LOG";

// =============================================================================
// Environment Variables - Ingestion
// =============================================================================

/// Environment variable for the default sample TTL (duration string)
pub const ENV_DEFAULT_TTL: &str = "PROMGATE_DEFAULT_TTL";

/// Environment variable for the janitor sweep interval (duration string)
pub const ENV_SWEEP_INTERVAL: &str = "PROMGATE_SWEEP_INTERVAL";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host (the scrape endpoint is meant to be reachable)
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: u16 = 9107;

/// Maximum inbound payload body size in bytes
pub const INGEST_BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Retry-After value returned when the ingest buffer is full
pub const BACKPRESSURE_RETRY_AFTER_SECS: u64 = 1;

// =============================================================================
// Ingestion Defaults
// =============================================================================

/// Default TTL applied when a sample does not carry an `expires` override
pub const DEFAULT_TTL: &str = "90s";

/// Default janitor sweep interval
pub const DEFAULT_SWEEP_INTERVAL: &str = "60s";

// =============================================================================
// Topics
// =============================================================================

/// Topic name for inbound sample payloads
pub const TOPIC_SAMPLES: &str = "samples";

/// Default total byte budget for buffered topic messages
pub const DEFAULT_TOPIC_BUFFER_BYTES: usize = 8 * 1024 * 1024;

/// Default topic channel capacity (messages)
pub const DEFAULT_TOPIC_CHANNEL_CAPACITY: usize = 1024;

// =============================================================================
// Shutdown
// =============================================================================

/// Maximum time to wait for background tasks during shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;
