//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for docr-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:8000"`).
    pub bind_address: String,

    /// SQLite database URL (default: `"sqlite://docr.db?mode=rwc"`).
    /// `mode=rwc` creates the file on first start.  Supports any
    /// sqlx-compatible connection string.
    pub database_url: String,

    /// Directory uploaded documents are stored under (created at startup).
    pub upload_dir: String,

    /// Bounded task-queue capacity; submissions beyond it are rejected.
    pub queue_capacity: usize,

    /// Number of OCR worker tasks.
    pub workers: usize,

    /// Language spec handed to the OCR engine, e.g. `"rus+eng"`.
    pub ocr_languages: String,

    /// Tesseract binary to invoke.
    pub tesseract_bin: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,sqlx=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated CORS origin allowlist; unset means wildcard.
    pub cors_origins: Option<String>,

    /// Serve Swagger UI at `/swagger-ui` (default: enabled).
    pub enable_swagger: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("DOCR_BIND", "0.0.0.0:8000"),
            database_url: env_or("DOCR_DATABASE_URL", "sqlite://docr.db?mode=rwc"),
            upload_dir: env_or("DOCR_UPLOAD_DIR", "uploads"),
            queue_capacity: parse_env("DOCR_QUEUE_CAPACITY", 100),
            workers: parse_env("DOCR_WORKERS", 2),
            ocr_languages: env_or("DOCR_OCR_LANGUAGES", "rus+eng"),
            tesseract_bin: env_or("DOCR_TESSERACT_BIN", "tesseract"),
            log_level: env_or("DOCR_LOG", "info"),
            log_json: std::env::var("DOCR_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            cors_origins: std::env::var("DOCR_CORS_ORIGINS").ok(),
            enable_swagger: std::env::var("DOCR_ENABLE_SWAGGER")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
