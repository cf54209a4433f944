/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT` (`pretty` | `json`, default `pretty`).
    pub fn from_env() -> Self {
        match std::env::var("LOG_FORMAT").as_deref() {
            Ok("json") => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins from comma-separated `CORS_ORIGINS`; `*` allows any.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `300`).
    pub request_timeout_secs: u64,
    /// Directory served under `/static` (default: `static`).
    pub static_dir: String,
    /// Maximum pooled database connections (default: `20`).
    pub database_max_connections: u32,
    /// Timeout around one inference call in seconds (default: `120`).
    pub inference_timeout_secs: u64,
    /// Fail extractions whose recipe has validation findings (default: `false`).
    pub reject_invalid_recipes: bool,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default   |
    /// |----------------------------|-----------|
    /// | `HOST`                     | `0.0.0.0` |
    /// | `PORT`                     | `8000`    |
    /// | `CORS_ORIGINS`             | `*`       |
    /// | `REQUEST_TIMEOUT_SECS`     | `300`     |
    /// | `STATIC_DIR`               | `static`  |
    /// | `DATABASE_MAX_CONNECTIONS` | `20`      |
    /// | `INFERENCE_TIMEOUT_SECS`   | `120`     |
    /// | `REJECT_INVALID_RECIPES`   | `false`   |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "300".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into());

        let database_max_connections: u32 = std::env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("DATABASE_MAX_CONNECTIONS must be a valid u32");

        let inference_timeout_secs: u64 = std::env::var("INFERENCE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "120".into())
            .parse()
            .expect("INFERENCE_TIMEOUT_SECS must be a valid u64");

        let reject_invalid_recipes = std::env::var("REJECT_INVALID_RECIPES")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            static_dir,
            database_max_connections,
            inference_timeout_secs,
            reject_invalid_recipes,
        }
    }

    /// `true` when `CORS_ORIGINS` lets any origin through.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}
