use std::env;

/// Application configuration loaded from environment variables.
///
/// The sync credentials are optional at startup so the server can boot and
/// answer health checks without them; the sync endpoint rejects invocations
/// until both are present.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// Domus API access token.
    pub domus_token: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Domus listing endpoint.
    pub domus_api_base: String,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3030".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            domus_token: env::var("DOMUS_TOKEN").ok(),
            database_url: env::var("DATABASE_URL").ok(),
            domus_api_base: env::var("DOMUS_API_BASE")
                .unwrap_or_else(|_| "https://apiv3get.domus.la/inmuebles/lista".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        }
    }

    /// Whether both values the sync run requires are present.
    pub fn sync_configured(&self) -> bool {
        self.domus_token.is_some() && self.database_url.is_some()
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
