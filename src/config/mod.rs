//! Server configuration: port, bind address, database URL, log level.
//!
//! Priority (highest to lowest): CLI / env (passed as `Some(value)` from
//! clap) > built-in defaults. `DATABASE_URL` selects the storage backend;
//! when unset a local SQLite file in the working directory is used.

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_DATABASE_URL: &str = "sqlite://todos.db?mode=rwc";

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Bind address (default: 127.0.0.1; use 0.0.0.0 for LAN access).
    pub bind_address: String,
    /// SQLx connection string for the task store.
    pub database_url: String,
    /// Log level filter string (trace, debug, info, warn, error).
    pub log: String,
}

impl ServerConfig {
    pub fn new(
        port: Option<u16>,
        bind_address: Option<String>,
        database_url: Option<String>,
        log: Option<String>,
    ) -> Self {
        let port = port.unwrap_or(DEFAULT_PORT);
        let bind_address = bind_address
            .filter(|s| !s.is_empty())
            .unwrap_or_else(default_bind_address);
        let database_url = database_url
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let log = log.unwrap_or_else(|| "info".to_string());

        Self {
            port,
            bind_address,
            database_url,
            log,
        }
    }
}
