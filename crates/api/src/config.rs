use std::time::Duration;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT verification settings.
    pub jwt: JwtConfig,
    /// Requests allowed per caller key in one window (default: `100`).
    pub rate_limit_max_requests: u32,
    /// Rate limit window length in seconds (default: `60`).
    pub rate_limit_window_secs: u64,
    /// Largest accepted inbound frame payload in bytes (default: 1 MiB).
    /// Also caps a reassembled fragmented message.
    pub ws_max_frame_bytes: usize,
    /// Outbound frames queued per connection before broadcasts start
    /// dropping frames for it (default: `256`).
    pub ws_outbound_buffer: usize,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `RATE_LIMIT_MAX_REQUESTS` | `100`                   |
    /// | `RATE_LIMIT_WINDOW_SECS`  | `60`                    |
    /// | `WS_MAX_FRAME_BYTES`      | `1048576`               |
    /// | `WS_OUTBOUND_BUFFER`      | `256`                   |
    ///
    /// JWT variables are documented on [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let rate_limit_max_requests: u32 = env_or("RATE_LIMIT_MAX_REQUESTS", "100")
            .parse()
            .expect("RATE_LIMIT_MAX_REQUESTS must be a valid u32");

        let rate_limit_window_secs: u64 = env_or("RATE_LIMIT_WINDOW_SECS", "60")
            .parse()
            .expect("RATE_LIMIT_WINDOW_SECS must be a valid u64");
        assert!(rate_limit_window_secs > 0, "RATE_LIMIT_WINDOW_SECS must be positive");

        let ws_max_frame_bytes: usize = env_or("WS_MAX_FRAME_BYTES", "1048576")
            .parse()
            .expect("WS_MAX_FRAME_BYTES must be a valid usize");

        let ws_outbound_buffer: usize = env_or("WS_OUTBOUND_BUFFER", "256")
            .parse()
            .expect("WS_OUTBOUND_BUFFER must be a valid usize");
        assert!(ws_outbound_buffer > 0, "WS_OUTBOUND_BUFFER must be positive");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            rate_limit_max_requests,
            rate_limit_window_secs,
            ws_max_frame_bytes,
            ws_outbound_buffer,
        }
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}
