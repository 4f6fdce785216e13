//! Process configuration, read once at startup.
//!
//! Everything the binary needs comes from the environment (optionally via a
//! `.env` file): bind address, database, CORS, timeouts, token verification
//! and the generation client. Malformed values abort startup.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use adpilot_llm::LlmConfig;

use crate::auth::jwt::JwtConfig;

/// Headroom the HTTP timeout keeps over a single LLM call, since an email
/// makes two calls (body, then subject line) plus scoring.
const LLM_HEADROOM: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    /// Front-end origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Per-request timeout. Generation waits on the model, so this is long.
    pub request_timeout: Duration,
    /// How long background tasks get to drain after the listener stops.
    pub shutdown_timeout: Duration,
    pub jwt: JwtConfig,
    pub llm: LlmConfig,
}

impl ServerConfig {
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `5000`                  |
    /// | `DATABASE_URL`          | required                |
    /// | `CORS_ORIGINS`          | `http://localhost:3000` |
    /// | `REQUEST_TIMEOUT_SECS`  | `120`                   |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `10`                    |
    ///
    /// plus the `JwtConfig` and `LlmConfig` variables.
    pub fn from_env() -> Self {
        let host: IpAddr = env_parse("HOST", IpAddr::from([0, 0, 0, 0]));
        let port: u16 = env_parse("PORT", 5000);
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let cors_origins = parse_origins(
            &std::env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:3000".into()),
        );

        let config = Self {
            bind_addr: SocketAddr::new(host, port),
            database_url,
            cors_origins,
            request_timeout: Duration::from_secs(env_parse("REQUEST_TIMEOUT_SECS", 120)),
            shutdown_timeout: Duration::from_secs(env_parse("SHUTDOWN_TIMEOUT_SECS", 10)),
            jwt: JwtConfig::from_env(),
            llm: LlmConfig::from_env(),
        };
        config.warn_on_tight_timeout();
        config
    }

    /// Generation requests cut off by the HTTP timeout would leave the
    /// model call running with nobody waiting for it.
    fn warn_on_tight_timeout(&self) {
        let llm_timeout = Duration::from_secs(self.llm.timeout_secs);
        if self.request_timeout < llm_timeout + LLM_HEADROOM {
            tracing::warn!(
                request_timeout_secs = self.request_timeout.as_secs(),
                llm_timeout_secs = self.llm.timeout_secs,
                "REQUEST_TIMEOUT_SECS leaves little room for generation calls",
            );
        }
    }
}

/// Parse `key`, falling back to `default` when unset. Panics on a value
/// that does not parse.
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{key} has an invalid value: {raw:?}")),
        Err(_) => default,
    }
}

/// Split a comma-separated origin list, dropping blanks and trailing slashes.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
