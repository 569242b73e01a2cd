//! Process configuration: CLI flags with environment fallbacks.

use std::net::SocketAddr;

use actix_web::cookie::Key;
use clap::Parser;
use color_eyre::eyre::{eyre, WrapErr};
use tracing::warn;

/// RouteLink backend configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "routelink", version, about = "Campus commute matching backend")]
pub struct AppConfig {
    /// Address to bind the HTTP server to.
    #[arg(long, env = "ROUTELINK_BIND", default_value = "127.0.0.1:8080")]
    pub bind: SocketAddr,

    /// Path of the SQLite database file.
    #[arg(long, env = "ROUTELINK_DB", default_value = "routelink.db")]
    pub database: String,

    /// File holding at least 64 random bytes used to derive the session
    /// signing key.
    #[arg(long, env = "ROUTELINK_SESSION_KEY_FILE")]
    pub session_key_file: Option<String>,

    /// Set the `Secure` attribute on the session cookie.
    #[arg(long, env = "ROUTELINK_COOKIE_SECURE", default_value_t = false)]
    pub cookie_secure: bool,

    /// Restrict registration to email addresses on this domain.
    #[arg(long, env = "ROUTELINK_EMAIL_DOMAIN")]
    pub email_domain: Option<String>,
}

impl AppConfig {
    /// Load or derive the session signing key.
    ///
    /// Without a configured key file, debug builds fall back to an
    /// ephemeral key (sessions die with the process); release builds
    /// refuse to start.
    pub fn session_key(&self) -> color_eyre::Result<Key> {
        match &self.session_key_file {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .wrap_err_with(|| format!("failed to read session key at {path}"))?;
                if bytes.len() < 32 {
                    return Err(eyre!("session key file {path} holds fewer than 32 bytes"));
                }
                Ok(Key::derive_from(&bytes))
            }
            None if cfg!(debug_assertions) => {
                warn!("no session key file configured; using an ephemeral key (dev only)");
                Ok(Key::generate())
            }
            None => Err(eyre!(
                "a session key file is required outside debug builds; set ROUTELINK_SESSION_KEY_FILE"
            )),
        }
    }
}
