//! Runtime configuration handed to the web layer

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Default Scryfall API base URL
pub const SCRYFALL_API_URL: &str = "https://api.scryfall.com";

/// Service settings, built once in `main` from the command line
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address the HTTP server binds to
    pub bind_addr: SocketAddr,
    /// Scryfall base URL (overridable for tests and mirrors)
    pub scryfall_url: String,
    /// Upper bound for a single card lookup
    pub lookup_timeout: Duration,
    /// Base URL used in share links; falls back to the request's Host header
    pub public_url: Option<String>,
    /// Directory for spooled uploads; system temp dir when unset
    pub upload_dir: Option<PathBuf>,
    /// Maximum accepted request body size in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5000),
            scryfall_url: SCRYFALL_API_URL.to_string(),
            lookup_timeout: Duration::from_secs(10),
            public_url: None,
            upload_dir: None,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}
