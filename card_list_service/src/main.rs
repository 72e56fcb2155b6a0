//! Card List Service - HTTP server entry point
//!
//! Opens the SQLite database, then serves the card list API until Ctrl-C.

use card_list_service::web::{self, AppState};
use card_list_service::{init_schema, ScryfallClient, ServiceConfig};
use clap::Parser;
use rusqlite::Connection;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Card list server - resolves uploaded CSV card lists and serves them
#[derive(Parser, Debug)]
#[command(name = "card_list_service")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    #[arg(short, long, default_value_t = default_db_path())]
    database: String,

    /// Address to bind the HTTP server to
    #[arg(long, default_value = "0.0.0.0")]
    bind: IpAddr,

    /// Port for the HTTP server
    #[arg(short, long, default_value_t = 5000)]
    port: u16,

    /// Scryfall API base URL
    #[arg(long, default_value = card_list_service::config::SCRYFALL_API_URL)]
    scryfall_url: String,

    /// Timeout for a single card lookup, in seconds
    #[arg(long, default_value_t = 10)]
    lookup_timeout_secs: u64,

    /// Public base URL used in share links (default: taken from the Host header)
    #[arg(long)]
    public_url: Option<String>,

    /// Directory for temporary upload files (default: system temp dir)
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Maximum upload size in megabytes
    #[arg(long, default_value_t = 10)]
    max_upload_mb: usize,
}

impl Args {
    fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            bind_addr: SocketAddr::new(self.bind, self.port),
            scryfall_url: self.scryfall_url.clone(),
            lookup_timeout: Duration::from_secs(self.lookup_timeout_secs),
            public_url: self.public_url.clone(),
            upload_dir: self.upload_dir.clone(),
            max_upload_bytes: self.max_upload_mb * 1024 * 1024,
        }
    }
}

/// Returns the default database path: ~/.local/share/card_list_service/card_lists.db
fn default_db_path() -> String {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("card_list_service")
        .join("card_lists.db")
        .to_string_lossy()
        .to_string()
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let db_path = PathBuf::from(&args.database);
    let config = args.service_config();

    log::info!("Starting card_list_service...");
    log::info!("Database path: {}", db_path.display());

    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                log::error!("Failed to create database directory: {}", e);
                std::process::exit(1);
            }
            log::info!("Created directory: {}", parent.display());
        }
    }

    let conn = match Connection::open(&db_path) {
        Ok(conn) => {
            log::info!("Opened database: {}", db_path.display());
            conn
        }
        Err(e) => {
            log::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_schema(&conn) {
        log::error!("Failed to initialize database schema: {}", e);
        std::process::exit(1);
    }

    let scryfall = match ScryfallClient::new(&config.scryfall_url, config.lookup_timeout) {
        Ok(client) => {
            log::info!("Scryfall API: {}", client.base_url());
            client
        }
        Err(e) => {
            log::error!("Failed to build Scryfall client: {}", e);
            std::process::exit(1);
        }
    };

    // Wrap connection in Arc<Mutex> for thread-safe sharing
    let db = Arc::new(Mutex::new(conn));
    let state = AppState::new(db, scryfall, config);

    if let Err(e) = web::serve(state).await {
        log::error!("Web server error: {}", e);
        std::process::exit(1);
    }

    log::info!("Server stopped.");
}
