//! Server state and configuration.

use std::path::PathBuf;
use std::time::Instant;

/// Default listen address, matching the client's default service URL.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3001";

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:3001")
    pub listen_addr: String,
    /// Directory for temporary upload files
    pub upload_dir: PathBuf,
    /// exiftool binary name or path
    pub exiftool_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            upload_dir: std::env::temp_dir().join("shutterglyph-uploads"),
            exiftool_path: "exiftool".to_string(),
        }
    }
}

/// Application state shared across handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            started_at: Instant::now(),
        }
    }
}
