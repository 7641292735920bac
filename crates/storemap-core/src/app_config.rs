use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub static_dir: PathBuf,
    /// Catalog URLs or file paths, concatenated in this order.
    pub catalog_sources: Vec<String>,
    pub state_dir: PathBuf,
    pub save_debounce_ms: u64,
    pub storage_quota_bytes: usize,
    pub cookie_max_bytes: usize,
    pub cookie_max_age_days: u32,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    pub geo_high_accuracy: bool,
    pub geo_timeout_secs: u64,
    pub geo_max_age_secs: u64,
}
