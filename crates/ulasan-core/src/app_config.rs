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

/// Credentials and location of an Appwrite storage bucket.
#[derive(Clone, PartialEq, Eq)]
pub struct AppwriteConfig {
    pub endpoint: String,
    pub project_id: String,
    pub api_key: String,
    pub bucket_id: String,
}

impl std::fmt::Debug for AppwriteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppwriteConfig")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("api_key", &"[redacted]")
            .field("bucket_id", &self.bucket_id)
            .finish()
    }
}

/// Where uploaded CSV files end up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Files are copied into a directory on local disk.
    Local { root: PathBuf },
    Appwrite(AppwriteConfig),
}

/// Runtime configuration shared by the server and the CLI.
///
/// Secrets live inside [`AppwriteConfig`], whose `Debug` output is redacted.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub data_dir: PathBuf,
    /// `None` selects the built-in lexicon.
    pub lexicon_path: Option<PathBuf>,
    pub harvest_bin: String,
    pub preview_limit: usize,
    pub storage: StorageBackend,
    pub storage_timeout_secs: u64,
}
