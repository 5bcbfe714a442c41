use std::net::SocketAddr;
use std::path::PathBuf;

use crate::app_config::{AppConfig, AppwriteConfig, Environment, StorageBackend};
use crate::ConfigError;

const DEFAULT_APPWRITE_ENDPOINT: &str = "https://cloud.appwrite.io/v1";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("ULASAN_ENV", "development"))?;
    let bind_addr = parse_addr("ULASAN_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("ULASAN_LOG_LEVEL", "info");
    let data_dir = PathBuf::from(or_default("ULASAN_DATA_DIR", "./tweets-data"));
    let lexicon_path = lookup("ULASAN_LEXICON_PATH")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from);
    let harvest_bin = or_default("ULASAN_HARVEST_BIN", "tweet-harvest");

    let preview_limit = parse_usize("ULASAN_PREVIEW_LIMIT", "50")?;
    if preview_limit == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "ULASAN_PREVIEW_LIMIT".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let storage_timeout_secs = parse_u64("ULASAN_STORAGE_TIMEOUT_SECS", "30")?;

    let storage = match or_default("ULASAN_STORAGE_BACKEND", "local").as_str() {
        "local" => StorageBackend::Local {
            root: PathBuf::from(or_default("ULASAN_STORAGE_DIR", "./storage")),
        },
        "appwrite" => StorageBackend::Appwrite(AppwriteConfig {
            endpoint: or_default("APPWRITE_ENDPOINT", DEFAULT_APPWRITE_ENDPOINT)
                .trim_end_matches('/')
                .to_string(),
            project_id: require("APPWRITE_PROJECT_ID")?,
            api_key: require("APPWRITE_API_KEY")?,
            bucket_id: require("APPWRITE_BUCKET_ID")?,
        }),
        other => {
            return Err(ConfigError::InvalidEnvVar {
                var: "ULASAN_STORAGE_BACKEND".to_string(),
                reason: format!("unknown backend '{other}'; expected 'local' or 'appwrite'"),
            })
        }
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        data_dir,
        lexicon_path,
        harvest_bin,
        preview_limit,
        storage,
        storage_timeout_secs,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "ULASAN_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
