use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration from the provided env-var lookup function, so tests can
/// drive it from a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        parse_num(&or_default(var, default)).map_err(|r| invalid(var, r))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_num(&or_default(var, default)).map_err(|r| invalid(var, r))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        parse_num(&or_default(var, default)).map_err(|r| invalid(var, r))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_flag(&or_default(var, default))
            .ok_or_else(|| invalid(var, "expected true/false".to_string()))
    };

    let env = parse_environment(&or_default("STOREMAP_ENV", "development"))
        .ok_or_else(|| invalid("STOREMAP_ENV", "expected development, test or production".into()))?;

    let bind_addr = parse("STOREMAP_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("STOREMAP_LOG_LEVEL", "info");
    let static_dir = PathBuf::from(or_default("STOREMAP_STATIC_DIR", "./store-map"));

    let catalog_sources = parse_sources(&or_default(
        "STOREMAP_CATALOG_SOURCES",
        "store_coordinates.json,store_milk.json",
    ));
    if catalog_sources.is_empty() {
        return Err(invalid(
            "STOREMAP_CATALOG_SOURCES",
            "at least one catalog source is required".to_string(),
        ));
    }

    let state_dir = PathBuf::from(or_default("STOREMAP_STATE_DIR", "./.storemap"));
    let save_debounce_ms = parse_u64("STOREMAP_SAVE_DEBOUNCE_MS", "300")?;
    let storage_quota_bytes = parse_usize("STOREMAP_STORAGE_QUOTA_BYTES", "5242880")?;
    let cookie_max_bytes = parse_usize("STOREMAP_COOKIE_MAX_BYTES", "4096")?;
    let cookie_max_age_days = parse_u32("STOREMAP_COOKIE_MAX_AGE_DAYS", "365")?;

    let fetch_timeout_secs = parse_u64("STOREMAP_FETCH_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("STOREMAP_USER_AGENT", "storemap/0.1 (store-locator)");

    let geo_high_accuracy = parse_bool("STOREMAP_GEO_HIGH_ACCURACY", "true")?;
    let geo_timeout_secs = parse_u64("STOREMAP_GEO_TIMEOUT_SECS", "15")?;
    let geo_max_age_secs = parse_u64("STOREMAP_GEO_MAX_AGE_SECS", "30")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        static_dir,
        catalog_sources,
        state_dir,
        save_debounce_ms,
        storage_quota_bytes,
        cookie_max_bytes,
        cookie_max_age_days,
        fetch_timeout_secs,
        user_agent,
        geo_high_accuracy,
        geo_timeout_secs,
        geo_max_age_secs,
    })
}

/// Parse an environment name. Unknown names are rejected.
fn parse_environment(s: &str) -> Option<Environment> {
    match s.trim() {
        "development" => Some(Environment::Development),
        "test" => Some(Environment::Test),
        "production" => Some(Environment::Production),
        _ => None,
    }
}

fn parse_num<T>(raw: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| e.to_string())
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_sources(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
