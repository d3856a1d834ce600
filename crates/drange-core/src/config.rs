use crate::app_config::{AppConfig, Environment, IndexStrategy, StoreBackend};
use crate::ConfigError;

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

/// Longest index lifetime accepted; indexes are rebuilt far more often.
pub const MAX_INDEX_TTL_SECS: u64 = 30 * 24 * 60 * 60;

fn invalid(var: &str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| invalid(var, e))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
///
/// # Errors
///
/// Returns [`ConfigError`] if a required variable is missing or any value
/// fails to parse or validate.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let catalog_feed_url = require("DRANGE_CATALOG_FEED_URL")?;

    let env = parse_environment(&or_default("DRANGE_ENV", "development"))?;
    let bind_addr: SocketAddr =
        parse_as("DRANGE_BIND_ADDR", &or_default("DRANGE_BIND_ADDR", "0.0.0.0:8000"))?;
    let log_level = or_default("DRANGE_LOG_LEVEL", "info");

    let store_backend = parse_store_backend(&or_default("DRANGE_STORE_BACKEND", "redis"))?;
    let redis_url = or_default("DRANGE_REDIS_URL", "redis://127.0.0.1:6379");
    let index_strategy = parse_index_strategy(&or_default("DRANGE_INDEX_STRATEGY", "sharded"))?;

    let shard_chunk_size: usize = parse_as(
        "DRANGE_SHARD_CHUNK_SIZE",
        &or_default("DRANGE_SHARD_CHUNK_SIZE", "100000"),
    )?;
    if shard_chunk_size == 0 {
        return Err(invalid("DRANGE_SHARD_CHUNK_SIZE", "must be greater than zero"));
    }

    let index_ttl_secs: u64 = parse_as(
        "DRANGE_INDEX_TTL_SECS",
        &or_default("DRANGE_INDEX_TTL_SECS", "45000"),
    )?;
    if index_ttl_secs == 0 {
        return Err(invalid("DRANGE_INDEX_TTL_SECS", "must be greater than zero"));
    }
    if index_ttl_secs > MAX_INDEX_TTL_SECS {
        return Err(invalid(
            "DRANGE_INDEX_TTL_SECS",
            format!("must be at most {MAX_INDEX_TTL_SECS} seconds"),
        ));
    }

    let max_search_radius_km: f64 = parse_as(
        "DRANGE_MAX_SEARCH_RADIUS_KM",
        &or_default("DRANGE_MAX_SEARCH_RADIUS_KM", "8.0"),
    )?;
    if !max_search_radius_km.is_finite() || max_search_radius_km <= 0.0 {
        return Err(invalid(
            "DRANGE_MAX_SEARCH_RADIUS_KM",
            "must be a positive number of kilometres",
        ));
    }

    let catalog_utc_offset_minutes: i32 = parse_as(
        "DRANGE_CATALOG_UTC_OFFSET_MINUTES",
        &or_default("DRANGE_CATALOG_UTC_OFFSET_MINUTES", "0"),
    )?;
    if catalog_utc_offset_minutes.abs() >= 24 * 60 {
        return Err(invalid(
            "DRANGE_CATALOG_UTC_OFFSET_MINUTES",
            "must be strictly within one day of UTC",
        ));
    }

    let feed_request_timeout_secs = parse_as(
        "DRANGE_FEED_REQUEST_TIMEOUT_SECS",
        &or_default("DRANGE_FEED_REQUEST_TIMEOUT_SECS", "30"),
    )?;
    let feed_user_agent = or_default("DRANGE_FEED_USER_AGENT", "drange/0.1 (catalog-refresh)");
    let feed_max_retries = parse_as(
        "DRANGE_FEED_MAX_RETRIES",
        &or_default("DRANGE_FEED_MAX_RETRIES", "3"),
    )?;
    let feed_retry_backoff_base_ms = parse_as(
        "DRANGE_FEED_RETRY_BACKOFF_BASE_MS",
        &or_default("DRANGE_FEED_RETRY_BACKOFF_BASE_MS", "500"),
    )?;

    let refresh_cron = lookup("DRANGE_REFRESH_CRON")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let api_keys = lookup("DRANGE_API_KEYS")
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        catalog_feed_url,
        store_backend,
        redis_url,
        index_strategy,
        shard_chunk_size,
        index_ttl_secs,
        max_search_radius_km,
        catalog_utc_offset_minutes,
        feed_request_timeout_secs,
        feed_user_agent,
        feed_max_retries,
        feed_retry_backoff_base_ms,
        refresh_cron,
        api_keys,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Returns `Err` for unrecognized values so a typo such as `prod` never
/// silently boots with development defaults.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(invalid(
            "DRANGE_ENV",
            format!("unrecognized value \"{other}\"; expected development, test, or production"),
        )),
    }
}

fn parse_store_backend(s: &str) -> Result<StoreBackend, ConfigError> {
    match s {
        "redis" => Ok(StoreBackend::Redis),
        "memory" => Ok(StoreBackend::Memory),
        other => Err(invalid(
            "DRANGE_STORE_BACKEND",
            format!("unrecognized value \"{other}\"; expected redis or memory"),
        )),
    }
}

fn parse_index_strategy(s: &str) -> Result<IndexStrategy, ConfigError> {
    match s {
        "sharded" => Ok(IndexStrategy::Sharded),
        "native-geo" => Ok(IndexStrategy::NativeGeo),
        other => Err(invalid(
            "DRANGE_INDEX_STRATEGY",
            format!("unrecognized value \"{other}\"; expected sharded or native-geo"),
        )),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
