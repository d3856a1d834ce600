use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

/// Returns a map with all required env vars populated with valid defaults.
fn full_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("DRANGE_CATALOG_FEED_URL", "https://feeds.example.com/catalog.csv");
    m
}

#[test]
fn parse_environment_accepts_known_values() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_rejects_unknown_value() {
    let err = parse_environment("prod").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "DRANGE_ENV"));
}

#[test]
fn build_app_config_fails_without_feed_url() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "DRANGE_CATALOG_FEED_URL"),
        "expected MissingEnvVar(DRANGE_CATALOG_FEED_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_treats_blank_feed_url_as_missing() {
    let mut map = HashMap::new();
    map.insert("DRANGE_CATALOG_FEED_URL", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_app_config_applies_defaults() {
    let map = full_env();
    let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should be valid");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8000");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.store_backend, StoreBackend::Redis);
    assert_eq!(cfg.redis_url, "redis://127.0.0.1:6379");
    assert_eq!(cfg.index_strategy, IndexStrategy::Sharded);
    assert_eq!(cfg.shard_chunk_size, 100_000);
    assert_eq!(cfg.index_ttl_secs, 45_000);
    assert!((cfg.max_search_radius_km - 8.0).abs() < f64::EPSILON);
    assert_eq!(cfg.catalog_utc_offset_minutes, 0);
    assert_eq!(cfg.feed_request_timeout_secs, 30);
    assert_eq!(cfg.feed_user_agent, "drange/0.1 (catalog-refresh)");
    assert_eq!(cfg.feed_max_retries, 3);
    assert_eq!(cfg.feed_retry_backoff_base_ms, 500);
    assert!(cfg.refresh_cron.is_none());
    assert!(cfg.api_keys.is_empty());
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = full_env();
    map.insert("DRANGE_ENV", "production");
    map.insert("DRANGE_STORE_BACKEND", "memory");
    map.insert("DRANGE_INDEX_STRATEGY", "native-geo");
    map.insert("DRANGE_SHARD_CHUNK_SIZE", "250");
    map.insert("DRANGE_MAX_SEARCH_RADIUS_KM", "12.5");
    map.insert("DRANGE_CATALOG_UTC_OFFSET_MINUTES", "-180");
    map.insert("DRANGE_REFRESH_CRON", "0 0 */6 * * *");
    map.insert("DRANGE_API_KEYS", " alpha, ,beta ");
    let cfg = build_app_config(lookup_from_map(&map)).expect("overrides should be valid");
    assert_eq!(cfg.env, Environment::Production);
    assert_eq!(cfg.store_backend, StoreBackend::Memory);
    assert_eq!(cfg.index_strategy, IndexStrategy::NativeGeo);
    assert_eq!(cfg.shard_chunk_size, 250);
    assert!((cfg.max_search_radius_km - 12.5).abs() < f64::EPSILON);
    assert_eq!(cfg.catalog_utc_offset_minutes, -180);
    assert_eq!(cfg.refresh_cron.as_deref(), Some("0 0 */6 * * *"));
    assert_eq!(cfg.api_keys, vec!["alpha".to_string(), "beta".to_string()]);
}

#[test]
fn build_app_config_fails_with_invalid_bind_addr() {
    let mut map = full_env();
    map.insert("DRANGE_BIND_ADDR", "not-a-socket-addr");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DRANGE_BIND_ADDR"),
        "expected InvalidEnvVar(DRANGE_BIND_ADDR), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_zero_chunk_size() {
    let mut map = full_env();
    map.insert("DRANGE_SHARD_CHUNK_SIZE", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DRANGE_SHARD_CHUNK_SIZE"),
        "expected InvalidEnvVar(DRANGE_SHARD_CHUNK_SIZE), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_positive_search_radius() {
    for raw in ["0", "-3", "NaN", "wide"] {
        let mut map = full_env();
        map.insert("DRANGE_MAX_SEARCH_RADIUS_KM", raw);
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DRANGE_MAX_SEARCH_RADIUS_KM"),
            "expected InvalidEnvVar for {raw:?}, got: {result:?}"
        );
    }
}

#[test]
fn build_app_config_rejects_unknown_store_backend() {
    let mut map = full_env();
    map.insert("DRANGE_STORE_BACKEND", "memcached");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DRANGE_STORE_BACKEND"),
        "expected InvalidEnvVar(DRANGE_STORE_BACKEND), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_unknown_index_strategy() {
    let mut map = full_env();
    map.insert("DRANGE_INDEX_STRATEGY", "quadtree");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DRANGE_INDEX_STRATEGY"),
        "expected InvalidEnvVar(DRANGE_INDEX_STRATEGY), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_offset_of_a_full_day() {
    let mut map = full_env();
    map.insert("DRANGE_CATALOG_UTC_OFFSET_MINUTES", "1440");
    let result = build_app_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
}

#[test]
fn debug_output_redacts_redis_url_and_api_keys() {
    let mut map = full_env();
    map.insert("DRANGE_REDIS_URL", "redis://:hunter2@cache:6379");
    map.insert("DRANGE_API_KEYS", "secret-token");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("hunter2"));
    assert!(!rendered.contains("secret-token"));
}

#[test]
fn build_app_config_bounds_index_ttl() {
    let mut map = full_env();
    map.insert("DRANGE_INDEX_TTL_SECS", "18446744073709551615");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "DRANGE_INDEX_TTL_SECS"),
        "expected InvalidEnvVar(DRANGE_INDEX_TTL_SECS), got: {result:?}"
    );

    let longest = MAX_INDEX_TTL_SECS.to_string();
    let mut map = full_env();
    map.insert("DRANGE_INDEX_TTL_SECS", longest.as_str());
    let cfg = build_app_config(lookup_from_map(&map)).expect("longest ttl accepted");
    assert_eq!(cfg.index_ttl_secs, MAX_INDEX_TTL_SECS);
}
