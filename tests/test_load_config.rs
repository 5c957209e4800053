use partner_catalog::config::{AssetLayout, CatalogConfig, Limits, ThumbnailPolicy};
use partner_catalog::load_config::{load_config, load_remote_config};
use serial_test::serial;
use std::env;
use std::fs::write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const REMOTE_VARS: [&str; 7] = [
    "REGION",
    "BUCKET_NAME",
    "OBJECT_KEY",
    "ACCOUNT_ID",
    "ENDPOINT",
    "ACCESS_KEY_ID",
    "SECRET_ACCESS_KEY",
];

fn clear_remote_env() {
    for var in REMOTE_VARS {
        env::remove_var(var);
    }
}

/// A partial config overrides only what it names.
#[test]
fn partial_config_keeps_defaults_for_absent_keys() {
    let config_yaml = r#"
partners_dir: ./data/partners
layout: logo
thumbnail_policy: max_bound
limits:
  name_limit: 30
"#;
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), config_yaml).unwrap();

    let config = load_config(config_file.path()).expect("Config should load");

    assert_eq!(config.partners_dir, PathBuf::from("./data/partners"));
    assert_eq!(config.layout, AssetLayout::Logo);
    assert_eq!(config.thumbnail_policy, ThumbnailPolicy::MaxBound);
    assert_eq!(config.limits.name_limit, 30);
    assert_eq!(config.limits.tag_character_limit, Limits::default().tag_character_limit);
    assert_eq!(config.declaration_file, "info.yaml");
    assert_eq!(config.example_dir_name, "example");
}

#[test]
fn empty_config_file_is_all_defaults() {
    let config_file = NamedTempFile::new().expect("temp file");

    let config = load_config(config_file.path()).expect("Empty config should load");

    let defaults = CatalogConfig::default();
    assert_eq!(config.partners_dir, defaults.partners_dir);
    assert_eq!(config.limits, defaults.limits);
    assert_eq!(config.manifest_file_name, "partners.json");
}

#[test]
fn invalid_yaml_is_a_parse_error() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), b"limits: [:::").unwrap();

    let err = load_config(config_file.path()).unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("parse") || msg.contains("YAML"), "Parse error expected, got: {msg}");
}

#[test]
fn missing_file_is_a_read_error() {
    let err = load_config("/definitely/not/here/catalog.yaml").unwrap_err();

    assert!(err.to_string().contains("read"), "got: {err}");
}

#[test]
fn zero_concurrency_is_rejected() {
    let config_file = NamedTempFile::new().expect("temp file");
    write(config_file.path(), "concurrency: 0\n").unwrap();

    let err = load_config(config_file.path()).unwrap_err();

    assert!(err.to_string().contains("concurrency"), "got: {err}");
}

#[test]
fn default_thumbnails_are_exact_and_banners_max_bound() {
    use partner_catalog::assets::DimensionPolicy;

    let specs = CatalogConfig::default().asset_specs();

    let names: Vec<&str> = specs.iter().map(|s| s.file_name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "thumbnail_light.png",
            "thumbnail_dark.png",
            "banner_light.png",
            "banner_dark.png"
        ]
    );
    assert_eq!(
        specs[0].policy,
        DimensionPolicy::Exact {
            width: 160,
            height: 160
        }
    );
    assert_eq!(
        specs[3].policy,
        DimensionPolicy::MaxBound {
            width: 274,
            height: 60
        }
    );
}

#[test]
#[serial]
fn remote_config_fills_defaults_from_account() {
    clear_remote_env();
    env::set_var("BUCKET_NAME", "partner-assets");
    env::set_var("ACCOUNT_ID", "abc123");
    env::set_var("ACCESS_KEY_ID", "key-id");
    env::set_var("SECRET_ACCESS_KEY", "very-secret");

    let remote = load_remote_config(&CatalogConfig::default()).expect("remote config loads");

    assert_eq!(remote.region, "auto");
    assert_eq!(remote.bucket_name, "partner-assets");
    assert_eq!(remote.object_key, "partners.json");
    assert_eq!(remote.endpoint, "https://abc123.r2.cloudflarestorage.com");
    let debug = format!("{remote:?}");
    assert!(!debug.contains("very-secret"), "secret leaked into Debug: {debug}");
    assert!(!debug.contains("key-id"), "access key leaked into Debug: {debug}");
    clear_remote_env();
}

#[test]
#[serial]
fn remote_config_honours_explicit_values() {
    clear_remote_env();
    env::set_var("REGION", "eu-west-1");
    env::set_var("BUCKET_NAME", "partner-assets");
    env::set_var("OBJECT_KEY", "catalog/partners.json");
    env::set_var("ACCOUNT_ID", "abc123");
    env::set_var("ENDPOINT", "http://localhost:9000");
    env::set_var("ACCESS_KEY_ID", "key-id");
    env::set_var("SECRET_ACCESS_KEY", "very-secret");

    let remote = load_remote_config(&CatalogConfig::default()).expect("remote config loads");

    assert_eq!(remote.region, "eu-west-1");
    assert_eq!(remote.object_key, "catalog/partners.json");
    assert_eq!(remote.endpoint, "http://localhost:9000");
    clear_remote_env();
}

#[test]
#[serial]
fn remote_config_requires_credentials() {
    clear_remote_env();
    env::set_var("BUCKET_NAME", "partner-assets");
    env::set_var("ACCOUNT_ID", "abc123");
    env::set_var("ACCESS_KEY_ID", "key-id");

    let err = load_remote_config(&CatalogConfig::default()).unwrap_err();

    assert!(err.to_string().contains("SECRET_ACCESS_KEY"), "got: {err}");
    clear_remote_env();
}
