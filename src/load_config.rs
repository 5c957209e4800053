/// `load_config` module: loads the catalog settings from a YAML file and the
/// bucket settings and secrets from the environment.
///
/// This is the only place where configuration is read from outside the
/// process. Everything downstream receives a [`CatalogConfig`] or
/// [`RemoteConfig`] value.
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{anyhow, Result};
use std::env;
use std::fs;
use std::path::Path;
use tracing::{error, info};

use crate::config::{CatalogConfig, RemoteConfig};

/// Loads a YAML catalog config. Every key is optional; absent keys keep
/// their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CatalogConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow!("Failed to read config file {:?}: {}", path_ref, e));
        }
    };

    // serde_yaml rejects an empty document for a struct, so treat it as "all defaults".
    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(CatalogConfig::default());
    }

    let config: CatalogConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    if config.concurrency == 0 {
        error!(config_path = ?path_ref, "concurrency must be at least 1");
        anyhow::bail!("Invalid config: concurrency must be at least 1");
    }

    config.trace_loaded();
    Ok(config)
}

fn required_var(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        Ok(_) => {
            error!(var = name, "Environment variable is empty");
            Err(anyhow!("{name} environment variable is empty"))
        }
        Err(e) => {
            error!(error = ?e, var = name, "Environment variable not set");
            Err(anyhow!("{name} environment variable not set: {e}"))
        }
    }
}

/// Builds the bucket settings from `REGION`, `BUCKET_NAME`, `OBJECT_KEY`,
/// `ACCOUNT_ID`, `ENDPOINT`, `ACCESS_KEY_ID` and `SECRET_ACCESS_KEY`.
///
/// `OBJECT_KEY` falls back to the catalog's manifest file name, `REGION` to
/// `auto`, and `ENDPOINT` to the R2 endpoint of `ACCOUNT_ID`.
pub fn load_remote_config(catalog: &CatalogConfig) -> Result<RemoteConfig> {
    let bucket_name = required_var("BUCKET_NAME")?;
    let account_id = required_var("ACCOUNT_ID")?;
    let access_key_id = required_var("ACCESS_KEY_ID")?;
    let secret_access_key = required_var("SECRET_ACCESS_KEY")?;

    let region = env::var("REGION")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "auto".to_string());
    let object_key = env::var("OBJECT_KEY")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| catalog.manifest_file_name.clone());
    let endpoint = env::var("ENDPOINT")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| format!("https://{account_id}.r2.cloudflarestorage.com"));

    let remote = RemoteConfig {
        region,
        bucket_name,
        object_key,
        account_id,
        endpoint,
        access_key_id,
        secret_access_key,
    };
    info!(remote = ?remote, "Remote config loaded from environment");
    Ok(remote)
}
