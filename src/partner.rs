//! Partner Loader: reads one partner's declaration file and normalises it
//! into the canonical [`PartnerRecord`].
//!
//! The declaration uses snake_case keys (`short_description`, ...); the
//! canonical record serialises as camelCase (`shortDescription`, ...). Nothing
//! downstream of this module sees the declared key names. No field is
//! defaulted: every key must be present in the file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// The record exactly as declared. Every key is optional here so that all
/// absent keys can be reported together.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPartnerRecord {
    pub name: Option<String>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub tags: Option<Vec<String>>,
    pub url: Option<String>,
}

/// One entry of the published manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerRecord {
    pub name: String,
    pub short_description: String,
    pub long_description: String,
    pub tags: Vec<String>,
    pub url: String,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{file} is missing in {}", .dir.display())]
    MissingDeclaration { file: String, dir: PathBuf },

    #[error("{} could not be read: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{file} contains invalid data in {}: {reason}", .dir.display())]
    Malformed {
        file: String,
        dir: PathBuf,
        reason: String,
    },

    #[error("{} missing in {}", .fields.join(", "), .path.display())]
    MissingFields {
        path: PathBuf,
        fields: Vec<&'static str>,
    },
}

impl LoadError {
    /// Human-readable messages for a validation report, one per problem.
    pub fn messages(&self) -> Vec<String> {
        match self {
            LoadError::MissingFields { path, fields } => fields
                .iter()
                .map(|field| format!("{} is missing in {}", field, path.display()))
                .collect(),
            other => vec![other.to_string()],
        }
    }
}

impl RawPartnerRecord {
    /// Maps the declared record onto the canonical shape, failing with every
    /// absent key if any are missing.
    pub fn normalise(self, path: &Path) -> Result<PartnerRecord, LoadError> {
        let mut missing = Vec::new();
        if self.name.is_none() {
            missing.push("name");
        }
        if self.short_description.is_none() {
            missing.push("short_description");
        }
        if self.long_description.is_none() {
            missing.push("long_description");
        }
        if self.tags.is_none() {
            missing.push("tags");
        }
        if self.url.is_none() {
            missing.push("url");
        }

        match (
            self.name,
            self.short_description,
            self.long_description,
            self.tags,
            self.url,
        ) {
            (Some(name), Some(short_description), Some(long_description), Some(tags), Some(url)) => {
                Ok(PartnerRecord {
                    name,
                    short_description,
                    long_description,
                    tags,
                    url,
                })
            }
            _ => Err(LoadError::MissingFields {
                path: path.to_path_buf(),
                fields: missing,
            }),
        }
    }
}

/// Parses declaration text. `.json` files are read as JSON, anything else
/// as YAML.
pub fn parse_declaration(file_name: &str, contents: &str) -> Result<RawPartnerRecord, String> {
    if file_name.ends_with(".json") {
        serde_json::from_str(contents).map_err(|e| e.to_string())
    } else {
        serde_yaml::from_str(contents).map_err(|e| e.to_string())
    }
}

/// Loads and normalises the partner declared in `source/declaration_file`.
pub fn load_partner(source: &Path, declaration_file: &str) -> Result<PartnerRecord, LoadError> {
    let path = source.join(declaration_file);
    if !path.is_file() {
        return Err(LoadError::MissingDeclaration {
            file: declaration_file.to_string(),
            dir: source.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(&path).map_err(|e| match e.kind() {
        io::ErrorKind::InvalidData => {
            warn!(declaration = %path.display(), error = %e, "Partner declaration is not UTF-8");
            LoadError::Malformed {
                file: declaration_file.to_string(),
                dir: source.to_path_buf(),
                reason: e.to_string(),
            }
        }
        _ => LoadError::Unreadable {
            path: path.clone(),
            source: e,
        },
    })?;

    let raw = parse_declaration(declaration_file, &contents).map_err(|reason| {
        warn!(declaration = %path.display(), %reason, "Failed to parse partner declaration");
        LoadError::Malformed {
            file: declaration_file.to_string(),
            dir: source.to_path_buf(),
            reason,
        }
    })?;

    let record = raw.normalise(&path)?;
    debug!(partner = %record.name, declaration = %path.display(), "Loaded partner declaration");
    Ok(record)
}
