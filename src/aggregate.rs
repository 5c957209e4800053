//! Partner Aggregator: turns scanned partner directories into the published
//! [`Manifest`], and composes the loader and both validators into a
//! per-partner [`ValidationReport`].

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::assets::{check_assets, ImageProbe};
use crate::config::CatalogConfig;
use crate::fields::check_fields;
use crate::partner::{load_partner, LoadError, PartnerRecord};

/// The published artifact: every partner that loaded, in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    pub partners: Vec<PartnerRecord>,
}

impl Manifest {
    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// Partner names, which double as the namespaces of their remote images.
    pub fn names(&self) -> HashSet<&str> {
        self.partners.iter().map(|p| p.name.as_str()).collect()
    }

    /// Serialises the manifest as a JSON array.
    pub fn to_json(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    /// Writes the JSON manifest to `path`, replacing it atomically.
    pub fn write_local(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json()?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut file = NamedTempFile::new_in(dir)?;
        file.write_all(&json)?;
        file.persist(path).map_err(|e| e.error)?;
        info!(path = %path.display(), partners = self.len(), "Stored manifest locally");
        Ok(())
    }
}

/// Loads every source, dropping (and logging) any that fail to load.
/// One malformed partner never aborts the batch.
pub fn build_manifest(sources: &[PathBuf], declaration_file: &str) -> Manifest {
    let mut partners = Vec::with_capacity(sources.len());
    for source in sources {
        match load_partner(source, declaration_file) {
            Ok(record) => partners.push(record),
            Err(e) => {
                warn!(source = %source.display(), error = %e, "Dropping partner from manifest");
            }
        }
    }
    info!(
        partners = partners.len(),
        dropped = sources.len() - partners.len(),
        "Built partner manifest"
    );
    Manifest { partners }
}

/// Validation outcome for one partner directory. No errors means valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub source: PathBuf,
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the full per-partner validation: declaration, required fields,
/// image assets and field limits.
#[derive(Clone)]
pub struct Validator {
    config: Arc<CatalogConfig>,
    probe: Arc<dyn ImageProbe>,
}

impl Validator {
    pub fn new(config: Arc<CatalogConfig>, probe: Arc<dyn ImageProbe>) -> Self {
        Self { config, probe }
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Every problem found with the partner in `source`, in a stable order.
    ///
    /// A missing declaration file is the only message returned for that
    /// partner. A declaration that fails to load is reported and the assets
    /// are still checked.
    pub async fn validate_partner_info(&self, source: &Path) -> Vec<String> {
        let config = &self.config;
        let declaration = source.join(&config.declaration_file);

        let record = match load_partner(source, &config.declaration_file) {
            Ok(record) => record,
            Err(e @ LoadError::MissingDeclaration { .. }) => return vec![e.to_string()],
            Err(e) => {
                let mut messages = e.messages();
                messages.extend(self.check_assets(source).await);
                return messages;
            }
        };

        let mut messages = Vec::new();
        for (field, value) in [
            ("name", &record.name),
            ("short_description", &record.short_description),
            ("long_description", &record.long_description),
            ("url", &record.url),
        ] {
            if value.is_empty() {
                messages.push(format!("{} is missing in {}", field, declaration.display()));
            }
        }
        messages.extend(self.check_assets(source).await);
        messages.extend(check_fields(&record, &config.limits));
        messages
    }

    /// Validates all `sources` with bounded concurrency. Reports come back
    /// in the order of `sources`.
    pub async fn validate_all(&self, sources: &[PathBuf]) -> Vec<ValidationReport> {
        let limit = self.config.concurrency.max(1);
        let reports: Vec<ValidationReport> = stream::iter(sources)
            .map(|source| async move {
                ValidationReport {
                    source: source.clone(),
                    errors: self.validate_partner_info(source).await,
                }
            })
            .buffered(limit)
            .collect()
            .await;

        for report in reports.iter().filter(|r| !r.is_valid()) {
            warn!(
                source = %report.source.display(),
                errors = report.errors.len(),
                "Partner failed validation"
            );
        }
        reports
    }

    async fn check_assets(&self, source: &Path) -> Vec<String> {
        check_assets(
            source,
            &self.config.asset_specs(),
            &self.config.image_extension,
            Arc::clone(&self.probe),
        )
        .await
    }
}
