//! High-level pipeline: validate → upload manifest → upload images → clean up.
//!
//! [`publish`] is the only function that mutates the remote store. One run
//! moves through these steps:
//!   - Validates every partner directory; any invalid partner aborts the run
//!     before the first remote write.
//!   - Uploads the manifest JSON to its fixed key, replacing the old one. A
//!     failure here fails the run.
//!   - Uploads every partner's images (best effort: failures are logged and
//!     reported, the remaining uploads continue).
//!   - Deletes remote images whose partner is no longer in the manifest.
//!     This only starts once all uploads have finished.
//!
//! There are no retries at this layer. A failed run is retried by running the
//! whole pipeline again; every step is safe to repeat.

use futures::stream::{self, StreamExt};
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::aggregate::{Manifest, ValidationReport, Validator};
use crate::contract::{RemoteStore, StoreError};
use crate::partner::{load_partner, LoadError};

/// Key prefix all partner images live under.
pub const IMAGES_PREFIX: &str = "images/";

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("{} partner(s) failed validation", .0.len())]
    InvalidPartners(Vec<ValidationReport>),

    #[error("partner name {0:?} is declared by more than one directory")]
    DuplicateName(String),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("failed to serialise manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to upload manifest to {key}: {source}")]
    ManifestUpload {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to list remote images: {0}")]
    CleanupListing(#[source] StoreError),
}

/// What a successful run did.
#[derive(Debug, Default)]
pub struct PublishReport {
    pub partners: usize,
    pub manifest_sha256: String,
    pub uploaded: Vec<String>,
    pub failed_uploads: Vec<String>,
    pub deleted: Vec<String>,
    pub failed_deletions: Vec<String>,
}

/// Result of [`cleanup_unused_images`].
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CleanupOutcome {
    pub deleted: Vec<String>,
    pub failed: Vec<String>,
}

fn image_key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^images/(?:([^/]+)/.+|([^/]+)\.[^./]+)$").expect("image key pattern is valid")
    })
}

/// Extracts the partner name from `images/{name}/{file}` or
/// `images/{name}.{ext}`. Other keys yield `None`.
pub fn partner_name_from_key(key: &str) -> Option<&str> {
    let captures = image_key_pattern().captures(key)?;
    captures
        .get(1)
        .or_else(|| captures.get(2))
        .map(|m| m.as_str())
}

pub async fn publish<S>(
    store: &S,
    validator: &Validator,
    manifest_key: &str,
    manifest: &Manifest,
    sources: &[PathBuf],
) -> Result<PublishReport, PublishError>
where
    S: RemoteStore + ?Sized,
{
    let config = validator.config();
    info!(sources = sources.len(), "[PUBLISH] Validating partner info");

    // Step 1: validate everything; nothing remote happens unless all pass.
    let invalid: Vec<ValidationReport> = validator
        .validate_all(sources)
        .await
        .into_iter()
        .filter(|report| !report.is_valid())
        .collect();
    if !invalid.is_empty() {
        for report in &invalid {
            error!(
                source = %report.source.display(),
                errors = ?report.errors,
                "[PUBLISH][ERROR] Partner failed validation"
            );
        }
        return Err(PublishError::InvalidPartners(invalid));
    }

    let mut seen = HashSet::new();
    let mut named_sources = Vec::with_capacity(sources.len());
    for source in sources {
        let record = load_partner(source, &config.declaration_file)?;
        if !seen.insert(record.name.clone()) {
            error!(partner = %record.name, "[PUBLISH][ERROR] Duplicate partner name");
            return Err(PublishError::DuplicateName(record.name));
        }
        named_sources.push((source.as_path(), record.name));
    }

    // Step 2: manifest.
    let body = manifest.to_json()?;
    let manifest_sha256 = format!("{:x}", Sha256::digest(&body));
    info!(key = manifest_key, partners = manifest.len(), sha256 = %manifest_sha256, "[PUBLISH] Uploading manifest");
    if let Err(e) = store
        .put_object(manifest_key, body, "application/json")
        .await
    {
        error!(error = ?e, key = manifest_key, "[PUBLISH][ERROR] Manifest upload failed");
        return Err(PublishError::ManifestUpload {
            key: manifest_key.to_string(),
            source: e,
        });
    }

    // Step 3: images, best effort.
    let specs = config.asset_specs();
    let content_type = format!("image/{}", config.image_extension);
    let jobs: Vec<(PathBuf, String)> = named_sources
        .iter()
        .flat_map(|(source, name)| {
            specs.iter().map(move |spec| {
                (
                    source.join(&spec.file_name),
                    config.remote_image_key(name, spec),
                )
            })
        })
        .collect();
    info!(files = jobs.len(), "[PUBLISH] Uploading partner images");

    let outcomes: Vec<(String, Result<(), StoreError>)> = stream::iter(jobs)
        .map(|(path, key)| {
            let content_type = content_type.as_str();
            async move {
                let result = upload_file(store, &path, &key, content_type).await;
                (key, result)
            }
        })
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    let mut uploaded = Vec::new();
    let mut failed_uploads = Vec::new();
    for (key, result) in outcomes {
        match result {
            Ok(()) => uploaded.push(key),
            Err(e) => {
                warn!(key = %key, error = %e, "[PUBLISH][UPLOAD] Image upload failed, continuing");
                failed_uploads.push(key);
            }
        }
    }
    uploaded.sort();
    failed_uploads.sort();

    // Step 4: cleanup, strictly after every upload above has settled.
    info!("[PUBLISH] Cleaning up unused images");
    let cleanup = cleanup_unused_images(store, &manifest.names())
        .await
        .map_err(PublishError::CleanupListing)?;

    let report = PublishReport {
        partners: manifest.len(),
        manifest_sha256,
        uploaded,
        failed_uploads,
        deleted: cleanup.deleted,
        failed_deletions: cleanup.failed,
    };
    info!(
        partners = report.partners,
        uploaded = report.uploaded.len(),
        failed_uploads = report.failed_uploads.len(),
        deleted = report.deleted.len(),
        failed_deletions = report.failed_deletions.len(),
        "[PUBLISH] Publish complete"
    );
    Ok(report)
}

async fn upload_file<S>(
    store: &S,
    path: &Path,
    key: &str,
    content_type: &str,
) -> Result<(), StoreError>
where
    S: RemoteStore + ?Sized,
{
    let body = tokio::fs::read(path).await.map_err(|e| {
        error!(error = ?e, path = %path.display(), "[PUBLISH][UPLOAD] Failed to read image");
        e
    })?;
    debug!(path = %path.display(), key, bytes = body.len(), "[PUBLISH][UPLOAD] Uploading image");
    store.put_object(key, body, content_type).await
}

/// Deletes every image under [`IMAGES_PREFIX`] whose partner name is not in
/// `current_names`. Keys that do not follow the image key layout are left
/// alone. A listing failure is returned; individual deletion failures are
/// logged and collected.
pub async fn cleanup_unused_images<S>(
    store: &S,
    current_names: &HashSet<&str>,
) -> Result<CleanupOutcome, StoreError>
where
    S: RemoteStore + ?Sized,
{
    let keys = store.list_keys(IMAGES_PREFIX).await?;
    let mut outcome = CleanupOutcome::default();

    for key in keys {
        let Some(name) = partner_name_from_key(&key) else {
            debug!(key = %key, "[PUBLISH][CLEANUP] Skipping key outside image layout");
            continue;
        };
        if current_names.contains(name) {
            continue;
        }
        info!(key = %key, partner = name, "[PUBLISH][CLEANUP] Deleting unused image");
        match store.delete_object(&key).await {
            Ok(()) => outcome.deleted.push(key),
            Err(e) => {
                warn!(key = %key, error = %e, "[PUBLISH][CLEANUP] Failed to delete image");
                outcome.failed.push(key);
            }
        }
    }
    Ok(outcome)
}
