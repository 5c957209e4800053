//! Asset Validator: checks that a partner directory contains every required
//! image, that each carries the expected extension, and that its pixel
//! dimensions satisfy the asset's [`DimensionPolicy`].
//!
//! Failures are returned as messages. Every asset is checked and every
//! defect reported; an unreadable image becomes a message, never an error.

use futures::future::join_all;
use image::ImageReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

pub type ProbeError = Box<dyn std::error::Error + Send + Sync>;

/// Reads pixel dimensions from an image file.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
pub trait ImageProbe: Send + Sync {
    /// Returns `(width, height)` of the image at `path`.
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), ProbeError>;
}

/// [`ImageProbe`] backed by the `image` crate. Only the header is decoded,
/// and the format is detected from the file's content, not its name.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateProbe;

impl ImageProbe for ImageCrateProbe {
    fn dimensions(&self, path: &Path) -> Result<(u32, u32), ProbeError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        Ok(reader.into_dimensions()?)
    }
}

/// How an image's width and height are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionPolicy {
    /// Width and height must equal the target.
    Exact { width: u32, height: u32 },
    /// Width and height must each be at most the bound.
    MaxBound { width: u32, height: u32 },
}

impl DimensionPolicy {
    /// Returns a message when `actual` violates the policy.
    pub fn check(&self, path: &Path, actual: (u32, u32)) -> Option<String> {
        let (actual_width, actual_height) = actual;
        match *self {
            DimensionPolicy::Exact { width, height } => {
                if actual_width != width || actual_height != height {
                    Some(format!(
                        "Image dimensions for {} are {}x{}, but expected {}x{}",
                        path.display(),
                        actual_width,
                        actual_height,
                        width,
                        height
                    ))
                } else {
                    None
                }
            }
            DimensionPolicy::MaxBound { width, height } => {
                if actual_width > width || actual_height > height {
                    Some(format!(
                        "Image dimensions for {} are {}x{}, exceeding the maximum of {}x{} pixels",
                        path.display(),
                        actual_width,
                        actual_height,
                        width,
                        height
                    ))
                } else {
                    None
                }
            }
        }
    }
}

/// One required image: a label for messages, its fixed file name inside the
/// partner directory, and the dimension policy it must meet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetSpec {
    pub label: String,
    pub file_name: String,
    pub policy: DimensionPolicy,
}

impl AssetSpec {
    pub fn new(label: &str, file_name: &str, policy: DimensionPolicy) -> Self {
        Self {
            label: label.to_string(),
            file_name: file_name.to_string(),
            policy,
        }
    }
}

/// Reads the image at `path` and checks it against `policy`.
pub fn check_dimensions(
    probe: &dyn ImageProbe,
    path: &Path,
    policy: &DimensionPolicy,
) -> Option<String> {
    match probe.dimensions(path) {
        Ok((width, height)) if width == 0 || height == 0 => {
            debug!(path = %path.display(), width, height, "Image reported an empty dimension");
            Some(format!("Image metadata could not be read for {}", path.display()))
        }
        Ok(actual) => policy.check(path, actual),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Failed to read image metadata");
            Some(format!("Image metadata could not be read for {}", path.display()))
        }
    }
}

/// Checks every asset in `specs` under `source`.
///
/// Messages come in three groups: missing files, wrong extensions, then
/// dimension problems, each in `specs` order. Missing files are not probed.
/// Dimension reads run on the blocking pool, concurrently.
pub async fn check_assets(
    source: &Path,
    specs: &[AssetSpec],
    extension: &str,
    probe: Arc<dyn ImageProbe>,
) -> Vec<String> {
    let mut messages = Vec::new();
    let mut present: Vec<(PathBuf, DimensionPolicy)> = Vec::new();

    for spec in specs {
        let path = source.join(&spec.file_name);
        if path.is_file() {
            present.push((path, spec.policy));
        } else {
            messages.push(format!("{} image is missing", spec.label));
        }
    }

    let suffix = format!(".{extension}");
    for spec in specs {
        if !spec.file_name.ends_with(&suffix) {
            messages.push(format!(
                "{} image is not a {}",
                spec.label,
                extension.to_uppercase()
            ));
        }
    }

    let reads = present.into_iter().map(|(path, policy)| {
        let probe = Arc::clone(&probe);
        async move {
            let shown = path.clone();
            tokio::task::spawn_blocking(move || check_dimensions(probe.as_ref(), &path, &policy))
                .await
                .unwrap_or_else(|e| {
                    debug!(path = %shown.display(), error = %e, "Image metadata task failed");
                    Some(format!("Image metadata could not be read for {}", shown.display()))
                })
        }
    });
    messages.extend(join_all(reads).await.into_iter().flatten());

    messages
}
