//! Configuration types for a catalog run.
//!
//! [`CatalogConfig`] describes where partners live and what counts as valid;
//! [`RemoteConfig`] describes the bucket the manifest and images go to. Both
//! are plain data passed explicitly into the pipeline. Loading them from a
//! YAML file or the process environment happens in [`crate::load_config`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, info};

use crate::assets::{AssetSpec, DimensionPolicy};

/// Length, count and pixel limits enforced by the validators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub short_description_limit: usize,
    pub long_description_limit: usize,
    pub name_limit: usize,
    pub tag_character_limit: usize,
    pub max_number_of_tags: usize,
    pub max_thumbnail_width: u32,
    pub max_thumbnail_height: u32,
    pub max_banner_width: u32,
    pub max_banner_height: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            short_description_limit: 60,
            long_description_limit: 175,
            name_limit: 20,
            tag_character_limit: 12,
            max_number_of_tags: 3,
            max_thumbnail_width: 160,
            max_thumbnail_height: 160,
            max_banner_width: 274,
            max_banner_height: 60,
        }
    }
}

/// Which set of image files a partner directory must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetLayout {
    /// Light and dark variants of both thumbnail and banner.
    Themed,
    /// A single logo image.
    Logo,
}

/// How thumbnails are checked. Banners are always max-bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThumbnailPolicy {
    Exact,
    MaxBound,
}

/// Fixed file names of the image assets inside a partner directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetFiles {
    pub thumbnail_light: String,
    pub thumbnail_dark: String,
    pub banner_light: String,
    pub banner_dark: String,
    pub logo: String,
}

impl Default for AssetFiles {
    fn default() -> Self {
        Self {
            thumbnail_light: "thumbnail_light.png".to_string(),
            thumbnail_dark: "thumbnail_dark.png".to_string(),
            banner_light: "banner_light.png".to_string(),
            banner_dark: "banner_dark.png".to_string(),
            logo: "logo.png".to_string(),
        }
    }
}

/// Everything the scanner, loader and validators need for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub partners_dir: PathBuf,
    pub example_dir_name: String,
    pub declaration_file: String,
    pub manifest_file_name: String,
    pub image_extension: String,
    pub layout: AssetLayout,
    pub thumbnail_policy: ThumbnailPolicy,
    pub asset_files: AssetFiles,
    /// Upper bound on partners validated, and files uploaded, at once.
    pub concurrency: usize,
    pub limits: Limits,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            partners_dir: PathBuf::from("partners"),
            example_dir_name: "example".to_string(),
            declaration_file: "info.yaml".to_string(),
            manifest_file_name: "partners.json".to_string(),
            image_extension: "png".to_string(),
            layout: AssetLayout::Themed,
            thumbnail_policy: ThumbnailPolicy::Exact,
            asset_files: AssetFiles::default(),
            concurrency: 8,
            limits: Limits::default(),
        }
    }
}

impl CatalogConfig {
    pub fn trace_loaded(&self) {
        info!(
            partners_dir = %self.partners_dir.display(),
            declaration_file = %self.declaration_file,
            layout = ?self.layout,
            "Loaded catalog config"
        );
        debug!(?self, "Catalog config loaded (full debug)");
    }

    /// The image files every partner directory must contain, with the
    /// dimension policy each one is checked against.
    pub fn asset_specs(&self) -> Vec<AssetSpec> {
        let limits = &self.limits;
        let thumbnail = match self.thumbnail_policy {
            ThumbnailPolicy::Exact => DimensionPolicy::Exact {
                width: limits.max_thumbnail_width,
                height: limits.max_thumbnail_height,
            },
            ThumbnailPolicy::MaxBound => DimensionPolicy::MaxBound {
                width: limits.max_thumbnail_width,
                height: limits.max_thumbnail_height,
            },
        };
        let banner = DimensionPolicy::MaxBound {
            width: limits.max_banner_width,
            height: limits.max_banner_height,
        };
        let files = &self.asset_files;

        match self.layout {
            AssetLayout::Themed => vec![
                AssetSpec::new("Light thumbnail", &files.thumbnail_light, thumbnail),
                AssetSpec::new("Dark thumbnail", &files.thumbnail_dark, thumbnail),
                AssetSpec::new("Light banner", &files.banner_light, banner),
                AssetSpec::new("Dark banner", &files.banner_dark, banner),
            ],
            AssetLayout::Logo => vec![AssetSpec::new(
                "Logo",
                &files.logo,
                DimensionPolicy::MaxBound {
                    width: limits.max_thumbnail_width,
                    height: limits.max_thumbnail_height,
                },
            )],
        }
    }

    /// Remote key an asset of `partner_name` is published under.
    pub fn remote_image_key(&self, partner_name: &str, spec: &AssetSpec) -> String {
        match self.layout {
            AssetLayout::Themed => format!("images/{}/{}", partner_name, spec.file_name),
            AssetLayout::Logo => format!("images/{}.{}", partner_name, self.image_extension),
        }
    }
}

/// Bucket location and credentials for publishing.
#[derive(Clone)]
pub struct RemoteConfig {
    pub region: String,
    pub bucket_name: String,
    pub object_key: String,
    pub account_id: String,
    pub endpoint: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("region", &self.region)
            .field("bucket_name", &self.bucket_name)
            .field("object_key", &self.object_key)
            .field("account_id", &self.account_id)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &"<redacted>")
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}
