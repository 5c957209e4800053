mod common;

use partner_catalog::assets::{
    check_assets, check_dimensions, AssetSpec, DimensionPolicy, ImageCrateProbe, ImageProbe,
    MockImageProbe,
};
use partner_catalog::config::CatalogConfig;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::tempdir;

fn real_probe() -> Arc<dyn ImageProbe> {
    Arc::new(ImageCrateProbe)
}

#[tokio::test]
async fn valid_themed_assets_have_no_messages() {
    let temp = tempdir().unwrap();
    common::write_valid_images(temp.path());
    let specs = CatalogConfig::default().asset_specs();

    let messages = check_assets(temp.path(), &specs, "png", real_probe()).await;

    assert!(messages.is_empty(), "got {messages:?}");
}

#[tokio::test]
async fn each_missing_file_is_reported_and_the_rest_still_checked() {
    let temp = tempdir().unwrap();
    common::write_png(&temp.path().join("thumbnail_light.png"), 150, 160);
    let specs = CatalogConfig::default().asset_specs();

    let messages = check_assets(temp.path(), &specs, "png", real_probe()).await;

    let thumbnail = temp.path().join("thumbnail_light.png");
    assert_eq!(
        messages,
        vec![
            "Dark thumbnail image is missing".to_string(),
            "Light banner image is missing".to_string(),
            "Dark banner image is missing".to_string(),
            format!(
                "Image dimensions for {} are 150x160, but expected 160x160",
                thumbnail.display()
            ),
        ]
    );
}

#[tokio::test]
async fn unreadable_image_becomes_a_message() {
    let temp = tempdir().unwrap();
    common::write_valid_images(temp.path());
    let broken = temp.path().join("banner_dark.png");
    fs::write(&broken, b"fake-image-data").unwrap();
    let specs = CatalogConfig::default().asset_specs();

    let messages = check_assets(temp.path(), &specs, "png", real_probe()).await;

    assert_eq!(
        messages,
        vec![format!(
            "Image metadata could not be read for {}",
            broken.display()
        )]
    );
}

#[tokio::test]
async fn oversized_banner_gets_one_combined_message() {
    let temp = tempdir().unwrap();
    common::write_valid_images(temp.path());
    let banner = temp.path().join("banner_light.png");
    common::write_png(&banner, 300, 80);
    let specs = CatalogConfig::default().asset_specs();

    let messages = check_assets(temp.path(), &specs, "png", real_probe()).await;

    assert_eq!(
        messages,
        vec![format!(
            "Image dimensions for {} are 300x80, exceeding the maximum of 274x60 pixels",
            banner.display()
        )]
    );
}

#[tokio::test]
async fn file_name_without_required_extension_is_reported() {
    let temp = tempdir().unwrap();
    common::write_png(&temp.path().join("thumb.png"), 10, 10);
    fs::copy(temp.path().join("thumb.png"), temp.path().join("thumb.jpg")).unwrap();
    let specs = vec![AssetSpec::new(
        "Light thumbnail",
        "thumb.jpg",
        DimensionPolicy::MaxBound {
            width: 160,
            height: 160,
        },
    )];

    let messages = check_assets(temp.path(), &specs, "png", real_probe()).await;

    assert_eq!(
        messages,
        vec!["Light thumbnail image is not a PNG".to_string()]
    );
}

#[tokio::test]
async fn every_asset_is_probed_through_the_probe() {
    let temp = tempdir().unwrap();
    common::write_valid_images(temp.path());
    let specs = CatalogConfig::default().asset_specs();

    let mut probe = MockImageProbe::new();
    probe.expect_dimensions().times(4).returning(|_| Ok((10, 10)));

    let messages = check_assets(temp.path(), &specs, "png", Arc::new(probe)).await;

    // 10x10 is under every max bound but not the exact thumbnail size.
    assert_eq!(messages.len(), 2, "got {messages:?}");
    assert!(messages
        .iter()
        .all(|m| m.contains("thumbnail") && m.ends_with("but expected 160x160")));
}

#[test]
fn exact_and_max_bound_policies_report_differently() {
    let path = Path::new("/partners/acme/thumbnail_light.png");
    let mut probe = MockImageProbe::new();
    probe.expect_dimensions().returning(|_| Ok((280, 105)));

    let exact = check_dimensions(
        &probe,
        path,
        &DimensionPolicy::Exact {
            width: 160,
            height: 160,
        },
    )
    .expect("280x105 is not 160x160");
    let bounded = check_dimensions(
        &probe,
        path,
        &DimensionPolicy::MaxBound {
            width: 160,
            height: 160,
        },
    )
    .expect("280 is wider than 160");

    assert_eq!(
        exact,
        "Image dimensions for /partners/acme/thumbnail_light.png are 280x105, but expected 160x160"
    );
    assert_eq!(
        bounded,
        "Image dimensions for /partners/acme/thumbnail_light.png are 280x105, exceeding the maximum of 160x160 pixels"
    );
}

#[test]
fn max_bound_accepts_smaller_images() {
    let policy = DimensionPolicy::MaxBound {
        width: 274,
        height: 60,
    };

    assert_eq!(policy.check(Path::new("banner.png"), (274, 60)), None);
    assert_eq!(policy.check(Path::new("banner.png"), (1, 1)), None);
    assert!(policy.check(Path::new("banner.png"), (274, 61)).is_some());
}

#[test]
fn probe_errors_and_empty_dimensions_are_unreadable() {
    let path = Path::new("logo.png");
    let policy = DimensionPolicy::MaxBound {
        width: 160,
        height: 160,
    };

    let mut failing = MockImageProbe::new();
    failing
        .expect_dimensions()
        .returning(|_| Err("corrupt header".into()));
    let mut empty = MockImageProbe::new();
    empty.expect_dimensions().returning(|_| Ok((0, 12)));

    let expected = Some("Image metadata could not be read for logo.png".to_string());
    assert_eq!(check_dimensions(&failing, path, &policy), expected);
    assert_eq!(check_dimensions(&empty, path, &policy), expected);
}

#[tokio::test]
async fn dimensions_are_read_from_content_whatever_the_file_name() {
    let temp = tempdir().unwrap();
    let banner = temp.path().join("banner.jpg");
    common::write_png(&temp.path().join("banner.png"), 300, 80);
    fs::rename(temp.path().join("banner.png"), &banner).unwrap();
    let specs = vec![AssetSpec::new(
        "Light banner",
        "banner.jpg",
        DimensionPolicy::MaxBound {
            width: 274,
            height: 60,
        },
    )];

    let messages = check_assets(temp.path(), &specs, "png", real_probe()).await;

    assert_eq!(
        messages,
        vec![
            "Light banner image is not a PNG".to_string(),
            format!(
                "Image dimensions for {} are 300x80, exceeding the maximum of 274x60 pixels",
                banner.display()
            ),
        ]
    );
}
