#![allow(dead_code)]

use image::{Rgba, RgbaImage};
use std::fs;
use std::path::{Path, PathBuf};

pub fn partner_yaml(name: &str) -> String {
    format!(
        r#"name: "{name}"
short_description: "Tools for builders"
long_description: "Makes dependable tools for builders of every kind."
tags:
  - "tools"
  - "builders"
url: "https://{name}.example"
"#
    )
}

/// Writes a solid PNG of the given size.
pub fn write_png(path: &Path, width: u32, height: u32) {
    RgbaImage::from_pixel(width, height, Rgba([20, 40, 60, 255]))
        .save(path)
        .expect("write png fixture");
}

/// Writes the four themed images at sizes that pass the default limits.
pub fn write_valid_images(dir: &Path) {
    write_png(&dir.join("thumbnail_light.png"), 160, 160);
    write_png(&dir.join("thumbnail_dark.png"), 160, 160);
    write_png(&dir.join("banner_light.png"), 274, 60);
    write_png(&dir.join("banner_dark.png"), 200, 50);
}

/// Creates `root/dir` holding `declaration` as `info.yaml` plus valid images.
pub fn write_partner(root: &Path, dir: &str, declaration: &str) -> PathBuf {
    let path = root.join(dir);
    fs::create_dir_all(&path).expect("create partner dir");
    fs::write(path.join("info.yaml"), declaration).expect("write info.yaml");
    write_valid_images(&path);
    path
}

/// Creates a fully valid partner named `name` in `root/name`.
pub fn write_valid_partner(root: &Path, name: &str) -> PathBuf {
    write_partner(root, name, &partner_yaml(name))
}
