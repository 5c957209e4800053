use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Lists the partner directories directly under `root`, skipping the
/// reserved example directory. Results are sorted by path.
///
/// A missing or unreadable root yields an empty list so that a checkout
/// without partner data still runs; the condition is logged.
pub fn list_partner_sources(root: &Path, example_dir_name: &str) -> Vec<PathBuf> {
    if !root.exists() {
        error!(partners_dir = %root.display(), "Partners directory does not exist");
        return Vec::new();
    }

    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            error!(error = ?e, partners_dir = %root.display(), "Error reading partner directories");
            return Vec::new();
        }
    };

    let mut sources: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                error!(error = ?e, "Skipping unreadable directory entry");
                None
            }
        })
        .filter(|path| path.is_dir())
        .filter(|path| path.file_name().map_or(true, |name| name != example_dir_name))
        .collect();
    sources.sort();

    for source in &sources {
        debug!(source = %source.display(), "Found partner directory");
    }
    info!(count = sources.len(), partners_dir = %root.display(), "Scanned partner directories");
    sources
}
