use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;

/// Collects supported image files under `root`, recursing into
/// subdirectories. A single image file is accepted as-is.
///
/// Results are sorted by path so the batch order (and therefore tie-breaks
/// downstream) is reproducible across runs and platforms.
pub fn scan_images(root: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    let mut images = Vec::new();
    if root.is_file() {
        if is_image(root) {
            images.push(root.to_path_buf());
        }
    } else {
        walk(root, &mut images)?;
    }
    images.sort();
    Ok(images)
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn walk(dir: &Path, images: &mut Vec<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, images)?;
        } else if is_image(&path) {
            images.push(path);
        }
    }
    Ok(())
}
