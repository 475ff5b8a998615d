use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::grouping::domain::observation::ImageId;
use crate::output::domain::group_writer::GroupWriter;

/// Copies each group's source images into `<output>/<group name>/`.
///
/// Original file names are kept. Basename collisions (same file name from
/// different source folders) get a numeric suffix so no copy is silently
/// overwritten.
pub struct FolderGroupWriter;

impl FolderGroupWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FolderGroupWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupWriter for FolderGroupWriter {
    fn write_group(
        &self,
        output_dir: &Path,
        name: &str,
        images: &[ImageId],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let group_dir = output_dir.join(name);
        fs::create_dir_all(&group_dir)?;

        let mut taken: HashSet<String> = HashSet::new();
        for source in images {
            let file_name = source
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| format!("image path has no file name: {}", source.display()))?;

            let target_name = disambiguate(file_name, &taken);
            taken.insert(target_name.clone());
            fs::copy(source, group_dir.join(&target_name))?;
        }
        Ok(())
    }
}

fn disambiguate(file_name: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(file_name) {
        return file_name.to_string();
    }

    let (stem, ext) = match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (file_name, None),
    };
    let mut n = 1;
    loop {
        let candidate = match ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        if !taken.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
