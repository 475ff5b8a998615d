use std::path::Path;

use crate::grouping::domain::observation::ImageId;

/// Domain interface for materializing one identity group.
///
/// Receives the caller-assigned group name and the source image references;
/// how the group is packaged (folders, archives) is an infrastructure
/// concern.
pub trait GroupWriter: Send {
    fn write_group(
        &self,
        output_dir: &Path,
        name: &str,
        images: &[ImageId],
    ) -> Result<(), Box<dyn std::error::Error>>;
}
