use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::grouping::domain::observation::ImageFaces;
use crate::pipeline::face_extractor::FaceExtractor;

/// Runtime knobs for a batch extraction run.
pub struct ExtractionConfig {
    /// Progress callback `(images_done, images_total) -> keep_going`.
    /// Returning `false` cancels the run.
    pub on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    /// Cooperative cancellation flag shared with the workers.
    pub cancelled: Arc<AtomicBool>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Strategy interface for running face extraction over a photo batch.
///
/// Implementations must return one [`ImageFaces`] per successfully processed
/// image, in the same order as `paths`. Images that fail to decode or embed
/// are logged and omitted — downstream never distinguishes "failed" from
/// "absent".
pub trait ExtractionExecutor {
    fn execute(
        &self,
        extractors: Vec<Box<dyn FaceExtractor>>,
        paths: &[PathBuf],
        config: ExtractionConfig,
    ) -> Result<Vec<ImageFaces>, Box<dyn std::error::Error>>;
}
