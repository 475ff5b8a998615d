pub const DETECTOR_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const DETECTOR_MODEL_URL: &str =
    "https://github.com/photosort/photosort/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

pub const EMBEDDING_MODEL_NAME: &str = "w600k_r50.onnx";
pub const EMBEDDING_MODEL_URL: &str =
    "https://github.com/photosort/photosort/releases/download/v0.1.0/w600k_r50.onnx";

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

/// Distance below which two embeddings are treated as the same identity.
/// Lower = stricter matching, fewer false merges.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.4;

/// A group must span at least this many distinct images to be kept.
pub const DEFAULT_MIN_GROUP_SIZE: usize = 2;

/// Minimum detection confidence for a face to enter the pipeline.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.7;
