use std::path::Path;

use crate::detection::domain::face_embedder::{DetectedFace, FaceEmbedder};
use crate::imaging::domain::image_reader::ImageReader;

/// Turns one image file into its detected faces: decode, detect, embed.
pub trait FaceExtractor: Send {
    fn extract(&mut self, path: &Path) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>>;
}

/// Standard extractor: an [`ImageReader`] feeding a [`FaceEmbedder`].
pub struct ImageFaceExtractor {
    reader: Box<dyn ImageReader>,
    embedder: Box<dyn FaceEmbedder>,
}

impl ImageFaceExtractor {
    pub fn new(reader: Box<dyn ImageReader>, embedder: Box<dyn FaceEmbedder>) -> Self {
        Self { reader, embedder }
    }
}

impl FaceExtractor for ImageFaceExtractor {
    fn extract(&mut self, path: &Path) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>> {
        let frame = self.reader.read(path)?;
        self.embedder.embed(&frame)
    }
}
