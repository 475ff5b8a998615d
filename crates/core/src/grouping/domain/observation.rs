use std::path::PathBuf;

/// Opaque reference to a source image. The grouping layer only carries it
/// forward; it never opens or copies file content.
pub type ImageId = PathBuf;

/// One detected face instance within one image.
///
/// `(image_id, face_index)` is the unique key of an observation. The
/// embedding is compared only through a distance function and is never
/// interpreted semantically.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceObservation {
    pub image_id: ImageId,
    /// Position within the image's detection list (0-based).
    pub face_index: usize,
    pub embedding: Vec<f32>,
    /// Detection confidence in [0, 1]. Minimum-confidence filtering happens
    /// upstream; observations that reach the engine are trusted.
    pub confidence: f64,
}

/// All face observations detected in a single image, in detection order.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageFaces {
    pub image_id: ImageId,
    pub faces: Vec<FaceObservation>,
}

impl ImageFaces {
    pub fn new(image_id: ImageId) -> Self {
        Self {
            image_id,
            faces: Vec::new(),
        }
    }

    /// Appends a face; `face_index` is assigned from the current position
    /// so it always matches detection order.
    pub fn push_face(&mut self, embedding: Vec<f32>, confidence: f64) {
        let face_index = self.faces.len();
        self.faces.push(FaceObservation {
            image_id: self.image_id.clone(),
            face_index,
            embedding,
            confidence,
        });
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }
}

/// A cluster of observations judged to depict the same identity.
///
/// `images` is insertion-ordered and duplicate-free: an image with several
/// faces assigned to the same group appears once. `observations` keeps every
/// member assignment for diagnostics.
#[derive(Clone, Debug, PartialEq)]
pub struct Group {
    pub images: Vec<ImageId>,
    pub observations: Vec<FaceObservation>,
}

impl Group {
    /// Starts a candidate group from a seed observation.
    pub fn seeded(seed: FaceObservation) -> Self {
        Self {
            images: vec![seed.image_id.clone()],
            observations: vec![seed],
        }
    }

    /// Adds a matched observation, keeping `images` unique.
    pub fn add(&mut self, observation: FaceObservation) {
        if !self.images.contains(&observation.image_id) {
            self.images.push(observation.image_id.clone());
        }
        self.observations.push(observation);
    }

    /// Number of distinct images in the group.
    pub fn image_count(&self) -> usize {
        self.images.len()
    }
}
