use crate::shared::frame::Frame;

/// One detected face: its identity embedding and detection confidence.
///
/// Returned in detection order; position in the list becomes the face index
/// used by the grouping layer.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedFace {
    pub embedding: Vec<f32>,
    pub confidence: f64,
}

/// Domain interface turning a decoded photo into face embeddings.
///
/// Implementations may be stateful (inference sessions), hence `&mut self`.
/// Faces below the implementation's confidence threshold are filtered here,
/// upstream of grouping.
pub trait FaceEmbedder: Send {
    fn embed(&mut self, frame: &Frame) -> Result<Vec<DetectedFace>, Box<dyn std::error::Error>>;
}
