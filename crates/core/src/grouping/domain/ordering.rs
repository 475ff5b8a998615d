use std::cmp::Ordering;

use crate::grouping::domain::observation::ImageFaces;

/// Comparator deciding which images are visited first by the engine.
///
/// The scan order is load-bearing: it fixes which observations become seeds
/// and therefore the exact group membership. Policies must be used with a
/// stable sort so ties keep the caller's input order.
pub type OrderingPolicy = fn(&ImageFaces, &ImageFaces) -> Ordering;

/// Default policy: images with more detected faces first.
///
/// Face-rich images seeding first empirically reduces fragmentation; it is
/// a heuristic, not an optimality guarantee.
pub fn more_faces_first(a: &ImageFaces, b: &ImageFaces) -> Ordering {
    b.face_count().cmp(&a.face_count())
}

/// Keeps the caller's input order unchanged.
pub fn input_order(_a: &ImageFaces, _b: &ImageFaces) -> Ordering {
    Ordering::Equal
}
