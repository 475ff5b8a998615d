use std::collections::HashSet;

use thiserror::Error;

use crate::grouping::domain::distance;
use crate::grouping::domain::observation::{Group, ImageFaces};
use crate::grouping::domain::ordering::{self, OrderingPolicy};

pub const DEFAULT_THRESHOLD: f64 = 0.4;
pub const DEFAULT_MIN_GROUP_SIZE: usize = 2;

#[derive(Error, Debug)]
pub enum GroupingError {
    #[error("similarity threshold must be non-negative and finite, got {0}")]
    InvalidThreshold(f64),
}

/// Greedy seed-based face clustering over an immutable batch of images.
///
/// Single pass, deterministic, and deliberately non-transitive: every
/// comparison in a group's scan is against the seed embedding, never a
/// centroid or an intermediate match. This trades clustering quality on
/// ambiguous chains for speed and reproducibility. Worst case is O(F²)
/// distance computations over the total face count F.
pub struct GroupingEngine {
    threshold: f64,
    min_group_size: usize,
    ordering: OrderingPolicy,
}

impl GroupingEngine {
    /// Creates an engine with the given distance threshold (lower = stricter
    /// matching). Negative or non-finite thresholds are rejected before any
    /// scanning begins.
    pub fn new(threshold: f64) -> Result<Self, GroupingError> {
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(GroupingError::InvalidThreshold(threshold));
        }
        Ok(Self {
            threshold,
            min_group_size: DEFAULT_MIN_GROUP_SIZE,
            ordering: ordering::more_faces_first,
        })
    }

    /// Minimum number of distinct images a group must span to be kept.
    pub fn with_min_group_size(mut self, min_group_size: usize) -> Self {
        self.min_group_size = min_group_size;
        self
    }

    /// Overrides the image visit order. The default processes face-rich
    /// images first; replacing the policy changes which observations seed
    /// groups and therefore the output.
    pub fn with_ordering(mut self, ordering: OrderingPolicy) -> Self {
        self.ordering = ordering;
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Partitions face observations into identity groups.
    ///
    /// Every observation is claimed by at most one group. Each unclaimed
    /// observation seeds a candidate group, then all other images are
    /// scanned in sorted order for unclaimed faces within `threshold` of the
    /// seed. Candidates spanning fewer than `min_group_size` distinct images
    /// are discarded, but their seed stays consumed — an unmatched face is
    /// dropped, not retried.
    ///
    /// Pairs with mismatched embedding dimensions are treated as
    /// non-matching; their count is logged at the end of the run.
    pub fn group(&self, images: &[ImageFaces]) -> Vec<Group> {
        let mut order: Vec<&ImageFaces> = images.iter().collect();
        // Stable sort: ties keep the caller's input order.
        order.sort_by(|a, b| (self.ordering)(a, b));

        // Keyed by (position in sorted order, face index); owned by this
        // invocation only.
        let mut used: HashSet<(usize, usize)> = HashSet::new();
        let mut groups: Vec<Group> = Vec::new();
        let mut dimension_mismatches: usize = 0;

        for (image_pos, image) in order.iter().enumerate() {
            for (face_pos, seed) in image.faces.iter().enumerate() {
                if !used.insert((image_pos, face_pos)) {
                    continue;
                }

                let mut candidate = Group::seeded(seed.clone());

                for (other_pos, other) in order.iter().enumerate() {
                    if other_pos == image_pos {
                        continue;
                    }
                    for (other_face_pos, observation) in other.faces.iter().enumerate() {
                        if used.contains(&(other_pos, other_face_pos)) {
                            continue;
                        }
                        match distance::euclidean(&seed.embedding, &observation.embedding) {
                            Ok(d) if d < self.threshold => {
                                candidate.add(observation.clone());
                                used.insert((other_pos, other_face_pos));
                            }
                            Ok(_) => {}
                            Err(_) => dimension_mismatches += 1,
                        }
                    }
                }

                if candidate.image_count() >= self.min_group_size {
                    groups.push(candidate);
                }
            }
        }

        if dimension_mismatches > 0 {
            log::warn!(
                "skipped {dimension_mismatches} embedding comparisons with mismatched dimensions"
            );
        }

        groups
    }
}

impl Default for GroupingEngine {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_group_size: DEFAULT_MIN_GROUP_SIZE,
            ordering: ordering::more_faces_first,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    // --- Helpers ---

    fn image(id: &str, embeddings: &[&[f32]]) -> ImageFaces {
        let mut image = ImageFaces::new(PathBuf::from(id));
        for e in embeddings {
            image.push_face(e.to_vec(), 0.9);
        }
        image
    }

    fn ids(group: &Group) -> Vec<&str> {
        group
            .images
            .iter()
            .map(|p| p.to_str().unwrap())
            .collect()
    }

    // --- Scenarios from the contract ---

    #[test]
    fn test_close_pair_groups_distant_image_left_out() {
        // A and B within 0.1 of each other, C far from both.
        let images = vec![
            image("a.jpg", &[&[0.0, 0.0]]),
            image("b.jpg", &[&[0.1, 0.0]]),
            image("c.jpg", &[&[2.0, 0.0]]),
        ];
        let groups = GroupingEngine::new(0.4).unwrap().group(&images);

        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_single_image_with_two_faces_yields_no_group() {
        // Same-image faces never match each other, and one image cannot
        // satisfy the minimum group size.
        let images = vec![image("a.jpg", &[&[0.0, 0.0], &[0.0, 0.0]])];
        let groups = GroupingEngine::new(0.4).unwrap().group(&images);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_image_with_two_identities_appears_in_both_groups() {
        // A carries one face matching B and one matching C; B and C are
        // dissimilar. A legitimately lands in both output groups.
        let images = vec![
            image("a.jpg", &[&[0.0, 0.0], &[10.0, 0.0]]),
            image("b.jpg", &[&[0.1, 0.0]]),
            image("c.jpg", &[&[10.1, 0.0]]),
        ];
        let groups = GroupingEngine::new(0.4).unwrap().group(&images);

        assert_eq!(groups.len(), 2);
        assert_eq!(ids(&groups[0]), vec!["a.jpg", "b.jpg"]);
        assert_eq!(ids(&groups[1]), vec!["a.jpg", "c.jpg"]);
    }

    #[test]
    fn test_empty_input_yields_empty_output() {
        let groups = GroupingEngine::new(0.4).unwrap().group(&[]);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_dimension_mismatch_treated_as_non_matching() {
        // C's embedding has the wrong length; the run completes and C is
        // simply never matched.
        let images = vec![
            image("a.jpg", &[&[0.0, 0.0]]),
            image("b.jpg", &[&[0.1, 0.0]]),
            image("c.jpg", &[&[0.0]]),
        ];
        let groups = GroupingEngine::new(0.4).unwrap().group(&images);

        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["a.jpg", "b.jpg"]);
    }

    // --- Invariants ---

    #[test]
    fn test_every_observation_assigned_at_most_once() {
        // A chain: a-b close, b-c close, a-c far. Greedy matching claims b
        // for a's group; c must not join through b.
        let images = vec![
            image("a.jpg", &[&[0.0]]),
            image("b.jpg", &[&[0.3]]),
            image("c.jpg", &[&[0.6]]),
        ];
        let groups = GroupingEngine::new(0.4).unwrap().group(&images);

        let mut seen: HashSet<(PathBuf, usize)> = HashSet::new();
        for group in &groups {
            for obs in &group.observations {
                assert!(
                    seen.insert((obs.image_id.clone(), obs.face_index)),
                    "observation assigned to more than one group"
                );
            }
        }
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_consumed_singleton_cannot_join_later_group() {
        // a seeds first (two faces) and claims nothing; its faces stay
        // consumed and never re-enter the scan.
        let images = vec![
            image("a.jpg", &[&[5.0], &[9.0]]),
            image("b.jpg", &[&[0.0]]),
            image("c.jpg", &[&[0.1]]),
        ];
        let groups = GroupingEngine::new(0.4).unwrap().group(&images);

        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["b.jpg", "c.jpg"]);
    }

    #[test]
    fn test_no_singleton_groups_in_output() {
        let images = vec![
            image("a.jpg", &[&[0.0]]),
            image("b.jpg", &[&[3.0]]),
            image("c.jpg", &[&[6.0]]),
        ];
        let groups = GroupingEngine::new(0.4).unwrap().group(&images);
        assert!(groups.is_empty());

        for group in &groups {
            assert!(group.image_count() >= 2);
        }
    }

    #[test]
    fn test_deterministic_across_runs() {
        let images = vec![
            image("a.jpg", &[&[0.0, 0.0], &[4.0, 0.0]]),
            image("b.jpg", &[&[0.2, 0.0]]),
            image("c.jpg", &[&[4.1, 0.0]]),
            image("d.jpg", &[&[0.3, 0.0]]),
        ];
        let engine = GroupingEngine::new(0.4).unwrap();
        assert_eq!(engine.group(&images), engine.group(&images));
    }

    #[test]
    fn test_stricter_threshold_never_grows_groups() {
        let images = vec![
            image("a.jpg", &[&[0.0]]),
            image("b.jpg", &[&[0.15]]),
            image("c.jpg", &[&[0.3]]),
            image("d.jpg", &[&[0.9]]),
        ];

        let loose = GroupingEngine::new(0.4).unwrap().group(&images);
        let strict = GroupingEngine::new(0.2).unwrap().group(&images);

        let max_size = |groups: &[Group]| {
            groups.iter().map(Group::image_count).max().unwrap_or(0)
        };
        assert!(max_size(&strict) <= max_size(&loose));
        assert_eq!(max_size(&loose), 3);
        assert_eq!(max_size(&strict), 2);
    }

    #[test]
    fn test_images_without_faces_contribute_nothing() {
        let images = vec![
            image("empty1.jpg", &[]),
            image("a.jpg", &[&[0.0]]),
            image("b.jpg", &[&[0.1]]),
            image("empty2.jpg", &[]),
        ];
        let groups = GroupingEngine::new(0.4).unwrap().group(&images);

        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_match_requires_strictly_below_threshold() {
        // Distance exactly equal to the threshold does not match.
        let images = vec![
            image("a.jpg", &[&[0.0]]),
            image("b.jpg", &[&[0.4]]),
        ];
        let groups = GroupingEngine::new(0.4).unwrap().group(&images);
        assert!(groups.is_empty());
    }

    // --- Configuration ---

    #[test]
    fn test_negative_threshold_rejected() {
        assert!(matches!(
            GroupingEngine::new(-0.1),
            Err(GroupingError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_non_finite_threshold_rejected() {
        assert!(GroupingEngine::new(f64::NAN).is_err());
        assert!(GroupingEngine::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_zero_threshold_is_valid_and_matches_nothing() {
        let images = vec![
            image("a.jpg", &[&[0.0]]),
            image("b.jpg", &[&[0.0]]),
        ];
        // Zero distance is not strictly below a zero threshold.
        let groups = GroupingEngine::new(0.0).unwrap().group(&images);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_min_group_size_three_drops_pairs() {
        let images = vec![
            image("a.jpg", &[&[0.0]]),
            image("b.jpg", &[&[0.1]]),
        ];
        let groups = GroupingEngine::new(0.4)
            .unwrap()
            .with_min_group_size(3)
            .group(&images);
        assert!(groups.is_empty());
    }

    #[test]
    fn test_default_engine_uses_recognized_defaults() {
        let engine = GroupingEngine::default();
        assert!((engine.threshold() - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_face_rich_images_seed_first() {
        // x has one face sitting between y's face and z's face. Default
        // ordering lets y (two faces) seed and absorb both neighbors.
        let x = image("x.jpg", &[&[0.0]]);
        let y = image("y.jpg", &[&[0.35], &[50.0]]);
        let z = image("z.jpg", &[&[0.7]]);
        let images = vec![x, y, z];

        let groups = GroupingEngine::new(0.4).unwrap().group(&images);
        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["y.jpg", "x.jpg", "z.jpg"]);
    }

    #[test]
    fn test_ordering_policy_changes_output() {
        // Same input as above, but seeding in input order makes x the seed:
        // it reaches y but not z, producing a different (smaller) group.
        let images = vec![
            image("x.jpg", &[&[0.0]]),
            image("y.jpg", &[&[0.35], &[50.0]]),
            image("z.jpg", &[&[0.7]]),
        ];
        let groups = GroupingEngine::new(0.4)
            .unwrap()
            .with_ordering(ordering::input_order)
            .group(&images);

        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["x.jpg", "y.jpg"]);
    }

    #[test]
    fn test_matches_anchor_to_seed_not_to_intermediate_matches() {
        // b is within threshold of seed a; c is within threshold of b but
        // not of a. Non-transitive matching must leave c out.
        let images = vec![
            image("a.jpg", &[&[0.0]]),
            image("b.jpg", &[&[0.35]]),
            image("c.jpg", &[&[0.55]]),
            image("d.jpg", &[&[0.30]]),
        ];
        let groups = GroupingEngine::new(0.4).unwrap().group(&images);

        assert_eq!(groups.len(), 1);
        assert_eq!(ids(&groups[0]), vec!["a.jpg", "b.jpg", "d.jpg"]);
    }
}
