use std::path::{Path, PathBuf};

use crate::grouping::domain::grouping_engine::GroupingEngine;
use crate::grouping::domain::observation::ImageId;
use crate::output::domain::group_writer::GroupWriter;
use crate::pipeline::extraction_executor::{ExtractionConfig, ExtractionExecutor};
use crate::pipeline::face_extractor::FaceExtractor;

/// An identity group with its caller-assigned folder name.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedGroup {
    pub name: String,
    pub images: Vec<ImageId>,
}

/// Summary of one organization run, for CLI reporting.
#[derive(Clone, Debug, PartialEq)]
pub struct OrganizeReport {
    pub images_scanned: usize,
    pub images_processed: usize,
    pub images_with_faces: usize,
    pub faces_detected: usize,
    pub groups: Vec<NamedGroup>,
}

/// Batch pipeline: extract faces → group by identity → write group folders.
///
/// The engine never names groups; numbering (`Person_N`) happens here, in
/// output order.
pub struct OrganizePhotosUseCase {
    executor: Box<dyn ExtractionExecutor>,
    engine: GroupingEngine,
    writer: Box<dyn GroupWriter>,
}

impl OrganizePhotosUseCase {
    pub fn new(
        executor: Box<dyn ExtractionExecutor>,
        engine: GroupingEngine,
        writer: Box<dyn GroupWriter>,
    ) -> Self {
        Self {
            executor,
            engine,
            writer,
        }
    }

    pub fn execute(
        &mut self,
        extractors: Vec<Box<dyn FaceExtractor>>,
        paths: &[PathBuf],
        output_dir: &Path,
        config: ExtractionConfig,
    ) -> Result<OrganizeReport, Box<dyn std::error::Error>> {
        let images = self.executor.execute(extractors, paths, config)?;

        let images_processed = images.len();
        let images_with_faces = images.iter().filter(|i| !i.faces.is_empty()).count();
        let faces_detected = images.iter().map(|i| i.face_count()).sum();

        let groups = self.engine.group(&images);
        log::info!(
            "grouped {faces_detected} faces from {images_with_faces} images into {} identities",
            groups.len()
        );

        let mut named = Vec::with_capacity(groups.len());
        for (index, group) in groups.into_iter().enumerate() {
            let name = format!("Person_{}", index + 1);
            self.writer.write_group(output_dir, &name, &group.images)?;
            named.push(NamedGroup {
                name,
                images: group.images,
            });
        }

        Ok(OrganizeReport {
            images_scanned: paths.len(),
            images_processed,
            images_with_faces,
            faces_detected,
            groups: named,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::domain::observation::ImageFaces;
    use std::sync::{Arc, Mutex};

    // --- Stubs ---

    struct StubExecutor {
        images: Vec<ImageFaces>,
    }

    impl ExtractionExecutor for StubExecutor {
        fn execute(
            &self,
            _extractors: Vec<Box<dyn FaceExtractor>>,
            _paths: &[PathBuf],
            _config: ExtractionConfig,
        ) -> Result<Vec<ImageFaces>, Box<dyn std::error::Error>> {
            Ok(self.images.clone())
        }
    }

    struct StubWriter {
        written: Arc<Mutex<Vec<(String, Vec<ImageId>)>>>,
    }

    impl StubWriter {
        fn new() -> Self {
            Self {
                written: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl GroupWriter for StubWriter {
        fn write_group(
            &self,
            _output_dir: &Path,
            name: &str,
            images: &[ImageId],
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.written
                .lock()
                .unwrap()
                .push((name.to_string(), images.to_vec()));
            Ok(())
        }
    }

    // --- Helpers ---

    fn image(id: &str, embeddings: &[&[f32]]) -> ImageFaces {
        let mut image = ImageFaces::new(PathBuf::from(id));
        for e in embeddings {
            image.push_face(e.to_vec(), 0.9);
        }
        image
    }

    fn use_case(images: Vec<ImageFaces>, writer: StubWriter) -> OrganizePhotosUseCase {
        OrganizePhotosUseCase::new(
            Box::new(StubExecutor { images }),
            GroupingEngine::new(0.4).unwrap(),
            Box::new(writer),
        )
    }

    #[test]
    fn test_groups_named_in_output_order() {
        let writer = StubWriter::new();
        let written = writer.written.clone();
        let mut uc = use_case(
            vec![
                image("a.jpg", &[&[0.0], &[10.0]]),
                image("b.jpg", &[&[0.1]]),
                image("c.jpg", &[&[10.1]]),
            ],
            writer,
        );

        let report = uc
            .execute(
                vec![],
                &[PathBuf::from("a.jpg"), PathBuf::from("b.jpg"), PathBuf::from("c.jpg")],
                Path::new("/out"),
                ExtractionConfig::default(),
            )
            .unwrap();

        assert_eq!(report.groups.len(), 2);
        assert_eq!(report.groups[0].name, "Person_1");
        assert_eq!(report.groups[1].name, "Person_2");

        let written = written.lock().unwrap();
        assert_eq!(written[0].0, "Person_1");
        assert_eq!(
            written[0].1,
            vec![PathBuf::from("a.jpg"), PathBuf::from("b.jpg")]
        );
        assert_eq!(written[1].0, "Person_2");
        assert_eq!(
            written[1].1,
            vec![PathBuf::from("a.jpg"), PathBuf::from("c.jpg")]
        );
    }

    #[test]
    fn test_report_counts() {
        let writer = StubWriter::new();
        let mut uc = use_case(
            vec![
                image("a.jpg", &[&[0.0], &[10.0]]),
                image("b.jpg", &[&[0.1]]),
                image("empty.jpg", &[]),
            ],
            writer,
        );

        let report = uc
            .execute(
                vec![],
                &[
                    PathBuf::from("a.jpg"),
                    PathBuf::from("b.jpg"),
                    PathBuf::from("empty.jpg"),
                    PathBuf::from("broken.jpg"),
                ],
                Path::new("/out"),
                ExtractionConfig::default(),
            )
            .unwrap();

        assert_eq!(report.images_scanned, 4);
        assert_eq!(report.images_processed, 3);
        assert_eq!(report.images_with_faces, 2);
        assert_eq!(report.faces_detected, 3);
    }

    #[test]
    fn test_no_matches_writes_nothing() {
        let writer = StubWriter::new();
        let written = writer.written.clone();
        let mut uc = use_case(
            vec![image("a.jpg", &[&[0.0]]), image("b.jpg", &[&[9.0]])],
            writer,
        );

        let report = uc
            .execute(
                vec![],
                &[PathBuf::from("a.jpg"), PathBuf::from("b.jpg")],
                Path::new("/out"),
                ExtractionConfig::default(),
            )
            .unwrap();

        assert!(report.groups.is_empty());
        assert!(written.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_batch() {
        let writer = StubWriter::new();
        let mut uc = use_case(vec![], writer);
        let report = uc
            .execute(vec![], &[], Path::new("/out"), ExtractionConfig::default())
            .unwrap();

        assert_eq!(report.images_scanned, 0);
        assert_eq!(report.faces_detected, 0);
        assert!(report.groups.is_empty());
    }
}
