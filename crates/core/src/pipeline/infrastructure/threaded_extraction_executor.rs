use std::path::PathBuf;
use std::sync::atomic::Ordering;

use crate::detection::domain::face_embedder::DetectedFace;
use crate::grouping::domain::observation::ImageFaces;
use crate::pipeline::extraction_executor::{ExtractionConfig, ExtractionExecutor};
use crate::pipeline::face_extractor::FaceExtractor;

type WorkerResult = (usize, PathBuf, Result<Vec<DetectedFace>, String>);

/// Runs extraction across a pool of worker threads, one per extractor.
///
/// Work items are claimed from a shared channel, so a slow photo never
/// stalls the rest of the batch. Results are reassembled in input order,
/// keeping the downstream grouping input deterministic regardless of which
/// worker finished first.
pub struct ThreadedExtractionExecutor;

impl ThreadedExtractionExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ThreadedExtractionExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionExecutor for ThreadedExtractionExecutor {
    fn execute(
        &self,
        extractors: Vec<Box<dyn FaceExtractor>>,
        paths: &[PathBuf],
        config: ExtractionConfig,
    ) -> Result<Vec<ImageFaces>, Box<dyn std::error::Error>> {
        if extractors.is_empty() {
            return Err("at least one extractor is required".into());
        }

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, PathBuf)>();
        for (index, path) in paths.iter().enumerate() {
            job_tx
                .send((index, path.clone()))
                .map_err(|e| e.to_string())?;
        }
        drop(job_tx);

        let (result_tx, result_rx) = crossbeam_channel::unbounded::<WorkerResult>();

        let mut handles = Vec::with_capacity(extractors.len());
        for mut extractor in extractors {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let cancelled = config.cancelled.clone();
            handles.push(std::thread::spawn(move || {
                while let Ok((index, path)) = job_rx.recv() {
                    if cancelled.load(Ordering::Relaxed) {
                        break;
                    }
                    let result = extractor.extract(&path).map_err(|e| e.to_string());
                    if result_tx.send((index, path, result)).is_err() {
                        break;
                    }
                }
            }));
        }
        drop(result_tx);

        let total = paths.len();
        let mut slots: Vec<Option<ImageFaces>> = (0..total).map(|_| None).collect();
        let mut done = 0;
        let mut was_cancelled = false;

        // Drain everything even after cancellation so workers shut down
        // cleanly before we return.
        while let Ok((index, path, result)) = result_rx.recv() {
            done += 1;
            match result {
                Ok(faces) => {
                    let mut image = ImageFaces::new(path);
                    for face in faces {
                        image.push_face(face.embedding, face.confidence);
                    }
                    slots[index] = Some(image);
                }
                Err(e) => log::warn!("skipping {}: {e}", path.display()),
            }

            if let Some(ref callback) = config.on_progress {
                if !callback(done, total) {
                    config.cancelled.store(true, Ordering::Relaxed);
                    was_cancelled = true;
                }
            }
        }

        for handle in handles {
            let _ = handle.join();
        }

        if was_cancelled {
            return Err("Cancelled".into());
        }
        Ok(slots.into_iter().flatten().collect())
    }
}
