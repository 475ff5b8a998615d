use std::path::PathBuf;
use std::process;

use clap::Parser;
use serde::Serialize;

use photosort_core::detection::infrastructure::onnx_face_embedder::OnnxFaceEmbedder;
use photosort_core::grouping::domain::grouping_engine::GroupingEngine;
use photosort_core::imaging::infrastructure::image_file_reader::ImageFileReader;
use photosort_core::output::infrastructure::folder_group_writer::FolderGroupWriter;
use photosort_core::pipeline::extraction_executor::ExtractionConfig;
use photosort_core::pipeline::face_extractor::{FaceExtractor, ImageFaceExtractor};
use photosort_core::pipeline::image_scanner::scan_images;
use photosort_core::pipeline::infrastructure::threaded_extraction_executor::ThreadedExtractionExecutor;
use photosort_core::pipeline::organize_photos_use_case::{OrganizePhotosUseCase, OrganizeReport};
use photosort_core::shared::constants::{
    DEFAULT_MIN_CONFIDENCE, DEFAULT_MIN_GROUP_SIZE, DEFAULT_SIMILARITY_THRESHOLD,
    DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL, EMBEDDING_MODEL_NAME, EMBEDDING_MODEL_URL,
};
use photosort_core::shared::model_resolver;

/// Groups photos into per-person folders by face similarity.
#[derive(Parser)]
#[command(name = "photosort")]
struct Cli {
    /// Input photo or folder (folders are searched recursively).
    input: PathBuf,

    /// Output folder for the grouped photos.
    output: PathBuf,

    /// Face match distance cutoff (lower = stricter, fewer false merges).
    #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
    threshold: f64,

    /// Minimum number of distinct images required to keep a group.
    #[arg(long, default_value_t = DEFAULT_MIN_GROUP_SIZE)]
    min_group_size: usize,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_MIN_CONFIDENCE)]
    confidence: f64,

    /// Extraction worker threads (0 = one per CPU).
    #[arg(long, default_value = "0")]
    workers: usize,

    /// Print the run report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let detector_path = model_resolver::resolve(
        DETECTOR_MODEL_NAME,
        DETECTOR_MODEL_URL,
        None,
        Some(Box::new(download_progress)),
    )?;
    let embedder_path = model_resolver::resolve(
        EMBEDDING_MODEL_NAME,
        EMBEDDING_MODEL_URL,
        None,
        Some(Box::new(download_progress)),
    )?;
    eprintln!();

    let images = scan_images(&cli.input)?;
    if images.is_empty() {
        log::warn!("no supported images found under {}", cli.input.display());
    }

    let workers = match cli.workers {
        0 => std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1),
        n => n,
    }
    // One extractor per worker; never spawn more workers than images.
    .min(images.len().max(1));

    let mut extractors: Vec<Box<dyn FaceExtractor>> = Vec::with_capacity(workers);
    for _ in 0..workers {
        let embedder = OnnxFaceEmbedder::new(&detector_path, &embedder_path, cli.confidence)?;
        extractors.push(Box::new(ImageFaceExtractor::new(
            Box::new(ImageFileReader::new()),
            Box::new(embedder),
        )));
    }

    let engine = GroupingEngine::new(cli.threshold)?.with_min_group_size(cli.min_group_size);
    let mut use_case = OrganizePhotosUseCase::new(
        Box::new(ThreadedExtractionExecutor::new()),
        engine,
        Box::new(FolderGroupWriter::new()),
    );

    let total = images.len();
    let config = ExtractionConfig {
        on_progress: Some(Box::new(move |current, _| {
            eprint!("\rProcessing image {current}/{total}");
            true
        })),
        ..Default::default()
    };

    let report = use_case.execute(extractors, &images, &cli.output, config)?;
    eprintln!();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&JsonReport::from(&report))?);
    } else {
        print_summary(&report, &cli.output);
    }

    Ok(())
}

fn print_summary(report: &OrganizeReport, output: &std::path::Path) {
    println!(
        "Processed {} of {} images ({} faces in {} images).",
        report.images_processed,
        report.images_scanned,
        report.faces_detected,
        report.images_with_faces
    );
    if report.groups.is_empty() {
        println!("No matching faces found; nothing written.");
        return;
    }
    for group in &report.groups {
        println!("  {}: {} images", group.name, group.images.len());
    }
    println!("Output written to {}", output.display());
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input path not found: {}", cli.input.display()).into());
    }
    if !cli.threshold.is_finite() || cli.threshold < 0.0 {
        return Err(format!(
            "Threshold must be a non-negative number, got {}",
            cli.threshold
        )
        .into());
    }
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    if cli.min_group_size < 1 {
        return Err("Minimum group size must be at least 1".into());
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading face models... {pct}%");
    } else {
        eprint!("\rDownloading face models... {downloaded} bytes");
    }
}

#[derive(Serialize)]
struct JsonReport {
    images_scanned: usize,
    images_processed: usize,
    images_with_faces: usize,
    faces_detected: usize,
    groups: Vec<JsonGroup>,
}

#[derive(Serialize)]
struct JsonGroup {
    name: String,
    images: Vec<PathBuf>,
}

impl From<&OrganizeReport> for JsonReport {
    fn from(report: &OrganizeReport) -> Self {
        Self {
            images_scanned: report.images_scanned,
            images_processed: report.images_processed,
            images_with_faces: report.images_with_faces,
            faces_detected: report.faces_detected,
            groups: report
                .groups
                .iter()
                .map(|g| JsonGroup {
                    name: g.name.clone(),
                    images: g.images.clone(),
                })
                .collect(),
        }
    }
}
