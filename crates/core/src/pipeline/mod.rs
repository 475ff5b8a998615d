pub mod extraction_executor;
pub mod face_extractor;
pub mod image_scanner;
pub mod infrastructure;
pub mod organize_photos_use_case;
