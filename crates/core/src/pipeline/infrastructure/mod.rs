pub mod threaded_extraction_executor;
