pub mod analysis_service;
pub mod ingestion_service;
pub mod relevance;
pub mod scrape;
pub mod tagging;
