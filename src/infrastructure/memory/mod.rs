pub mod document_store;
pub mod stats_collector;
