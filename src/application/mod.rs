pub mod embedding_gateway;
pub mod ingest;
pub mod search;
