pub mod embeddings;
pub mod import;
pub mod memory;
