pub mod metadata;
pub mod metadata_filter;
pub mod similarity_method;
pub mod vector_math;
