pub mod vector_document;
