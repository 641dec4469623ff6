mod common;

use common::{setup_with, ScriptedProvider};
use neuradb::application::ingest::AddManyOptions;
use neuradb::application::search::SearchOptions;
use neuradb::domain::error::DomainError;
use neuradb::domain::values::metadata::MetadataValue;
use neuradb::domain::values::metadata_filter::MetadataFilter;
use neuradb::infrastructure::import::load_documents;
use std::io::Write;
use std::sync::Arc;

fn write_file(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

#[tokio::test]
async fn test_json_file_ingest_and_filtered_search() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "products.json",
        r#"[
          {"id": "p1", "content": "Rust book", "metadata": {"category": "Books"}},
          {"id": "p2", "content": "Python course", "metadata": {"category": "Courses"}},
          {"id": "p3", "content": "Cooking with rust pans", "metadata": {"category": "Kitchen"}}
        ]"#,
    );

    let provider = Arc::new(ScriptedProvider::new());
    let db = setup_with(provider);
    let docs = load_documents(&path).unwrap();
    let summary = db
        .add_documents(docs, AddManyOptions::default().with_embeddings())
        .await
        .unwrap();
    assert!(summary.is_complete_success());

    let results = db
        .search(
            "rust",
            SearchOptions::default().filter(MetadataFilter::new().eq("category", "Kitchen")),
        )
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document.id, "p3");
}

#[tokio::test]
async fn test_csv_file_columns_become_metadata() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "articles.CSV",
        "id,content,category\na1,Rust ownership explained,AI\n,Untitled python note,Database\n",
    );

    let docs = load_documents(&path).unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0].id.as_deref(), Some("a1"));
    assert!(docs[1].id.is_none());

    let db = setup_with(Arc::new(ScriptedProvider::new()));
    let summary = db
        .add_documents(docs, AddManyOptions::default().with_embeddings())
        .await
        .unwrap();
    assert_eq!(summary.inserted, 2);
    assert_eq!(
        db.get_document("a1").unwrap().metadata["category"],
        MetadataValue::from("AI")
    );
}

#[test]
fn test_unsupported_extension_and_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "notes.txt", "hello");
    assert!(matches!(load_documents(&path), Err(DomainError::Parse(_))));

    let missing = dir.path().join("absent.json");
    assert!(matches!(load_documents(&missing), Err(DomainError::Parse(_))));
}
