//! Loading documents from JSON and CSV files.
//!
//! JSON files hold an array of `{ id?, content, embedding?, metadata? }`
//! records. CSV files need a `content` column; an `id` column is optional and
//! every other non-empty cell becomes a string metadata entry.

use crate::domain::entities::vector_document::NewDocument;
use crate::domain::error::DomainError;
use crate::domain::values::metadata::MetadataValue;
use std::io::Read;
use std::path::Path;

pub fn load_documents(path: &Path) -> Result<Vec<NewDocument>, DomainError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    let file = std::fs::File::open(path)
        .map_err(|e| DomainError::Parse(format!("cannot open {}: {e}", path.display())))?;

    let docs = match ext.as_str() {
        "json" => parse_json(file)?,
        "csv" => parse_csv(file)?,
        other => {
            return Err(DomainError::Parse(format!(
                "unsupported file type {other:?} (expected .json or .csv)"
            )))
        }
    };
    tracing::info!(path = %path.display(), documents = docs.len(), "documents loaded");
    Ok(docs)
}

pub fn parse_json(reader: impl Read) -> Result<Vec<NewDocument>, DomainError> {
    serde_json::from_reader(reader).map_err(|e| DomainError::Parse(format!("invalid JSON documents: {e}")))
}

pub fn parse_csv(reader: impl Read) -> Result<Vec<NewDocument>, DomainError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr
        .headers()
        .map_err(|e| DomainError::Parse(format!("invalid CSV header: {e}")))?
        .clone();
    let content_col = headers
        .iter()
        .position(|h| h == "content")
        .ok_or_else(|| DomainError::Parse("CSV is missing a 'content' column".into()))?;
    let id_col = headers.iter().position(|h| h == "id");

    let mut docs = Vec::new();
    for (line, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| DomainError::Parse(format!("CSV row {}: {e}", line + 1)))?;

        let mut doc = NewDocument::new(record.get(content_col).unwrap_or_default());
        if let Some(id) = id_col.and_then(|c| record.get(c)).filter(|id| !id.is_empty()) {
            doc.id = Some(id.to_string());
        }
        for (col, (header, value)) in headers.iter().zip(record.iter()).enumerate() {
            if col == content_col || Some(col) == id_col || value.is_empty() {
                continue;
            }
            doc.metadata
                .insert(header.to_string(), MetadataValue::String(value.to_string()));
        }
        docs.push(doc);
    }
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_sample() {
        let json = r#"[
          {
            "id": "prod_1",
            "content": "Premium wireless headphones with noise cancellation",
            "metadata": { "category": "Electronics", "price": 299, "rating": 4.8 }
          },
          { "content": "No id here", "embedding": [0.1, 0.2] }
        ]"#;
        let docs = parse_json(json.as_bytes()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id.as_deref(), Some("prod_1"));
        assert_eq!(docs[0].metadata["price"], MetadataValue::Number(299.0));
        assert!(docs[1].id.is_none());
        assert_eq!(docs[1].embedding, Some(vec![0.1, 0.2]));
    }

    #[test]
    fn test_parse_json_rejects_non_array() {
        assert!(matches!(parse_json(r#"{"content": "x"}"#.as_bytes()), Err(DomainError::Parse(_))));
    }

    #[test]
    fn test_parse_csv_sample() {
        let csv = "id,content,category,author,published_date\n\
                   art_1,\"Machine learning revolutionizes data analysis\",AI,John Doe,2024-01-15\n\
                   art_2,\"Vector databases enable semantic search\",Database,Jane Smith,\n";
        let docs = parse_csv(csv.as_bytes()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id.as_deref(), Some("art_1"));
        assert_eq!(docs[0].content, "Machine learning revolutionizes data analysis");
        assert_eq!(docs[0].metadata["author"], MetadataValue::from("John Doe"));
        assert_eq!(docs[0].metadata.len(), 3);
        assert!(!docs[1].metadata.contains_key("published_date"));
    }

    #[test]
    fn test_parse_csv_requires_content() {
        let err = parse_csv("id,text\n1,hello\n".as_bytes()).unwrap_err();
        assert!(matches!(err, DomainError::Parse(_)));
    }
}
