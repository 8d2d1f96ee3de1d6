//! # SQLite Specific SQL Queries
//!
//! SQL strings for the scholarship document store, kept apart from the
//! provider logic so the database-specific syntax lives in one place.

/// Creates the table holding one row per ingested scholarship document.
pub const CREATE_SCHOLARSHIP_DOCUMENTS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS scholarship_documents (
        id INTEGER PRIMARY KEY,
        scholarship_id TEXT,
        content TEXT NOT NULL,
        model_name TEXT NOT NULL,
        embedding BLOB NOT NULL
    );
";

/// All statements needed to bring an empty database up to date.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[CREATE_SCHOLARSHIP_DOCUMENTS_TABLE];

pub const INSERT_SCHOLARSHIP_DOCUMENT: &str =
    "INSERT INTO scholarship_documents (scholarship_id, content, model_name, embedding) VALUES (?, ?, ?, ?)";

pub const DELETE_SCHOLARSHIP_DOCUMENT: &str =
    "DELETE FROM scholarship_documents WHERE scholarship_id = ?";

pub const COUNT_SCHOLARSHIP_DOCUMENTS: &str = "SELECT COUNT(*) FROM scholarship_documents";

/// Returns the cosine-similarity search over stored documents.
///
/// `vector_literal` must already be a `vector('[...]')` expression.
pub fn vector_search_documents(vector_literal: &str, limit: u32) -> String {
    format!(
        "SELECT content, (1.0 - (vector_distance_cos(embedding, {vector_literal}) / 2.0)) AS similarity
         FROM scholarship_documents
         ORDER BY similarity DESC
         LIMIT {limit};"
    )
}
