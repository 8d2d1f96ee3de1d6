//! # SQLite Document Store
//!
//! Stores scholarship documents alongside their embeddings in a local SQLite
//! database (through Turso) and answers cosine-similarity searches over them.

use crate::{errors::RagError, types::RetrievedDocument};
use std::fmt::{self, Debug};
use tracing::{debug, info};
use turso::{Database, Value as TursoValue};

pub mod sql;

/// A provider for interacting with a local SQLite database using Turso.
///
/// Cloning shares the underlying `Database`, so clones see the same file or
/// in-memory instance.
#[derive(Clone)]
pub struct SqliteProvider {
    pub db: Database,
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` from a file path or `":memory:"`.
    pub async fn new(db_path: &str) -> Result<Self, RagError> {
        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| RagError::StorageConnection(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| RagError::StorageConnection(e.to_string()))?;
        // PRAGMA returns a row, so it has to go through `query`.
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| RagError::StorageConnection(e.to_string()))?;

        Ok(Self { db })
    }

    /// Creates any missing tables. Safe to call on every startup.
    pub async fn initialize_schema(&self) -> Result<(), RagError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| RagError::StorageConnection(e.to_string()))?;

        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ())
                .await
                .map_err(|e| RagError::StorageOperationFailed(e.to_string()))?;
        }
        Ok(())
    }

    /// Stores one document with its embedding.
    ///
    /// When `scholarship_id` is given, earlier rows for the same scholarship
    /// are removed first so re-ingesting a file does not duplicate documents.
    pub async fn store_document(
        &self,
        scholarship_id: Option<&str>,
        content: &str,
        model_name: &str,
        embedding: &[f32],
    ) -> Result<(), RagError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| RagError::StorageConnection(e.to_string()))?;

        if let Some(id) = scholarship_id {
            conn.execute(
                sql::DELETE_SCHOLARSHIP_DOCUMENT,
                vec![TursoValue::Text(id.to_string())],
            )
            .await?;
        }

        let params = vec![
            scholarship_id
                .map(|id| TursoValue::Text(id.to_string()))
                .unwrap_or(TursoValue::Null),
            TursoValue::Text(content.to_string()),
            TursoValue::Text(model_name.to_string()),
            TursoValue::Blob(embedding_to_bytes(embedding)),
        ];
        conn.execute(sql::INSERT_SCHOLARSHIP_DOCUMENT, params).await?;
        Ok(())
    }

    /// Returns the number of stored documents.
    pub async fn count_documents(&self) -> Result<i64, RagError> {
        let conn = self
            .db
            .connect()
            .map_err(|e| RagError::StorageConnection(e.to_string()))?;
        let mut rows = conn.query(sql::COUNT_SCHOLARSHIP_DOCUMENTS, ()).await?;
        let count = match rows.next().await? {
            Some(row) => match row.get_value(0)? {
                TursoValue::Integer(n) => n,
                _ => 0,
            },
            None => 0,
        };
        Ok(count)
    }

    /// Returns the `limit` documents closest to `query_vector`, best first.
    pub async fn vector_search(
        &self,
        query_vector: &[f32],
        limit: u32,
    ) -> Result<Vec<RetrievedDocument>, RagError> {
        info!("Executing SQLite vector search on scholarship documents.");
        let conn = self
            .db
            .connect()
            .map_err(|e| RagError::StorageConnection(e.to_string()))?;

        let vector_literal = format!(
            "vector('[{}]')",
            query_vector
                .iter()
                .map(|f| f.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        let sql = sql::vector_search_documents(&vector_literal, limit);
        debug!(limit, "Running vector search SQL");

        let mut rows = conn.query(&sql, ()).await?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next().await? {
            let content = match row.get_value(0)? {
                TursoValue::Text(s) => s,
                _ => String::new(),
            };
            let score = match row.get_value(1)? {
                TursoValue::Real(f) => f,
                _ => 0.0,
            };
            documents.push(RetrievedDocument { content, score });
        }

        Ok(documents)
    }
}

/// Encodes an embedding as the little-endian `f32` blob the vector functions read.
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_to_bytes_is_little_endian_f32() {
        let bytes = embedding_to_bytes(&[1.0, -2.5]);
        assert_eq!(bytes.len(), 8);
        assert_eq!(&bytes[..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[4..], &(-2.5f32).to_le_bytes());
    }

    #[test]
    fn test_vector_search_sql_has_limit() {
        let sql = sql::vector_search_documents("vector('[0.1, 0.2]')", 3);
        assert!(sql.contains("vector_distance_cos(embedding, vector('[0.1, 0.2]'))"));
        assert!(sql.contains("LIMIT 3;"));
    }
}
