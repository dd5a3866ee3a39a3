use super::traits::{check_dimensions, KnowledgeStore};
use crate::types::{AppError, KnowledgeItem, KnowledgeTriple, Payload, Result, TripleFilter};
use async_trait::async_trait;
use libsql::{params_from_iter, Builder, Connection, Database, Row, Value};
use tokio::sync::Mutex;

/// libsql-backed knowledge store.
///
/// Holds one connection for its lifetime so that `:memory:` databases keep
/// their contents across calls. Writes are serialized through `write_lock`.
pub struct SqliteKnowledgeStore {
    _db: Database,
    conn: Connection,
    write_lock: Mutex<()>,
}

impl SqliteKnowledgeStore {
    /// Open (or create) a local database file. Parent directories are created.
    pub async fn new_local(path: &str) -> Result<Self> {
        if path != ":memory:" {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        AppError::Database(format!(
                            "Failed to create database directory {}: {}",
                            parent.display(),
                            e
                        ))
                    })?;
                }
            }
        }

        let db = Builder::new_local(path)
            .build()
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;
        let conn = db
            .connect()
            .map_err(|e| AppError::Database(format!("Failed to get connection: {}", e)))?;

        let store = Self {
            _db: db,
            conn,
            write_lock: Mutex::new(()),
        };
        store.initialize_schema().await?;

        tracing::debug!(path, "Opened knowledge database");
        Ok(store)
    }

    /// Open a private in-memory database.
    pub async fn new_memory() -> Result<Self> {
        Self::new_local(":memory:").await
    }

    async fn initialize_schema(&self) -> Result<()> {
        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS knowledge (
                    id TEXT PRIMARY KEY,
                    content TEXT,
                    embedding TEXT,
                    metadata TEXT
                )",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to create knowledge table: {}", e)))?;

        self.conn
            .execute(
                "CREATE TABLE IF NOT EXISTS knowledge_graph (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    subject TEXT,
                    predicate TEXT,
                    object TEXT,
                    metadata TEXT
                )",
                (),
            )
            .await
            .map_err(|e| {
                AppError::Database(format!("Failed to create knowledge_graph table: {}", e))
            })?;

        Ok(())
    }

    async fn fetch_triples(&self, sql: &str, params: Vec<Value>) -> Result<Vec<KnowledgeTriple>> {
        let mut rows = self
            .conn
            .query(sql, params_from_iter(params))
            .await
            .map_err(|e| AppError::Database(format!("Failed to query triples: {}", e)))?;

        let mut triples = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            triples.push(KnowledgeTriple {
                subject: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
                predicate: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
                object: row.get(2).map_err(|e| AppError::Database(e.to_string()))?,
                metadata: decode_metadata(&row, 3)?,
            });
        }

        Ok(triples)
    }
}

fn decode_metadata(row: &Row, idx: i32) -> Result<Payload> {
    let raw: String = row.get(idx).map_err(|e| AppError::Database(e.to_string()))?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::Database(format!("Corrupt metadata column: {}", e)))
}

fn decode_item(row: &Row) -> Result<KnowledgeItem> {
    let raw_embedding: String = row.get(2).map_err(|e| AppError::Database(e.to_string()))?;
    let embedding: Vec<f32> = serde_json::from_str(&raw_embedding)
        .map_err(|e| AppError::Database(format!("Corrupt embedding column: {}", e)))?;

    Ok(KnowledgeItem {
        id: row.get(0).map_err(|e| AppError::Database(e.to_string()))?,
        content: row.get(1).map_err(|e| AppError::Database(e.to_string()))?,
        embedding,
        metadata: decode_metadata(row, 3)?,
    })
}

fn encode<T: serde::Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| AppError::Internal(e.to_string()))
}

#[async_trait]
impl KnowledgeStore for SqliteKnowledgeStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn insert_item(&self, item: &KnowledgeItem) -> Result<()> {
        let embedding = encode(&item.embedding)?;
        let metadata = encode(&item.metadata)?;

        let _guard = self.write_lock.lock().await;
        if let Some(stored) = self.dimensions().await? {
            check_dimensions(stored, item)?;
        }
        self.conn
            .execute(
                "INSERT INTO knowledge (id, content, embedding, metadata) VALUES (?, ?, ?, ?)",
                (item.id.as_str(), item.content.as_str(), embedding, metadata),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to store knowledge item: {}", e)))?;

        Ok(())
    }

    async fn items(&self) -> Result<Vec<KnowledgeItem>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, content, embedding, metadata FROM knowledge ORDER BY rowid",
                (),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query knowledge: {}", e)))?;

        let mut items = Vec::new();
        while let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            items.push(decode_item(&row)?);
        }

        Ok(items)
    }

    async fn get_item(&self, id: &str) -> Result<Option<KnowledgeItem>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, content, embedding, metadata FROM knowledge WHERE id = ?",
                [id],
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to query knowledge: {}", e)))?;

        match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => Ok(Some(decode_item(&row)?)),
            None => Ok(None),
        }
    }

    async fn count_items(&self) -> Result<usize> {
        let mut rows = self
            .conn
            .query("SELECT COUNT(*) FROM knowledge", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to count knowledge: {}", e)))?;

        let count = match rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        {
            Some(row) => row
                .get::<i64>(0)
                .map_err(|e| AppError::Database(e.to_string()))?,
            None => 0,
        };

        Ok(count.max(0) as usize)
    }

    async fn dimensions(&self) -> Result<Option<usize>> {
        let mut rows = self
            .conn
            .query("SELECT embedding FROM knowledge ORDER BY rowid LIMIT 1", ())
            .await
            .map_err(|e| AppError::Database(format!("Failed to query knowledge: {}", e)))?;

        let Some(row) = rows
            .next()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
        else {
            return Ok(None);
        };
        let raw: String = row.get(0).map_err(|e| AppError::Database(e.to_string()))?;
        let embedding: Vec<f32> = serde_json::from_str(&raw)
            .map_err(|e| AppError::Database(format!("Corrupt embedding column: {}", e)))?;
        Ok(Some(embedding.len()))
    }

    async fn append_triple(&self, triple: &KnowledgeTriple) -> Result<()> {
        let metadata = encode(&triple.metadata)?;

        let _guard = self.write_lock.lock().await;
        self.conn
            .execute(
                "INSERT INTO knowledge_graph (subject, predicate, object, metadata) VALUES (?, ?, ?, ?)",
                (
                    triple.subject.as_str(),
                    triple.predicate.as_str(),
                    triple.object.as_str(),
                    metadata,
                ),
            )
            .await
            .map_err(|e| AppError::Database(format!("Failed to append triple: {}", e)))?;

        Ok(())
    }

    async fn query_triples(&self, filter: &TripleFilter) -> Result<Vec<KnowledgeTriple>> {
        let mut sql =
            String::from("SELECT subject, predicate, object, metadata FROM knowledge_graph WHERE 1=1");
        let mut params = Vec::new();

        for (column, value) in [
            ("subject", &filter.subject),
            ("predicate", &filter.predicate),
            ("object", &filter.object),
        ] {
            if let Some(value) = value {
                sql.push_str(&format!(" AND {} = ?", column));
                params.push(Value::Text(value.clone()));
            }
        }
        sql.push_str(" ORDER BY id");

        self.fetch_triples(&sql, params).await
    }

    async fn related(&self, topic: &str) -> Result<Vec<KnowledgeTriple>> {
        self.fetch_triples(
            "SELECT subject, predicate, object, metadata FROM knowledge_graph
             WHERE subject = ? OR object = ? ORDER BY id",
            vec![Value::Text(topic.to_string()), Value::Text(topic.to_string())],
        )
        .await
    }
}
