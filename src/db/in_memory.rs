use super::traits::{check_dimensions, KnowledgeStore};
use crate::types::{AppError, KnowledgeItem, KnowledgeTriple, Result, TripleFilter};
use async_trait::async_trait;
use parking_lot::RwLock;

/// In-memory knowledge store.
///
/// Data is not persisted and will be lost when the process exits.
/// Items and triples are kept in insertion order.
#[derive(Default)]
pub struct InMemoryKnowledgeStore {
    items: RwLock<Vec<KnowledgeItem>>,
    triples: RwLock<Vec<KnowledgeTriple>>,
}

impl InMemoryKnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryKnowledgeStore {
    fn backend_name(&self) -> &'static str {
        "in-memory"
    }

    async fn insert_item(&self, item: &KnowledgeItem) -> Result<()> {
        let mut items = self.items.write();
        if items.iter().any(|existing| existing.id == item.id) {
            return Err(AppError::Database(format!(
                "Knowledge item '{}' already exists",
                item.id
            )));
        }
        if let Some(first) = items.first() {
            check_dimensions(first.embedding.len(), item)?;
        }
        items.push(item.clone());
        Ok(())
    }

    async fn items(&self) -> Result<Vec<KnowledgeItem>> {
        Ok(self.items.read().clone())
    }

    async fn get_item(&self, id: &str) -> Result<Option<KnowledgeItem>> {
        Ok(self.items.read().iter().find(|item| item.id == id).cloned())
    }

    async fn count_items(&self) -> Result<usize> {
        Ok(self.items.read().len())
    }

    async fn dimensions(&self) -> Result<Option<usize>> {
        Ok(self.items.read().first().map(|item| item.embedding.len()))
    }

    async fn append_triple(&self, triple: &KnowledgeTriple) -> Result<()> {
        self.triples.write().push(triple.clone());
        Ok(())
    }

    async fn query_triples(&self, filter: &TripleFilter) -> Result<Vec<KnowledgeTriple>> {
        Ok(self
            .triples
            .read()
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect())
    }

    async fn related(&self, topic: &str) -> Result<Vec<KnowledgeTriple>> {
        Ok(self
            .triples
            .read()
            .iter()
            .filter(|t| t.subject == topic || t.object == topic)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Payload;

    fn item(id: &str) -> KnowledgeItem {
        KnowledgeItem {
            id: id.to_string(),
            content: format!("content {}", id),
            embedding: vec![1.0, 0.0],
            metadata: Payload::new(),
        }
    }

    #[tokio::test]
    async fn test_items_keep_insertion_order() {
        let store = InMemoryKnowledgeStore::new();
        for id in ["b", "a", "c"] {
            store.insert_item(&item(id)).await.unwrap();
        }

        let ids: Vec<String> = store.items().await.unwrap().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(store.count_items().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_duplicate_id_is_database_error() {
        let store = InMemoryKnowledgeStore::new();
        store.insert_item(&item("a")).await.unwrap();
        let err = store.insert_item(&item("a")).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
        assert_eq!(store.count_items().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_mixed_dimensions_rejected() {
        let store = InMemoryKnowledgeStore::new();
        assert_eq!(store.dimensions().await.unwrap(), None);
        store.insert_item(&item("a")).await.unwrap();

        let mut wide = item("b");
        wide.embedding = vec![1.0, 0.0, 0.0];
        let err = store.insert_item(&wide).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(store.dimensions().await.unwrap(), Some(2));
        assert_eq!(store.count_items().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_related_matches_subject_or_object() {
        let store = InMemoryKnowledgeStore::new();
        store
            .append_triple(&KnowledgeTriple::new("rust", "is_a", "language"))
            .await
            .unwrap();
        store
            .append_triple(&KnowledgeTriple::new("ferris", "mascot_of", "rust"))
            .await
            .unwrap();
        store
            .append_triple(&KnowledgeTriple::new("go", "is_a", "language"))
            .await
            .unwrap();

        let related = store.related("rust").await.unwrap();
        assert_eq!(related.len(), 2);

        let languages = store
            .query_triples(&TripleFilter {
                predicate: Some("is_a".into()),
                object: Some("language".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(languages.len(), 2);
        assert_eq!(languages[0].subject, "rust");
    }
}
