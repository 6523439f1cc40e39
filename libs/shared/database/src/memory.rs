use std::collections::HashMap;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use crate::store::{
    merge_set, new_id, Collection, DeleteResult, Document, DocumentStore, Filter, InsertResult,
    UpdateResult, ID_FIELD,
};

/// In-process document store. Documents keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `{ "<collection>": [documents] }`.
    pub fn from_seed(seed: Value) -> Result<Self> {
        let object = seed
            .as_object()
            .ok_or_else(|| anyhow!("Seed data must be a JSON object keyed by collection"))?;

        let mut collections = HashMap::new();
        for (name, documents) in object {
            let collection = Collection::from_name(name)
                .ok_or_else(|| anyhow!("Unknown collection in seed data: {}", name))?;
            let documents = documents
                .as_array()
                .ok_or_else(|| anyhow!("Seed collection {} must be an array", name))?;

            let mut stored = Vec::with_capacity(documents.len());
            for document in documents {
                let mut document = document
                    .as_object()
                    .cloned()
                    .ok_or_else(|| anyhow!("Seed documents in {} must be objects", name))?;
                ensure_id(&mut document);
                stored.push(document);
            }
            collections.insert(collection, stored);
        }

        Ok(Self {
            collections: RwLock::new(collections),
        })
    }

    pub async fn load_seed_file(path: &Path) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read seed file {}", path.display()))?;
        let seed: Value = serde_json::from_str(&raw)
            .with_context(|| format!("Seed file {} is not valid JSON", path.display()))?;
        Self::from_seed(seed)
    }

    pub async fn seed(&self, collection: Collection, documents: Vec<Document>) {
        let mut collections = self.collections.write().await;
        let stored = collections.entry(collection).or_default();
        for mut document in documents {
            ensure_id(&mut document);
            stored.push(document);
        }
    }

    pub async fn len(&self, collection: Collection) -> usize {
        self.collections
            .read()
            .await
            .get(&collection)
            .map_or(0, Vec::len)
    }
}

fn ensure_id(document: &mut Document) -> String {
    match document.get(ID_FIELD).and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => {
            let id = new_id();
            document.insert(ID_FIELD.to_string(), Value::String(id.clone()));
            id
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>> {
        debug!("memory find on {} with {:?}", collection, filter);
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| filter.matches(document))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>> {
        debug!("memory find_one on {} with {:?}", collection, filter);
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|documents| documents.iter().find(|document| filter.matches(document)))
            .cloned())
    }

    async fn insert_one(&self, collection: Collection, mut document: Document) -> Result<InsertResult> {
        let id = ensure_id(&mut document);
        debug!("memory insert into {} with _id {}", collection, id);

        let mut collections = self.collections.write().await;
        collections.entry(collection).or_default().push(document);

        Ok(InsertResult {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> Result<UpdateResult> {
        debug!("memory update on {} with {:?} (upsert: {})", collection, filter, upsert);
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection).or_default();

        if let Some(existing) = documents.iter_mut().find(|document| filter.matches(document)) {
            let (merged, changed) = merge_set(existing, &set);
            *existing = merged;
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(changed),
                upserted_id: None,
            });
        }

        if !upsert {
            return Ok(UpdateResult::unmatched());
        }

        let (mut document, _) = merge_set(&filter.to_document(), &set);
        let id = ensure_id(&mut document);
        documents.push(document);

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_id: Some(id),
        })
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteResult> {
        debug!("memory delete on {} with {:?}", collection, filter);
        let mut collections = self.collections.write().await;
        let deleted_count = match collections.get_mut(&collection) {
            Some(documents) => match documents.iter().position(|document| filter.matches(document)) {
                Some(index) => {
                    documents.remove(index);
                    1
                }
                None => 0,
            },
            None => 0,
        };

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_id_and_find_returns_it() {
        let store = MemoryStore::new();
        let result = store
            .insert_one(Collection::Doctors, doc(json!({ "email": "doc@x.com" })))
            .await
            .unwrap();

        assert!(result.acknowledged);
        let found = store
            .find_one(Collection::Doctors, &Filter::by_id(result.inserted_id.clone()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found["email"], "doc@x.com");
        assert_eq!(found[ID_FIELD], result.inserted_id);
    }

    #[tokio::test]
    async fn test_insert_keeps_caller_id() {
        let store = MemoryStore::new();
        let result = store
            .insert_one(Collection::Bookings, doc(json!({ "_id": "b-1" })))
            .await
            .unwrap();
        assert_eq!(result.inserted_id, "b-1");
    }

    #[tokio::test]
    async fn test_find_preserves_insertion_order() {
        let store = MemoryStore::new();
        for name in ["a", "b", "c"] {
            store
                .insert_one(Collection::Services, doc(json!({ "name": name })))
                .await
                .unwrap();
        }

        let names: Vec<_> = store
            .find(Collection::Services, &Filter::new())
            .await
            .unwrap()
            .into_iter()
            .map(|d| d["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("a"), json!("b"), json!("c")]);
    }

    #[tokio::test]
    async fn test_update_without_upsert_leaves_store_untouched() {
        let store = MemoryStore::new();
        let result = store
            .update_one(
                Collection::Users,
                &Filter::new().eq("email", "ghost@x.com"),
                doc(json!({ "role": "admin" })),
                false,
            )
            .await
            .unwrap();

        assert_eq!(result, UpdateResult::unmatched());
        assert_eq!(store.len(Collection::Users).await, 0);
    }

    #[tokio::test]
    async fn test_upsert_inserts_then_updates() {
        let store = MemoryStore::new();
        let filter = Filter::new().eq("email", "a@x.com");

        let first = store
            .update_one(Collection::Users, &filter, doc(json!({ "name": "A" })), true)
            .await
            .unwrap();
        assert_eq!(first.matched_count, 0);
        assert!(first.upserted_id.is_some());

        let second = store
            .update_one(Collection::Users, &filter, doc(json!({ "name": "A" })), true)
            .await
            .unwrap();
        assert_eq!(second.matched_count, 1);
        assert_eq!(second.modified_count, 0);
        assert_eq!(second.upserted_id, None);

        let stored = store.find(Collection::Users, &filter).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0]["email"], "a@x.com");
        assert_eq!(stored[0]["name"], "A");
    }

    #[tokio::test]
    async fn test_delete_one_removes_first_match_only() {
        let store = MemoryStore::new();
        store
            .seed(
                Collection::Doctors,
                vec![doc(json!({ "email": "d@x.com" })), doc(json!({ "email": "d@x.com" }))],
            )
            .await;

        let result = store
            .delete_one(Collection::Doctors, &Filter::new().eq("email", "d@x.com"))
            .await
            .unwrap();
        assert_eq!(result.deleted_count, 1);
        assert_eq!(store.len(Collection::Doctors).await, 1);

        let missing = store
            .delete_one(Collection::Doctors, &Filter::new().eq("email", "nobody@x.com"))
            .await
            .unwrap();
        assert_eq!(missing.deleted_count, 0);
    }

    #[tokio::test]
    async fn test_load_seed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            json!({ "services": [{ "name": "Cleaning", "slots": ["10:00", "11:00"] }] })
        )
        .unwrap();

        let store = MemoryStore::load_seed_file(file.path()).await.unwrap();
        let services = store.find(Collection::Services, &Filter::new()).await.unwrap();
        assert_eq!(services.len(), 1);
        assert!(services[0].contains_key(ID_FIELD));
    }

    #[test]
    fn test_seed_rejects_unknown_collection() {
        assert!(MemoryStore::from_seed(json!({ "patients": [] })).is_err());
        assert!(MemoryStore::from_seed(json!([])).is_err());
    }
}
