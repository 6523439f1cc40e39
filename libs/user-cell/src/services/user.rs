use std::sync::Arc;

use anyhow::Result;
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_database::{Collection, Document, DocumentStore, Filter, UpdateResult};
use shared_models::auth::ADMIN_ROLE;
use shared_utils::extractor::has_admin_role;

use crate::models::PROTECTED_USER_FIELDS;

pub struct UserService {
    store: Arc<dyn DocumentStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn by_email(email: &str) -> Filter {
        Filter::new().eq("email", email)
    }

    pub async fn find_user(&self, email: &str) -> Result<Option<Document>> {
        self.store.find_one(Collection::Users, &Self::by_email(email)).await
    }

    /// Unknown users are simply not admins.
    pub async fn is_admin(&self, email: &str) -> Result<bool> {
        let user = self.find_user(email).await?;
        Ok(user.as_ref().is_some_and(has_admin_role))
    }

    /// Creates or merges the user keyed by `email`. The role and id are never
    /// taken from the payload and the path email wins over any body email.
    pub async fn upsert_user(&self, email: &str, mut fields: Document) -> Result<UpdateResult> {
        for field in PROTECTED_USER_FIELDS {
            fields.remove(field);
        }
        fields.insert("email".to_string(), Value::String(email.to_string()));

        debug!("Upserting user {}", email);
        self.store
            .update_one(Collection::Users, &Self::by_email(email), fields, true)
            .await
    }

    /// Grants the admin role to an existing user. Unknown emails are not created.
    pub async fn make_admin(&self, email: &str) -> Result<UpdateResult> {
        let mut set = Document::new();
        set.insert("role".to_string(), json!(ADMIN_ROLE));

        let result = self
            .store
            .update_one(Collection::Users, &Self::by_email(email), set, false)
            .await?;

        info!("Admin role requested for {} (matched {})", email, result.matched_count);
        Ok(result)
    }

    pub async fn list_users(&self) -> Result<Vec<Document>> {
        self.store.find(Collection::Users, &Filter::new()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_database::MemoryStore;

    fn fields(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_upsert_ignores_role_and_body_email() {
        let store = Arc::new(MemoryStore::new());
        let service = UserService::new(store.clone());

        service
            .upsert_user(
                "a@x.com",
                fields(json!({ "email": "evil@x.com", "role": "admin", "name": "A" })),
            )
            .await
            .unwrap();

        let user = service.find_user("a@x.com").await.unwrap().unwrap();
        assert_eq!(user["email"], "a@x.com");
        assert_eq!(user["name"], "A");
        assert!(user.get("role").is_none());
        assert!(service.find_user("evil@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_keeps_existing_role() {
        let store = Arc::new(MemoryStore::new());
        let service = UserService::new(store.clone());

        service.upsert_user("a@x.com", Document::new()).await.unwrap();
        service.make_admin("a@x.com").await.unwrap();
        service
            .upsert_user("a@x.com", fields(json!({ "name": "A" })))
            .await
            .unwrap();

        assert!(service.is_admin("a@x.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_make_admin_does_not_create_users() {
        let store = Arc::new(MemoryStore::new());
        let service = UserService::new(store.clone());

        let result = service.make_admin("ghost@x.com").await.unwrap();
        assert_eq!(result.matched_count, 0);
        assert!(service.list_users().await.unwrap().is_empty());
        assert!(!service.is_admin("ghost@x.com").await.unwrap());
    }
}
