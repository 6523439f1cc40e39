use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client, Method,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::{json, Value};
use tracing::{debug, error};

use shared_config::AppConfig;

use crate::store::{
    merge_set, new_id, Collection, DeleteResult, Document, DocumentStore, Filter, InsertResult,
    UpdateResult, ID_FIELD,
};

/// Document store on top of a Supabase/PostgREST endpoint. Each collection is
/// a table `(id text primary key, doc jsonb, created_at timestamptz default now())`.
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    service_key: String,
}

#[derive(Debug, Deserialize)]
struct Row {
    id: String,
    doc: Value,
}

impl Row {
    fn into_document(self) -> Document {
        let mut document = match self.doc {
            Value::Object(map) => map,
            _ => Document::new(),
        };
        document.insert(ID_FIELD.to_string(), Value::String(self.id));
        document
    }
}

impl PostgrestStore {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.database_url.trim_end_matches('/').to_string(),
            service_key: config.database_service_key.clone(),
        }
    }

    fn get_headers(&self, prefer: Option<&'static str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.service_key)?);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.service_key))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(prefer) = prefer {
            headers.insert("Prefer", HeaderValue::from_static(prefer));
        }

        Ok(headers)
    }

    pub async fn request<T>(
        &self,
        method: Method,
        collection: Collection,
        query: &[(String, String)],
        body: Option<Value>,
        prefer: Option<&'static str>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}/rest/v1/{}", self.base_url, collection);
        debug!("Making {} request to {} with {:?}", method, url, query);

        let mut req = self
            .client
            .request(method, &url)
            .headers(self.get_headers(prefer)?)
            .query(query);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("Store error ({}): {}", status, error_text);

            return Err(match status.as_u16() {
                401 | 403 => anyhow!("Store authentication error: {}", error_text),
                404 => anyhow!("Store collection not found: {}", error_text),
                _ => anyhow!("Store error ({}): {}", status, error_text),
            });
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    fn filter_query(filter: &Filter) -> Vec<(String, String)> {
        filter
            .clauses()
            .iter()
            .map(|(field, value)| {
                let column = if field == ID_FIELD {
                    "id".to_string()
                } else {
                    format!("doc->>{}", field)
                };
                let rendered = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (column, format!("eq.{}", rendered))
            })
            .collect()
    }

    fn select_query(filter: &Filter, limit: Option<usize>) -> Vec<(String, String)> {
        let mut query = vec![
            ("select".to_string(), "id,doc".to_string()),
            ("order".to_string(), "created_at.asc".to_string()),
        ];
        query.extend(Self::filter_query(filter));
        if let Some(limit) = limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }

    fn id_query(id: &str) -> Vec<(String, String)> {
        vec![("id".to_string(), format!("eq.{}", id))]
    }

    fn split_id(mut document: Document) -> (String, Document) {
        let id = match document.remove(ID_FIELD) {
            Some(Value::String(id)) => id,
            Some(other) => other.to_string(),
            None => new_id(),
        };
        (id, document)
    }
}

#[async_trait]
impl DocumentStore for PostgrestStore {
    async fn ping(&self) -> Result<()> {
        let query = vec![
            ("select".to_string(), "id".to_string()),
            ("limit".to_string(), "1".to_string()),
        ];
        let _: Vec<Value> = self
            .request(Method::GET, Collection::Services, &query, None, None)
            .await?;
        Ok(())
    }

    async fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>> {
        let rows: Vec<Row> = self
            .request(Method::GET, collection, &Self::select_query(filter, None), None, None)
            .await?;
        Ok(rows.into_iter().map(Row::into_document).collect())
    }

    async fn find_one(&self, collection: Collection, filter: &Filter) -> Result<Option<Document>> {
        let rows: Vec<Row> = self
            .request(Method::GET, collection, &Self::select_query(filter, Some(1)), None, None)
            .await?;
        Ok(rows.into_iter().next().map(Row::into_document))
    }

    async fn insert_one(&self, collection: Collection, document: Document) -> Result<InsertResult> {
        let (id, doc) = Self::split_id(document);
        let rows: Vec<Row> = self
            .request(
                Method::POST,
                collection,
                &[],
                Some(json!({ "id": id, "doc": doc })),
                Some("return=representation"),
            )
            .await?;

        let inserted = rows
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Store returned no row for insert into {}", collection))?;

        Ok(InsertResult {
            acknowledged: true,
            inserted_id: inserted.id,
        })
    }

    async fn update_one(
        &self,
        collection: Collection,
        filter: &Filter,
        set: Document,
        upsert: bool,
    ) -> Result<UpdateResult> {
        let Some(existing) = self.find_one(collection, filter).await? else {
            if !upsert {
                return Ok(UpdateResult::unmatched());
            }
            let (document, _) = merge_set(&filter.to_document(), &set);
            let inserted = self.insert_one(collection, document).await?;
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
                upserted_id: Some(inserted.inserted_id),
            });
        };

        let (merged, changed) = merge_set(&existing, &set);
        if !changed {
            return Ok(UpdateResult {
                acknowledged: true,
                matched_count: 1,
                modified_count: 0,
                upserted_id: None,
            });
        }

        let (id, doc) = Self::split_id(merged);
        let rows: Vec<Row> = self
            .request(
                Method::PATCH,
                collection,
                &Self::id_query(&id),
                Some(json!({ "doc": doc })),
                Some("return=representation"),
            )
            .await?;

        Ok(UpdateResult {
            acknowledged: true,
            matched_count: 1,
            modified_count: rows.len() as u64,
            upserted_id: None,
        })
    }

    async fn delete_one(&self, collection: Collection, filter: &Filter) -> Result<DeleteResult> {
        let Some(existing) = self.find_one(collection, filter).await? else {
            return Ok(DeleteResult {
                acknowledged: true,
                deleted_count: 0,
            });
        };

        let (id, _) = Self::split_id(existing);
        let rows: Vec<Row> = self
            .request(
                Method::DELETE,
                collection,
                &Self::id_query(&id),
                None,
                Some("return=representation"),
            )
            .await?;

        Ok(DeleteResult {
            acknowledged: true,
            deleted_count: rows.len() as u64,
        })
    }
}
