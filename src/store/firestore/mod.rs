/*!
 * Cloud Firestore backend over the REST API (v1).
 *
 * Authentication uses a bearer access token, taken from the configuration
 * or the `FIRESTORE_ACCESS_TOKEN` environment variable (for example the
 * output of `gcloud auth print-access-token`). When `FIRESTORE_EMULATOR_HOST`
 * or `emulator_host` is set, requests go to the local emulator instead.
 */

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use url::Url;

use super::{CollectionRef, DocRef, Document, DocumentStore, Fields, Write, WriteBatch};
use crate::app_config::StoreConfig;
use crate::errors::StoreError;

pub mod codec;

/// Environment variable holding the bearer token
pub const ACCESS_TOKEN_ENV: &str = "FIRESTORE_ACCESS_TOKEN";

/// Environment variable naming a local emulator (`host:port`)
pub const EMULATOR_HOST_ENV: &str = "FIRESTORE_EMULATOR_HOST";

/// Documents requested per list page
const LIST_PAGE_SIZE: u32 = 300;

/// Token the emulator accepts as an admin credential
const EMULATOR_TOKEN: &str = "owner";

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<FirestoreDocument>,
    next_page_token: Option<String>,
}

/// Firestore REST client
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: Client,
    endpoint: Url,
    project_id: String,
    database: String,
    token: Option<String>,
}

impl FirestoreStore {
    /// Create a client for `project_id` at `endpoint`
    pub fn new(
        endpoint: &str,
        project_id: &str,
        database: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| StoreError::Connection(format!("Invalid endpoint '{}': {}", endpoint, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Connection(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            project_id: project_id.to_string(),
            database: database.to_string(),
            token,
        })
    }

    /// Build a client from the store configuration and environment
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        if config.project_id.trim().is_empty() {
            return Err(StoreError::Authentication(
                "Firestore backend requires store.project_id".to_string(),
            ));
        }

        let timeout = Duration::from_secs(config.timeout_secs);
        let emulator = config
            .emulator_host
            .clone()
            .or_else(|| std::env::var(EMULATOR_HOST_ENV).ok())
            .filter(|host| !host.trim().is_empty());

        if let Some(host) = emulator {
            debug!("Using Firestore emulator at {}", host);
            return Self::new(
                &format!("http://{}/v1", host),
                &config.project_id,
                &config.database,
                Some(EMULATOR_TOKEN.to_string()),
                timeout,
            );
        }

        let token = Some(config.access_token.clone())
            .filter(|t| !t.trim().is_empty())
            .or_else(|| std::env::var(ACCESS_TOKEN_ENV).ok())
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                StoreError::Authentication(format!(
                    "No access token: set store.access_token or {}",
                    ACCESS_TOKEN_ENV
                ))
            })?;

        Self::new(
            &config.endpoint,
            &config.project_id,
            &config.database,
            Some(token),
            timeout,
        )
    }

    /// Resource name of the database's document root
    fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database
        )
    }

    /// Full resource name of a document
    pub fn document_name(&self, path: &str) -> String {
        format!("{}/{}", self.documents_root(), path)
    }

    /// REST URL of a document or collection path
    pub fn resource_url(&self, path: &str) -> Result<Url, StoreError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::Connection(format!("Endpoint cannot be a base: {}", self.endpoint)))?;
            segments
                .pop_if_empty()
                .extend(["projects", self.project_id.as_str(), "databases", self.database.as_str(), "documents"])
                .extend(path.split('/'));
        }
        Ok(url)
    }

    fn commit_url(&self) -> Result<Url, StoreError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StoreError::Connection(format!("Endpoint cannot be a base: {}", self.endpoint)))?;
            segments
                .pop_if_empty()
                .extend(["projects", self.project_id.as_str(), "databases", self.database.as_str()])
                .push("documents:commit");
        }
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Map a non-success response to a store error
    async fn check(response: Response, path: &str) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);

        Err(match status {
            StatusCode::NOT_FOUND => StoreError::NotFound(path.to_string()),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Authentication(message),
            _ => StoreError::Api {
                status_code: status.as_u16(),
                message,
            },
        })
    }

    fn into_document(raw: FirestoreDocument) -> Result<Document, StoreError> {
        let id = raw.name.rsplit('/').next().unwrap_or_default().to_string();
        Ok(Document {
            id,
            fields: codec::decode_fields(&raw.fields)?,
        })
    }

    /// Field mask entry, backtick-quoted unless a plain identifier
    fn field_path(name: &str) -> String {
        let simple = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if simple {
            name.to_string()
        } else {
            format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
        }
    }

    fn encode_write(&self, write: &Write) -> Value {
        match write {
            Write::Set { doc, fields } => json!({
                "update": {
                    "name": self.document_name(doc.path()),
                    "fields": codec::encode_fields(fields),
                }
            }),
            Write::Delete { doc } => json!({ "delete": self.document_name(doc.path()) }),
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    async fn get(&self, doc: &DocRef) -> Result<Option<Document>, StoreError> {
        let response = self
            .request(Method::GET, self.resource_url(doc.path())?)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let raw: FirestoreDocument = Self::check(response, doc.path()).await?.json().await?;
        Self::into_document(raw).map(Some)
    }

    async fn set(&self, doc: &DocRef, fields: Fields) -> Result<(), StoreError> {
        let body = json!({ "fields": codec::encode_fields(&fields) });

        let response = self
            .request(Method::PATCH, self.resource_url(doc.path())?)
            .json(&body)
            .send()
            .await?;

        Self::check(response, doc.path()).await?;
        Ok(())
    }

    async fn update(&self, doc: &DocRef, fields: Fields) -> Result<(), StoreError> {
        let mut url = self.resource_url(doc.path())?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("currentDocument.exists", "true");
            for name in fields.keys() {
                query.append_pair("updateMask.fieldPaths", &Self::field_path(name));
            }
        }

        let body = json!({ "fields": codec::encode_fields(&fields) });
        let response = self.request(Method::PATCH, url).json(&body).send().await?;

        Self::check(response, doc.path()).await?;
        Ok(())
    }

    async fn delete(&self, doc: &DocRef) -> Result<(), StoreError> {
        let response = self
            .request(Method::DELETE, self.resource_url(doc.path())?)
            .send()
            .await?;

        match Self::check(response, doc.path()).await {
            Ok(_) | Err(StoreError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn list(&self, collection: &CollectionRef) -> Result<Vec<Document>, StoreError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = self.resource_url(collection.path())?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("pageSize", &LIST_PAGE_SIZE.to_string());
                if let Some(token) = &page_token {
                    query.append_pair("pageToken", token);
                }
            }

            let response = self.request(Method::GET, url).send().await?;
            let page: ListDocumentsResponse =
                Self::check(response, collection.path()).await?.json().await?;

            for raw in page.documents {
                documents.push(Self::into_document(raw)?);
            }

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        documents.sort_by(|a, b| a.id.cmp(&b.id));
        debug!("Listed {} documents from {}", documents.len(), collection);
        Ok(documents)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let writes: Vec<Value> = batch
            .into_writes()
            .iter()
            .map(|write| self.encode_write(write))
            .collect();
        let count = writes.len();

        let response = self
            .request(Method::POST, self.commit_url()?)
            .json(&json!({ "writes": writes }))
            .send()
            .await?;

        if let Err(e) = Self::check(response, "documents:commit").await {
            warn!("Commit of {} writes failed: {}", count, e);
            return Err(e);
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "firestore"
    }
}
