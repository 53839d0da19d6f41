//! HttpDocumentStore - `DocumentStore` client for the HTTP document service.
//!
//! Requires the `http` feature. Speaks the routes served by
//! [`crate::server::router`]:
//!
//! - `GET /collections/:collection/documents`
//! - `GET | PUT | DELETE /collections/:collection/document?id=<id>`
//!
//! Document ids travel in the query string, so any string (including the
//! empty one) is addressable.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use tracing::debug;

use super::wire::{
    DeleteRequest, DeleteResponse, DocumentQuery, ErrorBody, SetRequest, SetResponse,
};
use super::{Document, DocumentError, DocumentStore, Fields, Precondition, WriteMode};

/// Document store reached over HTTP.
#[derive(Clone)]
pub struct HttpDocumentStore {
    client: Client,
    base: Url,
}

impl HttpDocumentStore {
    /// Create a client for the service at `base_url` (e.g. `"http://127.0.0.1:8080"`).
    pub fn new(base_url: &str) -> Result<Self, DocumentError> {
        Self::with_client(Client::new(), base_url)
    }

    /// Create a client reusing an existing reqwest `Client` (timeouts, proxies, ...).
    pub fn with_client(client: Client, base_url: &str) -> Result<Self, DocumentError> {
        let base = Url::parse(base_url).map_err(|e| {
            DocumentError::Unavailable(format!("invalid base url {}: {}", base_url, e))
        })?;
        if base.cannot_be_a_base() {
            return Err(DocumentError::Unavailable(format!(
                "invalid base url {}: cannot be a base",
                base_url
            )));
        }
        Ok(Self { client, base })
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, collection: &str, resource: &str) -> Result<Url, DocumentError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| DocumentError::Unavailable(format!("invalid base url {}", self.base)))?
            .pop_if_empty()
            .extend(["collections", collection, resource]);
        Ok(url)
    }

    /// Turn a non-success response into a `DocumentError`.
    async fn failure(
        response: Response,
        collection: &str,
        id: &str,
        expected: Precondition,
    ) -> DocumentError {
        let status = response.status();
        let body = response.json::<ErrorBody>().await.ok();

        match status {
            StatusCode::CONFLICT => DocumentError::PreconditionFailed {
                collection: collection.to_string(),
                id: id.to_string(),
                expected,
                actual: body.and_then(|b| b.actual),
            },
            StatusCode::BAD_REQUEST => DocumentError::InvalidId(
                body.map(|b| b.error).unwrap_or_else(|| status.to_string()),
            ),
            _ => DocumentError::Unavailable(match body {
                Some(b) => format!("{}: {}", status, b.error),
                None => status.to_string(),
            }),
        }
    }
}

fn transport(err: reqwest::Error) -> DocumentError {
    if err.is_decode() {
        DocumentError::Serde(err.to_string())
    } else {
        DocumentError::Unavailable(err.to_string())
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>, DocumentError> {
        let url = self.url(collection, "documents")?;
        let response = self.client.get(url).send().await.map_err(transport)?;

        if !response.status().is_success() {
            return Err(Self::failure(response, collection, "", Precondition::Any).await);
        }

        let documents: Vec<Document> = response.json().await.map_err(transport)?;
        debug!(collection, count = documents.len(), "listed documents");
        Ok(documents)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, DocumentError> {
        let url = self.url(collection, "document")?;
        let response = self
            .client
            .get(url)
            .query(&DocumentQuery { id: id.to_string() })
            .send()
            .await
            .map_err(transport)?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                Ok(Some(response.json().await.map_err(transport)?))
            }
            _ => Err(Self::failure(response, collection, id, Precondition::Any).await),
        }
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        fields: Fields,
        mode: WriteMode,
        precondition: Precondition,
    ) -> Result<u64, DocumentError> {
        let url = self.url(collection, "document")?;
        let response = self
            .client
            .put(url)
            .query(&DocumentQuery { id: id.to_string() })
            .json(&SetRequest {
                fields,
                mode,
                precondition,
            })
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(Self::failure(response, collection, id, precondition).await);
        }

        let body: SetResponse = response.json().await.map_err(transport)?;
        Ok(body.version)
    }

    async fn delete(
        &self,
        collection: &str,
        id: &str,
        precondition: Precondition,
    ) -> Result<bool, DocumentError> {
        let url = self.url(collection, "document")?;
        let response = self
            .client
            .delete(url)
            .query(&DocumentQuery { id: id.to_string() })
            .json(&DeleteRequest { precondition })
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(Self::failure(response, collection, id, precondition).await);
        }

        let body: DeleteResponse = response.json().await.map_err(transport)?;
        Ok(body.existed)
    }
}
