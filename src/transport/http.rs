use super::{Transport, TransportError};
use crate::core::EntityId;
use crate::model::Resource;
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Backing API of this deployment.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// REST adapter over reqwest: GET/POST/PUT/DELETE against `/{collection}`
/// and `/{collection}/{id}`. Timeout policy is whatever the supplied
/// `reqwest::Client` was built with; the engine imposes none of its own.
pub struct HttpTransport<R> {
    http: reqwest::Client,
    base_url: String,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Resource> HttpTransport<R> {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            _marker: PhantomData,
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, R::COLLECTION.as_str())
    }

    fn entity_url(&self, id: EntityId) -> String {
        format!("{}/{}/{}", self.base_url, R::COLLECTION.as_str(), id)
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

fn check_status(res: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    if res.status().is_success() {
        Ok(res)
    } else {
        Err(TransportError::Status(res.status().as_u16()))
    }
}

#[async_trait]
impl<R> Transport<R> for HttpTransport<R>
where
    R: Resource + Serialize + DeserializeOwned,
    R::Draft: Serialize,
    R::Patch: Serialize,
{
    async fn list(&self) -> Result<Vec<R>, TransportError> {
        let res = self.http.get(self.collection_url()).send().await?;
        let res = check_status(res)?;
        Ok(res.json().await?)
    }

    async fn create(&self, draft: &R::Draft) -> Result<R, TransportError> {
        let res = self
            .http
            .post(self.collection_url())
            .json(draft)
            .send()
            .await?;
        let res = check_status(res)?;
        Ok(res.json().await?)
    }

    async fn update(
        &self,
        id: EntityId,
        patch: &R::Patch,
    ) -> Result<Option<R>, TransportError> {
        let res = self
            .http
            .put(self.entity_url(id))
            .json(patch)
            .send()
            .await?;
        let res = check_status(res)?;

        // A confirmed update may come back with an empty body; the optimistic
        // row is authoritative then.
        let body = res.text().await?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| TransportError::Decode(e.to_string()))
    }

    async fn delete(&self, id: EntityId) -> Result<(), TransportError> {
        let res = self.http.delete(self.entity_url(id)).send().await?;
        check_status(res)?;
        Ok(())
    }
}
