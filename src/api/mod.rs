//! REST client for the BidWaves backend.
//!
//! The backend is an external collaborator: collection endpoints answer
//! `GET <endpoint>?<query>` with `{ list, total }`, and item sub-paths accept
//! `PATCH`/`DELETE`. This module owns the HTTP details and error
//! classification; list controllers only see the [`ListSource`] trait.

pub mod error;
pub mod resources;

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{self, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::Config;
use crate::error::{BidwavesError, Result};
use crate::list::builder::encode_component;
use crate::session::Session;

pub use error::ApiError;
pub use resources::{Billing, Campaign, Order, Product, Resource, ResourceKind, Suggestion};

/// One page of a collection, as served by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub list: Vec<T>,
    #[serde(default)]
    pub total: u64,
}

impl<T> ListPage<T> {
    pub fn empty() -> Self {
        Self {
            list: Vec::new(),
            total: 0,
        }
    }
}

/// Remote operations a list controller needs for one collection.
pub trait ListSource<T: Resource>: Send + Sync + 'static {
    /// Fetch the page described by a fully-built request path.
    fn fetch(
        &self,
        path: &str,
    ) -> impl Future<Output = std::result::Result<ListPage<T>, ApiError>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = std::result::Result<(), ApiError>> + Send;

    /// Apply a partial update and return the record as stored by the server.
    fn update(
        &self,
        id: &str,
        changes: &serde_json::Value,
    ) -> impl Future<Output = std::result::Result<T, ApiError>> + Send;
}

pub struct ApiClient {
    client: Client,
    base_url: String,
    session: Arc<dyn Session>,
}

impl ApiClient {
    /// Create a client for `base_url`.
    ///
    /// Without `timeout` the HTTP client's defaults apply.
    pub fn new(
        base_url: &str,
        session: Arc<dyn Session>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let parsed = Url::parse(base_url).map_err(|e| {
            BidwavesError::Config(format!("invalid api.base_url '{base_url}': {e}"))
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BidwavesError::Other(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn from_config(config: &Config, session: Arc<dyn Session>) -> Result<Self> {
        Self::new(&config.base_url(), session, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Typed view of one collection, usable as a [`ListSource`].
    pub fn resource<T: Resource>(self: &Arc<Self>) -> ResourceSource<T> {
        ResourceSource {
            client: Arc::clone(self),
            _marker: PhantomData,
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "api request");

        let mut builder = self
            .client
            .request(method, url)
            .header(header::ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = self.session.token() {
            match HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    builder = builder.header(header::AUTHORIZATION, value);
                }
                Err(_) => {
                    tracing::warn!("stored token is not a valid header value, sending without it")
                }
            }
        }
        builder
    }

    /// Send a request and turn non-success statuses into [`ApiError`]s.
    async fn send(&self, builder: RequestBuilder) -> std::result::Result<Response, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                tracing::debug!(status = status.as_u16(), error = %err, "failed to read error body");
                Default::default()
            }
        };
        let err = ApiError::from_response(status, &body);
        tracing::warn!(status = status.as_u16(), error = %err, "api request failed");
        Err(err)
    }

    async fn json<T: DeserializeOwned>(response: Response) -> std::result::Result<T, ApiError> {
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// `GET` a collection page. `path` already carries the query string.
    pub async fn list<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> std::result::Result<ListPage<T>, ApiError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Self::json(response).await
    }

    pub async fn create<T, B>(&self, endpoint: &str, body: &B) -> std::result::Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let response = self
            .send(self.request(Method::POST, endpoint).json(body))
            .await?;
        Self::json(response).await
    }

    pub async fn update<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        id: &str,
        changes: &serde_json::Value,
    ) -> std::result::Result<T, ApiError> {
        let path = item_path(endpoint, id);
        let response = self
            .send(self.request(Method::PATCH, &path).json(changes))
            .await?;
        Self::json(response).await
    }

    /// `DELETE` a record. The success body is ignored.
    pub async fn delete(&self, endpoint: &str, id: &str) -> std::result::Result<(), ApiError> {
        let path = item_path(endpoint, id);
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}

/// `<endpoint>/<encoded id>`
pub fn item_path(endpoint: &str, id: &str) -> String {
    format!("{}/{}", endpoint.trim_end_matches('/'), encode_component(id))
}

/// [`ApiClient`] bound to the collection of `T`.
pub struct ResourceSource<T> {
    client: Arc<ApiClient>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for ResourceSource<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            _marker: PhantomData,
        }
    }
}

impl<T: Resource> ListSource<T> for ResourceSource<T> {
    async fn fetch(&self, path: &str) -> std::result::Result<ListPage<T>, ApiError> {
        self.client.list(path).await
    }

    async fn delete(&self, id: &str) -> std::result::Result<(), ApiError> {
        self.client.delete(T::ENDPOINT, id).await
    }

    async fn update(
        &self,
        id: &str,
        changes: &serde_json::Value,
    ) -> std::result::Result<T, ApiError> {
        self.client.update(T::ENDPOINT, id, changes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Anonymous;

    #[test]
    fn test_list_page_decodes_missing_total() {
        let page: ListPage<Order> =
            serde_json::from_str(r#"{"list": [{"id": 1, "name": "Spring"}]}"#).unwrap();
        assert_eq!(page.list.len(), 1);
        assert_eq!(page.total, 0);
    }

    #[test]
    fn test_item_path_encodes_id() {
        assert_eq!(item_path("/order", "42"), "/order/42");
        assert_eq!(item_path("/order/", "a b/c"), "/order/a%20b%2Fc");
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = ApiClient::new(
            "https://api.bidwaves.example/v1/",
            Arc::new(Anonymous),
            None,
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://api.bidwaves.example/v1");
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        let result = ApiClient::new("not a url", Arc::new(Anonymous), None);
        assert!(matches!(result, Err(BidwavesError::Config(_))));
    }
}
