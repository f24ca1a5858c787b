pub mod assertions;
pub mod builders;

use anyhow::Context as _;
use axum::{
    body::{Body, Bytes},
    http::{HeaderMap, Method, Request, StatusCode},
    Router,
};
use gentree_search::MemoryCollection;
use gentree_server::{api::create_router, AppState, Config};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt as _;

pub use assertions::*;
pub use builders::*;

/// Router over an in-memory person collection.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub persons: MemoryCollection,
}

impl TestApp {
    pub fn new(persons: Vec<Value>) -> anyhow::Result<Self> {
        Self::new_with_config(persons, |_| {})
    }

    pub fn new_with_config(
        persons: Vec<Value>,
        configure: impl FnOnce(&mut Config),
    ) -> anyhow::Result<Self> {
        let mut config = Config::defaults();
        configure(&mut config);

        let collection = MemoryCollection::new();
        for person in persons {
            let record = person
                .as_object()
                .cloned()
                .context("person fixture is a JSON object")?;
            collection.insert(record);
        }

        let state = AppState::with_collection(config, Arc::new(collection.clone()))
            .context("initialize AppState")?;
        let router = create_router(state.clone());

        Ok(Self {
            router,
            state,
            persons: collection,
        })
    }

    pub async fn get(&self, path_and_query: &str) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        self.get_with_headers(path_and_query, &[]).await
    }

    pub async fn get_with_headers(
        &self,
        path_and_query: &str,
        extra_headers: &[(&str, &str)],
    ) -> anyhow::Result<(StatusCode, HeaderMap, Bytes)> {
        let mut builder = Request::builder()
            .method(Method::GET)
            .uri(path_and_query)
            .header("host", "example.org");
        for (name, value) in extra_headers {
            builder = builder.header(*name, *value);
        }
        let request = builder.body(Body::empty()).context("build request")?;

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .context("dispatch request")?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .context("read response body")?;

        Ok((status, headers, body))
    }

    /// GET and decode the JSON body.
    pub async fn get_json(&self, path_and_query: &str) -> anyhow::Result<(StatusCode, Value)> {
        let (status, _, body) = self.get(path_and_query).await?;
        let json = serde_json::from_slice(&body)
            .with_context(|| format!("response body is JSON: {}", String::from_utf8_lossy(&body)))?;
        Ok((status, json))
    }
}
