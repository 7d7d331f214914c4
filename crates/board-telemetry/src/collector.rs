//! Delivery of event batches to the collector endpoint.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::event::{AdEvent, CollectorPayload};
use crate::CollectorError;

/// One outbound collector request.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectRequest {
    pub payload: CollectorPayload,
    /// The send must outlive the caller (page unload).
    pub keepalive: bool,
}

impl CollectRequest {
    pub fn new(payload: CollectorPayload) -> Self {
        Self {
            payload,
            keepalive: false,
        }
    }

    pub fn keepalive(mut self) -> Self {
        self.keepalive = true;
        self
    }
}

/// Sink for event batches.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Deliver one request. Failures are reported, never retried here.
    async fn send(&self, request: &CollectRequest) -> Result<(), CollectorError>;
}

/// Collector that POSTs JSON to an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpCollector {
    client: reqwest::Client,
    url: String,
}

impl HttpCollector {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(
        client: reqwest::Client,
        url: String,
        payload: CollectorPayload,
    ) -> Result<(), CollectorError> {
        let response = client.post(&url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CollectorError::Status(status.as_u16()));
        }
        debug!(url = %url, events = payload.len(), "batch delivered");
        Ok(())
    }
}

#[async_trait]
impl Collector for HttpCollector {
    async fn send(&self, request: &CollectRequest) -> Result<(), CollectorError> {
        let fut = Self::post(
            self.client.clone(),
            self.url.clone(),
            request.payload.clone(),
        );

        if !request.keepalive {
            return fut.await;
        }

        // Detached so the request completes even if the caller is dropped.
        tokio::spawn(fut)
            .await
            .map_err(|e| CollectorError::Aborted(e.to_string()))?
    }
}

/// In-memory collector that records every request.
#[derive(Debug, Default)]
pub struct MemoryCollector {
    requests: Mutex<Vec<CollectRequest>>,
    failing: AtomicBool,
}

impl MemoryCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent sends fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Requests that were accepted.
    pub fn requests(&self) -> Vec<CollectRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// All accepted events, in delivery order.
    pub fn events(&self) -> Vec<AdEvent> {
        self.requests()
            .into_iter()
            .flat_map(|r| r.payload.into_events())
            .collect()
    }
}

#[async_trait]
impl Collector for MemoryCollector {
    async fn send(&self, request: &CollectRequest) -> Result<(), CollectorError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(CollectorError::Unavailable("memory collector offline".into()));
        }
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());
        Ok(())
    }
}
