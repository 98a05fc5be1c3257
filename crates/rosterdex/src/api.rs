//! Remote fetch adapter for the directory API

use crate::config::ApiConfig;
use crate::prelude::*;
use async_trait::async_trait;
use rosterdex_core::envelope::Envelope;
use rosterdex_core::error::FetchError;
use rosterdex_core::page::{FilterContext, PageRequest, PageResult};
use rosterdex_core::record::CanonicalRecord;

/// The three query shapes the directory API supports.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Page of all records.
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<PageResult, FetchError>;

    /// Page of records belonging to `category`.
    async fn fetch_category_page(
        &self,
        category: &str,
        page: u32,
        per_page: u32,
    ) -> Result<PageResult, FetchError>;

    /// Every record matching `name`, unpaginated.
    async fn fetch_by_name(&self, name: &str) -> Result<Vec<CanonicalRecord>, FetchError>;

    /// Dispatch a page request on its filter context.
    async fn fetch(&self, request: &PageRequest) -> Result<PageResult, FetchError> {
        match &request.context {
            FilterContext::All => self.fetch_page(request.page, request.per_page).await,
            FilterContext::Category(category) => {
                self.fetch_category_page(category, request.page, request.per_page)
                    .await
            }
        }
    }
}

/// [`RecordSource`] backed by the HTTP API.
#[derive(Debug, Clone)]
pub struct HttpRecordSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRecordSource {
    /// Create a client with the configured per-request timeout
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("rosterdex/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| eyre!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            url: config.records_url(),
        })
    }

    /// Issue one GET against the record endpoint and decode its envelope.
    async fn get_envelope(&self, params: &[(&str, String)]) -> Result<Envelope, FetchError> {
        log::debug!("GET {} {:?}", self.url, params);

        let response = self
            .client
            .get(&self.url)
            .query(params)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("request failed");
            log::warn!("GET {} {:?} failed with HTTP {}", self.url, params, status);
            return Err(FetchError::from_status(status.as_u16(), reason));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        Ok(Envelope::decode(body))
    }

    async fn get_page(&self, request: PageRequest) -> Result<PageResult, FetchError> {
        let envelope = self.get_envelope(&request.query_params()).await?;
        Ok(PageResult::from_envelope(&request, &envelope))
    }
}

fn transport_error(err: reqwest::Error) -> FetchError {
    if let Some(status) = err.status() {
        return FetchError::from_status(status.as_u16(), err.to_string());
    }
    if err.is_timeout() {
        return FetchError::Transport(format!("request timed out: {err}"));
    }
    FetchError::Transport(err.to_string())
}

#[async_trait]
impl RecordSource for HttpRecordSource {
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<PageResult, FetchError> {
        self.get_page(PageRequest {
            context: FilterContext::All,
            page,
            per_page,
        })
        .await
    }

    async fn fetch_category_page(
        &self,
        category: &str,
        page: u32,
        per_page: u32,
    ) -> Result<PageResult, FetchError> {
        self.get_page(PageRequest {
            context: FilterContext::Category(category.to_string()),
            page,
            per_page,
        })
        .await
    }

    async fn fetch_by_name(&self, name: &str) -> Result<Vec<CanonicalRecord>, FetchError> {
        let envelope = self.get_envelope(&[("name", name.to_string())]).await?;
        Ok(envelope.records())
    }
}
