//! In-memory record source for exercising sessions and commands without a network.

use crate::api::RecordSource;
use async_trait::async_trait;
use rosterdex_core::error::FetchError;
use rosterdex_core::page::PageResult;
use rosterdex_core::record::CanonicalRecord;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

type PageKey = (Option<String>, u32);

/// In-memory directory with per-page latency and scripted failures.
#[derive(Default)]
pub struct FakeSource {
    pages: HashMap<PageKey, Result<Vec<CanonicalRecord>, FetchError>>,
    totals: HashMap<Option<String>, u64>,
    latency: HashMap<PageKey, Duration>,
    names: HashMap<String, Vec<CanonicalRecord>>,
    name_failures: Mutex<HashMap<String, FetchError>>,
    calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn page(mut self, category: Option<&str>, page: u32, names: &[&str]) -> Self {
        let records = names
            .iter()
            .map(|name| CanonicalRecord {
                id: format!("{}-{name}", category.unwrap_or("all")),
                name: name.to_string(),
                category: category.unwrap_or("Abydos").to_string(),
                ..CanonicalRecord::default()
            })
            .collect();
        self.pages
            .insert((category.map(str::to_string), page), Ok(records));
        self
    }

    pub fn failing(mut self, category: Option<&str>, page: u32, error: FetchError) -> Self {
        self.pages
            .insert((category.map(str::to_string), page), Err(error));
        self
    }

    pub fn total(mut self, category: Option<&str>, total: u64) -> Self {
        self.totals.insert(category.map(str::to_string), total);
        self
    }

    pub fn slow(mut self, category: Option<&str>, page: u32, millis: u64) -> Self {
        self.latency.insert(
            (category.map(str::to_string), page),
            Duration::from_millis(millis),
        );
        self
    }

    pub fn named(mut self, query: &str, names: &[&str]) -> Self {
        let records = names.iter().map(|n| CanonicalRecord::named(*n)).collect();
        self.names.insert(query.to_string(), records);
        self
    }

    pub fn named_records(mut self, query: &str, records: Vec<CanonicalRecord>) -> Self {
        self.names.insert(query.to_string(), records);
        self
    }

    /// Fail the first search for `query`; later ones are answered normally.
    pub fn failing_name(self, query: &str, error: FetchError) -> Self {
        self.name_failures
            .lock()
            .unwrap()
            .insert(query.to_string(), error);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn serve(
        &self,
        category: Option<&str>,
        page: u32,
    ) -> Result<Vec<CanonicalRecord>, FetchError> {
        let key = (category.map(str::to_string), page);
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{page}", category.unwrap_or("all")));
        let delay = self
            .latency
            .get(&key)
            .copied()
            .unwrap_or(Duration::from_millis(10));
        tokio::time::sleep(delay).await;
        self.pages
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::from_status(404, "Not Found")))
    }
}

#[async_trait]
impl RecordSource for FakeSource {
    async fn fetch_page(&self, page: u32, per_page: u32) -> Result<PageResult, FetchError> {
        let items = self.serve(None, page).await?;
        let total = self.totals.get(&None).copied();
        Ok(PageResult::unfiltered(items, page, per_page, total))
    }

    async fn fetch_category_page(
        &self,
        category: &str,
        page: u32,
        per_page: u32,
    ) -> Result<PageResult, FetchError> {
        let items = self.serve(Some(category), page).await?;
        Ok(PageResult::category(items, page, per_page, None))
    }

    async fn fetch_by_name(&self, name: &str) -> Result<Vec<CanonicalRecord>, FetchError> {
        self.calls.lock().unwrap().push(format!("name:{name}"));
        tokio::time::sleep(Duration::from_millis(10)).await;
        if let Some(error) = self.name_failures.lock().unwrap().remove(name) {
            return Err(error);
        }
        Ok(self.names.get(name).cloned().unwrap_or_default())
    }
}

