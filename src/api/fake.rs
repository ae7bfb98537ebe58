//! In-memory backend used by unit tests

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::{ApiError, EmployeeApi};
use crate::types::{BasicInfo, Department, Details, Location};

#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<String>>,
    basic_info: Mutex<Vec<BasicInfo>>,
    details: Mutex<Vec<Details>>,
    departments: Vec<Department>,
    locations: Vec<Location>,
    failing: Mutex<HashSet<&'static str>>,
    latency: Duration,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_basic_info(self, records: Vec<BasicInfo>) -> Self {
        *self.basic_info.lock().unwrap() = records;
        self
    }

    pub fn with_details(self, records: Vec<Details>) -> Self {
        *self.details.lock().unwrap() = records;
        self
    }

    pub fn with_departments(mut self, names: &[&str]) -> Self {
        self.departments = names
            .iter()
            .enumerate()
            .map(|(i, name)| Department {
                id: i as u64 + 1,
                name: name.to_string(),
            })
            .collect();
        self
    }

    pub fn with_locations(mut self, names: &[&str]) -> Self {
        self.locations = names
            .iter()
            .enumerate()
            .map(|(i, name)| Location {
                id: i as u64 + 1,
                name: name.to_string(),
            })
            .collect();
        self
    }

    /// Delay every call, like the backend's injected POST latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make `endpoint` (e.g. `"POST /basicInfo"`) answer with a 500
    pub fn fail_on(&self, endpoint: &'static str) {
        self.failing.lock().unwrap().insert(endpoint);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub fn stored_basic_info(&self) -> Vec<BasicInfo> {
        self.basic_info.lock().unwrap().clone()
    }

    pub fn stored_details(&self) -> Vec<Details> {
        self.details.lock().unwrap().clone()
    }

    async fn enter(&self, endpoint: &'static str, call: String) -> Result<(), ApiError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.failing.lock().unwrap().contains(endpoint) {
            return Err(ApiError::http(endpoint, 500, "Internal Server Error"));
        }
        Ok(())
    }
}

fn matching<T: Clone>(items: &[T], name: impl Fn(&T) -> &str, query: &str) -> Vec<T> {
    let query = query.to_lowercase();
    items
        .iter()
        .filter(|item| name(item).to_lowercase().contains(&query))
        .cloned()
        .collect()
}

#[async_trait]
impl EmployeeApi for FakeApi {
    async fn list_basic_info(&self) -> Result<Vec<BasicInfo>, ApiError> {
        self.enter("GET /basicInfo", "GET /basicInfo".into()).await?;
        Ok(self.stored_basic_info())
    }

    async fn create_basic_info(&self, record: &BasicInfo) -> Result<BasicInfo, ApiError> {
        self.enter("POST /basicInfo", "POST /basicInfo".into())
            .await?;
        let mut stored = self.basic_info.lock().unwrap();
        let mut record = record.clone();
        record.id = Some(stored.len() as u64 + 1);
        stored.push(record.clone());
        Ok(record)
    }

    async fn list_details(&self) -> Result<Vec<Details>, ApiError> {
        self.enter("GET /details", "GET /details".into()).await?;
        Ok(self.stored_details())
    }

    async fn create_details(&self, record: &Details) -> Result<Details, ApiError> {
        self.enter("POST /details", "POST /details".into()).await?;
        let mut stored = self.details.lock().unwrap();
        let mut record = record.clone();
        record.id = Some(stored.len() as u64 + 1);
        stored.push(record.clone());
        Ok(record)
    }

    async fn search_departments(&self, query: &str) -> Result<Vec<Department>, ApiError> {
        self.enter(
            "GET /departments",
            format!("GET /departments?name_like={}", query),
        )
        .await?;
        Ok(matching(&self.departments, |d: &Department| d.name.as_str(), query))
    }

    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, ApiError> {
        self.enter("GET /locations", format!("GET /locations?name_like={}", query))
            .await?;
        Ok(matching(&self.locations, |l: &Location| l.name.as_str(), query))
    }
}
