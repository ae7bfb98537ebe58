//! Client for the employee backend collections
//!
//! Two services back the app: the basic-info service (`/basicInfo`, `/departments`)
//! and the details service (`/details`, `/locations`). Both are reached through the
//! [`EmployeeApi`] trait so the wizard and the listing can run against a fake in tests.

pub mod client;
pub mod error;
#[cfg(test)]
pub(crate) mod fake;

pub use client::HttpEmployeeApi;
pub use error::ApiError;

use async_trait::async_trait;

use crate::types::{BasicInfo, Department, Details, Location};

/// Remote operations the app needs from the backend
#[async_trait]
pub trait EmployeeApi: Send + Sync {
    /// `GET /basicInfo`
    async fn list_basic_info(&self) -> Result<Vec<BasicInfo>, ApiError>;

    /// `POST /basicInfo`, returns the stored record (with its id)
    async fn create_basic_info(&self, record: &BasicInfo) -> Result<BasicInfo, ApiError>;

    /// `GET /details`
    async fn list_details(&self) -> Result<Vec<Details>, ApiError>;

    /// `POST /details`, returns the stored record (with its id)
    async fn create_details(&self, record: &Details) -> Result<Details, ApiError>;

    /// `GET /departments?name_like=<query>`
    async fn search_departments(&self, query: &str) -> Result<Vec<Department>, ApiError>;

    /// `GET /locations?name_like=<query>`
    async fn search_locations(&self, query: &str) -> Result<Vec<Location>, ApiError>;
}
