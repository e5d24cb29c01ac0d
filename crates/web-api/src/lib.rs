//! HTTP surface of the flarewatch dashboard.
//!
//! [`DashboardService`] fetches both feeds concurrently, caches merged
//! datasets and projections, and hands them to the analytics core;
//! [`ApiServer`] exposes it as a JSON API under `/api`.

pub mod cache;
pub mod handlers;
pub mod server;
pub mod service;

pub use cache::TtlCache;
pub use handlers::ApiError;
pub use server::ApiServer;
pub use service::{DashboardService, Dataset, HealthReport, SourceStatus, SummaryReport};
