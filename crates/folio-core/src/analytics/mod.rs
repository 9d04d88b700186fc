//! Dashboard analytics for the portfolio site
//!
//! Turns raw tracking events, catalog rows and inquiries into a single
//! [`DashboardSnapshot`](folio_types::DashboardSnapshot) for a resolved date
//! window. Data access goes through [`AnalyticsSource`] so the aggregation can
//! run against the SQLite store or an in-memory fake.

pub mod dashboard;
pub mod source;
pub mod sources;
pub mod window;


pub use dashboard::{compute_dashboard, compute_dashboard_at};
pub use source::{AnalyticsSource, CatalogCounts, InquiryCounts, ReferrerCount, ViewTotals};
pub use sources::{normalise_referrer, rank_traffic_sources, DIRECT_SOURCE};
pub use window::{resolve_window, DashboardQuery};
