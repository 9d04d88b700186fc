//! folio-core - Core library for folio
//!
//! Provides the portfolio store, the dashboard analytics aggregator and the
//! masonry gallery layout engine.

pub mod analytics;
pub mod config;
pub mod error;
pub mod event;
pub mod masonry;
pub mod models;
pub mod store;

pub use analytics::{compute_dashboard, compute_dashboard_at, AnalyticsSource, DashboardQuery};
pub use config::{AnalyticsConfig, FolioConfig, ServerConfig};
pub use error::{CoreError, Result};
pub use event::{DataEvent, EventBus};
pub use masonry::{compute_layout, LayoutInput, MasonryConfig, MasonryEngine};
pub use store::PortfolioStore;
