//! folio-types - Shared data types for folio
//!
//! This crate contains pure data structures without heavy dependencies.
//! No tokio, no database driver - just serde-serializable types.
//!
//! Used by:
//! - folio-core (store, aggregator, layout engine)
//! - folio-web (JSON API)
//! - folio (CLI output)

pub mod analytics;
pub mod layout;

// Re-export analytics types
pub use analytics::{
    ActivityEntry, ActivityKind, CategoryPerformance, DailyViews, DashboardSnapshot, DateWindow,
    Overview, Period, TopContent, TrafficSource,
};

// Re-export layout types
pub use layout::{Dimensions, Layout, LayoutOutcome, Placement, SkipReason};
