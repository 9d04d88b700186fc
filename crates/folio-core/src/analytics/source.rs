//! Data-access capability consumed by the aggregator

use crate::error::Result;
use chrono::NaiveDate;
use folio_types::{ActivityEntry, CategoryPerformance, DateWindow, TopContent};

/// Page-view totals within a window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewTotals {
    pub views: u64,
    pub unique_visitors: u64,
}

/// Catalog sizes (not windowed)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogCounts {
    pub items: u64,
    pub published_items: u64,
    pub categories: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InquiryCounts {
    /// Received inside the window
    pub received: u64,
    /// Still in `new` status, regardless of when they arrived
    pub unread: u64,
}

/// Raw referrer as stored, with its page-view count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferrerCount {
    pub referrer: Option<String>,
    pub visits: u64,
}

/// Read-only queries the dashboard needs
///
/// Every windowed method treats both window bounds as inclusive. Only
/// `page_view` events count as views.
pub trait AnalyticsSource {
    fn view_totals(&self, window: &DateWindow) -> Result<ViewTotals>;

    fn catalog_counts(&self) -> Result<CatalogCounts>;

    fn inquiry_counts(&self, window: &DateWindow) -> Result<InquiryCounts>;

    /// Items with at least one view, ranked by views, newest, then id
    fn item_views(&self, window: &DateWindow, limit: usize) -> Result<Vec<TopContent>>;

    fn referrer_counts(&self, window: &DateWindow) -> Result<Vec<ReferrerCount>>;

    /// One row per category, including categories without views
    fn category_rollups(&self, window: &DateWindow) -> Result<Vec<CategoryPerformance>>;

    /// Views per UTC calendar day; days without views may be omitted
    fn daily_view_counts(&self, window: &DateWindow) -> Result<Vec<(NaiveDate, u64)>>;

    fn recent_activity(&self, window: &DateWindow, limit: usize) -> Result<Vec<ActivityEntry>>;

    /// Run every query in `read` against one unchanging view of the data.
    ///
    /// Sources that accept concurrent writes must override this so a
    /// snapshot never mixes rows from before and after a write.
    fn read_consistent<T>(
        &self,
        read: impl FnOnce(&dyn AnalyticsSource) -> Result<T>,
    ) -> Result<T>
    where
        Self: Sized,
    {
        read(self)
    }
}
