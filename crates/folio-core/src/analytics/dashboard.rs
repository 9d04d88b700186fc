//! Dashboard snapshot aggregation

use super::source::AnalyticsSource;
use super::sources::rank_traffic_sources;
use super::window::{resolve_window, DashboardQuery};
use crate::config::AnalyticsConfig;
use crate::error::Result;
use chrono::{DateTime, NaiveDate, Utc};
use folio_types::{
    ActivityEntry, CategoryPerformance, DailyViews, DashboardSnapshot, DateWindow, Overview,
    TopContent,
};
use std::collections::HashMap;
use tracing::debug;

/// Compute a dashboard snapshot for the current time
pub fn compute_dashboard<S: AnalyticsSource>(
    source: &S,
    query: &DashboardQuery,
    config: &AnalyticsConfig,
) -> Result<DashboardSnapshot> {
    compute_dashboard_at(source, query, config, Utc::now())
}

/// Compute a dashboard snapshot with an injected clock
///
/// The query is fully validated before the source is touched. All queries run
/// inside one [`AnalyticsSource::read_consistent`] call, and any source failure
/// aborts the whole snapshot.
pub fn compute_dashboard_at<S: AnalyticsSource>(
    source: &S,
    query: &DashboardQuery,
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> Result<DashboardSnapshot> {
    let window = resolve_window(query, config, now)?;
    debug!(
        start = %window.start,
        end = %window.end,
        period = ?window.period,
        "Computing dashboard"
    );

    source.read_consistent(|reader| assemble(reader, window, config, now))
}

fn assemble(
    source: &dyn AnalyticsSource,
    window: DateWindow,
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> Result<DashboardSnapshot> {
    let views = source.view_totals(&window)?;
    let catalog = source.catalog_counts()?;
    let inquiries = source.inquiry_counts(&window)?;

    let overview = Overview {
        total_views: views.views,
        unique_visitors: views.unique_visitors,
        total_items: catalog.items,
        published_items: catalog.published_items,
        total_categories: catalog.categories,
        inquiries: inquiries.received,
        unread_inquiries: inquiries.unread,
    };

    let top_content = rank_top_content(
        source.item_views(&window, config.top_content_limit)?,
        config.top_content_limit,
    );
    let traffic_sources = rank_traffic_sources(&source.referrer_counts(&window)?);
    let category_performance = rank_categories(source.category_rollups(&window)?);
    let recent_activity = newest_first(
        source.recent_activity(&window, config.recent_activity_limit)?,
        &window,
        config.recent_activity_limit,
    );
    let daily_views = fill_daily_series(&window, source.daily_view_counts(&window)?);

    debug!(
        views = overview.total_views,
        top = top_content.len(),
        sources = traffic_sources.len(),
        days = daily_views.len(),
        "Dashboard computed"
    );

    Ok(DashboardSnapshot {
        window,
        overview,
        top_content,
        traffic_sources,
        category_performance,
        recent_activity,
        daily_views,
        generated_at: now,
    })
}

fn rank_top_content(mut rows: Vec<TopContent>, limit: usize) -> Vec<TopContent> {
    rows.retain(|row| row.views > 0);
    rows.sort_by(|a, b| {
        b.views
            .cmp(&a.views)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.item_id.cmp(&a.item_id))
    });
    rows.truncate(limit);
    rows
}

fn rank_categories(mut rows: Vec<CategoryPerformance>) -> Vec<CategoryPerformance> {
    rows.sort_by(|a, b| b.views.cmp(&a.views).then_with(|| a.name.cmp(&b.name)));
    rows
}

fn newest_first(
    mut entries: Vec<ActivityEntry>,
    window: &DateWindow,
    limit: usize,
) -> Vec<ActivityEntry> {
    entries.retain(|e| window.contains(&e.occurred_at));
    entries.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
    entries.truncate(limit);
    entries
}

/// One entry per calendar day of the window, gaps zero-filled
fn fill_daily_series(window: &DateWindow, counts: Vec<(NaiveDate, u64)>) -> Vec<DailyViews> {
    let mut by_day: HashMap<NaiveDate, u64> = HashMap::with_capacity(counts.len());
    for (day, views) in counts {
        *by_day.entry(day).or_default() += views;
    }

    window
        .days()
        .map(|date| DailyViews {
            date,
            views: by_day.get(&date).copied().unwrap_or(0),
        })
        .collect()
}
