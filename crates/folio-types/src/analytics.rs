//! Dashboard snapshot types
//!
//! Everything here is derived data: a snapshot has no persistent identity and
//! is recomputed for every request.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Named reporting period accepted by the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Week, Period::Month, Period::Quarter, Period::Year];

    /// Parse the wire form (`7d`, `30d`, `90d`, `1y`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "7d" => Some(Period::Week),
            "30d" => Some(Period::Month),
            "90d" => Some(Period::Quarter),
            "1y" => Some(Period::Year),
            _ => None,
        }
    }

    /// Length of the period in days
    pub fn days(&self) -> i64 {
        match self {
            Period::Week => 7,
            Period::Month => 30,
            Period::Quarter => 90,
            Period::Year => 365,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Week => "7d",
            Period::Month => "30d",
            Period::Quarter => "90d",
            Period::Year => "1y",
        }
    }

    /// Human label for reports
    pub fn label(&self) -> String {
        match self {
            Period::Year => "Last 12 months".to_string(),
            other => format!("Last {} days", other.days()),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved, inclusive reporting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Set when the window was derived from a named period
    pub period: Option<Period>,
}

impl DateWindow {
    /// Calendar day of the window start
    pub fn first_day(&self) -> NaiveDate {
        self.start.date_naive()
    }

    /// Calendar day of the window end
    pub fn last_day(&self) -> NaiveDate {
        self.end.date_naive()
    }

    /// Number of calendar days touched by the window (inclusive)
    pub fn day_count(&self) -> usize {
        let span = (self.last_day() - self.first_day()).num_days();
        if span < 0 {
            0
        } else {
            span as usize + 1
        }
    }

    /// Every calendar day in the window, ascending
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.first_day().iter_days().take(self.day_count())
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        *ts >= self.start && *ts <= self.end
    }
}

/// Headline counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub total_views: u64,
    pub unique_visitors: u64,
    pub total_items: u64,
    pub published_items: u64,
    pub total_categories: u64,
    pub inquiries: u64,
    pub unread_inquiries: u64,
}

/// One row of the top-content ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopContent {
    pub item_id: i64,
    pub title: String,
    pub views: u64,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Visits grouped by normalised referrer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSource {
    pub source: String,
    pub visits: u64,
}

/// Per-category rollup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPerformance {
    pub category_id: i64,
    pub name: String,
    pub items: u64,
    pub views: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    PageView,
    Inquiry,
    ItemCreated,
}

/// Entry of the recent-activity feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub kind: ActivityKind,
    pub label: String,
    pub item_id: Option<i64>,
    pub occurred_at: DateTime<Utc>,
}

/// View count for a single calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyViews {
    pub date: NaiveDate,
    pub views: u64,
}

/// Complete dashboard payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub window: DateWindow,
    pub overview: Overview,
    pub top_content: Vec<TopContent>,
    pub traffic_sources: Vec<TrafficSource>,
    pub category_performance: Vec<CategoryPerformance>,
    pub recent_activity: Vec<ActivityEntry>,
    pub daily_views: Vec<DailyViews>,
    pub generated_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    /// Sum of the daily series (equals `overview.total_views` for page views)
    pub fn series_total(&self) -> u64 {
        self.daily_views.iter().map(|d| d.views).sum()
    }
}
