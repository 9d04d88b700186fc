//! Reporting window resolution
//!
//! Explicit dates win whenever either one is present; a named period only
//! applies when both are absent.

use crate::config::AnalyticsConfig;
use crate::error::{CoreError, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use folio_types::{DateWindow, Period};
use serde::Deserialize;

/// Raw dashboard parameters as received from a client
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub period: Option<String>,
}

impl DashboardQuery {
    pub fn for_period(period: impl Into<String>) -> Self {
        Self {
            period: Some(period.into()),
            ..Default::default()
        }
    }

    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start_date: Some(start.into()),
            end_date: Some(end.into()),
            period: None,
        }
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

impl Bound {
    fn field(self) -> &'static str {
        match self {
            Bound::Start => "startDate",
            Bound::End => "endDate",
        }
    }
}

/// Resolve a query into a concrete window relative to `now`
///
/// All parsing happens here so that malformed input is rejected before any
/// data access. Windows longer than `max_window_days` calendar days are
/// rejected.
pub fn resolve_window(
    query: &DashboardQuery,
    config: &AnalyticsConfig,
    now: DateTime<Utc>,
) -> Result<DateWindow> {
    let period = match present(&query.period) {
        Some(raw) => Some(Period::parse(raw).ok_or_else(|| CoreError::InvalidPeriod {
            value: raw.to_string(),
        })?),
        None => None,
    };
    let start = present(&query.start_date)
        .map(|raw| parse_bound(raw, Bound::Start))
        .transpose()?;
    let end = present(&query.end_date)
        .map(|raw| parse_bound(raw, Bound::End))
        .transpose()?;

    let window = match (start, end) {
        (None, None) => {
            let period = period.unwrap_or(config.default_period);
            DateWindow {
                start: days_before(now, period.days())?,
                end: now,
                period: Some(period),
            }
        }
        (start, end) => {
            let end = end.unwrap_or(now);
            let start = match start {
                Some(start) => start,
                None => days_before(end, period.unwrap_or(config.default_period).days())?,
            };
            DateWindow {
                start,
                end,
                period: None,
            }
        }
    };

    if window.start > window.end {
        return Err(CoreError::InvalidWindow {
            message: format!(
                "start {} is after end {}",
                window.start.to_rfc3339(),
                window.end.to_rfc3339()
            ),
        });
    }
    if window.day_count() > config.max_window_days {
        return Err(CoreError::InvalidWindow {
            message: format!(
                "{} days requested, at most {} allowed",
                window.day_count(),
                config.max_window_days
            ),
        });
    }
    Ok(window)
}

fn days_before(ts: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
    ts.checked_sub_signed(Duration::days(days))
        .ok_or_else(|| CoreError::InvalidWindow {
            message: format!("{} days before {} is out of range", days, ts.to_rfc3339()),
        })
}

fn present(raw: &Option<String>) -> Option<&str> {
    raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_bound(raw: &str, bound: Bound) -> Result<DateTime<Utc>> {
    let invalid = || CoreError::InvalidDate {
        field: bound.field(),
        value: raw.to_string(),
    };

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| invalid())?;
    // %Y also takes signed and 5+ digit years
    if !(0..=9999).contains(&date.year()) {
        return Err(invalid());
    }
    let time = match bound {
        Bound::Start => NaiveTime::MIN,
        Bound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999).ok_or_else(invalid)?,
    };
    Ok(date.and_time(time).and_utc())
}
