//! CLI output formatting and demo seeding
//!
//! Renders dashboard snapshots and layouts with comfy-table, and fills an
//! empty store with demo content for `folio seed`.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};
use folio_core::models::{EventType, NewCategory, NewEvent, NewInquiry, NewItem};
use folio_core::{AnalyticsSource, PortfolioStore};
use folio_types::{DashboardSnapshot, LayoutOutcome};

// ============================================================================
// Dashboard
// ============================================================================

/// Format a dashboard snapshot as tables (human) or JSON
pub fn format_dashboard(snapshot: &DashboardSnapshot, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(snapshot).unwrap_or_else(|_| "{}".to_string());
    }

    let window = &snapshot.window;
    let mut out = Vec::new();
    out.push(format!(
        "folio dashboard: {} to {}{}",
        window.start.format("%Y-%m-%d %H:%M"),
        window.end.format("%Y-%m-%d %H:%M"),
        window
            .period
            .map(|p| format!(" ({})", p.label()))
            .unwrap_or_default()
    ));
    out.push(String::new());

    let o = &snapshot.overview;
    let mut overview = new_table(&["Metric", "Value"], no_color);
    for (metric, value) in [
        ("Page views", o.total_views),
        ("Unique visitors", o.unique_visitors),
        ("Portfolio items", o.total_items),
        ("Published items", o.published_items),
        ("Categories", o.total_categories),
        ("Inquiries received", o.inquiries),
        ("Unread inquiries", o.unread_inquiries),
    ] {
        overview.add_row(Row::from(vec![metric.to_string(), format_number(value)]));
    }
    out.push(overview.to_string());

    if snapshot.top_content.is_empty() {
        out.push("\nNo views in this window.".to_string());
    } else {
        let mut top = new_table(&["#", "Title", "Category", "Views"], no_color);
        for (rank, row) in snapshot.top_content.iter().enumerate() {
            top.add_row(Row::from(vec![
                (rank + 1).to_string(),
                truncate(&row.title, 40),
                row.category.clone().unwrap_or_else(|| "-".to_string()),
                format_number(row.views),
            ]));
        }
        out.push(format!("\nTop content\n{}", top));
    }

    if !snapshot.traffic_sources.is_empty() {
        let mut sources = new_table(&["Source", "Visits"], no_color);
        for row in &snapshot.traffic_sources {
            sources.add_row(Row::from(vec![
                truncate(&row.source, 40),
                format_number(row.visits),
            ]));
        }
        out.push(format!("\nTraffic sources\n{}", sources));
    }

    if !snapshot.category_performance.is_empty() {
        let mut categories = new_table(&["Category", "Items", "Views"], no_color);
        for row in &snapshot.category_performance {
            categories.add_row(Row::from(vec![
                row.name.clone(),
                row.items.to_string(),
                format_number(row.views),
            ]));
        }
        out.push(format!("\nCategories\n{}", categories));
    }

    let peak = snapshot
        .daily_views
        .iter()
        .map(|d| d.views)
        .max()
        .unwrap_or(0);
    let mut daily = new_table(&["Day", "Views", ""], no_color);
    for day in &snapshot.daily_views {
        daily.add_row(Row::from(vec![
            day.date.format("%Y-%m-%d").to_string(),
            format_number(day.views),
            bar(day.views, peak, 30),
        ]));
    }
    out.push(format!("\nDaily views\n{}", daily));

    if !snapshot.recent_activity.is_empty() {
        let mut activity = new_table(&["When", "Activity"], no_color);
        for entry in &snapshot.recent_activity {
            activity.add_row(Row::from(vec![
                entry.occurred_at.format("%Y-%m-%d %H:%M").to_string(),
                truncate(&entry.label, 50),
            ]));
        }
        out.push(format!("\nRecent activity\n{}", activity));
    }

    out.join("\n")
}

// ============================================================================
// Layout
// ============================================================================

/// Parse an aspect ratio: `1.5`, `3:2` or `1200x800`
pub fn parse_ratio(raw: &str) -> Result<f64> {
    let raw = raw.trim();
    let ratio = match raw.split_once([':', 'x', 'X']) {
        Some((w, h)) => {
            let w: f64 = w.trim().parse().with_context(|| format!("Invalid width in '{}'", raw))?;
            let h: f64 = h.trim().parse().with_context(|| format!("Invalid height in '{}'", raw))?;
            if h == 0.0 {
                bail!("Invalid ratio '{}': height is zero", raw);
            }
            w / h
        }
        None => raw
            .parse()
            .with_context(|| format!("Invalid ratio '{}' (expected 1.5, 3:2 or 1200x800)", raw))?,
    };

    if !(ratio.is_finite() && ratio > 0.0) {
        bail!("Invalid ratio '{}': must be positive", raw);
    }
    Ok(ratio)
}

/// Format a layout outcome as a placement table (human) or JSON
pub fn format_layout(outcome: &LayoutOutcome, json: bool, no_color: bool) -> String {
    if json {
        return serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string());
    }

    let layout = match outcome {
        LayoutOutcome::Laid(layout) => layout,
        LayoutOutcome::Skipped { reason } => return format!("Layout skipped: {:?}", reason),
    };

    let mut table = new_table(&["Card", "Column", "X", "Y", "Width", "Height"], no_color);
    for p in &layout.placements {
        table.add_row(Row::from(vec![
            p.id.clone(),
            p.column.to_string(),
            format!("{:.1}", p.x),
            format!("{:.1}", p.y),
            format!("{:.1}", p.width),
            format!("{:.1}", p.height),
        ]));
    }

    format!(
        "{} columns, {:.1}px wide, gap {}px, container height {:.1}px\n{}",
        layout.columns, layout.column_width, layout.gap, layout.container_height, table
    )
}

// ============================================================================
// Seeding
// ============================================================================

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: usize,
    pub items: usize,
    pub events: usize,
    pub inquiries: usize,
}

const DEMO_CATEGORIES: [&str; 4] = ["Weddings", "Portraits", "Travel", "Architecture"];

const DEMO_ITEMS: [(&str, usize, u32, u32, bool); 10] = [
    ("First Dance", 0, 1600, 1067, true),
    ("Confetti Exit", 0, 1067, 1600, false),
    ("Studio Light Study", 1, 1200, 1500, true),
    ("The Potter", 1, 1500, 1000, false),
    ("Harbour at Dusk", 2, 2000, 1125, true),
    ("Desert Road", 2, 1600, 900, false),
    ("Market Colours", 2, 1000, 1000, true),
    ("Concrete Curves", 3, 1200, 1800, true),
    ("Glass Atrium", 3, 1800, 1200, false),
    ("Spiral Stair", 3, 1000, 1500, false),
];

const DEMO_REFERRERS: [Option<&str>; 6] = [
    None,
    Some("https://www.google.com/search?q=wedding+photographer"),
    Some("https://www.instagram.com/"),
    Some("https://www.pinterest.com/pin/123"),
    Some("https://behance.net/gallery/42"),
    None,
];

/// Fill an empty store with demo content spread over the last 60 days
pub fn seed_demo(store: &PortfolioStore, now: DateTime<Utc>) -> Result<SeedReport> {
    let counts = store.catalog_counts()?;
    if counts.items > 0 || counts.categories > 0 {
        bail!(
            "Store already has {} categories and {} items; seed needs an empty database",
            counts.categories,
            counts.items
        );
    }

    let mut report = SeedReport::default();
    let origin = now - Duration::days(60);

    let mut category_ids = Vec::new();
    for (i, name) in DEMO_CATEGORIES.iter().enumerate() {
        let mut category = NewCategory::named(*name);
        category.sort_order = i as i64;
        category.created_at = Some(origin);
        category_ids.push(store.create_category(&category)?.id);
        report.categories += 1;
    }

    let mut item_ids = Vec::new();
    for (i, (title, category, width, height, featured)) in DEMO_ITEMS.iter().enumerate() {
        let mut item = NewItem::new(*title, format!("/uploads/demo-{}.jpg", i + 1))
            .in_category(category_ids[*category])
            .with_size(*width, *height)
            .created_at(origin + Duration::days(i as i64 * 5));
        if *featured {
            item = item.featured();
        }
        item_ids.push(store.create_item(&item)?.id);
        report.items += 1;
    }

    // Deterministic spread, busier towards the present
    for day in 0..60i64 {
        let views_today = 3 + (day % 7) as usize + (day as usize / 10);
        for n in 0..views_today {
            let slot = (day as usize * 7 + n * 3) % item_ids.len();
            let at = origin + Duration::days(day) + Duration::minutes((n as i64 * 97) % 1440);
            if at > now {
                continue;
            }
            let mut event = NewEvent::page_view(
                format!("demo-visitor-{}", (day as usize + n) % 40),
                format!("/work/{}", slot + 1),
            )
            .for_item(item_ids[slot])
            .at(at);
            event.referrer = DEMO_REFERRERS[(n + day as usize) % DEMO_REFERRERS.len()]
                .map(str::to_string);
            store.record_event(&event)?;
            report.events += 1;

            if n == 0 && day % 4 == 0 {
                store.record_event(
                    &NewEvent::page_view(format!("demo-visitor-{}", day % 40), "/contact")
                        .of_type(EventType::ContactClick)
                        .at(at),
                )?;
                report.events += 1;
            }
        }
    }

    let inquiries = [
        ("Maya", "maya@example.com", "Wedding in September", 5),
        ("Tom", "tom@example.com", "Headshots for the team", 17),
        ("Priya", "priya@example.com", "Hotel interiors", 41),
    ];
    for (name, email, subject, days_ago) in inquiries {
        store.create_inquiry(&NewInquiry {
            name: name.to_string(),
            email: email.to_string(),
            subject: subject.to_string(),
            message: format!("Hi, I'd like to talk about: {}", subject.to_lowercase()),
            received_at: Some(now - Duration::days(days_ago)),
        })?;
        report.inquiries += 1;
    }

    Ok(report)
}

// ============================================================================
// Helpers
// ============================================================================

fn new_table(headers: &[&str], no_color: bool) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    if no_color {
        table.set_header(headers.to_vec());
    } else {
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    }
    table
}

fn bar(value: u64, peak: u64, width: usize) -> String {
    if peak == 0 {
        return String::new();
    }
    let filled = ((value as f64 / peak as f64) * width as f64).round() as usize;
    "█".repeat(filled)
}

fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Truncate to `max` characters (not bytes)
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}
