//! Performance benchmarks for the dashboard aggregator
//!
//! compute_dashboard over an in-memory store with 1k, 10k and 50k page views
//! spread across 90 days.

use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use folio_core::analytics::{compute_dashboard_at, DashboardQuery};
use folio_core::models::{NewCategory, NewEvent, NewItem};
use folio_core::{AnalyticsConfig, PortfolioStore};

const REFERRERS: [Option<&str>; 4] = [
    None,
    Some("https://www.google.com/search"),
    Some("https://instagram.com/p/1"),
    Some("newsletter"),
];

/// Populate a store with `views` page views over 90 days
fn seeded_store(views: usize) -> PortfolioStore {
    let store = PortfolioStore::open_in_memory().unwrap();
    let now = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();

    let categories: Vec<i64> = ["Weddings", "Travel", "Portraits", "Events"]
        .into_iter()
        .map(|name| store.create_category(&NewCategory::named(name)).unwrap().id)
        .collect();

    let items: Vec<i64> = (0..40)
        .map(|i| {
            store
                .create_item(
                    &NewItem::new(format!("Item {}", i), format!("/img/{}.jpg", i))
                        .in_category(categories[i % categories.len()])
                        .created_at(now - Duration::days(120 - i as i64)),
                )
                .unwrap()
                .id
        })
        .collect();

    for i in 0..views {
        let mut event = NewEvent::page_view(format!("visitor-{}", i % 500), "/work")
            .for_item(items[i % items.len()])
            .at(now - Duration::minutes((i * 257 % (90 * 24 * 60)) as i64));
        event.referrer = REFERRERS[i % REFERRERS.len()].map(str::to_string);
        store.record_event(&event).unwrap();
    }

    store
}

fn dashboard_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("compute_dashboard");
    let now = Utc.with_ymd_and_hms(2024, 4, 1, 12, 0, 0).unwrap();
    let config = AnalyticsConfig::default();

    for views in [1_000, 10_000, 50_000] {
        let store = seeded_store(views);
        for period in ["7d", "90d"] {
            let query = DashboardQuery::for_period(period);
            group.bench_with_input(
                BenchmarkId::new(period, views),
                &query,
                |b, query| {
                    b.iter(|| {
                        black_box(compute_dashboard_at(&store, query, &config, now).unwrap());
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, dashboard_benchmark);
criterion_main!(benches);
