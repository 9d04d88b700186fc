//! SQLite-backed portfolio store
//!
//! Holds categories, portfolio items, tracking events and inquiries, and
//! answers the dashboard's [`AnalyticsSource`] queries.
//!
//! Schema:
//! - categories, portfolio_items, analytics_events, inquiries
//! - store_metadata: key/value table carrying the schema version
//! - Indexes: analytics_events(created_at), analytics_events(item_id),
//!   portfolio_items(category_id), inquiries(created_at)
//!
//! Timestamps are UTC RFC 3339 with millisecond precision and a `Z` suffix,
//! so string comparison in SQL matches chronological order.

use crate::analytics::{AnalyticsSource, CatalogCounts, InquiryCounts, ReferrerCount, ViewTotals};
use crate::error::{CoreError, Result};
use crate::event::{DataEvent, EventBus};
use crate::models::{
    AnalyticsEvent, Category, EventType, Inquiry, InquiryStatus, NewCategory, NewEvent, NewInquiry,
    NewItem, PortfolioItem,
};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use folio_types::{ActivityEntry, ActivityKind, CategoryPerformance, DateWindow, TopContent};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Current schema version
///
/// Version History:
/// - v1: categories, portfolio_items, analytics_events, inquiries
const SCHEMA_VERSION: i32 = 1;

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS store_metadata (
        key TEXT PRIMARY KEY,
        value INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        description TEXT,
        sort_order INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS portfolio_items (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        slug TEXT NOT NULL UNIQUE,
        description TEXT,
        category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
        image_url TEXT NOT NULL,
        image_width INTEGER,
        image_height INTEGER,
        featured INTEGER NOT NULL DEFAULT 0,
        published INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS analytics_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event_type TEXT NOT NULL,
        item_id INTEGER REFERENCES portfolio_items(id) ON DELETE SET NULL,
        visitor_id TEXT NOT NULL,
        path TEXT NOT NULL,
        referrer TEXT,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS inquiries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        subject TEXT NOT NULL DEFAULT '',
        message TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'new',
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_events_created ON analytics_events(created_at);
    CREATE INDEX IF NOT EXISTS idx_events_item ON analytics_events(item_id);
    CREATE INDEX IF NOT EXISTS idx_items_category ON portfolio_items(category_id);
    CREATE INDEX IF NOT EXISTS idx_inquiries_created ON inquiries(created_at);
"#;

const CATEGORY_COLUMNS: &str = "id, name, slug, description, sort_order, created_at";
const ITEM_COLUMNS: &str = "id, title, slug, description, category_id, image_url, \
     image_width, image_height, featured, published, created_at";
const INQUIRY_COLUMNS: &str = "id, name, email, subject, message, status, created_at";

/// Portfolio store (thread-safe)
pub struct PortfolioStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
    events: EventBus,
}

impl PortfolioStore {
    /// Create or open the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::StoreUnavailable {
                reason: format!("cannot create {}: {}", parent.display(), e),
            })?;
        }

        let conn = Connection::open(path).map_err(CoreError::database("open database"))?;

        // WAL lets dashboard reads run alongside event inserts
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(CoreError::database("enable WAL"))?;

        let store = Self::init(conn, Some(path.to_path_buf()))?;
        info!(path = %path.display(), "Portfolio store opened");
        Ok(store)
    }

    /// Private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(CoreError::database("open database"))?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(CoreError::database("enable foreign keys"))?;
        conn.execute_batch(SCHEMA)
            .map_err(CoreError::database("create schema"))?;

        let stored_version: Option<i32> = conn
            .query_row(
                "SELECT value FROM store_metadata WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(CoreError::database("read schema version"))?;

        match stored_version {
            None => {
                conn.execute(
                    "INSERT INTO store_metadata (key, value) VALUES ('schema_version', ?)",
                    params![SCHEMA_VERSION],
                )
                .map_err(CoreError::database("write schema version"))?;
                debug!("Schema version initialized to {}", SCHEMA_VERSION);
            }
            Some(v) if v > SCHEMA_VERSION => {
                return Err(CoreError::StoreUnavailable {
                    reason: format!(
                        "database schema v{} is newer than supported v{}",
                        v, SCHEMA_VERSION
                    ),
                });
            }
            Some(v) => {
                debug!("Schema version {} matches current", v);
            }
        }

        Ok(Self {
            conn: Mutex::new(conn),
            path,
            events: EventBus::default_capacity(),
        })
    }

    /// Database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Bus carrying a [`DataEvent`] for every successful write
    pub fn event_bus(&self) -> &EventBus {
        &self.events
    }

    // ===================
    // Categories
    // ===================

    pub fn create_category(&self, new: &NewCategory) -> Result<Category> {
        new.validate()?;
        let slug = new.resolved_slug();
        let created_at = new.created_at.unwrap_or_else(Utc::now);

        let conn = self.conn.lock();
        ensure_slug_free(&conn, "categories", &slug)?;
        conn.execute(
            "INSERT INTO categories (name, slug, description, sort_order, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                new.name.trim(),
                slug,
                new.description,
                new.sort_order,
                encode_ts(&created_at)
            ],
        )
        .map_err(CoreError::database("insert category"))?;
        let id = conn.last_insert_rowid();
        drop(conn);

        debug!(id, slug = %slug, "Category created");
        self.events.publish(DataEvent::CategoryCreated(id));

        Ok(Category {
            id,
            name: new.name.trim().to_string(),
            slug,
            description: new.description.clone(),
            sort_order: new.sort_order,
            created_at: truncate_ms(created_at),
        })
    }

    /// All categories by sort order, then name
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM categories ORDER BY sort_order, name",
                CATEGORY_COLUMNS
            ))
            .map_err(CoreError::database("prepare category list"))?;
        let rows = stmt
            .query_map([], category_from_row)
            .map_err(CoreError::database("list categories"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(CoreError::database("read category row"))
    }

    pub fn category_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {} FROM categories WHERE slug = ?", CATEGORY_COLUMNS),
            params![slug],
            category_from_row,
        )
        .optional()
        .map_err(CoreError::database("find category"))
    }

    // ===================
    // Portfolio items
    // ===================

    pub fn create_item(&self, new: &NewItem) -> Result<PortfolioItem> {
        new.validate()?;
        let slug = new.resolved_slug();
        let created_at = new.created_at.unwrap_or_else(Utc::now);

        let conn = self.conn.lock();
        ensure_slug_free(&conn, "portfolio_items", &slug)?;
        if let Some(category_id) = new.category_id {
            ensure_exists(&conn, "categories", category_id, "categoryId")?;
        }
        conn.execute(
            "INSERT INTO portfolio_items
             (title, slug, description, category_id, image_url, image_width, image_height,
              featured, published, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                new.title.trim(),
                slug,
                new.description,
                new.category_id,
                new.image_url,
                new.image_width,
                new.image_height,
                new.featured,
                new.published,
                encode_ts(&created_at)
            ],
        )
        .map_err(CoreError::database("insert item"))?;
        let id = conn.last_insert_rowid();
        drop(conn);

        debug!(id, slug = %slug, "Portfolio item created");
        self.events.publish(DataEvent::ItemCreated(id));

        Ok(PortfolioItem {
            id,
            title: new.title.trim().to_string(),
            slug,
            description: new.description.clone(),
            category_id: new.category_id,
            image_url: new.image_url.clone(),
            image_width: new.image_width,
            image_height: new.image_height,
            featured: new.featured,
            published: new.published,
            created_at: truncate_ms(created_at),
        })
    }

    pub fn get_item(&self, id: i64) -> Result<Option<PortfolioItem>> {
        let conn = self.conn.lock();
        conn.query_row(
            &format!("SELECT {} FROM portfolio_items WHERE id = ?", ITEM_COLUMNS),
            params![id],
            item_from_row,
        )
        .optional()
        .map_err(CoreError::database("get item"))
    }

    /// Items newest first, optionally restricted to one category
    ///
    /// An unknown category slug is a [`CoreError::NotFound`].
    pub fn list_items(
        &self,
        category_slug: Option<&str>,
        published_only: bool,
    ) -> Result<Vec<PortfolioItem>> {
        let category_id = match category_slug {
            Some(slug) => Some(
                self.category_by_slug(slug)?
                    .ok_or_else(|| CoreError::NotFound {
                        entity: "category",
                        key: slug.to_string(),
                    })?
                    .id,
            ),
            None => None,
        };

        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM portfolio_items
                 WHERE (?1 IS NULL OR category_id = ?1)
                   AND (?2 = 0 OR published = 1)
                 ORDER BY created_at DESC, id DESC",
                ITEM_COLUMNS
            ))
            .map_err(CoreError::database("prepare item list"))?;
        let rows = stmt
            .query_map(params![category_id, published_only], item_from_row)
            .map_err(CoreError::database("list items"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(CoreError::database("read item row"))
    }

    /// Most recent `limit` featured, published items
    pub fn featured_items(&self, limit: usize) -> Result<Vec<PortfolioItem>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM portfolio_items
                 WHERE featured = 1 AND published = 1
                 ORDER BY created_at DESC, id DESC
                 LIMIT ?1",
                ITEM_COLUMNS
            ))
            .map_err(CoreError::database("prepare featured list"))?;
        let rows = stmt
            .query_map(params![limit as i64], item_from_row)
            .map_err(CoreError::database("list featured items"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(CoreError::database("read item row"))
    }

    // ===================
    // Tracking events
    // ===================

    pub fn record_event(&self, new: &NewEvent) -> Result<AnalyticsEvent> {
        new.validate()?;
        let created_at = new.occurred_at.unwrap_or_else(Utc::now);
        let referrer = new
            .referrer
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);

        let conn = self.conn.lock();
        if let Some(item_id) = new.item_id {
            ensure_exists(&conn, "portfolio_items", item_id, "itemId")?;
        }
        conn.execute(
            "INSERT INTO analytics_events (event_type, item_id, visitor_id, path, referrer, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.event_type.as_str(),
                new.item_id,
                new.visitor_id,
                new.path,
                referrer,
                encode_ts(&created_at)
            ],
        )
        .map_err(CoreError::database("insert event"))?;
        let id = conn.last_insert_rowid();
        drop(conn);

        self.events.publish(match new.event_type {
            EventType::PageView => DataEvent::ViewRecorded {
                item_id: new.item_id,
            },
            other => DataEvent::EventRecorded {
                event_type: other.as_str().to_string(),
            },
        });

        Ok(AnalyticsEvent {
            id,
            event_type: new.event_type,
            item_id: new.item_id,
            visitor_id: new.visitor_id.clone(),
            path: new.path.clone(),
            referrer,
            created_at: truncate_ms(created_at),
        })
    }

    // ===================
    // Inquiries
    // ===================

    pub fn create_inquiry(&self, new: &NewInquiry) -> Result<Inquiry> {
        new.validate()?;
        let created_at = new.received_at.unwrap_or_else(Utc::now);

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO inquiries (name, email, subject, message, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                new.name.trim(),
                new.email.trim(),
                new.subject.trim(),
                new.message,
                InquiryStatus::New.as_str(),
                encode_ts(&created_at)
            ],
        )
        .map_err(CoreError::database("insert inquiry"))?;
        let id = conn.last_insert_rowid();
        drop(conn);

        info!(id, "Inquiry received");
        self.events.publish(DataEvent::InquiryReceived(id));

        Ok(Inquiry {
            id,
            name: new.name.trim().to_string(),
            email: new.email.trim().to_string(),
            subject: new.subject.trim().to_string(),
            message: new.message.clone(),
            status: InquiryStatus::New,
            created_at: truncate_ms(created_at),
        })
    }

    pub fn set_inquiry_status(&self, id: i64, status: InquiryStatus) -> Result<Inquiry> {
        let conn = self.conn.lock();
        let changed = conn
            .execute(
                "UPDATE inquiries SET status = ?1 WHERE id = ?2",
                params![status.as_str(), id],
            )
            .map_err(CoreError::database("update inquiry"))?;
        if changed == 0 {
            return Err(CoreError::NotFound {
                entity: "inquiry",
                key: id.to_string(),
            });
        }
        conn.query_row(
            &format!("SELECT {} FROM inquiries WHERE id = ?", INQUIRY_COLUMNS),
            params![id],
            inquiry_from_row,
        )
        .map_err(CoreError::database("get inquiry"))
    }

    /// Inquiries newest first, optionally filtered by status
    pub fn list_inquiries(&self, status: Option<InquiryStatus>) -> Result<Vec<Inquiry>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM inquiries
                 WHERE (?1 IS NULL OR status = ?1)
                 ORDER BY created_at DESC, id DESC",
                INQUIRY_COLUMNS
            ))
            .map_err(CoreError::database("prepare inquiry list"))?;
        let rows = stmt
            .query_map(params![status.map(|s| s.as_str())], inquiry_from_row)
            .map_err(CoreError::database("list inquiries"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(CoreError::database("read inquiry row"))
    }
}

impl PortfolioStore {
    fn with_reader<T>(&self, read: impl FnOnce(&StoreReader<'_>) -> Result<T>) -> Result<T> {
        let conn = self.conn.lock();
        read(&StoreReader { conn: &conn })
    }
}

impl AnalyticsSource for PortfolioStore {
    fn view_totals(&self, window: &DateWindow) -> Result<ViewTotals> {
        self.with_reader(|r| r.view_totals(window))
    }

    fn catalog_counts(&self) -> Result<CatalogCounts> {
        self.with_reader(|r| r.catalog_counts())
    }

    fn inquiry_counts(&self, window: &DateWindow) -> Result<InquiryCounts> {
        self.with_reader(|r| r.inquiry_counts(window))
    }

    fn item_views(&self, window: &DateWindow, limit: usize) -> Result<Vec<TopContent>> {
        self.with_reader(|r| r.item_views(window, limit))
    }

    fn referrer_counts(&self, window: &DateWindow) -> Result<Vec<ReferrerCount>> {
        self.with_reader(|r| r.referrer_counts(window))
    }

    fn category_rollups(&self, window: &DateWindow) -> Result<Vec<CategoryPerformance>> {
        self.with_reader(|r| r.category_rollups(window))
    }

    fn daily_view_counts(&self, window: &DateWindow) -> Result<Vec<(NaiveDate, u64)>> {
        self.with_reader(|r| r.daily_view_counts(window))
    }

    fn recent_activity(&self, window: &DateWindow, limit: usize) -> Result<Vec<ActivityEntry>> {
        self.with_reader(|r| r.recent_activity(window, limit))
    }

    /// Holds the connection lock inside one deferred read transaction, so
    /// neither this process nor another writer can change rows mid-snapshot.
    fn read_consistent<T>(
        &self,
        read: impl FnOnce(&dyn AnalyticsSource) -> Result<T>,
    ) -> Result<T> {
        let mut conn = self.conn.lock();
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .map_err(CoreError::database("begin read transaction"))?;
        let result = read(&StoreReader { conn: &tx })?;
        tx.commit()
            .map_err(CoreError::database("end read transaction"))?;
        Ok(result)
    }
}

/// Query side of the store, bound to a connection that is already locked
struct StoreReader<'a> {
    conn: &'a Connection,
}

impl AnalyticsSource for StoreReader<'_> {
    fn view_totals(&self, window: &DateWindow) -> Result<ViewTotals> {
        let (start, end) = window_bounds(window);
        let conn = self.conn;
        conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT visitor_id) FROM analytics_events
             WHERE event_type = 'page_view' AND created_at BETWEEN ?1 AND ?2",
            params![start, end],
            |row| {
                Ok(ViewTotals {
                    views: count(row, 0)?,
                    unique_visitors: count(row, 1)?,
                })
            },
        )
        .map_err(CoreError::database("count views"))
    }

    fn catalog_counts(&self) -> Result<CatalogCounts> {
        let conn = self.conn;
        conn.query_row(
            "SELECT (SELECT COUNT(*) FROM portfolio_items),
                    (SELECT COUNT(*) FROM portfolio_items WHERE published = 1),
                    (SELECT COUNT(*) FROM categories)",
            [],
            |row| {
                Ok(CatalogCounts {
                    items: count(row, 0)?,
                    published_items: count(row, 1)?,
                    categories: count(row, 2)?,
                })
            },
        )
        .map_err(CoreError::database("count catalog"))
    }

    fn inquiry_counts(&self, window: &DateWindow) -> Result<InquiryCounts> {
        let (start, end) = window_bounds(window);
        let conn = self.conn;
        conn.query_row(
            "SELECT (SELECT COUNT(*) FROM inquiries WHERE created_at BETWEEN ?1 AND ?2),
                    (SELECT COUNT(*) FROM inquiries WHERE status = 'new')",
            params![start, end],
            |row| {
                Ok(InquiryCounts {
                    received: count(row, 0)?,
                    unread: count(row, 1)?,
                })
            },
        )
        .map_err(CoreError::database("count inquiries"))
    }

    fn item_views(&self, window: &DateWindow, limit: usize) -> Result<Vec<TopContent>> {
        let (start, end) = window_bounds(window);
        let conn = self.conn;
        let mut stmt = conn
            .prepare(
                "SELECT i.id, i.title, COUNT(e.id) AS views, c.name, i.created_at
                 FROM analytics_events e
                 JOIN portfolio_items i ON i.id = e.item_id
                 LEFT JOIN categories c ON c.id = i.category_id
                 WHERE e.event_type = 'page_view' AND e.created_at BETWEEN ?1 AND ?2
                 GROUP BY i.id, i.title, c.name, i.created_at
                 ORDER BY views DESC, i.created_at DESC, i.id DESC
                 LIMIT ?3",
            )
            .map_err(CoreError::database("prepare top content"))?;
        let rows = stmt
            .query_map(params![start, end, limit as i64], |row| {
                Ok(TopContent {
                    item_id: row.get(0)?,
                    title: row.get(1)?,
                    views: count(row, 2)?,
                    category: row.get(3)?,
                    created_at: decode_ts(row, 4)?,
                })
            })
            .map_err(CoreError::database("query top content"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(CoreError::database("read top content row"))
    }

    fn referrer_counts(&self, window: &DateWindow) -> Result<Vec<ReferrerCount>> {
        let (start, end) = window_bounds(window);
        let conn = self.conn;
        let mut stmt = conn
            .prepare(
                "SELECT referrer, COUNT(*) FROM analytics_events
                 WHERE event_type = 'page_view' AND created_at BETWEEN ?1 AND ?2
                 GROUP BY referrer",
            )
            .map_err(CoreError::database("prepare referrers"))?;
        let rows = stmt
            .query_map(params![start, end], |row| {
                Ok(ReferrerCount {
                    referrer: row.get(0)?,
                    visits: count(row, 1)?,
                })
            })
            .map_err(CoreError::database("query referrers"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(CoreError::database("read referrer row"))
    }

    fn category_rollups(&self, window: &DateWindow) -> Result<Vec<CategoryPerformance>> {
        let (start, end) = window_bounds(window);
        let conn = self.conn;
        let mut stmt = conn
            .prepare(
                "SELECT c.id, c.name,
                        (SELECT COUNT(*) FROM portfolio_items i WHERE i.category_id = c.id),
                        (SELECT COUNT(*) FROM analytics_events e
                           JOIN portfolio_items i ON i.id = e.item_id
                          WHERE i.category_id = c.id
                            AND e.event_type = 'page_view'
                            AND e.created_at BETWEEN ?1 AND ?2)
                 FROM categories c",
            )
            .map_err(CoreError::database("prepare category rollup"))?;
        let rows = stmt
            .query_map(params![start, end], |row| {
                Ok(CategoryPerformance {
                    category_id: row.get(0)?,
                    name: row.get(1)?,
                    items: count(row, 2)?,
                    views: count(row, 3)?,
                })
            })
            .map_err(CoreError::database("query category rollup"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(CoreError::database("read category rollup row"))
    }

    fn daily_view_counts(&self, window: &DateWindow) -> Result<Vec<(NaiveDate, u64)>> {
        let (start, end) = window_bounds(window);
        let conn = self.conn;
        let mut stmt = conn
            .prepare(
                "SELECT substr(created_at, 1, 10) AS day, COUNT(*) FROM analytics_events
                 WHERE event_type = 'page_view' AND created_at BETWEEN ?1 AND ?2
                 GROUP BY day ORDER BY day",
            )
            .map_err(CoreError::database("prepare daily views"))?;
        let rows = stmt
            .query_map(params![start, end], |row| {
                let day: String = row.get(0)?;
                let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
                })?;
                Ok((date, count(row, 1)?))
            })
            .map_err(CoreError::database("query daily views"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(CoreError::database("read daily views row"))
    }

    fn recent_activity(&self, window: &DateWindow, limit: usize) -> Result<Vec<ActivityEntry>> {
        let (start, end) = window_bounds(window);
        let conn = self.conn;
        let mut stmt = conn
            .prepare(
                "SELECT kind, label, item_id, at FROM (
                    SELECT 'page_view' AS kind, COALESCE(i.title, e.path) AS label,
                           e.item_id AS item_id, e.created_at AS at
                      FROM analytics_events e
                      LEFT JOIN portfolio_items i ON i.id = e.item_id
                     WHERE e.event_type = 'page_view' AND e.created_at BETWEEN ?1 AND ?2
                    UNION ALL
                    SELECT 'inquiry', name, NULL, created_at FROM inquiries
                     WHERE created_at BETWEEN ?1 AND ?2
                    UNION ALL
                    SELECT 'item_created', title, id, created_at FROM portfolio_items
                     WHERE created_at BETWEEN ?1 AND ?2
                 )
                 ORDER BY at DESC
                 LIMIT ?3",
            )
            .map_err(CoreError::database("prepare recent activity"))?;
        let rows = stmt
            .query_map(params![start, end, limit as i64], |row| {
                let kind: String = row.get(0)?;
                let subject: String = row.get(1)?;
                let (kind, label) = match kind.as_str() {
                    "page_view" => (ActivityKind::PageView, format!("Viewed {}", subject)),
                    "inquiry" => (ActivityKind::Inquiry, format!("Inquiry from {}", subject)),
                    _ => (ActivityKind::ItemCreated, format!("Added {}", subject)),
                };
                Ok(ActivityEntry {
                    kind,
                    label,
                    item_id: row.get(2)?,
                    occurred_at: decode_ts(row, 3)?,
                })
            })
            .map_err(CoreError::database("query recent activity"))?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(CoreError::database("read activity row"))
    }
}

impl Drop for PortfolioStore {
    fn drop(&mut self) {
        if self.path.is_none() {
            return;
        }
        // Flush the WAL so the file stays small across restarts
        let conn = self.conn.lock();
        if let Err(e) = conn.pragma_update(None, "wal_checkpoint", "TRUNCATE") {
            warn!("Failed to checkpoint WAL on PortfolioStore drop: {}", e);
        } else {
            debug!("WAL checkpoint completed on PortfolioStore drop");
        }
    }
}

/// Canonical stored form of a timestamp
pub fn encode_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn decode_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// The value a timestamp has after a round trip through the store
fn truncate_ms(ts: DateTime<Utc>) -> DateTime<Utc> {
    let ms = ts.timestamp_millis();
    DateTime::from_timestamp_millis(ms).unwrap_or(ts)
}

fn window_bounds(window: &DateWindow) -> (String, String) {
    (encode_ts(&window.start), encode_ts(&window.end))
}

fn count(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let n: i64 = row.get(idx)?;
    Ok(n.max(0) as u64)
}

fn ensure_slug_free(conn: &Connection, table: &'static str, slug: &str) -> Result<()> {
    let taken: Option<i64> = conn
        .query_row(
            &format!("SELECT id FROM {} WHERE slug = ?", table),
            params![slug],
            |row| row.get(0),
        )
        .optional()
        .map_err(CoreError::database("check slug"))?;
    if taken.is_some() {
        return Err(CoreError::InvalidInput {
            field: "slug",
            message: format!("'{}' is already in use", slug),
        });
    }
    Ok(())
}

fn ensure_exists(
    conn: &Connection,
    table: &'static str,
    id: i64,
    field: &'static str,
) -> Result<()> {
    let found: Option<i64> = conn
        .query_row(
            &format!("SELECT id FROM {} WHERE id = ?", table),
            params![id],
            |row| row.get(0),
        )
        .optional()
        .map_err(CoreError::database("check reference"))?;
    if found.is_none() {
        return Err(CoreError::InvalidInput {
            field,
            message: format!("no record with id {}", id),
        });
    }
    Ok(())
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        sort_order: row.get(4)?,
        created_at: decode_ts(row, 5)?,
    })
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<PortfolioItem> {
    Ok(PortfolioItem {
        id: row.get(0)?,
        title: row.get(1)?,
        slug: row.get(2)?,
        description: row.get(3)?,
        category_id: row.get(4)?,
        image_url: row.get(5)?,
        image_width: row.get(6)?,
        image_height: row.get(7)?,
        featured: row.get(8)?,
        published: row.get(9)?,
        created_at: decode_ts(row, 10)?,
    })
}

fn inquiry_from_row(row: &Row<'_>) -> rusqlite::Result<Inquiry> {
    let status: String = row.get(5)?;
    let status = status
        .parse::<InquiryStatus>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;
    Ok(Inquiry {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        subject: row.get(3)?,
        message: row.get(4)?,
        status,
        created_at: decode_ts(row, 6)?,
    })
}
