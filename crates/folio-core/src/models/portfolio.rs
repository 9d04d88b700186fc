//! Portfolio items and categories

use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use folio_types::Dimensions;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub image_url: String,
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    pub featured: bool,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

impl PortfolioItem {
    /// Dimensions recorded at upload, if both sides are known
    pub fn image_dimensions(&self) -> Option<Dimensions> {
        match (self.image_width, self.image_height) {
            (Some(w), Some(h)) => Some(Dimensions::new(w as f64, h as f64)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    /// Derived from `name` when absent
    pub slug: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i64,
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
}

impl NewCategory {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)
    }

    pub fn resolved_slug(&self) -> String {
        resolve_slug(self.slug.as_deref(), &self.name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub title: String,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub image_url: String,
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_published")]
    pub published: bool,
    #[serde(skip)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_published() -> bool {
    true
}

impl NewItem {
    pub fn new(title: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            image_url: image_url.into(),
            published: true,
            ..Default::default()
        }
    }

    pub fn in_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.image_width = Some(width);
        self.image_height = Some(height);
        self
    }

    pub fn featured(mut self) -> Self {
        self.featured = true;
        self
    }

    pub fn unpublished(mut self) -> Self {
        self.published = false;
        self
    }

    pub fn created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn validate(&self) -> Result<()> {
        require("title", &self.title)?;
        require("imageUrl", &self.image_url)
    }

    pub fn resolved_slug(&self) -> String {
        resolve_slug(self.slug.as_deref(), &self.title)
    }
}

fn resolve_slug(explicit: Option<&str>, fallback: &str) -> String {
    match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => slug::slugify(s),
        None => slug::slugify(fallback),
    }
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidInput {
            field,
            message: "must not be empty".into(),
        });
    }
    Ok(())
}
