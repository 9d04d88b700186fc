//! Responsive column table for the masonry grid

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Column count and gap applied from `min_width` upward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub min_width: f64,
    pub columns: usize,
    pub gap: f64,
}

impl Breakpoint {
    pub const fn new(min_width: f64, columns: usize, gap: f64) -> Self {
        Self {
            min_width,
            columns,
            gap,
        }
    }
}

/// Columns and gap resolved for one container width
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnSpec {
    pub columns: usize,
    pub gap: f64,
}

/// Configuration for the masonry layout engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MasonryConfig {
    /// Breakpoint table, any order
    pub breakpoints: Vec<Breakpoint>,

    /// Column width used by the fallback when no breakpoint matches
    pub min_column_width: f64,

    /// Upper clamp for the fallback column count
    pub max_columns: usize,

    /// Gap used by the fallback
    pub default_gap: f64,

    /// Fixed height added under each image (caption, meta row)
    pub content_chrome: f64,

    /// Aspect ratio assumed when an image cannot be measured
    pub fallback_aspect_ratio: f64,

    /// Quiet period after the last resize before a pass runs
    pub resize_debounce_ms: u64,

    /// Quiet period after the last add/remove before a pass runs
    pub mutation_debounce_ms: u64,
}

impl Default for MasonryConfig {
    fn default() -> Self {
        Self {
            breakpoints: vec![
                Breakpoint::new(1536.0, 5, 24.0),
                Breakpoint::new(1280.0, 4, 24.0),
                Breakpoint::new(768.0, 3, 24.0),
                Breakpoint::new(480.0, 2, 16.0),
            ],
            min_column_width: 240.0,
            max_columns: 5,
            default_gap: 16.0,
            content_chrome: 80.0,
            fallback_aspect_ratio: 1.5,
            resize_debounce_ms: 150,
            mutation_debounce_ms: 10,
        }
    }
}

impl MasonryConfig {
    /// Resolve columns for `container_width`.
    ///
    /// Breakpoints are scanned from widest to narrowest; the first whose
    /// `min_width` fits wins. Otherwise the column count is
    /// `floor(width / min_column_width)` clamped to `[1, max_columns]`.
    pub fn resolve_columns(&self, container_width: f64) -> ColumnSpec {
        let mut table = self.breakpoints.clone();
        table.sort_by(|a, b| b.min_width.total_cmp(&a.min_width));

        if let Some(bp) = table.iter().find(|bp| bp.min_width <= container_width) {
            return ColumnSpec {
                columns: bp.columns.clamp(1, self.max_columns.max(1)),
                gap: bp.gap,
            };
        }

        let fitted = (container_width / self.min_column_width).floor();
        let columns = if fitted.is_finite() && fitted >= 1.0 {
            (fitted as usize).min(self.max_columns.max(1))
        } else {
            1
        };

        ColumnSpec {
            columns,
            gap: self.default_gap,
        }
    }

    /// Sanitised aspect ratio for layout (fallback when unusable)
    pub fn effective_aspect(&self, aspect_ratio: Option<f64>) -> f64 {
        match aspect_ratio {
            Some(ratio) if ratio.is_finite() && ratio > 0.0 => ratio,
            _ => self.fallback_aspect_ratio,
        }
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }

    pub fn mutation_debounce(&self) -> Duration {
        Duration::from_millis(self.mutation_debounce_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_columns == 0 {
            return Err("masonry.max_columns must be at least 1".into());
        }
        if !(self.min_column_width.is_finite() && self.min_column_width > 0.0) {
            return Err("masonry.min_column_width must be positive".into());
        }
        if !(self.fallback_aspect_ratio.is_finite() && self.fallback_aspect_ratio > 0.0) {
            return Err("masonry.fallback_aspect_ratio must be positive".into());
        }
        if self.default_gap < 0.0 || self.content_chrome < 0.0 {
            return Err("masonry gaps and content_chrome must not be negative".into());
        }
        for bp in &self.breakpoints {
            if bp.columns == 0 || bp.columns > self.max_columns {
                return Err(format!(
                    "breakpoint at {}px has {} columns (allowed 1..={})",
                    bp.min_width, bp.columns, self.max_columns
                ));
            }
            if bp.gap < 0.0 || bp.min_width < 0.0 {
                return Err(format!("breakpoint at {}px has a negative value", bp.min_width));
            }
        }
        Ok(())
    }
}
