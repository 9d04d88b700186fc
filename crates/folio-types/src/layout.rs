//! Masonry layout types

use serde::{Deserialize, Serialize};

/// Natural dimensions reported for an image
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width / height, or `None` when either side is unusable
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
        {
            Some(self.width / self.height)
        } else {
            None
        }
    }
}

/// Position of one card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub id: String,
    pub column: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Result of a completed layout pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub columns: usize,
    pub column_width: f64,
    pub gap: f64,
    /// Accumulated height per column, trailing gap included
    pub column_heights: Vec<f64>,
    pub container_height: f64,
    pub placements: Vec<Placement>,
}

impl Layout {
    pub fn placement(&self, id: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.id == id)
    }

    /// Column index per placement, in placement order
    pub fn column_order(&self) -> Vec<usize> {
        self.placements.iter().map(|p| p.column).collect()
    }
}

/// Why a pass did not run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoContainerWidth,
    NoItems,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LayoutOutcome {
    Laid(Layout),
    Skipped { reason: SkipReason },
}

impl LayoutOutcome {
    pub fn layout(&self) -> Option<&Layout> {
        match self {
            LayoutOutcome::Laid(layout) => Some(layout),
            LayoutOutcome::Skipped { .. } => None,
        }
    }

    pub fn into_layout(self) -> Option<Layout> {
        match self {
            LayoutOutcome::Laid(layout) => Some(layout),
            LayoutOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, LayoutOutcome::Skipped { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_rejects_degenerate_dimensions() {
        assert_eq!(Dimensions::new(1200.0, 800.0).aspect_ratio(), Some(1.5));
        assert_eq!(Dimensions::new(0.0, 800.0).aspect_ratio(), None);
        assert_eq!(Dimensions::new(1200.0, 0.0).aspect_ratio(), None);
        assert_eq!(Dimensions::new(f64::NAN, 10.0).aspect_ratio(), None);
    }

    #[test]
    fn test_skipped_outcome_has_no_layout() {
        let outcome = LayoutOutcome::Skipped {
            reason: SkipReason::NoContainerWidth,
        };
        assert!(outcome.is_skipped());
        assert!(outcome.layout().is_none());

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "no_container_width");
    }
}
