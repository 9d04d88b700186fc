//! Shortest-column-first greedy packing
//!
//! Pure function of (items in order, container width, config). The stateful
//! engine and the HTTP layout endpoint both call into this.

use super::MasonryConfig;
use folio_types::{Dimensions, Layout, LayoutOutcome, Placement, SkipReason};

/// One card ready for layout
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutInput {
    pub id: String,
    /// Width / height of the card image
    pub aspect_ratio: f64,
}

impl LayoutInput {
    pub fn new(id: impl Into<String>, aspect_ratio: f64) -> Self {
        Self {
            id: id.into(),
            aspect_ratio,
        }
    }

    /// Build from optional measured dimensions, applying the configured fallback
    pub fn from_dimensions(
        id: impl Into<String>,
        dimensions: Option<Dimensions>,
        config: &MasonryConfig,
    ) -> Self {
        let ratio = dimensions.and_then(|d| d.aspect_ratio());
        Self::new(id, config.effective_aspect(ratio))
    }
}

/// Lay out `items` in order into the columns resolved for `container_width`.
///
/// Each item goes to the column with the smallest accumulated height, lowest
/// index first on ties. Runs in O(items × columns).
pub fn compute_layout(
    items: &[LayoutInput],
    container_width: f64,
    config: &MasonryConfig,
) -> LayoutOutcome {
    if !(container_width.is_finite() && container_width > 0.0) {
        return LayoutOutcome::Skipped {
            reason: SkipReason::NoContainerWidth,
        };
    }
    if items.is_empty() {
        return LayoutOutcome::Skipped {
            reason: SkipReason::NoItems,
        };
    }

    let spec = config.resolve_columns(container_width);
    let columns = spec.columns;
    let gap = spec.gap;
    let column_width =
        ((container_width - gap * (columns as f64 - 1.0)) / columns as f64).max(0.0);

    let mut heights = vec![0.0_f64; columns];
    let mut placements = Vec::with_capacity(items.len());

    for item in items {
        let column = shortest_column(&heights);
        let aspect = config.effective_aspect(Some(item.aspect_ratio));
        let height = column_width / aspect + config.content_chrome;

        placements.push(Placement {
            id: item.id.clone(),
            column,
            x: column as f64 * (column_width + gap),
            y: heights[column],
            width: column_width,
            height,
        });

        heights[column] += height + gap;
    }

    let tallest = heights.iter().copied().fold(0.0_f64, f64::max);

    LayoutOutcome::Laid(Layout {
        columns,
        column_width,
        gap,
        container_height: (tallest - gap).max(0.0),
        column_heights: heights,
        placements,
    })
}

fn shortest_column(heights: &[f64]) -> usize {
    let mut best = 0;
    for (idx, height) in heights.iter().enumerate().skip(1) {
        if *height < heights[best] {
            best = idx;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn inputs(ratios: &[f64]) -> Vec<LayoutInput> {
        ratios
            .iter()
            .enumerate()
            .map(|(i, r)| LayoutInput::new(format!("card-{}", i), *r))
            .collect()
    }

    /// Deterministic pseudo-random aspect ratios in [0.4, 2.6)
    fn ratio_sequence(seed: u64, count: usize) -> Vec<f64> {
        let mut state = seed;
        (0..count)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                0.4 + ((state >> 33) % 2200) as f64 / 1000.0
            })
            .collect()
    }

    #[test]
    fn test_zero_width_skips_pass() {
        let config = MasonryConfig::default();
        let items = inputs(&[1.0]);

        assert_eq!(
            compute_layout(&items, 0.0, &config),
            LayoutOutcome::Skipped {
                reason: SkipReason::NoContainerWidth
            }
        );
        assert!(compute_layout(&items, f64::NAN, &config).is_skipped());
        assert!(compute_layout(&items, -10.0, &config).is_skipped());
    }

    #[test]
    fn test_empty_items_skips_pass() {
        let outcome = compute_layout(&[], 900.0, &MasonryConfig::default());
        assert_eq!(
            outcome,
            LayoutOutcome::Skipped {
                reason: SkipReason::NoItems
            }
        );
    }

    #[test]
    fn test_three_columns_at_900px() {
        let config = MasonryConfig::default();
        let layout = compute_layout(&inputs(&[1.0, 2.0, 0.5, 1.0, 1.5]), 900.0, &config)
            .into_layout()
            .unwrap();

        assert_eq!(layout.columns, 3);
        assert_eq!(layout.gap, 24.0);
        assert!((layout.column_width - 284.0).abs() < EPS);

        // First row fills left to right from all-zero heights. The 2.0 card is
        // the shortest, so its column takes the fourth card.
        assert_eq!(layout.column_order(), vec![0, 1, 2, 1, 0]);

        let fourth = layout.placement("card-3").unwrap();
        assert!((fourth.x - 308.0).abs() < EPS);
        assert!((fourth.y - 246.0).abs() < EPS);
        assert!((fourth.height - 364.0).abs() < EPS);

        let fifth = layout.placement("card-4").unwrap();
        assert_eq!(fifth.x, 0.0);
        assert!((fifth.y - 388.0).abs() < EPS);

        let expected_height = 388.0 + (284.0 / 1.5 + 80.0) + 24.0 - 24.0;
        assert!((layout.container_height - expected_height).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_heights_fill_round_robin() {
        let config = MasonryConfig::default();
        let layout = compute_layout(&inputs(&[1.5; 5]), 900.0, &config)
            .into_layout()
            .unwrap();

        assert_eq!(layout.column_order(), vec![0, 1, 2, 0, 1]);
    }

    #[test]
    fn test_unusable_ratio_uses_fallback() {
        let config = MasonryConfig::default();
        let a = compute_layout(&inputs(&[0.0]), 900.0, &config)
            .into_layout()
            .unwrap();
        let b = compute_layout(&inputs(&[1.5]), 900.0, &config)
            .into_layout()
            .unwrap();

        assert_eq!(a.placements[0].height, b.placements[0].height);
    }

    #[test]
    fn test_from_dimensions_applies_fallback() {
        let config = MasonryConfig::default();
        let measured = LayoutInput::from_dimensions("a", Some(Dimensions::new(800.0, 400.0)), &config);
        let missing = LayoutInput::from_dimensions("b", None, &config);

        assert_eq!(measured.aspect_ratio, 2.0);
        assert_eq!(missing.aspect_ratio, 1.5);
    }

    #[test]
    fn test_columns_stay_balanced() {
        let config = MasonryConfig::default();

        for seed in 1..40u64 {
            for width in [320.0, 640.0, 900.0, 1300.0, 1700.0] {
                let items = inputs(&ratio_sequence(seed, (seed as usize % 23) + 1));
                let layout = compute_layout(&items, width, &config)
                    .into_layout()
                    .unwrap();

                let tallest_item = layout
                    .placements
                    .iter()
                    .map(|p| p.height)
                    .fold(0.0_f64, f64::max);
                let max_column = layout.column_heights.iter().copied().fold(0.0_f64, f64::max);

                for height in &layout.column_heights {
                    assert!(
                        max_column - height <= tallest_item + layout.gap + EPS,
                        "seed {} width {}: column {} vs max {}",
                        seed,
                        width,
                        height,
                        max_column
                    );
                }
            }
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let config = MasonryConfig::default();
        let items = inputs(&ratio_sequence(7, 30));

        let first = compute_layout(&items, 1300.0, &config);
        let second = compute_layout(&items, 1300.0, &config);
        assert_eq!(first, second);
    }

    #[test]
    fn test_placements_do_not_overlap_within_column() {
        let config = MasonryConfig::default();
        let layout = compute_layout(&inputs(&ratio_sequence(3, 25)), 1300.0, &config)
            .into_layout()
            .unwrap();

        for column in 0..layout.columns {
            let mut cards: Vec<_> = layout
                .placements
                .iter()
                .filter(|p| p.column == column)
                .collect();
            cards.sort_by(|a, b| a.y.total_cmp(&b.y));
            for pair in cards.windows(2) {
                assert!(pair[0].y + pair[0].height + layout.gap <= pair[1].y + EPS);
            }
        }
    }
}
