//! Stateful masonry engine
//!
//! Tracks mounted cards in insertion order, measures their images, and
//! re-runs [`compute_layout`] whenever the item set or container width
//! changes. Bursts are coalesced through a [`Debouncer`]: 10ms after an
//! add/remove, 150ms after a resize (both configurable).

use super::debounce::Debouncer;
use super::layout::{compute_layout, LayoutInput};
use super::measure::{ImageSource, Measure};
use super::MasonryConfig;
use folio_types::{Layout, LayoutOutcome};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, trace, warn};

/// Where the engine is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutPhase {
    Idle,
    /// At least one card is waiting for its image dimensions
    Measuring,
    LayingOut,
}

#[derive(Debug)]
struct TrackedItem {
    id: String,
    /// `None` until the image has been measured
    aspect_ratio: Option<f64>,
    /// Bumped on re-add so a stale measurement is discarded
    generation: u64,
}

#[derive(Debug)]
struct EngineState {
    items: Vec<TrackedItem>,
    container_width: f64,
    phase: LayoutPhase,
    passes: u64,
    next_generation: u64,
}

impl EngineState {
    fn has_pending(&self) -> bool {
        self.items.iter().any(|item| item.aspect_ratio.is_none())
    }

    fn settle_phase(&mut self) {
        self.phase = if self.has_pending() {
            LayoutPhase::Measuring
        } else {
            LayoutPhase::Idle
        };
    }
}

struct Shared {
    config: MasonryConfig,
    state: Mutex<EngineState>,
    debouncer: Debouncer,
    layout_tx: watch::Sender<Option<Layout>>,
    closed: AtomicBool,
}

impl Shared {
    fn schedule_pass(self: &Arc<Self>, delay: Duration) {
        if self.closed.load(Ordering::Acquire) {
            return;
        }
        let shared = Arc::clone(self);
        self.debouncer.schedule(delay, async move {
            shared.run_pass();
        });
    }

    fn run_pass(&self) -> LayoutOutcome {
        let (outcome, nothing_ready) = {
            let mut state = self.state.lock();
            state.phase = LayoutPhase::LayingOut;

            // Unmeasured cards sit out this pass
            let ready: Vec<LayoutInput> = state
                .items
                .iter()
                .filter_map(|item| {
                    item.aspect_ratio
                        .map(|ratio| LayoutInput::new(item.id.clone(), ratio))
                })
                .collect();

            let outcome = compute_layout(&ready, state.container_width, &self.config);
            state.passes += 1;
            state.settle_phase();
            (outcome, ready.is_empty())
        };

        match &outcome {
            LayoutOutcome::Laid(layout) => {
                debug!(
                    items = layout.placements.len(),
                    columns = layout.columns,
                    height = layout.container_height,
                    "Layout pass complete"
                );
                self.layout_tx.send_replace(Some(layout.clone()));
            }
            LayoutOutcome::Skipped { reason } if nothing_ready => {
                debug!(?reason, "No cards ready, clearing layout");
                self.layout_tx.send_replace(None);
            }
            LayoutOutcome::Skipped { reason } => {
                debug!(?reason, "Layout pass skipped");
            }
        }

        outcome
    }
}

/// Masonry engine bound to one gallery container
pub struct MasonryEngine<M: Measure> {
    shared: Arc<Shared>,
    measurer: Arc<M>,
}

impl<M: Measure> MasonryEngine<M> {
    pub fn new(measurer: M, config: MasonryConfig) -> Self {
        let (layout_tx, _) = watch::channel(None);
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(EngineState {
                    items: Vec::new(),
                    container_width: 0.0,
                    phase: LayoutPhase::Idle,
                    passes: 0,
                    next_generation: 0,
                }),
                debouncer: Debouncer::new(),
                layout_tx,
                closed: AtomicBool::new(false),
            }),
            measurer: Arc::new(measurer),
        }
    }

    /// Mount a card. Its image is measured in the background; a pass follows
    /// once the measurement lands. Re-adding an id re-measures it in place.
    pub fn add_item(&self, id: impl Into<String>, image: ImageSource) {
        let id = id.into();
        let generation = {
            let mut state = self.shared.state.lock();
            state.next_generation += 1;
            let generation = state.next_generation;

            match state.items.iter_mut().find(|item| item.id == id) {
                Some(item) => {
                    item.aspect_ratio = None;
                    item.generation = generation;
                }
                None => state.items.push(TrackedItem {
                    id: id.clone(),
                    aspect_ratio: None,
                    generation,
                }),
            }
            state.phase = LayoutPhase::Measuring;
            generation
        };

        let shared = Arc::clone(&self.shared);
        let measurer = Arc::clone(&self.measurer);
        tokio::spawn(async move {
            let measured = measurer
                .measure(&image)
                .await
                .and_then(|dims| dims.aspect_ratio());
            if measured.is_none() {
                warn!(id = %id, url = %image.url, "Image not measurable, using fallback aspect ratio");
            }
            let ratio = shared.config.effective_aspect(measured);

            {
                let mut state = shared.state.lock();
                let Some(item) = state
                    .items
                    .iter_mut()
                    .find(|item| item.id == id && item.generation == generation)
                else {
                    trace!(id = %id, "Discarding stale measurement");
                    return;
                };
                item.aspect_ratio = Some(ratio);
                if state.phase == LayoutPhase::Measuring {
                    state.settle_phase();
                }
            }

            shared.schedule_pass(shared.config.mutation_debounce());
        });
    }

    /// Unmount a card. The remaining cards are laid out again from scratch.
    pub fn remove_item(&self, id: &str) -> bool {
        let removed = {
            let mut state = self.shared.state.lock();
            let before = state.items.len();
            state.items.retain(|item| item.id != id);
            if state.phase == LayoutPhase::Measuring {
                state.settle_phase();
            }
            state.items.len() != before
        };

        if removed {
            self.shared
                .schedule_pass(self.shared.config.mutation_debounce());
        }
        removed
    }

    /// Record a new container width; the pass waits for the resize burst to end
    pub fn resize(&self, container_width: f64) {
        self.shared.state.lock().container_width = container_width;
        self.shared
            .schedule_pass(self.shared.config.resize_debounce());
    }

    /// Run a pass now, dropping any pending debounced one
    pub fn recalculate(&self) -> LayoutOutcome {
        self.shared.debouncer.cancel();
        self.shared.run_pass()
    }

    /// True while cards are measuring or a pass is queued or running
    pub fn is_loading(&self) -> bool {
        self.shared.debouncer.is_pending() || self.phase() != LayoutPhase::Idle
    }

    pub fn phase(&self) -> LayoutPhase {
        self.shared.state.lock().phase
    }

    /// Most recent completed layout
    pub fn current_layout(&self) -> Option<Layout> {
        self.shared.layout_tx.borrow().clone()
    }

    /// Receive every completed layout
    pub fn subscribe(&self) -> watch::Receiver<Option<Layout>> {
        self.shared.layout_tx.subscribe()
    }

    pub fn item_count(&self) -> usize {
        self.shared.state.lock().items.len()
    }

    /// Number of passes attempted, skipped ones included
    pub fn pass_count(&self) -> u64 {
        self.shared.state.lock().passes
    }

    pub fn config(&self) -> &MasonryConfig {
        &self.shared.config
    }
}

impl<M: Measure> Drop for MasonryEngine<M> {
    fn drop(&mut self) {
        self.shared.closed.store(true, Ordering::Release);
        self.shared.debouncer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::Dimensions;
    use std::collections::HashMap;

    /// Dimensions by URL, with an optional per-URL delay
    #[derive(Default)]
    struct FakeImages {
        sizes: HashMap<String, Dimensions>,
        delays: HashMap<String, Duration>,
    }

    impl FakeImages {
        fn with(mut self, url: &str, width: f64, height: f64) -> Self {
            self.sizes.insert(url.to_string(), Dimensions::new(width, height));
            self
        }

        fn slow(mut self, url: &str, delay: Duration) -> Self {
            self.delays.insert(url.to_string(), delay);
            self
        }
    }

    impl Measure for FakeImages {
        async fn measure(&self, image: &ImageSource) -> Option<Dimensions> {
            if let Some(delay) = self.delays.get(&image.url) {
                tokio::time::sleep(*delay).await;
            }
            self.sizes.get(&image.url).copied()
        }
    }

    fn gallery() -> FakeImages {
        FakeImages::default()
            .with("a", 1000.0, 1000.0)
            .with("b", 1000.0, 500.0)
            .with("c", 500.0, 1000.0)
            .with("d", 900.0, 600.0)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_mutations_coalesce_into_one_pass() {
        let engine = MasonryEngine::new(gallery(), MasonryConfig::default());
        engine.resize(900.0);
        for id in ["a", "b", "c", "d"] {
            engine.add_item(id, ImageSource::new(id));
        }
        assert!(engine.is_loading());

        settle().await;

        let layout = engine.current_layout().unwrap();
        assert_eq!(layout.placements.len(), 4);
        assert_eq!(layout.columns, 3);
        assert_eq!(engine.pass_count(), 1);
        assert!(!engine.is_loading());
        assert_eq!(engine.phase(), LayoutPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resize_burst_runs_single_pass_with_last_width() {
        let engine = MasonryEngine::new(gallery(), MasonryConfig::default());
        engine.resize(900.0);
        engine.add_item("a", ImageSource::new("a"));
        engine.add_item("b", ImageSource::new("b"));
        settle().await;
        let before = engine.pass_count();

        for width in [1000.0, 1100.0, 1200.0, 1300.0, 1700.0] {
            engine.resize(width);
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        settle().await;

        assert_eq!(engine.pass_count(), before + 1);
        assert_eq!(engine.current_layout().unwrap().columns, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_width_pass_is_retried_on_next_trigger() {
        let engine = MasonryEngine::new(gallery(), MasonryConfig::default());
        engine.add_item("a", ImageSource::new("a"));
        settle().await;

        assert_eq!(engine.pass_count(), 1);
        assert!(engine.current_layout().is_none());

        engine.resize(900.0);
        settle().await;

        assert_eq!(engine.pass_count(), 2);
        assert_eq!(engine.current_layout().unwrap().placements.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_removal_relays_remaining_items_from_scratch() {
        let config = MasonryConfig::default();
        let engine = MasonryEngine::new(gallery(), config.clone());
        engine.resize(1300.0);
        for id in ["a", "b", "c", "d"] {
            engine.add_item(id, ImageSource::new(id));
        }
        settle().await;

        assert!(engine.remove_item("b"));
        assert!(!engine.remove_item("missing"));
        settle().await;

        let after_removal = engine.current_layout().unwrap();
        assert!(after_removal.placement("b").is_none());

        let fresh = MasonryEngine::new(gallery(), config);
        fresh.resize(1300.0);
        for id in ["a", "c", "d"] {
            fresh.add_item(id, ImageSource::new(id));
        }
        settle().await;

        assert_eq!(after_removal, fresh.current_layout().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmeasured_items_wait_for_dimensions() {
        let images = gallery().slow("c", Duration::from_secs(2));
        let engine = MasonryEngine::new(images, MasonryConfig::default());
        engine.resize(900.0);
        for id in ["a", "b", "c"] {
            engine.add_item(id, ImageSource::new(id));
        }

        tokio::time::sleep(Duration::from_millis(300)).await;
        let partial = engine.current_layout().unwrap();
        assert_eq!(partial.placements.len(), 2);
        assert!(partial.placement("c").is_none());
        assert_eq!(engine.phase(), LayoutPhase::Measuring);
        assert!(engine.is_loading());

        tokio::time::sleep(Duration::from_secs(3)).await;
        let complete = engine.current_layout().unwrap();
        assert_eq!(complete.placements.len(), 3);
        assert!(!engine.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unmeasurable_image_uses_fallback_ratio() {
        let config = MasonryConfig::default();
        let engine = MasonryEngine::new(gallery(), config.clone());
        engine.resize(900.0);
        engine.add_item("broken", ImageSource::new("missing.jpg"));
        settle().await;

        let layout = engine.current_layout().unwrap();
        let card = layout.placement("broken").unwrap();
        let expected = layout.column_width / config.fallback_aspect_ratio + config.content_chrome;
        assert!((card.height - expected).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recalculate_runs_immediately_and_cancels_pending() {
        let engine = MasonryEngine::new(gallery(), MasonryConfig::default());
        engine.resize(900.0);
        engine.add_item("a", ImageSource::new("a"));
        settle().await;
        let before = engine.pass_count();

        engine.resize(1300.0);
        let outcome = engine.recalculate();
        assert_eq!(outcome.layout().unwrap().columns, 4);

        settle().await;
        assert_eq!(engine.pass_count(), before + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_readding_item_keeps_position_in_order() {
        let engine = MasonryEngine::new(gallery(), MasonryConfig::default());
        engine.resize(900.0);
        for id in ["a", "b", "c"] {
            engine.add_item(id, ImageSource::new(id));
        }
        settle().await;

        engine.add_item("a", ImageSource::new("d"));
        settle().await;

        assert_eq!(engine.item_count(), 3);
        let layout = engine.current_layout().unwrap();
        let ids: Vec<_> = layout.placements.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_completed_layouts() {
        let engine = MasonryEngine::new(gallery(), MasonryConfig::default());
        let mut rx = engine.subscribe();
        engine.resize(900.0);
        engine.add_item("a", ImageSource::new("a"));

        rx.changed().await.unwrap();
        let layout = rx.borrow().clone().unwrap();
        assert_eq!(layout.placements.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_removing_last_card_clears_layout() {
        let engine = MasonryEngine::new(gallery(), MasonryConfig::default());
        let mut rx = engine.subscribe();
        engine.resize(900.0);
        engine.add_item("a", ImageSource::new("a"));
        settle().await;
        assert!(engine.current_layout().unwrap().placement("a").is_some());
        let _ = rx.borrow_and_update();

        assert!(engine.remove_item("a"));
        settle().await;

        assert_eq!(engine.item_count(), 0);
        assert!(engine.current_layout().is_none());
        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow().is_none());
    }
}
