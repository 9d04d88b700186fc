//! Image measurement capability
//!
//! The engine only needs natural dimensions per card. Where they come from
//! (a decoded image, upload metadata, a browser callback) is up to the
//! implementor.

use folio_types::Dimensions;
use std::future::Future;

/// Handle to the image inside a card
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    pub url: String,
    /// Dimensions recorded when the image was uploaded, if known
    pub recorded: Option<Dimensions>,
}

impl ImageSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            recorded: None,
        }
    }

    pub fn with_recorded(mut self, width: f64, height: f64) -> Self {
        self.recorded = Some(Dimensions::new(width, height));
        self
    }
}

/// Resolves natural dimensions for an image.
///
/// `None` means the image could not be measured; the engine then lays the
/// card out with the fallback aspect ratio.
pub trait Measure: Send + Sync + 'static {
    fn measure(&self, image: &ImageSource) -> impl Future<Output = Option<Dimensions>> + Send;
}

/// Uses the dimensions stored alongside the portfolio item
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordedDimensions;

impl Measure for RecordedDimensions {
    async fn measure(&self, image: &ImageSource) -> Option<Dimensions> {
        image.recorded
    }
}
