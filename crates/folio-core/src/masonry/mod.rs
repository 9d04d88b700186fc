//! Masonry gallery layout
//!
//! Places variable-aspect-ratio cards into balanced columns with a
//! shortest-column-first greedy pass. [`compute_layout`] is the pure
//! algorithm; [`MasonryEngine`] wraps it with measurement and debounced
//! re-layout for a live gallery.

pub mod breakpoints;
pub mod debounce;
pub mod engine;
pub mod layout;
pub mod measure;

pub use breakpoints::{Breakpoint, ColumnSpec, MasonryConfig};
pub use debounce::Debouncer;
pub use engine::{LayoutPhase, MasonryEngine};
pub use layout::{compute_layout, LayoutInput};
pub use measure::{ImageSource, Measure, RecordedDimensions};
