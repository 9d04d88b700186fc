//! Data models for folio
//!
//! Rows of the four tables the store manages, plus the insert payloads.

pub mod event;
pub mod inquiry;
pub mod portfolio;

pub use event::{AnalyticsEvent, EventType, NewEvent};
pub use inquiry::{Inquiry, InquiryStatus, NewInquiry};
pub use portfolio::{Category, NewCategory, NewItem, PortfolioItem};
