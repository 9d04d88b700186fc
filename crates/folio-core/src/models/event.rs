//! Raw analytics events

use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PageView,
    ImageView,
    ContactClick,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PageView => "page_view",
            EventType::ImageView => "image_view",
            EventType::ContactClick => "contact_click",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "page_view" => Ok(EventType::PageView),
            "image_view" => Ok(EventType::ImageView),
            "contact_click" => Ok(EventType::ContactClick),
            other => Err(CoreError::InvalidInput {
                field: "eventType",
                message: format!("unknown event type '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub id: i64,
    pub event_type: EventType,
    pub item_id: Option<i64>,
    pub visitor_id: String,
    pub path: String,
    pub referrer: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Tracking payload
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub event_type: EventType,
    pub item_id: Option<i64>,
    pub visitor_id: String,
    pub path: String,
    pub referrer: Option<String>,
    #[serde(skip)]
    pub occurred_at: Option<DateTime<Utc>>,
}

impl NewEvent {
    pub fn page_view(visitor_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            event_type: EventType::PageView,
            item_id: None,
            visitor_id: visitor_id.into(),
            path: path.into(),
            referrer: None,
            occurred_at: None,
        }
    }

    pub fn for_item(mut self, item_id: i64) -> Self {
        self.item_id = Some(item_id);
        self
    }

    pub fn from_referrer(mut self, referrer: impl Into<String>) -> Self {
        self.referrer = Some(referrer.into());
        self
    }

    pub fn of_type(mut self, event_type: EventType) -> Self {
        self.event_type = event_type;
        self
    }

    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(at);
        self
    }

    pub fn validate(&self) -> Result<()> {
        super::portfolio::require("visitorId", &self.visitor_id)?;
        if !self.path.starts_with('/') {
            return Err(CoreError::InvalidInput {
                field: "path",
                message: "must start with '/'".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_parse() {
        assert_eq!("page_view".parse::<EventType>().unwrap(), EventType::PageView);
        assert_eq!(EventType::ContactClick.to_string(), "contact_click");
        assert!("click".parse::<EventType>().unwrap_err().is_validation());
    }

    #[test]
    fn test_new_event_validation() {
        assert!(NewEvent::page_view("v1", "/work").validate().is_ok());
        assert!(NewEvent::page_view("", "/work").validate().is_err());
        assert!(NewEvent::page_view("v1", "work").validate().is_err());
    }
}
