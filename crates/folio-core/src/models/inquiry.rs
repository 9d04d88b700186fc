//! Contact inquiries from the public site

use super::portfolio::require;
use crate::error::{CoreError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InquiryStatus {
    New,
    Read,
    Archived,
}

impl InquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::New => "new",
            InquiryStatus::Read => "read",
            InquiryStatus::Archived => "archived",
        }
    }
}

impl FromStr for InquiryStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "new" => Ok(InquiryStatus::New),
            "read" => Ok(InquiryStatus::Read),
            "archived" => Ok(InquiryStatus::Archived),
            other => Err(CoreError::InvalidInput {
                field: "status",
                message: format!("unknown inquiry status '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub status: InquiryStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewInquiry {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub subject: String,
    pub message: String,
    #[serde(skip)]
    pub received_at: Option<DateTime<Utc>>,
}

impl NewInquiry {
    pub fn validate(&self) -> Result<()> {
        require("name", &self.name)?;
        require("message", &self.message)?;

        let email = self.email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(()),
            _ => Err(CoreError::InvalidInput {
                field: "email",
                message: format!("'{}' is not an email address", email),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inquiry(email: &str) -> NewInquiry {
        NewInquiry {
            name: "Ada".into(),
            email: email.into(),
            subject: "Wedding".into(),
            message: "Are you free in June?".into(),
            received_at: None,
        }
    }

    #[test]
    fn test_email_validation() {
        assert!(inquiry("ada@example.com").validate().is_ok());
        assert!(inquiry("ada.example.com").validate().is_err());
        assert!(inquiry("@example.com").validate().is_err());
        assert!(inquiry("ada@localhost").validate().is_err());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("read".parse::<InquiryStatus>().unwrap(), InquiryStatus::Read);
        assert!("spam".parse::<InquiryStatus>().is_err());
    }
}
