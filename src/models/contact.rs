//! Contact form submission model.

use serde::{Deserialize, Serialize};

/// Triage state of a contact submission.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContactStatus {
    New,
    Read,
    Replied,
}

impl ContactStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactStatus::New => "New",
            ContactStatus::Read => "Read",
            ContactStatus::Replied => "Replied",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "New" => Some(ContactStatus::New),
            "Read" => Some(ContactStatus::Read),
            "Replied" => Some(ContactStatus::Replied),
            _ => None,
        }
    }
}

/// A message submitted through the public contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub status: ContactStatus,
    pub submitted_at: String,
}

/// Request body for `POST /api/contacts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateContactRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedContact {
    pub id: i64,
}

/// Request body for `PUT /api/contacts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateContactRequest {
    #[serde(default)]
    pub status: Option<String>,
}
