//! Dynamic page and static page override model.

use serde::{Deserialize, Serialize};

/// Publication state of a page.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
}

impl PageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageStatus::Draft => "Draft",
            PageStatus::Published => "Published",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Draft" => Some(PageStatus::Draft),
            "Published" => Some(PageStatus::Published),
            _ => None,
        }
    }
}

/// A page body addressed by path. Used both for admin-created dynamic pages and
/// for overrides of the statically routed pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    pub id: String,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub status: PageStatus,
}

/// Request body for `POST /api/pages`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePageRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Request body for `PUT /api/pages/{id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePageRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Query string for `GET /api/pages`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub path: Option<String>,
}
