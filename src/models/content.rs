//! Site content document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::Page;

/// Top-level section key to arbitrary structured value.
pub type Sections = Map<String, Value>;

/// The full set of editable site content: sections plus dynamic pages and
/// static page overrides keyed by path.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteContent {
    #[serde(flatten)]
    pub sections: Sections,
    #[serde(default)]
    pub dynamic_pages: Vec<Page>,
    #[serde(default)]
    pub static_page_overrides: BTreeMap<String, Page>,
}

/// Revision information for change detection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInfo {
    pub revision_id: i64,
    pub generated_at: String,
}
