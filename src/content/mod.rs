//! Content merging and update rules.
//!
//! The persisted document is partial: it only holds the sections an editor has saved.
//! Reads layer it over the compiled-in defaults one top-level key at a time. Nested
//! values are never deep-merged, so a saved `hero` replaces the default `hero` wholesale.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::models::{Page, Sections, SiteContent};
use crate::validation::{normalize_path, validate_page_fields};

/// Section keys an update may write.
pub const SECTION_KEYS: &[&str] = &[
    "name",
    "tagline",
    "description",
    "nav",
    "hero",
    "home",
    "services",
    "servicesPage",
    "about",
    "contact",
    "contactPage",
    "careersPage",
    "footer",
];

const DYNAMIC_PAGES_KEY: &str = "dynamicPages";
const STATIC_OVERRIDES_KEY: &str = "staticPageOverrides";

const BUILTIN_DEFAULTS: &str = include_str!("site_defaults.json");

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Malformed content: {0}")]
    Malformed(String),
    #[error("Invalid page: {0}")]
    InvalidPage(String),
    #[error("Path already exists: {0}")]
    DuplicatePath(String),
    #[error("Duplicate page id: {0}")]
    DuplicateId(String),
    #[error("Stored section '{key}' is unreadable: {reason}")]
    CorruptSection { key: String, reason: String },
    #[error("Persistence error: {0}")]
    Persistence(#[from] sqlx::Error),
}

/// Parse the compiled-in site defaults, or the JSON object at `path` when given.
pub fn load_defaults(path: Option<&Path>) -> Result<Sections, ContentError> {
    let raw = match path {
        Some(p) => std::fs::read_to_string(p)
            .map_err(|e| ContentError::Malformed(format!("{}: {}", p.display(), e)))?,
        None => BUILTIN_DEFAULTS.to_string(),
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ContentError::Malformed(
            "site defaults must be a JSON object".to_string(),
        )),
        Err(e) => Err(ContentError::Malformed(e.to_string())),
    }
}

/// Layer a persisted document over the defaults.
pub fn merge(defaults: &Sections, persisted: &SiteContent) -> SiteContent {
    let mut sections = defaults.clone();
    for (key, value) in &persisted.sections {
        sections.insert(key.clone(), value.clone());
    }
    SiteContent {
        sections,
        dynamic_pages: persisted.dynamic_pages.clone(),
        static_page_overrides: persisted.static_page_overrides.clone(),
    }
}

/// Apply an editor's patch to the persisted document, producing the next document.
///
/// Known sections present in the patch replace the current ones; `dynamicPages` and
/// `staticPageOverrides` replace their whole collection when present. The result is
/// checked for page validity and path uniqueness before it is returned.
pub fn apply_update(current: &SiteContent, patch: &Value) -> Result<SiteContent, ContentError> {
    let patch = patch.as_object().ok_or_else(|| {
        ContentError::Malformed("content update must be a JSON object".to_string())
    })?;

    let mut next = current.clone();

    for (key, value) in patch {
        if key == DYNAMIC_PAGES_KEY || key == STATIC_OVERRIDES_KEY {
            continue;
        }
        if !SECTION_KEYS.contains(&key.as_str()) {
            tracing::debug!("Ignoring unknown content section '{}'", key);
            continue;
        }
        if value.is_null() {
            continue;
        }
        next.sections.insert(key.clone(), value.clone());
    }

    if let Some(value) = patch.get(DYNAMIC_PAGES_KEY).filter(|v| !v.is_null()) {
        let pages: Vec<Page> = serde_json::from_value(value.clone())
            .map_err(|e| ContentError::Malformed(format!("{}: {}", DYNAMIC_PAGES_KEY, e)))?;
        next.dynamic_pages = pages.into_iter().map(trim_page).collect();
    }

    if let Some(value) = patch.get(STATIC_OVERRIDES_KEY).filter(|v| !v.is_null()) {
        let overrides: BTreeMap<String, Page> = serde_json::from_value(value.clone())
            .map_err(|e| ContentError::Malformed(format!("{}: {}", STATIC_OVERRIDES_KEY, e)))?;
        let mut rekeyed = BTreeMap::new();
        for page in overrides.into_values().map(trim_page) {
            if rekeyed.contains_key(&page.path) {
                return Err(ContentError::DuplicatePath(page.path));
            }
            rekeyed.insert(page.path.clone(), page);
        }
        next.static_page_overrides = rekeyed;
    }

    check_pages(&next)?;
    Ok(next)
}

fn trim_page(mut page: Page) -> Page {
    page.id = page.id.trim().to_string();
    page.name = page.name.trim().to_string();
    page.path = page.path.trim().to_string();
    page
}

/// Every page must be well formed, dynamic page ids must be unique, and no two pages
/// (dynamic or override) may share a normalized path.
fn check_pages(content: &SiteContent) -> Result<(), ContentError> {
    let mut ids = HashSet::new();
    let mut paths = HashSet::new();

    let all_pages = content
        .dynamic_pages
        .iter()
        .map(|p| (p, true))
        .chain(content.static_page_overrides.values().map(|p| (p, false)));

    for (page, is_dynamic) in all_pages {
        if page.id.is_empty() {
            return Err(ContentError::InvalidPage(format!(
                "page at '{}' is missing an id",
                page.path
            )));
        }
        validate_page_fields(&page.name, &page.path)
            .map_err(|msg| ContentError::InvalidPage(format!("{} ({})", msg, page.path)))?;
        if is_dynamic && !ids.insert(page.id.as_str()) {
            return Err(ContentError::DuplicateId(page.id.clone()));
        }
        if !paths.insert(normalize_path(&page.path)) {
            return Err(ContentError::DuplicatePath(page.path.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PageStatus;
    use serde_json::json;

    fn defaults() -> Sections {
        load_defaults(None).unwrap()
    }

    fn page(id: &str, path: &str) -> Page {
        Page {
            id: id.to_string(),
            name: format!("Page {}", id),
            path: path.to_string(),
            content: String::new(),
            status: PageStatus::Published,
        }
    }

    #[test]
    fn test_builtin_defaults_cover_all_sections() {
        let defaults = defaults();
        for key in SECTION_KEYS {
            assert!(defaults.contains_key(*key), "missing default for {}", key);
        }
        assert_eq!(defaults.len(), SECTION_KEYS.len());
    }

    #[test]
    fn test_merge_empty_returns_defaults() {
        let defaults = defaults();
        let merged = merge(&defaults, &SiteContent::default());
        assert_eq!(merged.sections, defaults);
        assert!(merged.dynamic_pages.is_empty());
        assert!(merged.static_page_overrides.is_empty());
    }

    #[test]
    fn test_merge_overrides_single_section_wholesale() {
        let defaults = defaults();
        let hero = json!({ "title": "Only a title" });
        let mut persisted = SiteContent::default();
        persisted.sections.insert("hero".into(), hero.clone());

        let merged = merge(&defaults, &persisted);

        assert_eq!(merged.sections["hero"], hero);
        assert!(merged.sections["hero"].get("cta").is_none());
        for (key, value) in &defaults {
            if key != "hero" {
                assert_eq!(&merged.sections[key], value);
            }
        }
    }

    #[test]
    fn test_merge_collections_replace() {
        let mut persisted = SiteContent::default();
        persisted.dynamic_pages.push(page("1", "/team"));
        let merged = merge(&defaults(), &persisted);
        assert_eq!(merged.dynamic_pages, vec![page("1", "/team")]);
    }

    #[test]
    fn test_apply_update_rejects_non_object() {
        let err = apply_update(&SiteContent::default(), &json!([1, 2])).unwrap_err();
        assert!(matches!(err, ContentError::Malformed(_)));
    }

    #[test]
    fn test_apply_update_sections() {
        let mut current = SiteContent::default();
        current.sections.insert("tagline".into(), json!("Old"));
        current.sections.insert("footer".into(), json!({ "tagline": "kept" }));

        let next = apply_update(
            &current,
            &json!({ "tagline": "New", "unknown": 1, "hero": null }),
        )
        .unwrap();

        assert_eq!(next.sections["tagline"], json!("New"));
        assert_eq!(next.sections["footer"], json!({ "tagline": "kept" }));
        assert!(!next.sections.contains_key("unknown"));
        assert!(!next.sections.contains_key("hero"));
    }

    #[test]
    fn test_apply_update_keeps_collections_when_absent() {
        let mut current = SiteContent::default();
        current.dynamic_pages.push(page("1", "/team"));
        let next = apply_update(&current, &json!({ "tagline": "x" })).unwrap();
        assert_eq!(next.dynamic_pages.len(), 1);
    }

    #[test]
    fn test_apply_update_replaces_dynamic_pages() {
        let mut current = SiteContent::default();
        current.dynamic_pages.push(page("1", "/team"));
        let next = apply_update(
            &current,
            &json!({ "dynamicPages": [
                { "id": "2", "name": "News", "path": "/news", "content": "", "status": "Draft" }
            ]}),
        )
        .unwrap();
        assert_eq!(next.dynamic_pages.len(), 1);
        assert_eq!(next.dynamic_pages[0].id, "2");
        assert_eq!(next.dynamic_pages[0].status, PageStatus::Draft);
    }

    #[test]
    fn test_dynamic_page_colliding_with_static_override() {
        let mut current = SiteContent::default();
        current
            .static_page_overrides
            .insert("/about".into(), page("s1", "/about"));

        let err = apply_update(
            &current,
            &json!({ "dynamicPages": [
                { "id": "d1", "name": "About again", "path": "/about/", "status": "Published" }
            ]}),
        )
        .unwrap_err();
        assert!(matches!(err, ContentError::DuplicatePath(p) if p == "/about/"));
    }

    #[test]
    fn test_duplicate_dynamic_ids() {
        let err = apply_update(
            &SiteContent::default(),
            &json!({ "dynamicPages": [
                { "id": "1", "name": "A", "path": "/a" },
                { "id": "1", "name": "B", "path": "/b" }
            ]}),
        )
        .unwrap_err();
        assert!(matches!(err, ContentError::DuplicateId(_)));
    }

    #[test]
    fn test_overrides_rekeyed_by_path() {
        let next = apply_update(
            &SiteContent::default(),
            &json!({ "staticPageOverrides": {
                "wrong-key": { "id": "s1", "name": "About", "path": "/about", "status": "Published" }
            }}),
        )
        .unwrap();
        assert!(next.static_page_overrides.contains_key("/about"));
        assert!(!next.static_page_overrides.contains_key("wrong-key"));
    }

    #[test]
    fn test_invalid_page_path_and_status() {
        let bad_path = apply_update(
            &SiteContent::default(),
            &json!({ "dynamicPages": [{ "id": "1", "name": "A", "path": "NoSlash" }] }),
        )
        .unwrap_err();
        assert!(matches!(bad_path, ContentError::InvalidPage(_)));

        let bad_status = apply_update(
            &SiteContent::default(),
            &json!({ "dynamicPages": [{ "id": "1", "name": "A", "path": "/a", "status": "Live" }] }),
        )
        .unwrap_err();
        assert!(matches!(bad_status, ContentError::Malformed(_)));
    }
}
