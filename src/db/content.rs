//! Persisted site content: sections, dynamic pages and static page overrides.
//!
//! The document is replaced wholesale on every save inside a single transaction.

use std::collections::BTreeMap;

use chrono::Utc;
use sqlx::{Row, SqliteConnection};

use super::Repository;
use crate::content::ContentError;
use crate::models::{Page, PageStatus, RevisionInfo, SiteContent};

impl Repository {
    /// Get the current content revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self) -> Result<RevisionInfo, sqlx::Error> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    /// Read the persisted (unmerged) content document.
    pub async fn load_content(&self) -> Result<SiteContent, ContentError> {
        let mut conn = self.pool.acquire().await?;
        read_content(&mut conn).await
    }

    /// Read the document and the revision it belongs to from one snapshot.
    pub async fn load_content_snapshot(&self) -> Result<(SiteContent, i64), ContentError> {
        let mut tx = self.pool.begin().await?;
        let revision_id: i64 = sqlx::query_scalar("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&mut *tx)
            .await?;
        let content = read_content(&mut tx).await?;
        tx.commit().await?;
        Ok((content, revision_id))
    }

    /// Replace the persisted document and bump the revision. Returns the new revision.
    ///
    /// Nothing is written unless every statement succeeds.
    pub async fn save_content(&self, content: &SiteContent) -> Result<i64, ContentError> {
        let now = Utc::now().to_rfc3339();
        let mut tx = self.pool.begin().await?;

        // Writing first takes the database write lock for the whole transaction.
        let revision_id = bump_revision(&mut tx).await?;

        sqlx::query("DELETE FROM site_content")
            .execute(&mut *tx)
            .await?;
        for (key, value) in &content.sections {
            sqlx::query(
                "INSERT INTO site_content (content_key, content_value, updated_at) VALUES (?, ?, ?)",
            )
            .bind(key)
            .bind(value.to_string())
            .bind(&now)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM dynamic_pages")
            .execute(&mut *tx)
            .await?;
        for page in &content.dynamic_pages {
            sqlx::query(
                "INSERT INTO dynamic_pages (id, name, path, content, status) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&page.id)
            .bind(&page.name)
            .bind(&page.path)
            .bind(&page.content)
            .bind(page.status.as_str())
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM static_page_overrides")
            .execute(&mut *tx)
            .await?;
        for page in content.static_page_overrides.values() {
            sqlx::query(
                "INSERT INTO static_page_overrides (path, id, name, content, status) VALUES (?, ?, ?, ?, ?)",
            )
            .bind(&page.path)
            .bind(&page.id)
            .bind(&page.name)
            .bind(&page.content)
            .bind(page.status.as_str())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(revision_id)
    }
}

/// Increment the revision ID on `conn` and return the new value.
pub(super) async fn bump_revision(conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    sqlx::query("UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1")
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    sqlx::query_scalar("SELECT revision_id FROM meta WHERE id = 1")
        .fetch_one(&mut *conn)
        .await
}

async fn read_content(conn: &mut SqliteConnection) -> Result<SiteContent, ContentError> {
    let mut content = SiteContent::default();

    let rows = sqlx::query("SELECT content_key, content_value FROM site_content")
        .fetch_all(&mut *conn)
        .await?;
    for row in rows {
        let key: String = row.get("content_key");
        let raw: String = row.get("content_value");
        // A save rewrites every row, so an unreadable one must stop the read rather
        // than be dropped.
        let value = serde_json::from_str(&raw).map_err(|e| ContentError::CorruptSection {
            key: key.clone(),
            reason: e.to_string(),
        })?;
        content.sections.insert(key, value);
    }

    let rows = sqlx::query("SELECT id, name, path, content, status FROM dynamic_pages ORDER BY rowid")
        .fetch_all(&mut *conn)
        .await?;
    content.dynamic_pages = rows.iter().map(page_from_row).collect();

    let rows = sqlx::query("SELECT id, name, path, content, status FROM static_page_overrides")
        .fetch_all(&mut *conn)
        .await?;
    content.static_page_overrides = rows
        .iter()
        .map(page_from_row)
        .map(|page| (page.path.clone(), page))
        .collect::<BTreeMap<_, _>>();

    Ok(content)
}

pub(super) fn page_from_row(row: &sqlx::sqlite::SqliteRow) -> Page {
    let status: String = row.get("status");
    Page {
        id: row.get("id"),
        name: row.get("name"),
        path: row.get("path"),
        content: row.get("content"),
        status: PageStatus::parse(&status).unwrap_or_default(),
    }
}
