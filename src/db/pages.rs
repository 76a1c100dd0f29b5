//! Dynamic page CRUD.
//!
//! Dynamic pages share the path namespace with static page overrides, so every path
//! write is checked against both tables.

use sqlx::{Row, SqliteConnection};

use super::content::{bump_revision, page_from_row};
use super::Repository;
use crate::errors::AppError;
use crate::models::Page;
use crate::validation::normalize_path;

const PAGE_COLUMNS: &str = "id, name, path, content, status";

impl Repository {
    /// List all dynamic pages by name.
    pub async fn list_pages(&self) -> Result<Vec<Page>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM dynamic_pages ORDER BY name",
            PAGE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(page_from_row).collect())
    }

    /// Get a dynamic page by ID.
    pub async fn get_page(&self, id: &str) -> Result<Option<Page>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM dynamic_pages WHERE id = ?",
            PAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(page_from_row))
    }

    /// Find a published page at an exact path.
    pub async fn find_published_page(&self, path: &str) -> Result<Option<Page>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM dynamic_pages WHERE path = ? AND status = 'Published'",
            PAGE_COLUMNS
        ))
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(page_from_row))
    }

    /// Insert a validated page. Fails with a conflict if its path or id is taken.
    pub async fn create_page(&self, page: &Page) -> Result<Page, AppError> {
        let mut tx = self.pool.begin().await?;

        // Bumping first takes the write lock, so no other writer can claim the path
        // between the check and the insert.
        bump_revision(&mut tx).await?;

        if path_taken(&mut tx, &page.path, None).await? {
            return Err(AppError::Conflict("Path already exists".to_string()));
        }
        let id_taken: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM dynamic_pages WHERE id = ?")
            .bind(&page.id)
            .fetch_one(&mut *tx)
            .await?;
        if id_taken > 0 {
            return Err(AppError::Conflict(format!("Page {} already exists", page.id)));
        }

        sqlx::query("INSERT INTO dynamic_pages (id, name, path, content, status) VALUES (?, ?, ?, ?, ?)")
            .bind(&page.id)
            .bind(&page.name)
            .bind(&page.path)
            .bind(&page.content)
            .bind(page.status.as_str())
            .execute(&mut *tx)
            .await
            .map_err(conflict_on_unique)?;

        tx.commit().await?;
        Ok(page.clone())
    }

    /// Replace a page's fields. Fails with a conflict if the new path belongs to another page.
    pub async fn update_page(&self, page: &Page) -> Result<Page, AppError> {
        let mut tx = self.pool.begin().await?;
        bump_revision(&mut tx).await?;

        if path_taken(&mut tx, &page.path, Some(&page.id)).await? {
            return Err(AppError::Conflict("Path already exists".to_string()));
        }

        let result =
            sqlx::query("UPDATE dynamic_pages SET name = ?, path = ?, content = ?, status = ? WHERE id = ?")
                .bind(&page.name)
                .bind(&page.path)
                .bind(&page.content)
                .bind(page.status.as_str())
                .bind(&page.id)
                .execute(&mut *tx)
                .await
                .map_err(conflict_on_unique)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Page {} not found", page.id)));
        }

        tx.commit().await?;
        Ok(page.clone())
    }

    /// Delete a page.
    pub async fn delete_page(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM dynamic_pages WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Page {} not found", id)));
        }

        bump_revision(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Whether any dynamic page (other than `exclude_id`) or static override uses `path`
/// once normalized.
async fn path_taken(
    conn: &mut SqliteConnection,
    path: &str,
    exclude_id: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let wanted = normalize_path(path);

    let rows = sqlx::query(
        "SELECT id, path FROM dynamic_pages UNION ALL SELECT NULL AS id, path FROM static_page_overrides",
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows.iter().any(|row| {
        let id: Option<String> = row.get("id");
        let existing: String = row.get("path");
        let is_self = matches!((id.as_deref(), exclude_id), (Some(a), Some(b)) if a == b);
        !is_self && normalize_path(&existing) == wanted
    }))
}

fn conflict_on_unique(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::Conflict("Path already exists".to_string())
        }
        other => other.into(),
    }
}
