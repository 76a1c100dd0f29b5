//! Contact form submissions.

use chrono::Utc;
use sqlx::Row;

use super::Repository;
use crate::errors::AppError;
use crate::models::{ContactStatus, ContactSubmission};

impl Repository {
    /// List all submissions, newest first.
    pub async fn list_contacts(&self) -> Result<Vec<ContactSubmission>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, email, phone, message, status, submitted_at FROM contact_submissions ORDER BY submitted_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(contact_from_row).collect())
    }

    /// Store a validated submission and return its ID.
    pub async fn create_contact(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        message: &str,
    ) -> Result<i64, AppError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO contact_submissions (name, email, phone, message, status, submitted_at) VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(email)
        .bind(phone)
        .bind(message)
        .bind(ContactStatus::New.as_str())
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn update_contact_status(&self, id: i64, status: ContactStatus) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE contact_submissions SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Contact {} not found", id)));
        }
        Ok(())
    }

    pub async fn delete_contact(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM contact_submissions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Contact {} not found", id)));
        }
        Ok(())
    }
}

fn contact_from_row(row: &sqlx::sqlite::SqliteRow) -> ContactSubmission {
    let status: String = row.get("status");
    ContactSubmission {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        message: row.get("message"),
        status: ContactStatus::parse(&status).unwrap_or(ContactStatus::New),
        submitted_at: row.get("submitted_at"),
    }
}
