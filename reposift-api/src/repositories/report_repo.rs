use serde::Serialize;
use sqlx::PgPool;
use time::OffsetDateTime;

use super::repo_error::RepositoryError;

pub trait ReportRepository {
    async fn insert_report(&self, new: &NewReport) -> Result<i32, RepositoryError>;
    async fn list_open_reports(&self) -> Result<Vec<Report>, RepositoryError>;
    async fn resolve_report(&self, id: i32) -> Result<(), RepositoryError>;
}

#[derive(Clone)]
pub struct ReportRepositoryImpl {
    pool: PgPool,
}

impl ReportRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ReportRepository for ReportRepositoryImpl {
    async fn insert_report(&self, new: &NewReport) -> Result<i32, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO reports (reporter, category, description, repo_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(new.reporter)
        .bind(&new.category)
        .bind(&new.description)
        .bind(new.repo_id.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn list_open_reports(&self) -> Result<Vec<Report>, RepositoryError> {
        let reports: Vec<Report> = sqlx::query_as(
            r#"
            SELECT id, reporter, category, description, repo_id, resolved, created_at
            FROM reports
            WHERE NOT resolved
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }

    async fn resolve_report(&self, id: i32) -> Result<(), RepositoryError> {
        let updated = sqlx::query("UPDATE reports SET resolved = TRUE WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if updated == 0 {
            return Err(RepositoryError::NotFound(format!("report {id}")));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: i32,
    pub reporter: i32,
    pub category: String,
    pub description: String,
    pub repo_id: Option<String>,
    pub resolved: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

pub struct NewReport {
    pub reporter: i32,
    pub category: String,
    pub description: String,
    pub repo_id: Option<String>,
}
