use sqlx::PgPool;

use crate::domain::{safe_name, Label, LabelKind};

use super::repo_error::RepositoryError;

pub trait LabelRepository {
    async fn list_labels(&self, kind: Option<LabelKind>) -> Result<Vec<Label>, RepositoryError>;
    async fn insert_label(&self, new: &NewLabel) -> Result<Label, RepositoryError>;
    async fn delete_label(&self, name: &str) -> Result<(), RepositoryError>;
}

#[derive(Clone)]
pub struct LabelRepositoryImpl {
    pool: PgPool,
}

impl LabelRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl LabelRepository for LabelRepositoryImpl {
    async fn list_labels(&self, kind: Option<LabelKind>) -> Result<Vec<Label>, RepositoryError> {
        let rows: Vec<LabelRow> = sqlx::query_as(
            r#"
            SELECT name, display_name, kind, suggested_by
            FROM labels
            WHERE ($1::text IS NULL OR kind = $1)
            ORDER BY name
            "#,
        )
        .bind(kind.map(|k| k.to_string()))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Label::from).collect())
    }

    async fn insert_label(&self, new: &NewLabel) -> Result<Label, RepositoryError> {
        let name = safe_name(&new.display_name);

        let row: LabelRow = sqlx::query_as(
            r#"
            INSERT INTO labels (name, display_name, kind, suggested_by)
            VALUES ($1, $2, $3, $4)
            RETURNING name, display_name, kind, suggested_by
            "#,
        )
        .bind(&name)
        .bind(&new.display_name)
        .bind(new.kind.to_string())
        .bind(new.suggested_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(name.clone())
            }
            other => RepositoryError::DatabaseError(other),
        })?;

        Ok(row.into())
    }

    async fn delete_label(&self, name: &str) -> Result<(), RepositoryError> {
        // Only the community-suggested taxonomy is deletable; primary
        // labels are referenced by every repository row.
        let kind: Option<String> = sqlx::query_scalar("SELECT kind FROM labels WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        match kind.as_deref() {
            None => return Err(RepositoryError::NotFound(name.to_owned())),
            Some("regular") => {}
            Some(_) => {
                return Err(RepositoryError::WrongLabelKind {
                    label: name.to_owned(),
                    expected: LabelKind::Regular,
                })
            }
        }

        sqlx::query("DELETE FROM labels WHERE name = $1")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct LabelRow {
    name: String,
    display_name: String,
    kind: String,
    suggested_by: Option<i32>,
}

impl From<LabelRow> for Label {
    fn from(row: LabelRow) -> Self {
        Self {
            name: row.name,
            display_name: row.display_name,
            kind: row.kind.parse().unwrap_or(LabelKind::Regular),
            suggested_by: row.suggested_by,
        }
    }
}

pub struct NewLabel {
    pub display_name: String,
    pub kind: LabelKind,
    pub suggested_by: Option<i32>,
}
