use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::{
    LabelKind, NewIndexedRepo, Provider, ProviderRepoData, RepoKey, RepoModerationEdit,
};

use super::repo_error::RepositoryError;

pub trait RepoRepository {
    async fn get_repository(&self, key: &RepoKey) -> Result<RepoSummary, RepositoryError>;
    async fn insert_repository(&self, new: &NewIndexedRepo) -> Result<String, RepositoryError>;
    async fn refresh_repository(
        &self,
        key: &RepoKey,
        fresh: &ProviderRepoData,
    ) -> Result<(), RepositoryError>;
    async fn update_moderation(
        &self,
        key: &RepoKey,
        edit: &RepoModerationEdit,
    ) -> Result<(), RepositoryError>;
    async fn delete_repository(&self, key: &RepoKey) -> Result<(), RepositoryError>;
}

#[derive(Clone)]
pub struct RepoRepositoryImpl {
    pool: PgPool,
}

impl RepoRepositoryImpl {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RepoRepository for RepoRepositoryImpl {
    async fn get_repository(&self, key: &RepoKey) -> Result<RepoSummary, RepositoryError> {
        let row: Option<(String, String, String)> = sqlx::query_as(
            r#"
            SELECT provider, author, name
            FROM repositories
            WHERE id = $1
            "#,
        )
        .bind(key.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let (provider, author, name) =
            row.ok_or_else(|| RepositoryError::NotFound(key.to_string()))?;
        let provider = provider
            .parse::<Provider>()
            .map_err(|_| RepositoryError::NotFound(key.to_string()))?;

        Ok(RepoSummary {
            key: RepoKey::new(provider, key.provider_id),
            author,
            name,
        })
    }

    async fn insert_repository(&self, new: &NewIndexedRepo) -> Result<String, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        ensure_label_kind(&mut tx, &new.primary_label, LabelKind::Primary).await?;
        for label in &new.labels {
            ensure_label_kind(&mut tx, label, LabelKind::Regular).await?;
        }

        let id = new.data.key.to_string();
        sqlx::query(
            r#"
            INSERT INTO repositories
                (id, provider, provider_id, author, name, description, stars,
                 primary_label, last_updated, suggested_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(&id)
        .bind(new.data.key.provider.to_string())
        .bind(new.data.key.provider_id)
        .bind(&new.data.author)
        .bind(&new.data.name)
        .bind(new.data.description.as_deref())
        .bind(new.data.stars)
        .bind(&new.primary_label)
        .bind(new.data.last_updated)
        .bind(new.suggested_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(id.clone())
            }
            other => RepositoryError::DatabaseError(other),
        })?;

        for label in &new.labels {
            sqlx::query(
                r#"
                INSERT INTO repo_labels (label_name, repo_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(label)
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        }

        replace_languages(&mut tx, &id, &new.data).await?;

        tx.commit().await?;
        Ok(id)
    }

    async fn refresh_repository(
        &self,
        key: &RepoKey,
        fresh: &ProviderRepoData,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id = key.to_string();
        let updated = sqlx::query(
            r#"
            UPDATE repositories
            SET author = $2, name = $3, description = $4, stars = $5, last_updated = $6
            WHERE id = $1
            "#,
        )
        .bind(&id)
        .bind(&fresh.author)
        .bind(&fresh.name)
        .bind(fresh.description.as_deref())
        .bind(fresh.stars)
        .bind(fresh.last_updated)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(RepositoryError::NotFound(id));
        }

        sqlx::query("DELETE FROM repo_langs WHERE repo_id = $1")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        replace_languages(&mut tx, &id, fresh).await?;

        tx.commit().await?;
        Ok(())
    }

    async fn update_moderation(
        &self,
        key: &RepoKey,
        edit: &RepoModerationEdit,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        ensure_label_kind(&mut tx, &edit.primary_label, LabelKind::Primary).await?;
        for label in &edit.labels {
            ensure_label_kind(&mut tx, label, LabelKind::Regular).await?;
        }

        let id = key.to_string();
        let updated = sqlx::query(
            r#"
            UPDATE repositories
            SET primary_label = $2, maintain_link = $3
            WHERE id = $1
            "#,
        )
        .bind(&id)
        .bind(&edit.primary_label)
        .bind(edit.maintain_link.as_deref())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(RepositoryError::NotFound(id));
        }

        sqlx::query("DELETE FROM repo_labels WHERE repo_id = $1")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        for label in &edit.labels {
            sqlx::query(
                r#"
                INSERT INTO repo_labels (label_name, repo_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(label)
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_repository(&self, key: &RepoKey) -> Result<(), RepositoryError> {
        let deleted = sqlx::query("DELETE FROM repositories WHERE id = $1")
            .bind(key.to_string())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(RepositoryError::NotFound(key.to_string()));
        }

        Ok(())
    }
}

/// A label reference must exist and be of the expected kind before any
/// write happens.
async fn ensure_label_kind(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    expected: LabelKind,
) -> Result<(), RepositoryError> {
    let kind: Option<String> = sqlx::query_scalar("SELECT kind FROM labels WHERE name = $1")
        .bind(name)
        .fetch_optional(&mut **tx)
        .await?;

    match kind {
        None => Err(RepositoryError::UnknownLabel(name.to_owned())),
        Some(kind) if kind != expected.to_string() => Err(RepositoryError::WrongLabelKind {
            label: name.to_owned(),
            expected,
        }),
        Some(_) => Ok(()),
    }
}

async fn replace_languages(
    tx: &mut Transaction<'_, Postgres>,
    repo_id: &str,
    data: &ProviderRepoData,
) -> Result<(), RepositoryError> {
    for lang in &data.languages {
        sqlx::query(
            r#"
            INSERT INTO languages (name, display_name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(&lang.name)
        .bind(&lang.display_name)
        .execute(&mut **tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO repo_langs (lang_name, repo_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(&lang.name)
        .bind(repo_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Just enough of a stored repository to re-fetch it from its provider.
#[derive(Debug, Clone)]
pub struct RepoSummary {
    pub key: RepoKey,
    pub author: String,
    pub name: String,
}
