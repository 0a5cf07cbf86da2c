//! PostgreSQL-backed search store.

use std::collections::HashMap;

use async_trait::async_trait;
use itertools::Itertools;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::domain::search::traits::{Association, Result, SearchError, SearchStore};
use crate::domain::search::types::{IndexedRepoRecord, LabelRef, LanguageRef, ScalarFilters};
use crate::domain::Provider;

/// Scalar predicates are expressed as `($n IS NULL OR <predicate>)`
/// guards so one static statement covers every filter combination. The
/// `id = ANY($5)` guard applies the intersector's surviving subset.
/// Ordering is by id, which is stable across pages under concurrent
/// writes.
const FETCH_PAGE_SQL: &str = r#"
    SELECT
        r.id,
        r.provider,
        r.author,
        r.name,
        r.description,
        r.stars,
        r.maintain_link,
        r.last_updated,
        u.handle AS suggested_by,
        l.name AS primary_label,
        l.display_name AS primary_label_display
    FROM repositories r
    JOIN labels l ON l.name = r.primary_label
    JOIN users u ON u.id = r.suggested_by
    WHERE ($1::text[] IS NULL OR r.provider = ANY($1))
      AND ($2::int8 IS NULL OR r.stars >= $2)
      AND ($3::int8 IS NULL OR r.stars <= $3)
      AND ($4::text IS NULL OR r.primary_label = $4)
      AND ($5::text[] IS NULL OR r.id = ANY($5))
    ORDER BY r.id
    LIMIT $6 OFFSET $7
"#;

const PAGE_LABELS_SQL: &str = r#"
    SELECT rl.repo_id, l.name, l.display_name
    FROM repo_labels rl
    JOIN labels l ON l.name = rl.label_name
    WHERE rl.repo_id = ANY($1)
    ORDER BY l.name
"#;

const PAGE_LANGS_SQL: &str = r#"
    SELECT rl.repo_id, lang.name, lang.display_name
    FROM repo_langs rl
    JOIN languages lang ON lang.name = rl.lang_name
    WHERE rl.repo_id = ANY($1)
    ORDER BY lang.name
"#;

#[derive(Clone)]
pub struct PgSearchStore {
    pool: PgPool,
}

impl PgSearchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Batched association fetch for one page of repository ids, grouped
    /// by repository. Two round-trips per page, independent of page size.
    async fn load_assocs(&self, sql: &str, ids: &[String]) -> Result<HashMap<String, Vec<AssocRow>>> {
        let rows: Vec<AssocRow> = sqlx::query_as(sql).bind(ids).fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.repo_id.clone(), row))
            .into_group_map())
    }
}

#[async_trait]
impl SearchStore for PgSearchStore {
    async fn intersect(
        &self,
        assoc: Association,
        values: &[String],
        within: Option<&[String]>,
    ) -> Result<Vec<String>> {
        let (table, column) = match assoc {
            Association::Languages => ("repo_langs", "lang_name"),
            Association::Labels => ("repo_labels", "label_name"),
        };

        // Grouped counting: a repository survives iff it has a join row
        // for every distinct requested value.
        let sql = format!(
            "SELECT repo_id FROM {table} \
             WHERE {column} = ANY($1) \
               AND ($2::text[] IS NULL OR repo_id = ANY($2)) \
             GROUP BY repo_id \
             HAVING COUNT(DISTINCT {column}) = $3"
        );

        let ids: Vec<String> = sqlx::query_scalar(&sql)
            .bind(values)
            .bind(within)
            .bind(values.len() as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    async fn fetch_page(
        &self,
        filters: &ScalarFilters,
        id_subset: Option<&[String]>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<IndexedRepoRecord>> {
        let provider_names: Option<Vec<String>> = filters
            .providers
            .as_ref()
            .map(|providers| providers.iter().map(ToString::to_string).collect());

        let rows: Vec<RepoRow> = sqlx::query_as(FETCH_PAGE_SQL)
            .bind(provider_names)
            .bind(filters.min_stars)
            .bind(filters.max_stars)
            .bind(filters.primary_label.as_deref())
            .bind(id_subset)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
        let mut labels = self.load_assocs(PAGE_LABELS_SQL, &ids).await?;
        let mut langs = self.load_assocs(PAGE_LANGS_SQL, &ids).await?;

        rows.into_iter()
            .map(|row| {
                let provider = row.provider.parse::<Provider>().map_err(|_| {
                    SearchError::DatabaseError(format!(
                        "unknown provider '{}' on repository {}",
                        row.provider, row.id
                    ))
                })?;

                let labels = labels
                    .remove(&row.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|a| LabelRef {
                        name: a.name,
                        display: a.display_name,
                    })
                    .collect();
                let languages = langs
                    .remove(&row.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|a| LanguageRef {
                        name: a.name,
                        display: a.display_name,
                    })
                    .collect();

                Ok(IndexedRepoRecord {
                    id: row.id,
                    provider,
                    author: row.author,
                    name: row.name,
                    description: row.description,
                    stars: row.stars.into(),
                    maintain_link: row.maintain_link,
                    last_updated: row.last_updated,
                    suggested_by: row.suggested_by,
                    primary_label: LabelRef {
                        name: row.primary_label,
                        display: row.primary_label_display,
                    },
                    labels,
                    languages,
                })
            })
            .collect()
    }
}

// Row types for sqlx queries

#[derive(sqlx::FromRow)]
struct RepoRow {
    id: String,
    provider: String,
    author: String,
    name: String,
    description: Option<String>,
    stars: i32,
    maintain_link: Option<String>,
    last_updated: OffsetDateTime,
    suggested_by: String,
    primary_label: String,
    primary_label_display: String,
}

#[derive(sqlx::FromRow)]
struct AssocRow {
    repo_id: String,
    name: String,
    display_name: String,
}
