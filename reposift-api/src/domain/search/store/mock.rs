//! In-memory store for testing the search orchestration.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::domain::search::traits::{Association, Result, SearchStore};
use crate::domain::search::types::{IndexedRepoRecord, ScalarFilters};

/// Mock search store backed by a Vec of records.
///
/// Counts `intersect` and `fetch_page` invocations so tests can assert
/// on store access (short-circuits, cache hits, rejected requests).
#[derive(Clone, Default)]
pub struct MockSearchStore {
    repos: Arc<RwLock<Vec<IndexedRepoRecord>>>,
    intersect_calls: Arc<AtomicUsize>,
    fetch_calls: Arc<AtomicUsize>,
}

impl MockSearchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repos(self, repos: Vec<IndexedRepoRecord>) -> Self {
        {
            let mut stored = self.repos.write().unwrap();
            *stored = repos;
        }
        self
    }

    pub fn intersect_calls(&self) -> usize {
        self.intersect_calls.load(Ordering::SeqCst)
    }

    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchStore for MockSearchStore {
    async fn intersect(
        &self,
        assoc: Association,
        values: &[String],
        within: Option<&[String]>,
    ) -> Result<Vec<String>> {
        self.intersect_calls.fetch_add(1, Ordering::SeqCst);

        let repos = self.repos.read().unwrap();
        let mut ids: Vec<String> = repos
            .iter()
            .filter(|repo| {
                if let Some(within) = within {
                    if !within.contains(&repo.id) {
                        return false;
                    }
                }
                values.iter().all(|value| match assoc {
                    Association::Languages => {
                        repo.languages.iter().any(|lang| &lang.name == value)
                    }
                    Association::Labels => repo.labels.iter().any(|label| &label.name == value),
                })
            })
            .map(|repo| repo.id.clone())
            .collect();
        ids.sort();

        Ok(ids)
    }

    async fn fetch_page(
        &self,
        filters: &ScalarFilters,
        id_subset: Option<&[String]>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<IndexedRepoRecord>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);

        let repos = self.repos.read().unwrap();
        let mut matching: Vec<IndexedRepoRecord> = repos
            .iter()
            .filter(|repo| {
                if let Some(providers) = &filters.providers {
                    if !providers.contains(&repo.provider) {
                        return false;
                    }
                }
                if let Some(min) = filters.min_stars {
                    if repo.stars < min {
                        return false;
                    }
                }
                if let Some(max) = filters.max_stars {
                    if repo.stars > max {
                        return false;
                    }
                }
                if let Some(primary) = &filters.primary_label {
                    if &repo.primary_label.name != primary {
                        return false;
                    }
                }
                if let Some(subset) = id_subset {
                    if !subset.contains(&repo.id) {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::types::{LabelRef, LanguageRef};
    use crate::domain::Provider;
    use time::OffsetDateTime;

    fn repo(id: &str, langs: &[&str]) -> IndexedRepoRecord {
        IndexedRepoRecord {
            id: id.to_string(),
            provider: Provider::Github,
            author: "octocat".to_string(),
            name: "hello-world".to_string(),
            description: None,
            stars: 10,
            maintain_link: None,
            last_updated: OffsetDateTime::UNIX_EPOCH,
            suggested_by: "someone".to_string(),
            primary_label: LabelRef {
                name: "looking-for-maintainers".to_string(),
                display: "Looking for Maintainers".to_string(),
            },
            labels: vec![],
            languages: langs
                .iter()
                .map(|l| LanguageRef {
                    name: l.to_string(),
                    display: l.to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn intersect_requires_every_value() {
        let store = MockSearchStore::new().with_repos(vec![
            repo("1|github", &["rust", "go"]),
            repo("2|github", &["rust"]),
        ]);

        let ids = store
            .intersect(
                Association::Languages,
                &["rust".to_string(), "go".to_string()],
                None,
            )
            .await
            .unwrap();

        assert_eq!(ids, vec!["1|github".to_string()]);
    }

    #[tokio::test]
    async fn intersect_respects_within_restriction() {
        let store = MockSearchStore::new().with_repos(vec![
            repo("1|github", &["rust"]),
            repo("2|github", &["rust"]),
        ]);

        let within = vec!["2|github".to_string()];
        let ids = store
            .intersect(Association::Languages, &["rust".to_string()], Some(&within))
            .await
            .unwrap();

        assert_eq!(ids, vec!["2|github".to_string()]);
    }

    #[tokio::test]
    async fn fetch_page_windows_by_offset_and_limit() {
        let store = MockSearchStore::new().with_repos(vec![
            repo("1|github", &[]),
            repo("2|github", &[]),
            repo("3|github", &[]),
        ]);

        let page = store
            .fetch_page(&ScalarFilters::default(), None, 2, 1)
            .await
            .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, "2|github");
        assert_eq!(store.fetch_calls(), 1);
    }
}
