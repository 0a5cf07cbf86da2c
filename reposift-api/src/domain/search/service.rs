//! Indexed-search orchestration: validation, relational intersection,
//! paginated assembly and response memoization.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use super::traits::{Association, Result, SearchError, SearchStore};
use super::types::{FilterPlan, RawSearchParams, SearchPage, SearchQuery};

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// How long a response stays memoized for an identical request.
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cache_ttl: Duration::from_secs(15 * 60),
            cache_capacity: 1_000,
        }
    }
}

/// The search entry point. A pure function of (request, store contents),
/// memoized per validated request for the configured window.
#[derive(Clone)]
pub struct SearchService<S> {
    store: S,
    cache: Cache<SearchQuery, Arc<SearchPage>>,
}

impl<S> SearchService<S>
where
    S: SearchStore,
{
    pub fn new(store: S, config: SearchConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(config.cache_capacity)
            .time_to_live(config.cache_ttl)
            .build();

        Self { store, cache }
    }

    #[allow(dead_code)]
    pub fn with_defaults(store: S) -> Self {
        Self::new(store, SearchConfig::default())
    }

    /// Validate a raw payload and run the indexed search.
    ///
    /// Returns every violated constraint as `SearchError::Validation`
    /// without touching the store. Within the memoization window an
    /// identical request returns the cached page, store untouched.
    pub async fn search(&self, raw: &RawSearchParams) -> Result<Arc<SearchPage>> {
        let query = SearchQuery::parse(raw).map_err(SearchError::Validation)?;

        if let Some(page) = self.cache.get(&query) {
            return Ok(page);
        }

        let page = self.execute(&query).await?;
        self.cache.insert(query, page.clone());

        Ok(page)
    }

    async fn execute(&self, query: &SearchQuery) -> Result<Arc<SearchPage>> {
        let plan = FilterPlan::from_query(query);

        // Conjunctive across constraint kinds: each intersection runs
        // within the survivors of the previous one.
        let mut subset: Option<Vec<String>> = None;
        let constraints = [
            (Association::Languages, plan.languages),
            (Association::Labels, plan.labels),
        ];
        for (assoc, values) in constraints {
            let Some(values) = values else {
                continue;
            };

            let survivors = self
                .store
                .intersect(assoc, &values, subset.as_deref())
                .await?;
            if survivors.is_empty() {
                // Nothing can match; skip the main query entirely.
                return Ok(Arc::new(SearchPage::empty(query.page)));
            }
            subset = Some(survivors);
        }

        // Over-fetch by one row to learn whether a further page exists
        // without a separate COUNT query.
        let limit = query.per_page + 1;
        let offset = (query.page - 1) * query.per_page;
        let mut items = self
            .store
            .fetch_page(&plan.scalars, subset.as_deref(), limit, offset)
            .await?;

        let has_next = items.len() as i64 > query.per_page;
        items.truncate(query.per_page as usize);

        Ok(Arc::new(SearchPage {
            items,
            curr_page: query.page,
            has_next,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::search::store::MockSearchStore;
    use crate::domain::search::types::{IndexedRepoRecord, LabelRef, LanguageRef};
    use crate::domain::{Provider, RepoKey};
    use time::OffsetDateTime;

    fn repo(
        num: i64,
        stars: i64,
        langs: &[&str],
        labels: &[&str],
    ) -> IndexedRepoRecord {
        IndexedRepoRecord {
            id: RepoKey::new(Provider::Github, num).to_string(),
            provider: Provider::Github,
            author: "octocat".to_string(),
            name: format!("repo-{num}"),
            description: Some("A repository".to_string()),
            stars,
            maintain_link: None,
            last_updated: OffsetDateTime::UNIX_EPOCH,
            suggested_by: "contributor".to_string(),
            primary_label: LabelRef {
                name: "looking-for-maintainers".to_string(),
                display: "Looking for Maintainers".to_string(),
            },
            labels: labels
                .iter()
                .map(|l| LabelRef {
                    name: l.to_string(),
                    display: l.to_string(),
                })
                .collect(),
            languages: langs
                .iter()
                .map(|l| LanguageRef {
                    name: l.to_string(),
                    display: l.to_string(),
                })
                .collect(),
        }
    }

    fn service(repos: Vec<IndexedRepoRecord>) -> (SearchService<MockSearchStore>, MockSearchStore) {
        let store = MockSearchStore::new().with_repos(repos);
        (SearchService::with_defaults(store.clone()), store)
    }

    fn params(languages: Option<&str>) -> RawSearchParams {
        RawSearchParams {
            languages: languages.map(str::to_owned),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn language_filter_requires_every_language() {
        let (service, _) = service(vec![
            repo(1, 10, &["rust", "go"], &[]),
            repo(2, 10, &["rust", "go", "wasm"], &[]),
        ]);

        let page = service
            .search(&params(Some("rust,go,wasm")))
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "2|github");
    }

    #[tokio::test]
    async fn empty_intersection_skips_the_main_query() {
        let (service, store) = service(vec![repo(1, 10, &["rust"], &[])]);

        let raw = RawSearchParams {
            languages: Some("cobol".to_string()),
            page: Some(3),
            ..Default::default()
        };
        let page = service.search(&raw).await.unwrap();

        assert!(page.items.is_empty());
        assert_eq!(page.curr_page, 3);
        assert!(!page.has_next);
        assert_eq!(store.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn pagination_peeks_one_row_ahead() {
        let repos: Vec<_> = (1..=16).map(|n| repo(n, 10, &["rust"], &[])).collect();
        let (service, _) = service(repos);

        let page_one = service
            .search(&RawSearchParams {
                page: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page_one.items.len(), 15);
        assert!(page_one.has_next);

        let page_two = service
            .search(&RawSearchParams {
                page: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page_two.items.len(), 1);
        assert!(!page_two.has_next);
    }

    #[tokio::test]
    async fn star_bounds_are_inclusive() {
        let (service, _) = service(vec![
            repo(1, 100, &[], &[]),
            repo(2, 200, &[], &[]),
            repo(3, 300, &[], &[]),
        ]);

        let page = service
            .search(&RawSearchParams {
                min_stars: Some(100),
                max_stars: Some(200),
                ..Default::default()
            })
            .await
            .unwrap();

        let ids: Vec<_> = page.items.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1|github", "2|github"]);
    }

    #[tokio::test]
    async fn invalid_request_never_reaches_the_store() {
        let (service, store) = service(vec![repo(1, 10, &[], &[])]);

        let err = service
            .search(&params(Some("rust,go,python,c,zig,haskell")))
            .await
            .unwrap_err();

        match err {
            SearchError::Validation(messages) => {
                assert!(messages[0].contains("languages"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(store.intersect_calls(), 0);
        assert_eq!(store.fetch_calls(), 0);
    }

    #[tokio::test]
    async fn repeated_request_hits_the_cache() {
        let (service, store) = service(vec![repo(1, 10, &["rust"], &[])]);

        let first = service.search(&params(Some("rust"))).await.unwrap();
        let second = service.search(&params(Some("rust"))).await.unwrap();

        assert_eq!(store.fetch_calls(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn cache_expires_after_the_window() {
        let store = MockSearchStore::new().with_repos(vec![repo(1, 10, &["rust"], &[])]);
        let service = SearchService::new(
            store.clone(),
            SearchConfig {
                cache_ttl: Duration::from_millis(50),
                cache_capacity: 100,
            },
        );

        service.search(&params(Some("rust"))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(80)).await;
        service.search(&params(Some("rust"))).await.unwrap();

        assert_eq!(store.fetch_calls(), 2);
    }

    #[tokio::test]
    async fn scalar_only_search_skips_the_intersector() {
        let (service, store) = service(vec![repo(1, 10, &[], &[])]);

        service
            .search(&RawSearchParams {
                min_stars: Some(5),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(store.intersect_calls(), 0);
        assert_eq!(store.fetch_calls(), 1);
    }

    #[tokio::test]
    async fn language_and_label_constraints_compose_conjunctively() {
        let (service, store) = service(vec![
            repo(1, 10, &["rust"], &["cli"]),
            repo(2, 10, &["rust"], &[]),
            repo(3, 10, &["go"], &["cli"]),
        ]);

        let page = service
            .search(&RawSearchParams {
                languages: Some("rust".to_string()),
                labels: Some("cli".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "1|github");
        assert_eq!(store.intersect_calls(), 2);
    }

    #[tokio::test]
    async fn combined_language_and_star_filters() {
        let (service, _) = service(vec![
            repo(1, 150, &["rust", "go"], &[]),
            repo(2, 200, &["rust"], &[]),
            repo(3, 50, &["rust", "go"], &[]),
        ]);

        let page = service
            .search(&RawSearchParams {
                languages: Some("rust,go".to_string()),
                min_stars: Some(100),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, "1|github");
        assert_eq!(page.curr_page, 1);
        assert!(!page.has_next);
    }
}
