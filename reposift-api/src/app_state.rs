use std::time::Duration;

use github_rest::GithubClient;
use sqlx::PgPool;
use url::Url;

use crate::{
    config::Settings,
    domain::search::{store::PgSearchStore, SearchConfig, SearchService},
    repositories::{
        LabelRepositoryImpl, RepoRepositoryImpl, ReportRepositoryImpl, UserRepositoryImpl,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub app_url: Url,
    pub search: SearchService<PgSearchStore>,
    pub github: GithubClient,
    pub repository_repo: RepoRepositoryImpl,
    pub label_repo: LabelRepositoryImpl,
    pub user_repo: UserRepositoryImpl,
    pub report_repo: ReportRepositoryImpl,
}

impl AppState {
    pub fn new(db_pool: PgPool, config: &Settings) -> Self {
        let app_url = Url::parse(&config.application.app_url).expect("Invalid app URL");

        let search = SearchService::new(
            PgSearchStore::new(db_pool.clone()),
            SearchConfig {
                cache_ttl: Duration::from_secs(config.search.cache_ttl_seconds),
                cache_capacity: config.search.cache_capacity,
            },
        );
        let github = GithubClient::new(&config.github.user_agent, config.github.token.clone());

        Self {
            app_url,
            search,
            github,
            repository_repo: RepoRepositoryImpl::new(db_pool.clone()),
            label_repo: LabelRepositoryImpl::new(db_pool.clone()),
            user_repo: UserRepositoryImpl::new(db_pool.clone()),
            report_repo: ReportRepositoryImpl::new(db_pool),
        }
    }
}
