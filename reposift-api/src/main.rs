use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

mod app_state;
mod auth;
mod config;
mod domain;
mod repositories;
mod router;
mod routes;

pub use app_state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .init();

    let config = config::read_config().expect("Failed to read configuration");

    let db_pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect_lazy_with(config.database.with_db());

    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");

    let app = router::create(db_pool, config.clone()).await;

    let address = format!(
        "{}:{}",
        config.application.host, config.application.port
    );
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind address");
    tracing::info!("Listening on {}", address);

    axum::serve(listener, app).await.expect("Server error");
}
