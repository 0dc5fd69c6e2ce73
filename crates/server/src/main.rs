use axum::Router;
use database::db::create_connection;
use log::{error, info, warn};
use migration::{Migrator, MigratorTrait};
use sea_orm::DbErr;
use server::{
    api_router, build,
    config::{Config, ConfigError},
    state::AppState,
    utils::shutdown::shutdown_signal,
};
use thiserror::Error;
use tower::ServiceBuilder;
use tower_oauth2_resource_server::server::OAuth2ResourceServer;

#[derive(Debug, Error)]
enum StartupError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("failed to set up token validation: {0}")]
    Auth(String),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

async fn guarded_api(state: AppState, issuer_url: Option<&str>) -> Result<Router, StartupError> {
    let api = api_router(state);

    let Some(issuer_url) = issuer_url else {
        warn!("OIDC_ISSUER_URL is not set, every mutating request will be rejected");
        return Ok(api);
    };

    let oauth2_resource_server = <OAuth2ResourceServer>::builder()
        .issuer_url(issuer_url)
        .build()
        .await
        .map_err(|err| StartupError::Auth(format!("{err:?}")))?;
    info!("Validating bearer tokens issued by {issuer_url}");

    Ok(api.layer(ServiceBuilder::new().layer(oauth2_resource_server.into_layer())))
}

async fn run() -> Result<(), StartupError> {
    let config = Config::from_env()?;
    let db = create_connection(&config.database_url).await?;

    if config.run_migrations {
        Migrator::up(&db, None).await?;
        info!("Database schema is up to date");
    }

    let state = AppState::new(db);
    let api = guarded_api(state.clone(), config.oidc_issuer_url.as_deref()).await?;
    let app = build(state, api);

    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    info!("Running axum on http://{}", config.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    if let Err(err) = run().await {
        error!("{err}");
        std::process::exit(1);
    }
}
