use axum::Router;
use complaint_portal::config::AppConfig;
use complaint_portal::error::AppError;
use complaint_portal::lifecycle::NewWorker;
use complaint_portal::portal::{portal_router, PortalService};
use complaint_portal::store::{InMemoryPortalStore, PgPortalStore, PortalStore, StoreError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the portal router over Postgres when a database URL is configured, in memory otherwise.
pub(crate) async fn portal_routes(
    config: &AppConfig,
    seeds: Vec<NewWorker>,
) -> Result<Router, AppError> {
    if config.database.url.is_some() {
        let store = connect_database(config).await?;
        if config.database.migrate_on_start {
            store.migrate().await?;
        }
        seed_workers(&store, seeds).await?;
        info!("complaints persisted to postgres");
        Ok(router_over(store, config))
    } else {
        let store = InMemoryPortalStore::new();
        seed_workers(&store, seeds).await?;
        warn!("APP_DATABASE_URL not set; records are kept in memory and lost on restart");
        Ok(router_over(store, config))
    }
}

fn router_over<S: PortalStore + 'static>(store: S, config: &AppConfig) -> Router {
    let service = PortalService::new(Arc::new(store), config.admin.clone());
    portal_router(Arc::new(service))
}

pub(crate) async fn connect_database(config: &AppConfig) -> Result<PgPortalStore, AppError> {
    let url = config.database.url.as_deref().ok_or_else(|| {
        AppError::Usage("APP_DATABASE_URL must be set for this command".to_string())
    })?;
    Ok(PgPortalStore::connect(url, &config.database).await?)
}

/// Registers startup workers, skipping any whose username is already taken.
pub(crate) async fn seed_workers<S: PortalStore>(
    store: &S,
    seeds: Vec<NewWorker>,
) -> Result<(), AppError> {
    for seed in seeds {
        let username = seed.username.clone();
        match store.create_worker(seed).await {
            Ok(worker) => info!(username = %worker.username, name = %worker.name, "worker seeded"),
            Err(StoreError::DuplicateUsername(_)) => {
                info!(%username, "worker already registered; seed skipped")
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Parses `USERNAME:PASSWORD:NAME`. The display name may itself contain colons.
pub(crate) fn parse_worker_seed(raw: &str) -> Result<NewWorker, String> {
    let mut parts = raw.splitn(3, ':');
    let username = parts.next().map(str::trim).unwrap_or_default();
    let password = parts.next().unwrap_or_default();
    let name = parts.next().map(str::trim).unwrap_or_default();

    if username.is_empty() || password.is_empty() || name.is_empty() {
        return Err(format!(
            "invalid worker seed '{raw}', expected USERNAME:PASSWORD:NAME"
        ));
    }

    Ok(NewWorker {
        username: username.to_string(),
        password: password.to_string(),
        name: name.to_string(),
    })
}
