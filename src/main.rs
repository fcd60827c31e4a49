use anyhow::Result;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;
use wifi_scanner::adapter::{NmcliAdapter, SimulatedAdapter, WifiAdapter};
use wifi_scanner::config::{AdapterBackend, AppConfig, PermissionMode};
use wifi_scanner::permission::{
    PermissionBroker, PermissionOutcome, RadioPermission, StaticPermission,
};
use wifi_scanner::session::{HomeSession, SessionConfig, SessionDeps};
use wifi_scanner::store::{CredentialStore, SqliteKvStore};
use wifi_scanner::*;

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

fn build_adapter(config: &AppConfig) -> Arc<dyn WifiAdapter> {
    match config.adapter.backend {
        AdapterBackend::Nmcli => Arc::new(NmcliAdapter::new(config.adapter.nmcli_options())),
        AdapterBackend::Simulated => Arc::new(SimulatedAdapter::new(
            config.adapter.simulated.clone(),
            config.adapter.simulated_latency_ms,
        )),
    }
}

fn build_permissions(config: &AppConfig, adapter: Arc<dyn WifiAdapter>) -> Arc<dyn PermissionBroker> {
    match config.permission.mode {
        PermissionMode::Radio => Arc::new(RadioPermission::new(adapter)),
        PermissionMode::Granted => Arc::new(StaticPermission(PermissionOutcome::Granted)),
        PermissionMode::Denied => Arc::new(StaticPermission(PermissionOutcome::Denied)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = AppConfig::load()?;
    tracing::info!(
        backend = ?app_config.adapter.backend,
        permission = ?app_config.permission.mode,
        "Starting {}",
        version::banner()
    );

    let kv = SqliteKvStore::connect(&app_config.storage.path, app_config.storage.max_pool_size)
        .await?;
    kv.init().await?;

    let adapter = build_adapter(&app_config);
    let permissions = build_permissions(&app_config, adapter.clone());
    let (events, _) = broadcast::channel(app_config.publishing.broadcast_capacity);

    let session = Arc::new(HomeSession::new(
        SessionDeps {
            adapter,
            permissions,
            credentials: CredentialStore::new(Arc::new(kv)),
            events,
        },
        SessionConfig {
            filter_substring: app_config.scan.filter_substring.clone(),
            filter_enabled: app_config.scan.filter_enabled,
        },
    ));

    // Remembered secrets must be in memory before the first request can save over them.
    session.workflow().load_credentials().await;
    if app_config.scan.scan_on_start {
        let startup = session.clone();
        tokio::spawn(async move {
            let state = startup.refresh().await;
            tracing::info!(
                networks = state.networks.len(),
                error = ?state.last_error,
                "initial scan finished"
            );
        });
    }

    let app = routes::app(
        session,
        app_config.theme.clone(),
        Arc::new(AtomicUsize::new(0)),
        &app_config.server.allowed_origins,
    );
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
    tracing::info!("Received shutdown signal");
}
