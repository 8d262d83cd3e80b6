//! Dispenser service runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, database and
//! migrations, REST API and graceful shutdown.

use std::sync::{Arc, OnceLock};

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use tracing::{error, info, warn};

use crate::application::DispenserService;
use crate::config::AppConfig;
use crate::domain::RepositoryProvider;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::{init_database, run_migrations, DatabaseConfig, SeaOrmRepositoryProvider};
use crate::interfaces::http::modules::auth::OperatorCredentials;
use crate::interfaces::http::{create_api_router, RouterDeps};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running dispenser service.
///
/// ```rust,no_run
/// use tapbill::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub service: Arc<DispenserService>,
    pub config: AppConfig,
    /// Port the API is listening on.
    pub port: u16,

    db: DatabaseConnection,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;
        app_cfg.validate()?;

        info!("Starting dispenser service...");

        let prometheus_handle = prometheus_handle();

        // ── Database ───────────────────────────────────────────
        let db = init_database(&DatabaseConfig {
            url: app_cfg.database.url.clone(),
        })
        .await?;

        if opts.auto_migrate {
            run_migrations(&db).await?;
        }

        // ── Services ───────────────────────────────────────────
        let repos: Arc<dyn RepositoryProvider> =
            Arc::new(SeaOrmRepositoryProvider::new(db.clone()));
        let service = Arc::new(DispenserService::new(repos));

        let jwt_config = JwtConfig::new(
            app_cfg.security.jwt_secret.clone(),
            app_cfg.security.jwt_expiration_hours,
        );
        info!(
            expiration_hours = jwt_config.expiration_hours,
            "JWT configured"
        );

        let credentials = Arc::new(OperatorCredentials::new(
            &app_cfg.auth.username,
            &app_cfg.auth.password,
        )?);

        // ── REST API ───────────────────────────────────────────
        let router = create_api_router(RouterDeps {
            service: service.clone(),
            jwt_config,
            credentials,
            db: Some(db.clone()),
            prometheus: prometheus_handle,
        });

        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let api_shutdown = shutdown.signal();

        let addr = app_cfg.listen_address();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();
        info!("REST API listening on http://{}", addr);
        info!("Swagger UI available at http://{}/docs/", addr);

        let api_server = axum::serve(listener, router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            service,
            config: app_cfg,
            port,
            db,
            shutdown,
            api_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the API to drain after shutdown has been triggered.
    pub async fn wait(self) {
        let timeout = std::time::Duration::from_secs(self.shutdown.timeout_secs());
        match tokio::time::timeout(timeout, self.api_task).await {
            Ok(Ok(())) => info!("REST API server stopped"),
            Ok(Err(e)) => error!("REST API server task panicked: {}", e),
            Err(_) => warn!(
                timeout_secs = timeout.as_secs(),
                "REST API did not stop in time"
            ),
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }

        info!("Dispenser service shutdown complete");
    }

    pub async fn shutdown(self) {
        info!("Shutting down dispenser service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// The global recorder can only be installed once per process; later starts
/// reuse it. `None` when installation fails.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!("Metrics disabled, recorder not installed: {}", e);
                None
            }
        })
        .clone()
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
/// `RUST_LOG` takes precedence over `logging.level`.
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    let result = match config.logging.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing already initialised: {}", e);
    }
}
