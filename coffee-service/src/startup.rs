//! Application startup and lifecycle management.
//!
//! The store handle is opened once here, injected into every handler through
//! `AppState`, and closed after the server has drained.

use crate::config::{CoffeeConfig, StorageBackend};
use crate::handlers;
use crate::services::{CoffeeStore, InMemoryCoffeeStore, MongoCoffeeStore};
use axum::{middleware::from_fn, routing::get, Router};
use service_core::error::AppError;
use service_core::middleware::{
    http_trace_layer, metrics_middleware, permissive_cors, request_id_middleware,
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CoffeeStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn CoffeeStore>) -> Self {
        Self { store }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/coffees",
            get(handlers::list_coffees).post(handlers::create_coffee),
        )
        .route(
            "/coffees/:id",
            get(handlers::get_coffee)
                .put(handlers::update_coffee)
                .delete(handlers::delete_coffee),
        )
        .layer(from_fn(metrics_middleware))
        .layer(http_trace_layer())
        .layer(from_fn(request_id_middleware))
        .layer(permissive_cors())
        .with_state(state)
}

/// Open the store selected by the configuration.
pub async fn open_store(config: &CoffeeConfig) -> Result<Arc<dyn CoffeeStore>, AppError> {
    let store: Arc<dyn CoffeeStore> = match config.storage {
        StorageBackend::Mongodb => Arc::new(
            MongoCoffeeStore::connect(
                &config.mongodb.uri,
                &config.mongodb.database,
                &config.mongodb.collection,
            )
            .await?,
        ),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; records are lost on restart");
            Arc::new(InMemoryCoffeeStore::new())
        }
    };
    Ok(store)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    store: Arc<dyn CoffeeStore>,
}

impl Application {
    pub async fn build(config: CoffeeConfig) -> Result<Self, AppError> {
        let store = open_store(&config).await?;
        Self::build_with_store(&config, store).await
    }

    /// Bind the listener and wire the router around an already opened store.
    ///
    /// An unreachable store does not stop startup: the ping runs in the
    /// background and requests fail individually until the store answers.
    pub async fn build_with_store(
        config: &CoffeeConfig,
        store: Arc<dyn CoffeeStore>,
    ) -> Result<Self, AppError> {
        let pinger = store.clone();
        tokio::spawn(async move {
            match pinger.ping().await {
                Ok(()) => tracing::info!("Pinged the document store; connection is healthy"),
                Err(e) => tracing::warn!(
                    error = %e,
                    "Document store is unreachable; serving anyway"
                ),
            }
        });

        let router = build_router(AppState::new(store.clone()));

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            router,
            store,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn store(&self) -> Arc<dyn CoffeeStore> {
        self.store.clone()
    }

    /// Serve until SIGINT/SIGTERM, then close the store.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(shutdown_signal()).await
    }

    /// Serve until `shutdown` resolves, drain in-flight requests, then close
    /// the store.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        self.store.shutdown().await;
        tracing::info!("Service shutdown complete");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
