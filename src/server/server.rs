//! HTTP server core implementation

use crate::config::ServerConfig;
use crate::monitoring::{AlertSystem, ShutdownSignal};
use crate::server::routes;
use crate::server::state::AppState;
use crate::utils::error::{Result, WatchError};
use actix_web::{
    App, HttpServer as ActixHttpServer,
    middleware::{DefaultHeaders, Logger},
    web,
};
use std::sync::Arc;
use tracing::info;

/// HTTP server for the management API
#[derive(Debug)]
pub struct HttpServer {
    /// Server configuration
    config: ServerConfig,
    /// Application state
    state: AppState,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(config: ServerConfig, system: Arc<AlertSystem>) -> Self {
        Self {
            config,
            state: AppState::new(system),
        }
    }

    /// Create the Actix-web application
    pub fn create_app(
        state: web::Data<AppState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .wrap(Logger::default())
            .wrap(DefaultHeaders::new().add(("Server", "tourney-watch")))
            .configure(routes::configure_routes)
    }

    /// Serve until `signal` fires, then stop gracefully
    pub async fn start(self, mut signal: ShutdownSignal) -> Result<()> {
        let bind_addr = self.config.address();
        info!("Starting HTTP server on {}", bind_addr);

        let server = {
            let state = web::Data::new(self.state);
            let mut server = ActixHttpServer::new(move || Self::create_app(state.clone()))
                .disable_signals();
            if let Some(workers) = self.config.workers {
                server = server.workers(workers);
            }

            server
                .bind(&bind_addr)
                .map_err(|e| WatchError::config(format!("Failed to bind to {}: {}", bind_addr, e)))?
                .run()
        };
        let handle = server.handle();

        info!("HTTP server listening on {}", bind_addr);

        tokio::select! {
            result = server => {
                result.map_err(|e| WatchError::internal(format!("Server error: {}", e)))?;
            }
            _ = signal.cancelled() => {
                info!("Shutting down HTTP server");
                handle.stop(true).await;
            }
        }

        info!("HTTP server stopped");
        Ok(())
    }

    /// Get server configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get application state
    pub fn state(&self) -> &AppState {
        &self.state
    }
}
