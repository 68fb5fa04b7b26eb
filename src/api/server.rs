//! Server startup and binding

use crate::core::config::ServerConfig;
use axum::Router;
use tokio::net::TcpListener;

use super::{AppState, build_router};

pub struct Server {
    config: ServerConfig,
    router: Router,
}

impl Server {
    pub fn new(config: ServerConfig, state: AppState) -> Self {
        Self {
            config,
            router: build_router(state),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Binds to the configured host/port and serves until the process stops.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind((self.config.host.as_str(), self.config.port)).await?;
        self.run_with_listener(listener).await
    }

    /// Serves on an already bound listener, e.g. one bound to port 0 in tests.
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!("Country Currency & Exchange API listening on http://{}", addr);

        axum::serve(listener, self.router).await
    }
}
