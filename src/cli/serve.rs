use crate::AppContext;
use crate::api::{AppState, Server};
use anyhow::{Context, Result};

pub async fn run(ctx: &AppContext) -> Result<()> {
    let state = AppState::new(ctx.store.clone(), ctx.refresher.clone());
    let server = Server::new(ctx.config.server.clone(), state);
    let (host, port) = (server.config().host.clone(), server.config().port);

    server
        .run()
        .await
        .with_context(|| format!("Server on {host}:{port} failed"))
}
