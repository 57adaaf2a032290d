use std::net::SocketAddr;

use dotenvy::dotenv;
use tracing::{info, warn};

use registrar::logging::init_tracing;
use registrar::metrics::{init_metrics, metrics_app};
use registrar::router::init_router;
use registrar::state::init_app_state;
use registrar_config::ServerConfig;
use registrar_db::run_migrations;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _log_guards = init_tracing()?;

    let metrics_handle = init_metrics()?;
    if metrics_handle.is_none() {
        warn!("Observability disabled; /metrics is not served");
    }

    let state = init_app_state().await?;
    run_migrations(&state.db).await?;

    let mut app = init_router(state);
    if let Some(handle) = metrics_handle {
        app = app.merge(metrics_app(handle));
    }

    let server_config = ServerConfig::from_env();
    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(address = %address, "Server listening");
    info!("Swagger UI available at /swagger-ui, Scalar at /scalar");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
