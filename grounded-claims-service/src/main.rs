use grounded_claims_service::{LogFormat, ServiceConfig, create_app};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing in the configured output format
fn init_tracing(log_format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "grounded_claims_service=debug,graph_flow=debug,tower_http=debug".into()
    });

    match log_format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env()?;
    init_tracing(config.log_format);

    let app = create_app(&config)?;
    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;
    let addr = listener.local_addr()?;

    info!(
        fact_store_timeout_ms = config.fact_store_timeout.as_millis() as u64,
        tables = ?config.tables_path,
        "Grounded claims service starting on {}",
        addr
    );
    info!("Query endpoint: POST http://{}/grounded/query", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
