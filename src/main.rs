use donation_hub::{
    api::{self, AppState},
    auth::TokenService,
    config::{database, load_app_configuration},
    errors::Result,
    services::{LogNotifier, Notifier, PaymentGateway, SimulatedGateway, scheduler},
};
use dotenvy::dotenv;
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables may also be set externally
    dotenv().ok();

    // 3. Load the application configuration
    let app_config = load_app_configuration()?;
    let tokens = TokenService::new(app_config.require_jwt_secret()?, app_config.token_ttl_hours);

    // 4. Initialize database
    let db = database::init_database(&app_config.database_url)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Start the reminder worker
    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
    let gateway: Arc<dyn PaymentGateway> = Arc::new(SimulatedGateway::accepting());
    tokio::spawn(scheduler::run_reminder_worker(
        db.clone(),
        Arc::clone(&notifier),
        Duration::from_secs(app_config.reminder_interval_secs),
        app_config.reminder_retention_days,
    ));

    // 6. Serve HTTP
    let state = AppState {
        db,
        tokens,
        gateway,
        notifier,
        reminder_retention_days: app_config.reminder_retention_days,
    };
    let listener = TcpListener::bind(&app_config.bind_addr)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", app_config.bind_addr, e))?;
    info!("Listening on {}", app_config.bind_addr);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}
