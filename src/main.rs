use std::{env, sync::Arc};
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use waste_rewards::{
    api::{self, AppState},
    config::{self, database},
    core::reward,
    errors::{Error, Result},
    services::{Geocoder, Verifier},
};

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenvy::dotenv().ok();

    // 3. Load the main application configuration
    let app_config = config::load_app_config()
        .inspect_err(|e| error!("Failed to load configuration: {}", e))?;

    // 4. Connect, create tables and seed the reward catalog
    let db = database::create_connection(&database::get_database_url())
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;
    reward::seed_catalog(&db, &app_config.catalog).await?;

    // 5. Classifier, only when an API key is present
    let verifier = match env::var("GEMINI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => Some(Verifier::gemini(&app_config.classifier, key)?),
        _ => {
            warn!("GEMINI_API_KEY not set, photo verification disabled");
            None
        }
    };

    // 6. Geocoder
    let geocoder = Geocoder::new(&app_config.geocoder)?;

    // 7. Serve until ctrl-c or SIGTERM
    let address = format!("{}:{}", app_config.server.host, app_config.server.port);
    let state = Arc::new(AppState {
        database: db,
        config: app_config,
        verifier,
        geocoder,
    });

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Error::from)?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
