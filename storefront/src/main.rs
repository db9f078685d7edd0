// storefront/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use storefront::config::{AppConfig, LogFormat, StoreBackend};
use storefront::services::seed::seed_demo_data;
use storefront::store::{MemoryStore, PgStore, Repository};
use storefront::web::configure_app_routes;
use storefront::{AppError, AppState};

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Text => builder.init(),
  }
}

fn startup_error(e: impl std::fmt::Display) -> io::Error {
  io::Error::new(io::ErrorKind::Other, e.to_string())
}

async fn open_store(config: &AppConfig) -> Result<Arc<dyn Repository>, AppError> {
  match config.store_backend {
    StoreBackend::Memory => {
      tracing::warn!("Using the in-memory store; data is lost on restart.");
      Ok(Arc::new(MemoryStore::new()))
    }
    StoreBackend::Postgres => {
      let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| AppError::Config("DATABASE_URL is required for the postgres backend".to_string()))?;
      let store = PgStore::connect(url).await?;
      tracing::info!("Successfully connected to the database.");
      Ok(Arc::new(store))
    }
  }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
  // Logging is not up yet, so configuration errors go to stderr.
  let app_config = match AppConfig::from_env() {
    Ok(cfg) => Arc::new(cfg),
    Err(e) => {
      eprintln!("Configuration error: {}", e);
      return Err(startup_error(e));
    }
  };
  init_tracing(app_config.log_format);
  tracing::info!("Starting bike shop storefront server...");

  let store = open_store(&app_config).await.map_err(|e| {
    tracing::error!(error = %e, "Failed to open the document store.");
    startup_error(e)
  })?;

  if app_config.seed_db {
    match seed_demo_data(&store).await {
      Ok(0) => {}
      Ok(n) => tracing::info!(products = n, "Demo data seeded."),
      Err(e) => tracing::error!(error = %e, "Failed to seed demo data."),
    }
  }

  let app_state = AppState::new(app_config.clone(), store).map_err(startup_error)?;
  app_state.stock.seed().await.map_err(|e| {
    tracing::error!(error = %e, "Failed to load stock counts.");
    startup_error(e)
  })?;
  let _ledger_follow = app_state.stock.follow();

  let server_address = app_config.bind_address();
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
