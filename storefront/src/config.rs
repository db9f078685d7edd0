// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;

/// Which [`Repository`](crate::store::Repository) implementation backs the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Memory,
  Postgres,
}

impl FromStr for StoreBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "memory" | "mem" => Ok(StoreBackend::Memory),
      "postgres" | "pg" => Ok(StoreBackend::Postgres),
      other => Err(AppError::Config(format!("Unknown STORE_BACKEND '{}'", other))),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
  Text,
  Json,
}

/// Uploads larger than this many bytes are refused unless `IMAGE_MAX_BYTES` says otherwise.
pub const DEFAULT_IMAGE_MAX_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct ImageHostConfig {
  pub cloud_name: String,
  pub upload_preset: String,
  pub api_base: String,
  pub delivery_base: String,
  pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  pub database_url: Option<String>,
  pub page_size: usize,
  pub image_host: ImageHostConfig,
  pub seed_db: bool,
  pub log_format: LogFormat,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; `from_env` passes the process
  /// environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get_or = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

    let server_host = get_or("SERVER_HOST", "127.0.0.1");
    let server_port = get_or("SERVER_PORT", "8080")
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;

    let store_backend: StoreBackend = get_or("STORE_BACKEND", "memory").parse()?;
    let database_url = lookup("DATABASE_URL");
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "DATABASE_URL is required when STORE_BACKEND=postgres".to_string(),
      ));
    }

    let page_size = get_or("PAGE_SIZE", "10")
      .parse::<usize>()
      .map_err(|e| AppError::Config(format!("Invalid PAGE_SIZE: {}", e)))?;
    if page_size == 0 {
      return Err(AppError::Config("PAGE_SIZE must be at least 1".to_string()));
    }

    let max_upload_bytes = match lookup("IMAGE_MAX_BYTES") {
      Some(raw) => raw
        .parse::<usize>()
        .map_err(|e| AppError::Config(format!("Invalid IMAGE_MAX_BYTES: {}", e)))?,
      None => DEFAULT_IMAGE_MAX_BYTES,
    };
    if max_upload_bytes == 0 {
      return Err(AppError::Config("IMAGE_MAX_BYTES must be at least 1".to_string()));
    }

    let image_host = ImageHostConfig {
      cloud_name: get_or("IMAGE_HOST_CLOUD_NAME", "demo"),
      upload_preset: get_or("IMAGE_HOST_UPLOAD_PRESET", "unsigned_products"),
      api_base: get_or("IMAGE_HOST_API_BASE", "https://api.cloudinary.com/v1_1"),
      delivery_base: get_or("IMAGE_HOST_DELIVERY_BASE", "https://res.cloudinary.com"),
      max_upload_bytes,
    };

    let seed_db = get_or("SEED_DB", "false")
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid SEED_DB value: {}", e)))?;

    let log_format = match get_or("LOG_FORMAT", "text").to_ascii_lowercase().as_str() {
      "json" => LogFormat::Json,
      "text" | "pretty" => LogFormat::Text,
      other => return Err(AppError::Config(format!("Unknown LOG_FORMAT '{}'", other))),
    };

    tracing::info!(?store_backend, page_size, "Application configuration loaded.");

    Ok(Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      page_size,
      image_host,
      seed_db,
      log_format,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name| map.get(name).cloned()
  }

  #[test]
  fn defaults_use_memory_store() {
    let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg.store_backend, StoreBackend::Memory);
    assert_eq!(cfg.page_size, 10);
    assert_eq!(cfg.bind_address(), "127.0.0.1:8080");
    assert_eq!(cfg.log_format, LogFormat::Text);
  }

  #[test]
  fn postgres_requires_database_url() {
    let err = AppConfig::from_lookup(lookup_from(&[("STORE_BACKEND", "postgres")])).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));

    let cfg = AppConfig::from_lookup(lookup_from(&[
      ("STORE_BACKEND", "pg"),
      ("DATABASE_URL", "postgres://localhost/shop"),
    ]))
    .unwrap();
    assert_eq!(cfg.store_backend, StoreBackend::Postgres);
  }

  #[test]
  fn image_upload_limit_defaults_to_ten_mebibytes() {
    let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg.image_host.max_upload_bytes, DEFAULT_IMAGE_MAX_BYTES);

    let cfg = AppConfig::from_lookup(lookup_from(&[("IMAGE_MAX_BYTES", "524288")])).unwrap();
    assert_eq!(cfg.image_host.max_upload_bytes, 524_288);

    assert!(AppConfig::from_lookup(lookup_from(&[("IMAGE_MAX_BYTES", "0")])).is_err());
    assert!(AppConfig::from_lookup(lookup_from(&[("IMAGE_MAX_BYTES", "big")])).is_err());
  }

  #[test]
  fn rejects_zero_page_size_and_bad_port() {
    assert!(AppConfig::from_lookup(lookup_from(&[("PAGE_SIZE", "0")])).is_err());
    assert!(AppConfig::from_lookup(lookup_from(&[("SERVER_PORT", "eighty")])).is_err());
  }
}
