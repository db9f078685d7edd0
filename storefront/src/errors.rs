// storefront/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use wheelwork::FlowError;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Out of stock: product {product_id} has {available} unit(s) available")]
  OutOfStock { product_id: String, available: u32 },

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Store Error: {0}")]
  Store(#[from] StoreError),

  #[error("Image Host Error: {0}")]
  ImageHost(String),

  #[error("Payload Too Large: {0}")]
  PayloadTooLarge(String),

  /// The first write of a two-step update landed, the second did not.
  #[error("Partial write: {0}")]
  PartialWrite(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Builds a `PartialWrite` naming what landed and what failed.
  pub fn partial(completed: impl std::fmt::Display, failed: impl std::fmt::Display) -> Self {
    AppError::PartialWrite(format!("{} succeeded but {} failed", completed, failed))
  }
}

impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    let err = match err.downcast::<AppError>() {
      Ok(app_err) => return app_err,
      Err(other) => other,
    };
    match err.downcast::<StoreError>() {
      Ok(store_err) => AppError::Store(store_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    match self {
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      AppError::OutOfStock { product_id, available } => HttpResponse::Conflict().json(json!({
        "error": "Product is out of stock",
        "productId": product_id,
        "available": available,
      })),
      AppError::Auth(m) => HttpResponse::Unauthorized().json(json!({"error": m})),
      AppError::Forbidden(m) => HttpResponse::Forbidden().json(json!({"error": m})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      AppError::Store(StoreError::NotFound(path)) => {
        HttpResponse::NotFound().json(json!({"error": "Document not found", "detail": path}))
      }
      AppError::Store(e) => {
        HttpResponse::BadGateway().json(json!({"error": "Remote store request failed", "detail": e.to_string()}))
      }
      AppError::ImageHost(m) => {
        HttpResponse::BadGateway().json(json!({"error": "Image host request failed", "detail": m}))
      }
      AppError::PayloadTooLarge(m) => HttpResponse::PayloadTooLarge().json(json!({"error": m})),
      AppError::PartialWrite(m) => HttpResponse::InternalServerError()
        .json(json!({"error": "Operation only partially completed", "detail": m})),
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      AppError::Workflow { source } => {
        tracing::error!(flow_error_source = ?source, "Workflow error details");
        HttpResponse::InternalServerError()
          .json(json!({"error": "Workflow processing error", "detail": source.to_string()}))
      }
      AppError::Internal(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
