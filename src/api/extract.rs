//! Request extractors
//!
//! JSON bodies whose rejections render as the standard error body.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` with failures reported as 400 `validation_error`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
