//! Extractors whose rejections use the JSON error body

use axum::extract::{FromRequest, FromRequestParts};

use crate::error::Error;

/// `axum::Json` with rejections mapped to [`Error`]
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Path` with rejections mapped to [`Error`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct AppPath<T>(pub T);
