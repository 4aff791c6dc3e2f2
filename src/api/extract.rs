use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Form` whose rejections are reported as JSON [`AppError`]s
#[derive(FromRequest)]
#[from_request(via(axum::Form), rejection(AppError))]
pub struct ValidForm<T>(pub T);
