//! 请求提取器
//! 解析失败统一转换为 `AppError`，响应体保持 `{"error": ...}`

use crate::error::AppError;
use axum::{
    extract::{Path, Query},
    Json,
};
use axum_extra::extract::WithRejection;

pub type ApiJson<T> = WithRejection<Json<T>, AppError>;
pub type ApiPath<T> = WithRejection<Path<T>, AppError>;
pub type ApiQuery<T> = WithRejection<Query<T>, AppError>;
