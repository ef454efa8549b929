//! # 카테고리 목록 핸들러
//!
//! `GET /api/v1/categories` → `{ "categories": [...] }`
//!
//! 포함/제외 카테고리 설정이나 검색 폼의 카테고리 태그 선택지로 쓰이는 목록입니다.

use crate::{db, error::AppError, routes::search::AppState};
use axum::{extract::State, Json};
use serde_json::{json, Value};

pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let categories = db::list_categories(&state.pool).await?;
    Ok(Json(json!({ "categories": categories })))
}
