//! # 헬스체크(Health Check) 핸들러
//!
//! - `GET /api/v1/health` → `{ "status": "ok", "database": "ok" }`
//!
//! 서버 프로세스뿐 아니라 저장소 연결까지 확인합니다.
//! DB에 닿지 못하면 `AppError::Database` → HTTP 500이 됩니다.

use crate::{error::AppError, routes::search::AppState};
use axum::{extract::State, Json};
use serde_json::{json, Value};

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    // 가장 가벼운 쿼리로 연결 풀에서 연결을 하나 빌려 응답을 확인
    sqlx::query("SELECT 1").execute(&state.pool).await?;

    Ok(Json(json!({
        "status": "ok",
        "database": "ok"
    })))
}
