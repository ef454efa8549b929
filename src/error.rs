//! # 에러 처리 모듈
//!
//! 검색 서비스에서 발생할 수 있는 에러 타입을 정의합니다.
//!
//! - `AppError` 열거형(enum): 모든 에러 종류를 하나의 타입으로 통합
//! - `IntoResponse` 구현: 에러를 HTTP 응답으로 자동 변환
//!
//! 잘못된 페이지 번호 같은 입력 오류는 에러가 아니라 기본값으로 처리하고,
//! 하이라이트 실패는 해당 필드만 건너뜁니다. 그래서 여기에는 "요청 전체를
//! 실패시켜야 하는" 에러만 남아 있습니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// 애플리케이션에서 발생할 수 있는 모든 에러 종류
#[derive(Debug, Error)]
pub enum AppError {
    /// 설정값 오류 (숫자가 아닌 posts-per-page, 존재하지 않는 링크 페이지 등)
    ///
    /// 서버 시작 시 `SearchSettings`를 만들면서 검증하므로,
    /// 정상적으로 뜬 서버의 요청 처리 중에는 나오지 않습니다.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// 저장소(SQLite) 읽기 실패 (HTTP 500)
    /// #[from]: sqlx::Error → AppError::Database 자동 변환 (`?` 연산자 사용 가능)
    /// 재시도하지 않고 그대로 요청 실패로 전파합니다.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    /// AppError를 HTTP 응답으로 변환합니다.
    ///
    /// 내부 에러의 실제 내용은 로그에만 남기고,
    /// 클라이언트에는 일반적인 메시지만 반환합니다.
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::InvalidConfiguration(ref msg) => {
                tracing::error!("Invalid configuration: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "invalid_configuration",
                    "The search component is misconfigured".to_string(),
                )
            }
            AppError::Database(ref e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_unavailable",
                    "A database error occurred".to_string(),
                )
            }
        };

        // 결과: { "error": { "code": "storage_unavailable", "message": "..." } }
        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_error_maps_to_500() {
        let response = AppError::Database(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_configuration_error_message() {
        let err = AppError::InvalidConfiguration("posts per page must be digits".into());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: posts per page must be digits"
        );
    }
}
