//! # 라우트 핸들러 모듈
//!
//! HTTP 요청을 처리하는 핸들러 함수들을 모아둔 모듈입니다.
//!
//! 각 하위 모듈:
//! - `categories`: 카테고리 목록
//! - `health`: 서버/DB 상태 확인 (헬스체크)
//! - `search`: 검색 페이지 (리다이렉트 또는 결과 렌더링 데이터)

pub mod categories;
pub mod health;
pub mod search;

pub use categories::*;
pub use health::*;
pub use search::*;
