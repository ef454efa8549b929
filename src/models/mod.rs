//! # 데이터 모델 모듈
//!
//! 검색 파이프라인에서 사용하는 데이터 구조체(struct)들을 정의합니다.
//! - `post`: 블로그 글(Post)과 카테고리(Category) 엔티티
//! - `search`: 검색 요청/결과와 관련된 값 타입 (SearchQuery, CategoryConstraint, ResultPage 등)
//!
//! `pub use X::*;`로 재공개하여 `crate::models::Post`처럼 짧게 접근할 수 있게 합니다.

pub mod post;
pub mod search;

pub use post::*;
pub use search::*;
