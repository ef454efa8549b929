//! # 서비스 모듈
//!
//! DB를 거치지 않는 순수 로직을 모아둔 모듈입니다.
//! - `annotate`: 결과 페이지에 링크/하이라이트 적용
//! - `highlight`: 검색어 `<mark>` 하이라이트 (HTML 태그 인식)
//! - `links`: 페이지 이름 → URL 패턴 → 글/카테고리 URL

pub mod annotate;
pub mod highlight;
pub mod links;

pub use annotate::annotate;
pub use links::{LinkTarget, PageRoutes};
