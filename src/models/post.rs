//! # 블로그 글/카테고리 모델 정의
//!
//! 저장소(블로그 엔진)가 소유하는 엔티티를 읽기 전용으로 표현합니다.
//! 검색 서비스는 이 값들을 조회해서 복사본에만 `url`과 하이라이트를 덧붙이며,
//! DB에 다시 쓰는 일은 없습니다.
//!
//! ## 테이블 구조
//! - `posts`: 글 엔티티
//! - `categories`: 카테고리 엔티티
//! - `posts_categories`: 글과 카테고리의 다대다(N:M) 관계 테이블

use serde::{Deserialize, Serialize};

/// 카테고리 엔티티, DB의 `categories` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub slug: String,
    /// 카테고리 페이지 링크. 조회 직후에는 None이고, 결과 주석 단계에서 채워집니다.
    ///
    /// `#[sqlx(skip)]`: SQL 결과 행에는 없는 컬럼이므로 `Default::default()`(None)로 초기화합니다.
    #[sqlx(skip)]
    pub url: Option<String>,
}

/// 블로그 글 엔티티, DB의 `posts` 테이블 한 행에 대응합니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    /// 원문(마크다운 등). 검색 매칭에만 쓰이고 응답에는 포함하지 않습니다.
    #[serde(skip_serializing)]
    pub content: String,
    /// 렌더링된 본문 HTML
    pub content_html: String,
    /// 게시 시각 (ISO 8601, 예: "2026-02-16T12:00:00.000Z")
    pub published_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// 함께 읽어온(eager-load) 카테고리 목록
    #[sqlx(skip)]
    pub categories: Vec<Category>,
    /// 글 페이지 링크
    #[sqlx(skip)]
    pub url: Option<String>,
}

/// 글-카테고리 관계를 JOIN해서 읽을 때 쓰는 행 타입입니다.
///
/// 어느 글에 속한 카테고리인지(`post_id`)를 함께 받아와서
/// 글 목록에 카테고리를 나눠 담는 데 사용합니다.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostCategoryRow {
    pub post_id: i64,
    pub id: i64,
    pub name: String,
    pub slug: String,
}

impl From<PostCategoryRow> for Category {
    fn from(row: PostCategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            url: None,
        }
    }
}
