//! # 데이터베이스 접근 계층 (Data Access Layer)
//!
//! 글/카테고리 저장소를 읽는 쿼리 함수들을 모아둔 모듈입니다.
//! 검색 서비스는 저장소에 쓰지 않으므로 모든 함수가 읽기 전용입니다.
//!
//! 각 하위 모듈:
//! - `categories`: 포함/제외 카테고리 → 글 ID 집합 해석, 카테고리 목록
//! - `posts`: 필터/정렬/페이지네이션이 적용된 글 검색

pub mod categories;
pub mod posts;

pub use categories::*;
pub use posts::*;

/// 테스트용 인메모리 DB와 데이터 삽입 도우미
#[cfg(test)]
pub mod test_support {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use sqlx::SqlitePool;
    use std::str::FromStr;

    /// 게시 시각 기본값 (과거 시점이라 항상 "게시됨")
    pub const PUBLISHED_AT: &str = "2024-01-01T00:00:00.000Z";

    /// 마이그레이션이 적용된 인메모리 SQLite 풀
    ///
    /// `sqlite::memory:`는 연결마다 별도의 DB가 생기므로 연결을 1개로 제한합니다.
    /// 서버와 같이 REGEXP 함수를 등록합니다.
    pub async fn test_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("sqlite url")
            .with_regexp();
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("in-memory sqlite");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("migrations");
        pool
    }

    pub async fn insert_category(pool: &SqlitePool, id: i64, name: &str) {
        sqlx::query("INSERT INTO categories (id, name, slug) VALUES (?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(slug::slugify(name))
            .execute(pool)
            .await
            .expect("insert category");
    }

    /// 게시된 글을 추가합니다. 본문 HTML은 `<p>본문</p>`으로 채웁니다.
    pub async fn insert_post(pool: &SqlitePool, id: i64, title: &str, excerpt: &str, content: &str) {
        sqlx::query(
            r#"
            INSERT INTO posts (id, title, slug, excerpt, content, content_html, published, published_at)
            VALUES (?, ?, ?, ?, ?, ?, 1, ?)
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(slug::slugify(title))
        .bind(excerpt)
        .bind(content)
        .bind(format!("<p>{}</p>", content))
        .bind(PUBLISHED_AT)
        .execute(pool)
        .await
        .expect("insert post");
    }

    pub async fn insert_post_at(pool: &SqlitePool, id: i64, title: &str, published_at: &str) {
        sqlx::query(
            "INSERT INTO posts (id, title, slug, published, published_at) VALUES (?, ?, ?, 1, ?)",
        )
        .bind(id)
        .bind(title)
        .bind(slug::slugify(title))
        .bind(published_at)
        .execute(pool)
        .await
        .expect("insert post");
    }

    pub async fn insert_draft(pool: &SqlitePool, id: i64, title: &str) {
        sqlx::query("INSERT INTO posts (id, title, slug, published) VALUES (?, ?, ?, 0)")
            .bind(id)
            .bind(title)
            .bind(slug::slugify(title))
            .execute(pool)
            .await
            .expect("insert draft");
    }

    pub async fn attach(pool: &SqlitePool, post_id: i64, category_id: i64) {
        sqlx::query("INSERT INTO posts_categories (post_id, category_id) VALUES (?, ?)")
            .bind(post_id)
            .bind(category_id)
            .execute(pool)
            .await
            .expect("attach category");
    }
}
