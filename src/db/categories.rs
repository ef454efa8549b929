//! # 카테고리 집합 해석 쿼리
//!
//! 설정된 포함/제외 카테고리 ID 목록을 실제 글 ID 집합으로 풀어냅니다.
//!
//! ```sql
//! SELECT DISTINCT post_id FROM posts_categories WHERE category_id IN (...)
//! ```
//!
//! 관계를 지연 로딩하지 않고, 집합 하나를 돌려주는 명시적인 쿼리 한 번으로 처리합니다.

use crate::error::AppError;
use crate::models::*;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeSet;

/// 주어진 카테고리들 중 하나라도 속한 모든 글의 ID를 모읍니다 (합집합).
///
/// 카테고리 목록이 비어 있으면 쿼리를 보내지 않고 빈 집합을 반환합니다.
pub async fn post_ids_in_categories(
    pool: &SqlitePool,
    category_ids: &[i64],
) -> Result<BTreeSet<i64>, AppError> {
    if category_ids.is_empty() {
        return Ok(BTreeSet::new());
    }

    // QueryBuilder: IN (?, ?, ...)처럼 바인딩 개수가 가변인 쿼리를 안전하게 만듭니다.
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT DISTINCT post_id FROM posts_categories WHERE category_id IN (",
    );
    let mut ids = qb.separated(", ");
    for id in category_ids {
        ids.push_bind(*id);
    }
    ids.push_unseparated(")");

    let rows: Vec<(i64,)> = qb.build_query_as().fetch_all(pool).await?;
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// 제외/포함 카테고리를 `CategoryConstraint`로 풀어냅니다.
///
/// - `blocked`: 제외 카테고리의 글 ID 합집합
/// - `allowed`: 포함 카테고리가 설정된 경우에만 `Some(합집합)`, 아니면 `None`(제한 없음)
pub async fn resolve_constraint(
    pool: &SqlitePool,
    exclude_ids: &[i64],
    include_ids: &[i64],
) -> Result<CategoryConstraint, AppError> {
    let blocked = post_ids_in_categories(pool, exclude_ids).await?;
    let allowed = if include_ids.is_empty() {
        None
    } else {
        Some(post_ids_in_categories(pool, include_ids).await?)
    };

    tracing::debug!(
        blocked = blocked.len(),
        allowed = ?allowed.as_ref().map(BTreeSet::len),
        "Resolved category constraint"
    );

    Ok(CategoryConstraint {
        include_ids: include_ids.to_vec(),
        exclude_ids: exclude_ids.to_vec(),
        blocked,
        allowed,
    })
}

/// 모든 카테고리를 이름순으로 조회합니다.
///
/// 포함/제외 카테고리 설정에 쓸 수 있는 선택지 목록이기도 합니다.
pub async fn list_categories(pool: &SqlitePool) -> Result<Vec<Category>, AppError> {
    let categories = sqlx::query_as::<_, Category>(
        "SELECT id, name, slug FROM categories ORDER BY name, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(categories)
}
