//! # 글 검색 쿼리 (필터 + 정렬 + 페이지네이션)
//!
//! 카테고리 제약, 검색어, 요청의 카테고리 태그 필터를 하나의 WHERE 절로 합친 뒤
//! 전체 개수(COUNT)와 현재 페이지(LIMIT/OFFSET)를 각각 조회합니다.
//! 그다음 현재 페이지 글들의 카테고리를 한 번에 읽어 각 글에 붙입니다(eager load).
//!
//! ## 필터 순서
//! 1. 게시된 글만 (`published = 1`, 게시 시각이 현재 이전)
//! 2. 제외 카테고리의 글 제거 (`id NOT IN blocked`)
//! 3. 포함 카테고리가 설정된 경우에만 `id IN allowed`
//! 4. 검색어: 제목 OR 요약 OR 본문에 대소문자 무시 부분 문자열 매칭
//! 5. 카테고리 태그 필터: 태그 중 하나 이상에 속한 글
//!
//! ## 대소문자 무시 매칭
//! SQLite의 `LIKE`는 ASCII 범위에서만 대소문자를 무시하므로 `REGEXP`를 씁니다.
//! `REGEXP` 함수는 sqlx의 `regexp` 기능이 연결마다 등록하며(`with_regexp()`),
//! 내부적으로 `regex` 크레이트를 사용합니다. 그래서 하이라이트와 같은 패턴
//! (`highlight::match_source`)으로 매칭하면 "Привет"/"ПРИВЕТ", "Über"/"über"처럼
//! 유니코드 대소문자도 똑같이 취급됩니다.

use crate::error::AppError;
use crate::models::*;
use crate::services::highlight::match_source;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::HashMap;

// 글 조회 시 가져오는 컬럼 목록 (Post 구조체의 DB 필드와 1:1 대응)
// categories, url은 #[sqlx(skip)] 필드라 여기에 없습니다.
const POST_COLUMNS: &str = "p.id, p.title, p.slug, p.excerpt, p.content, p.content_html, \
     p.published_at, p.created_at, p.updated_at";

/// 필터, 정렬, 페이지네이션을 적용해 요청한 페이지의 글 목록을 반환합니다.
///
/// 요청한 페이지가 마지막 페이지를 넘으면 빈 목록을 반환합니다.
/// 리다이렉트 여부는 호출 측(검색 컨트롤러)이 결정합니다.
///
/// # 매개변수
/// - `pool`: DB 연결 풀
/// - `query`: 검색어, 페이지, 페이지당 글 수, 정렬, 카테고리 태그
/// - `constraint`: 설정에서 해석된 카테고리 제약 (`resolve_constraint`의 결과)
pub async fn search_posts(
    pool: &SqlitePool,
    query: &SearchQuery,
    constraint: &CategoryConstraint,
) -> Result<ResultPage, AppError> {
    // 0 이하 값이 들어와도 나눗셈/OFFSET 계산이 깨지지 않도록 최소 1로 보정
    let per_page = query.per_page.max(1);
    let page = query.page.max(1);

    // ── 1단계: 전체 개수 ──
    // QueryBuilder<Sqlite>: 조건에 따라 SQL을 조립하면서 `?` 바인딩을 자동으로 붙여 줍니다.
    let mut count_qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM posts p");
    push_filters(&mut count_qb, query, constraint);
    // 결과가 한 컬럼뿐이라 튜플 (i64,)로 받습니다.
    let (total,): (i64,) = count_qb.build_query_as().fetch_one(pool).await?;

    // ── 2단계: 현재 페이지 ──
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
    qb.push(POST_COLUMNS).push(" FROM posts p");
    // COUNT와 완전히 같은 WHERE 절 → total과 목록이 어긋나지 않음
    push_filters(&mut qb, query, constraint);

    // 정렬 컬럼은 SortField 화이트리스트에서만 나오므로 직접 이어붙여도 안전합니다.
    // 같은 값끼리는 id로 정렬해 페이지 경계가 요청마다 바뀌지 않게 합니다.
    let direction = query.sort.direction.keyword();
    qb.push(format!(
        " ORDER BY p.{} {}, p.id {}",
        query.sort.field.column(),
        direction,
        direction
    ));
    // OFFSET = (page - 1) * per_page
    // 둘 다 u32라 곱하면 i64 범위를 넘을 수 있습니다. 넘으면 i64::MAX로 고정 → 빈 페이지
    let offset = i64::from(page - 1).saturating_mul(i64::from(per_page));
    qb.push(" LIMIT ")
        .push_bind(i64::from(per_page))
        .push(" OFFSET ")
        .push_bind(offset);

    // Post에 #[derive(sqlx::FromRow)]가 있어 각 행이 Post로 자동 변환됩니다.
    let mut posts: Vec<Post> = qb.build_query_as().fetch_all(pool).await?;

    // ── 3단계: 카테고리 eager load ──
    // 글마다 쿼리를 날리지 않고(N+1 방지) 현재 페이지 글 ID로 한 번에 조회합니다.
    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
    let mut categories = load_categories(pool, &ids, constraint).await?;
    for post in &mut posts {
        // remove(): HashMap에서 꺼내면서 소유권을 가져오므로 clone이 필요 없습니다.
        post.categories = categories.remove(&post.id).unwrap_or_default();
    }

    debug_assert!(posts.iter().all(|p| constraint.admits(p.id)));
    tracing::debug!(
        term = %query.term,
        page,
        total,
        returned = posts.len(),
        "Searched posts"
    );

    Ok(ResultPage {
        posts,
        pagination: Pagination::new(page, per_page, total),
    })
}

/// COUNT 쿼리와 페이지 쿼리가 같은 조건을 쓰도록 WHERE 절을 한 곳에서 만듭니다.
fn push_filters(
    qb: &mut QueryBuilder<Sqlite>,
    query: &SearchQuery,
    constraint: &CategoryConstraint,
) {
    // 게시 시각은 마이그레이션의 기본값과 같은 ISO 8601 문자열이라 문자열 비교로 충분합니다.
    qb.push(
        " WHERE p.published = 1 AND p.published_at IS NOT NULL \
         AND p.published_at <= strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
    );

    // 제외 카테고리에 속한 글은 포함 여부와 상관없이 항상 빠집니다.
    if !constraint.blocked.is_empty() {
        qb.push(" AND p.id NOT IN (");
        push_id_list(qb, constraint.blocked.iter().copied());
    }

    // None = 제한 없음. Some(빈 집합)은 "아무 글도 허용하지 않음"
    match &constraint.allowed {
        Some(allowed) if allowed.is_empty() => {
            // `IN ()`은 SQLite 문법 오류라서 항상 거짓인 조건으로 대신합니다.
            qb.push(" AND 0 = 1");
        }
        Some(allowed) => {
            qb.push(" AND p.id IN (");
            push_id_list(qb, allowed.iter().copied());
        }
        None => {}
    }

    // 빈 검색어는 조건을 추가하지 않음 → 제약을 통과한 모든 글
    if !query.term.is_empty() {
        // `x REGEXP ?`는 SQLite가 regexp(?, x)로 호출합니다.
        // 요약(excerpt)이 NULL이면 결과도 NULL이라 OR의 다른 항으로 넘어갑니다.
        let pattern = match_source(&query.term);
        qb.push(" AND (p.title REGEXP ")
            .push_bind(pattern.clone())
            .push(" OR p.excerpt REGEXP ")
            .push_bind(pattern.clone())
            .push(" OR p.content REGEXP ")
            .push_bind(pattern)
            .push(")");
    }

    // 요청의 카테고리 태그: 태그 중 하나라도 가진 글만 (설정 제약과 AND)
    if !query.category_tags.is_empty() {
        qb.push(
            " AND EXISTS (SELECT 1 FROM posts_categories pc \
             WHERE pc.post_id = p.id AND pc.category_id IN (",
        );
        push_id_list(qb, query.category_tags.iter().copied());
        qb.push(")");
    }
}

/// `(?, ?, ...)`의 바인딩 목록을 추가하고 괄호를 닫습니다.
fn push_id_list(qb: &mut QueryBuilder<Sqlite>, ids: impl Iterator<Item = i64>) {
    // separated(): 값 사이에만 구분자를 넣어 줍니다 (마지막 값 뒤에는 없음)
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(")");
}

/// 글 ID 목록의 카테고리를 한 번에 읽어 글별로 나눕니다.
///
/// 표시할 카테고리에도 설정이 적용됩니다. 제외 카테고리는 빠지고,
/// 포함 카테고리가 설정되어 있으면 그것만 남습니다.
/// 이 필터는 **표시용**이며, 글 자체의 검색 대상 여부와는 별개입니다.
async fn load_categories(
    pool: &SqlitePool,
    post_ids: &[i64],
    constraint: &CategoryConstraint,
) -> Result<HashMap<i64, Vec<Category>>, AppError> {
    // 빈 페이지면 쿼리 자체를 생략
    if post_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
        "SELECT pc.post_id, c.id, c.name, c.slug \
         FROM categories c \
         JOIN posts_categories pc ON pc.category_id = c.id \
         WHERE pc.post_id IN (",
    );
    push_id_list(&mut qb, post_ids.iter().copied());

    if !constraint.exclude_ids.is_empty() {
        qb.push(" AND c.id NOT IN (");
        push_id_list(&mut qb, constraint.exclude_ids.iter().copied());
    }
    if !constraint.include_ids.is_empty() {
        qb.push(" AND c.id IN (");
        push_id_list(&mut qb, constraint.include_ids.iter().copied());
    }
    // 글 안에서 카테고리 표시 순서를 고정 (이름순, 같으면 ID순)
    qb.push(" ORDER BY c.name, c.id");

    // PostCategoryRow: (post_id + 카테고리 컬럼) 한 행
    let rows: Vec<PostCategoryRow> = qb.build_query_as().fetch_all(pool).await?;

    // entry().or_default(): 키가 없으면 빈 Vec을 넣고 그 Vec에 push
    let mut by_post: HashMap<i64, Vec<Category>> = HashMap::new();
    for row in rows {
        by_post.entry(row.post_id).or_default().push(row.into());
    }
    Ok(by_post)
}
