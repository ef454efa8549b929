//! # 검색 페이지 핸들러 (SearchController)
//!
//! 요청 하나를 받아 **리다이렉트** 또는 **결과 렌더링** 중 하나로 끝냅니다.
//!
//! ## 엔드포인트
//! | 메서드 | 경로 | 설명 |
//! |--------|------|------|
//! | GET/POST | /search | 검색 페이지 (URL 매핑을 끈 경우 `?search=키워드`) |
//! | GET/POST | /search/{search} | 검색어가 경로에 들어간 정규(canonical) URL |
//!
//! ## 처리 흐름
//! 1. 검색어: URL 매핑이 켜져 있으면 경로 세그먼트, 꺼져 있으면 쿼리 파라미터
//! 2. URL 매핑 + GET + 쿼리 파라미터로 검색어가 왔으면 → `/search/{검색어}`로 리다이렉트
//!    (`?cat[]=...` 카테고리 태그는 유지)
//! 3. 카테고리 제약 해석 → 글 검색 → 링크/하이라이트 주석
//! 4. 요청 페이지가 마지막 페이지보다 크면(그리고 1보다 크면) → 마지막 페이지로 리다이렉트
//! 5. 그 외에는 결과와 파라미터 이름들을 JSON으로 반환 (렌더링은 외부 레이어 담당)

use crate::{
    config::SearchSettings,
    db,
    error::AppError,
    models::*,
    services,
};
use axum::{
    extract::{OriginalUri, Path, State},
    http::Method,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;
use url::form_urlencoded;

/// 애플리케이션 공유 상태
///
/// 모든 요청 핸들러가 `State(state): State<AppState>`로 접근합니다.
/// `SearchSettings`는 시작 시 한 번 검증된 뒤 읽기 전용으로 공유됩니다.
#[derive(Clone)]
pub struct AppState {
    /// SQLite 연결 풀 (내부적으로 Arc로 공유)
    pub pool: SqlitePool,
    pub settings: Arc<SearchSettings>,
}

/// 요청 카테고리 태그 파라미터 이름 (`?cat=1`, `?cat[]=1&cat[]=2`)
const CATEGORY_PARAM: &str = "cat";

/// HTTP 프레임워크와 무관하게 정리한 검색 요청
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub method: Method,
    /// 요청 경로 (쿼리 문자열 제외)
    pub path: String,
    /// 경로 세그먼트로 받은 검색어 (URL 매핑 라우트에서만 Some)
    pub path_term: Option<String>,
    /// 디코딩된 쿼리 파라미터 (순서 유지, 중복 키 허용)
    pub query: Vec<(String, String)>,
}

impl SearchRequest {
    pub fn new(method: Method, path: &str, raw_query: Option<&str>, path_term: Option<String>) -> Self {
        // form_urlencoded::parse: `a=1&b=%20x` → [("a","1"), ("b"," x")]
        // `+`도 공백으로 디코딩합니다. 쿼리 문자열이 없으면 빈 목록
        let query = raw_query
            .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
            .unwrap_or_default();

        Self {
            method,
            path: path.to_string(),
            path_term,
            query,
        }
    }

    /// 같은 키가 여러 번 오면 첫 번째 값을 씁니다.
    fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// `cat`, `cat[]`, `cat[0]` 키의 값을 모두 모읍니다.
    fn category_tag_values(&self) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(k, _)| is_category_key(k))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// 같은 경로에서 파라미터 하나만 바꾼 URL을 만듭니다. 나머지 쿼리 파라미터는 유지됩니다.
    fn url_with_param(&self, name: &str, value: &str) -> String {
        // Serializer: 키/값을 퍼센트 인코딩해 `k=v&k=v` 문자열로 이어붙입니다.
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.query.iter().filter(|(k, _)| k != name) {
            serializer.append_pair(k, v);
        }
        serializer.append_pair(name, value);
        format!("{}?{}", self.path, serializer.finish())
    }
}

/// `cat`, `cat[]`, `cat[0]` 모두 카테고리 태그 키로 인정합니다. `category` 같은 키는 아님
fn is_category_key(key: &str) -> bool {
    match key.strip_prefix(CATEGORY_PARAM) {
        Some("") => true,
        Some(rest) => {
            rest.starts_with('[')
                && rest.ends_with(']')
                && rest[1..rest.len() - 1].bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

/// 요청 하나의 처리 결과
#[derive(Debug)]
pub enum SearchOutcome {
    /// 이동할 URL (경로 + 쿼리 문자열)
    Redirect(String),
    Render(SearchPage),
}

/// 렌더링 레이어에 넘기는 데이터
///
/// 파라미터 이름들은 템플릿에서 쓰는 이름(`pageParam`, `searchTerm` 등) 그대로 직렬화합니다.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(flatten)]
    pub results: ResultPage,
    pub page_param: String,
    pub search_param: String,
    pub search_term: String,
    pub no_posts_message: String,
    pub post_page: String,
    pub category_page: String,
}

/// 요청 범위의 검색 컨텍스트
///
/// 요청에서 뽑아낸 값들을 한곳에 모아 파이프라인 단계 사이에 넘깁니다.
/// 컴포넌트 필드에 상태를 저장하지 않으므로 요청끼리 섞일 일이 없습니다.
#[derive(Debug, Clone)]
struct SearchContext {
    query: SearchQuery,
}

impl SearchContext {
    fn from_request(settings: &SearchSettings, request: &SearchRequest) -> Self {
        // URL 매핑 중에는 경로 세그먼트만 검색어로 봅니다.
        // (쿼리 파라미터 검색어는 GET이면 이미 리다이렉트되었고, POST면 무시)
        let term = if settings.url_mapping {
            request.path_term.clone().unwrap_or_default()
        } else {
            request
                .query_value(&settings.search_param)
                .unwrap_or_default()
                .to_string()
        };

        // 숫자가 아니거나 0 이하인 페이지 번호는 에러가 아니라 기본값 1로 처리
        let page = request
            .query_value(&settings.page_param)
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);

        // 숫자가 아닌 카테고리 태그는 무시
        let category_tags = request
            .category_tag_values()
            .into_iter()
            .filter_map(|v| v.trim().parse::<i64>().ok())
            .collect();

        Self {
            query: SearchQuery {
                term,
                page,
                category_tags,
                per_page: settings.posts_per_page,
                sort: settings.sort,
            },
        }
    }
}

/// 검색어를 경로에 넣은 정규 URL (`/search/Foo%20Bar?cat%5B%5D=1`)
fn canonical_url(settings: &SearchSettings, term: &str, category_tags: &[&str]) -> String {
    // urlencoding::encode: 공백 → %20, `/` → %2F (경로 세그먼트 하나로 유지)
    let mut url = format!(
        "{}/{}",
        settings.search_path.trim_end_matches('/'),
        urlencoding::encode(term)
    );

    if !category_tags.is_empty() {
        // `cat=1`, `cat[0]=1`로 왔어도 정규 URL에서는 항상 `cat[]=1`
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for tag in category_tags {
            serializer.append_pair("cat[]", tag);
        }
        url.push('?');
        url.push_str(&serializer.finish());
    }
    url
}

/// 검색 요청 하나를 끝까지 처리합니다.
pub async fn run_search(
    pool: &SqlitePool,
    settings: &SearchSettings,
    request: &SearchRequest,
) -> Result<SearchOutcome, AppError> {
    // ── 1. 쿼리 파라미터로 온 검색어를 정규 URL로 ──
    if settings.url_mapping && request.method == Method::GET {
        if let Some(term) = request
            .query_value(&settings.search_param)
            .filter(|t| !t.is_empty())
        {
            let target = canonical_url(settings, term, &request.category_tag_values());
            tracing::debug!("Redirecting to canonical search URL {}", target);
            return Ok(SearchOutcome::Redirect(target));
        }
    }

    // ── 2. 검색 파이프라인 ──
    // 요청 값은 SearchContext에만 담고, 공유 설정(settings)은 읽기만 합니다.
    let ctx = SearchContext::from_request(settings, request);
    // 카테고리 제약은 요청마다 다시 계산합니다 (글/카테고리 변경이 바로 반영됨)
    let constraint = db::resolve_constraint(
        pool,
        &settings.exclude_categories,
        &settings.include_categories,
    )
    .await?;
    // ?: 저장소 에러는 AppError::Database로 그대로 전파 → 500 응답
    let page = db::search_posts(pool, &ctx.query, &constraint).await?;
    // 조회 결과의 소유권을 넘겨 링크/하이라이트를 붙인 새 페이지를 받습니다.
    let results = services::annotate(
        page,
        &settings.post_page,
        &settings.category_page,
        settings.highlight,
        &ctx.query.term,
    );

    // ── 3. 범위를 넘은 페이지 → 마지막 페이지로 ──
    // 결과가 0건이면 last_page = 1 이므로 1페이지는 리다이렉트 없이 "결과 없음"을 렌더링
    let last_page = results.pagination.last_page;
    if ctx.query.page > last_page && ctx.query.page > 1 {
        let target = request.url_with_param(&settings.page_param, &last_page.to_string());
        tracing::debug!(
            requested = ctx.query.page,
            last_page,
            "Page out of range, redirecting"
        );
        return Ok(SearchOutcome::Redirect(target));
    }

    // ── 4. 렌더링 데이터 ──
    Ok(SearchOutcome::Render(SearchPage {
        results,
        page_param: settings.page_param.clone(),
        search_param: settings.search_param.clone(),
        search_term: ctx.query.term,
        no_posts_message: settings.no_posts_message.clone(),
        post_page: settings.post_page.name.clone(),
        category_page: settings.category_page.name.clone(),
    }))
}

impl IntoResponse for SearchOutcome {
    fn into_response(self) -> Response {
        match self {
            // Redirect::to: 303 See Other + Location 헤더 (브라우저는 GET으로 따라감)
            SearchOutcome::Redirect(target) => Redirect::to(&target).into_response(),
            // Json: Content-Type: application/json 으로 직렬화
            SearchOutcome::Render(page) => Json(page).into_response(),
        }
    }
}

/// `GET|POST /search`: 검색어가 경로에 없는 검색 페이지
///
/// `OriginalUri`: 중첩 라우터를 거쳐도 잘리지 않은 원래 요청 URI를 추출합니다.
/// 리다이렉트 URL을 만들 때 실제 경로가 필요합니다.
pub async fn search(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> Result<SearchOutcome, AppError> {
    let request = SearchRequest::new(method, uri.path(), uri.query(), None);
    run_search(&state.pool, &state.settings, &request).await
}

/// `GET|POST /search/{search}`: 검색어가 경로 세그먼트에 들어간 검색 페이지
///
/// 파라미터 이름이 설정값이라 `Path<HashMap<..>>`로 받아서 이름으로 꺼냅니다.
/// 경로 세그먼트는 axum이 이미 퍼센트 디코딩한 상태입니다.
pub async fn search_mapped(
    State(state): State<AppState>,
    method: Method,
    OriginalUri(uri): OriginalUri,
    Path(params): Path<HashMap<String, String>>,
) -> Result<SearchOutcome, AppError> {
    let term = params.get(&state.settings.search_param).cloned();
    let request = SearchRequest::new(method, uri.path(), uri.query(), term);
    run_search(&state.pool, &state.settings, &request).await
}
