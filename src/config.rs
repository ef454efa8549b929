//! # 애플리케이션 설정(Configuration) 모듈
//!
//! 환경변수(.env 포함)에서 서버 설정과 검색 컴포넌트 설정을 읽어옵니다.
//!
//! 서버 설정 (`Config`):
//! - `DATABASE_URL`: SQLite 데이터베이스 경로 (필수)
//! - `HOST`: 서버 바인딩 주소
//! - `PORT`: 서버 포트 번호
//! - `RUN_MIGRATIONS`: 시작 시 스키마 마이그레이션 실행 여부 (기본 true)
//!
//! 검색 설정 (`SearchSettings`):
//! | 환경변수 | 기본값 | 설명 |
//! |----------|--------|------|
//! | `SEARCH_TERM_PARAM` | `{{ :search }}` | 검색어 파라미터 이름 |
//! | `SEARCH_PAGE_PARAM` | `{{ :page }}` | 페이지 번호 파라미터 이름 |
//! | `SEARCH_DISABLE_URL_MAPPING` | `false` | true면 `?search=...` 쿼리 파라미터 사용 |
//! | `SEARCH_HIGHLIGHT` | `false` | 검색어 하이라이트 |
//! | `SEARCH_POSTS_PER_PAGE` | `10` | 페이지당 글 수 (숫자만) |
//! | `SEARCH_NO_POSTS_MESSAGE` | `No posts found` | 결과 없음 메시지 |
//! | `SEARCH_SORT_ORDER` | `published_at desc` | 정렬 |
//! | `SEARCH_INCLUDE_CATEGORIES` | (없음) | 포함 카테고리 ID (쉼표 구분) |
//! | `SEARCH_EXCLUDE_CATEGORIES` | (없음) | 제외 카테고리 ID (쉼표 구분) |
//! | `SEARCH_PAGE_ROUTES` | `DEFAULT_PAGE_ROUTES` | 페이지 이름 → URL 패턴 |
//! | `SEARCH_PAGE` | `search` | 검색 페이지 이름 |
//! | `SEARCH_POST_PAGE` | `blog/post` | 글 링크 페이지 이름 |
//! | `SEARCH_CATEGORY_PAGE` | `blog/category` | 카테고리 링크 페이지 이름 |

use crate::error::AppError;
use crate::models::SortSpec;
use crate::services::{LinkTarget, PageRoutes};
use std::env;

/// 서버 실행에 필요한 기본 설정
#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite 데이터베이스 파일 경로 (예: "sqlite:data/blog.db")
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// 저장소를 다른 프로세스(블로그 엔진)가 관리한다면 false로 끕니다.
    pub run_migrations: bool,
}

impl Config {
    /// 환경변수에서 설정값을 읽어 Config 인스턴스를 생성합니다.
    ///
    /// `DATABASE_URL`은 필수이며, 없으면 에러가 발생합니다.
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            database_url: env::var("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            run_migrations: env::var("RUN_MIGRATIONS")
                .map(|v| parse_flag(&v))
                .unwrap_or(true),
        })
    }
}

const DEFAULT_PAGE_ROUTES: &str =
    "blog/post=/blog/post/:slug;blog/category=/blog/category/:slug;search=/search";

/// 검증이 끝난 검색 컴포넌트 설정
///
/// 서버 시작 시 한 번 만들어져 모든 요청이 읽기 전용으로 공유합니다.
/// 여기까지 만들어졌다면 설정 오류는 더 이상 요청 처리 중에 나오지 않습니다.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// 검색어 파라미터 이름 (`{{ :search }}` → `search`)
    pub search_param: String,
    /// 페이지 번호 파라미터 이름 (`{{ :page }}` → `page`)
    pub page_param: String,
    /// true면 검색어를 URL 경로 세그먼트(`/search/Foo`)로 표현합니다.
    pub url_mapping: bool,
    pub highlight: bool,
    pub posts_per_page: u32,
    pub no_posts_message: String,
    pub sort: SortSpec,
    pub include_categories: Vec<i64>,
    pub exclude_categories: Vec<i64>,
    /// 검색 페이지의 기본 경로 (예: "/search")
    pub search_path: String,
    pub post_page: LinkTarget,
    pub category_page: LinkTarget,
}

impl SearchSettings {
    /// 환경변수에서 검색 설정을 읽고 검증합니다.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_source(|key| env::var(key).ok())
    }

    /// 키 → 값 조회 함수로부터 설정을 만듭니다. 값이 없으면 기본값을 씁니다.
    pub fn from_source(get: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let value = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let search_param = param_name(&value("SEARCH_TERM_PARAM", "{{ :search }}"))?;
        let page_param = param_name(&value("SEARCH_PAGE_PARAM", "{{ :page }}"))?;

        let per_page = value("SEARCH_POSTS_PER_PAGE", "10");
        let posts_per_page = parse_posts_per_page(&per_page)?;

        let sort = value("SEARCH_SORT_ORDER", "published_at desc")
            .parse::<SortSpec>()
            .map_err(AppError::InvalidConfiguration)?;

        let routes = PageRoutes::parse(&value("SEARCH_PAGE_ROUTES", DEFAULT_PAGE_ROUTES))?;
        let search_page = LinkTarget::resolve(&value("SEARCH_PAGE", "search"), &routes)?;
        if search_page.pattern.contains(':') {
            return Err(AppError::InvalidConfiguration(format!(
                "search page route '{}' must not contain parameters",
                search_page.pattern
            )));
        }

        Ok(Self {
            search_param,
            page_param,
            url_mapping: !parse_flag(&value("SEARCH_DISABLE_URL_MAPPING", "false")),
            highlight: parse_flag(&value("SEARCH_HIGHLIGHT", "false")),
            posts_per_page,
            no_posts_message: value("SEARCH_NO_POSTS_MESSAGE", "No posts found"),
            sort,
            include_categories: parse_id_list(&value("SEARCH_INCLUDE_CATEGORIES", ""))?,
            exclude_categories: parse_id_list(&value("SEARCH_EXCLUDE_CATEGORIES", ""))?,
            search_path: normalize_path(&search_page.pattern),
            post_page: LinkTarget::resolve(&value("SEARCH_POST_PAGE", "blog/post"), &routes)?,
            category_page: LinkTarget::resolve(
                &value("SEARCH_CATEGORY_PAGE", "blog/category"),
                &routes,
            )?,
        })
    }

    /// 검색어가 경로 세그먼트로 들어가는 라우트 (axum 0.8 문법: `/search/{search}`)
    pub fn mapped_route(&self) -> String {
        format!(
            "{}/{{{}}}",
            self.search_path.trim_end_matches('/'),
            self.search_param
        )
    }
}

/// `{{ :search }}` 형태의 설정값에서 파라미터 이름(`search`)을 꺼냅니다.
fn param_name(value: &str) -> Result<String, AppError> {
    let name = value
        .trim()
        .strip_prefix("{{")
        .and_then(|v| v.strip_suffix("}}"))
        .map(str::trim)
        .and_then(|v| v.strip_prefix(':'))
        .filter(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));

    name.map(str::to_string).ok_or_else(|| {
        AppError::InvalidConfiguration(format!(
            "parameter '{}' must look like '{{{{ :name }}}}'",
            value
        ))
    })
}

/// 페이지당 글 수는 `^[0-9]+$`만 허용하고, 0은 거부합니다.
fn parse_posts_per_page(value: &str) -> Result<u32, AppError> {
    let invalid = || {
        AppError::InvalidConfiguration(format!(
            "posts per page must be a positive number, got '{}'",
            value
        ))
    };

    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid()),
    }
}

fn parse_id_list(value: &str) -> Result<Vec<i64>, AppError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| {
            v.parse::<i64>().map_err(|_| {
                AppError::InvalidConfiguration(format!("invalid category id '{}'", v))
            })
        })
        .collect()
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<SearchSettings, AppError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SearchSettings::from_source(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.search_param, "search");
        assert_eq!(s.page_param, "page");
        assert!(s.url_mapping);
        assert!(!s.highlight);
        assert_eq!(s.posts_per_page, 10);
        assert_eq!(s.no_posts_message, "No posts found");
        assert_eq!(s.sort, SortSpec::default());
        assert!(s.include_categories.is_empty());
        assert_eq!(s.search_path, "/search");
        assert_eq!(s.post_page.name, "blog/post");
        assert_eq!(s.category_page.pattern, "/blog/category/:slug");
        assert_eq!(s.mapped_route(), "/search/{search}");
    }

    #[test]
    fn test_param_name() {
        assert_eq!(param_name("{{ :q }}").unwrap(), "q");
        assert_eq!(param_name("{{:page_no}}").unwrap(), "page_no");
        assert!(param_name("search").is_err());
        assert!(param_name("{{ : }}").is_err());
        assert!(param_name("{{ :a/b }}").is_err());
    }

    #[test]
    fn test_posts_per_page_must_be_digits() {
        assert!(settings(&[("SEARCH_POSTS_PER_PAGE", "abc")]).is_err());
        assert!(settings(&[("SEARCH_POSTS_PER_PAGE", "-5")]).is_err());
        assert!(settings(&[("SEARCH_POSTS_PER_PAGE", "0")]).is_err());
        assert!(settings(&[("SEARCH_POSTS_PER_PAGE", "")]).is_err());
        assert_eq!(
            settings(&[("SEARCH_POSTS_PER_PAGE", "25")])
                .unwrap()
                .posts_per_page,
            25
        );
    }

    #[test]
    fn test_unknown_link_target_is_rejected() {
        let err = settings(&[("SEARCH_POST_PAGE", "blog/article")]).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_search_page_with_parameters_is_rejected() {
        let routes = "search=/search/:q;blog/post=/p/:slug;blog/category=/c/:slug";
        let err = settings(&[("SEARCH_PAGE_ROUTES", routes)]).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_flags_and_category_lists() {
        let s = settings(&[
            ("SEARCH_DISABLE_URL_MAPPING", "true"),
            ("SEARCH_HIGHLIGHT", "1"),
            ("SEARCH_INCLUDE_CATEGORIES", "1, 2,,3"),
            ("SEARCH_EXCLUDE_CATEGORIES", "9"),
        ])
        .unwrap();
        assert!(!s.url_mapping);
        assert!(s.highlight);
        assert_eq!(s.include_categories, vec![1, 2, 3]);
        assert_eq!(s.exclude_categories, vec![9]);

        assert!(settings(&[("SEARCH_EXCLUDE_CATEGORIES", "news")]).is_err());
    }

    #[test]
    fn test_invalid_sort_order() {
        assert!(settings(&[("SEARCH_SORT_ORDER", "random")]).is_err());
    }
}
