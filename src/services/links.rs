//! # 링크 대상(Link target) 해석
//!
//! 설정에서 `postPage = "blog/post"`처럼 **페이지 이름**으로 링크 대상을 지정하면,
//! 페이지 라우트 표(`PageRoutes`)에서 URL 패턴(`/blog/post/:slug`)을 찾아
//! 각 글/카테고리의 실제 URL을 만들어 줍니다.
//!
//! ## 지원하는 패턴 파라미터
//! | 대상 | 파라미터 |
//! |------|----------|
//! | 글 | `:id`, `:slug`, `:year`, `:month`, `:day`, `:category` |
//! | 카테고리 | `:id`, `:slug` |
//!
//! 값을 채울 수 없는 파라미터 세그먼트는 URL에서 빠집니다.

use crate::error::AppError;
use crate::models::{Category, Post};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

/// 페이지 이름 → URL 패턴 표
///
/// 환경변수 `SEARCH_PAGE_ROUTES`의 `"이름=/패턴;이름=/패턴"` 형식을 파싱합니다.
///
/// 튜플 구조체(newtype): `BTreeMap`을 감싸서 "페이지 라우트 표"라는 의미를 타입으로 드러냅니다.
/// BTreeMap은 키 순서가 고정되어 로그/디버그 출력이 항상 같습니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRoutes(BTreeMap<String, String>);

impl PageRoutes {
    pub fn parse(spec: &str) -> Result<Self, AppError> {
        let mut routes = BTreeMap::new();
        // 빈 항목(`;;`, 끝의 `;`)은 건너뜁니다.
        for entry in spec.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            // split_once: 첫 번째 `=`에서만 나눕니다. `=`가 없으면 None → 설정 오류
            let (name, pattern) = entry.split_once('=').ok_or_else(|| {
                AppError::InvalidConfiguration(format!("malformed page route '{}'", entry))
            })?;
            let (name, pattern) = (name.trim(), pattern.trim());
            // 패턴은 반드시 절대 경로
            if name.is_empty() || !pattern.starts_with('/') {
                return Err(AppError::InvalidConfiguration(format!(
                    "malformed page route '{}'",
                    entry
                )));
            }
            routes.insert(name.to_string(), pattern.to_string());
        }
        Ok(Self(routes))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// 이름으로 찾아낸 링크 대상 페이지
#[derive(Debug, Clone, PartialEq)]
pub struct LinkTarget {
    /// 설정에 적힌 페이지 이름 (렌더링 레이어에 그대로 전달됨)
    pub name: String,
    pub pattern: String,
}

impl LinkTarget {
    /// 페이지 이름을 라우트 표에서 찾습니다. 없으면 `InvalidConfiguration`.
    pub fn resolve(name: &str, routes: &PageRoutes) -> Result<Self, AppError> {
        let pattern = routes.get(name).ok_or_else(|| {
            AppError::InvalidConfiguration(format!("unknown link target page '{}'", name))
        })?;
        Ok(Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
        })
    }

    /// 글 링크 URL을 만듭니다.
    ///
    /// 날짜 파라미터는 게시 시각 기준이고, `:category`는 (표시 필터를 거친) 첫 카테고리입니다.
    pub fn post_url(&self, post: &Post) -> String {
        // 게시 시각이 없거나 형식이 다르면 None → :year/:month/:day 세그먼트가 빠짐
        let date = post.published_at.as_deref().and_then(parse_timestamp);
        let slug = non_empty_or_slugify(&post.slug, &post.title);

        // 클로저가 파라미터 이름 → 값을 돌려줍니다. None이면 그 세그먼트를 생략
        self.build(|param| match param {
            "id" => Some(post.id.to_string()),
            "slug" => Some(slug.clone()),
            "year" => date.map(|d| format!("{:04}", d.year())),
            "month" => date.map(|d| format!("{:02}", d.month())),
            "day" => date.map(|d| format!("{:02}", d.day())),
            "category" => post
                .categories
                .first()
                .map(|c| non_empty_or_slugify(&c.slug, &c.name)),
            _ => None,
        })
    }

    /// 카테고리 링크 URL을 만듭니다.
    pub fn category_url(&self, category: &Category) -> String {
        let slug = non_empty_or_slugify(&category.slug, &category.name);

        self.build(|param| match param {
            "id" => Some(category.id.to_string()),
            "slug" => Some(slug.clone()),
            _ => None,
        })
    }

    /// 패턴의 `:이름` 세그먼트를 값으로 치환합니다.
    /// `:slug?`처럼 끝에 붙은 `?`(선택 파라미터 표시)는 무시합니다.
    fn build(&self, value_of: impl Fn(&str) -> Option<String>) -> String {
        let segments: Vec<String> = self
            .pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .filter_map(|segment| match segment.strip_prefix(':') {
                // 파라미터 세그먼트: 값이 있으면 퍼센트 인코딩 (slug의 `/`, 공백 등)
                Some(param) => value_of(param.trim_end_matches('?'))
                    .filter(|v| !v.is_empty())
                    .map(|v| urlencoding::encode(&v).into_owned()),
                // 고정 세그먼트는 그대로
                None => Some(segment.to_string()),
            })
            .collect();

        format!("/{}", segments.join("/"))
    }
}

/// slug가 비어 있으면 이름(제목)으로 slug를 만듭니다. 예: "Rust Tips" → "rust-tips"
fn non_empty_or_slugify(slug: &str, fallback: &str) -> String {
    if slug.is_empty() {
        slug::slugify(fallback)
    } else {
        slug.to_string()
    }
}

/// 게시 시각 문자열에서 날짜만 뽑아냅니다.
/// RFC 3339("2026-02-16T12:00:00.000Z")와 SQLite 기본 형식("2026-02-16 12:00:00")을 받습니다.
fn parse_timestamp(value: &str) -> Option<NaiveDate> {
    // 마이그레이션 기본값(strftime '%Y-%m-%dT%H:%M:%fZ')은 RFC 3339 형식
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.date())
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(slug: &str, published_at: Option<&str>) -> Post {
        Post {
            id: 7,
            title: "Hello World".to_string(),
            slug: slug.to_string(),
            excerpt: None,
            content: String::new(),
            content_html: String::new(),
            published_at: published_at.map(str::to_string),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
            categories: vec![Category {
                id: 3,
                name: "Rust Tips".to_string(),
                slug: String::new(),
                url: None,
            }],
            url: None,
        }
    }

    fn target(pattern: &str) -> LinkTarget {
        LinkTarget {
            name: "blog/post".to_string(),
            pattern: pattern.to_string(),
        }
    }

    #[test]
    fn test_page_routes_parse() {
        let routes = PageRoutes::parse("blog/post=/blog/:slug; search = /search ;").unwrap();
        assert_eq!(routes.get("blog/post"), Some("/blog/:slug"));
        assert_eq!(routes.get("search"), Some("/search"));
        assert_eq!(routes.get("missing"), None);
    }

    #[test]
    fn test_page_routes_rejects_malformed() {
        assert!(PageRoutes::parse("blog/post").is_err());
        assert!(PageRoutes::parse("blog/post=blog/:slug").is_err());
        assert!(PageRoutes::parse("=/blog").is_err());
    }

    #[test]
    fn test_resolve_unknown_page_is_configuration_error() {
        let routes = PageRoutes::parse("blog/post=/blog/:slug").unwrap();
        let err = LinkTarget::resolve("blog/missing", &routes).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_post_url_with_date_parts() {
        let url = target("/blog/:year/:month/:day/:slug")
            .post_url(&post("first-post", Some("2026-02-06T09:30:00.000Z")));
        assert_eq!(url, "/blog/2026/02/06/first-post");
    }

    #[test]
    fn test_post_url_falls_back_to_slugified_title() {
        let url = target("/blog/post/:slug").post_url(&post("", None));
        assert_eq!(url, "/blog/post/hello-world");
    }

    #[test]
    fn test_post_url_drops_unfillable_segments() {
        let url = target("/blog/:year/:id/:unknown?").post_url(&post("x", None));
        assert_eq!(url, "/blog/7");
    }

    #[test]
    fn test_post_url_category_param() {
        let url = target("/blog/:category/:slug").post_url(&post("x", None));
        assert_eq!(url, "/blog/rust-tips/x");
    }

    #[test]
    fn test_category_url() {
        let category = Category {
            id: 4,
            name: "News".to_string(),
            slug: "news".to_string(),
            url: None,
        };
        let url = target("/blog/category/:slug").category_url(&category);
        assert_eq!(url, "/blog/category/news");
    }

    #[test]
    fn test_sqlite_timestamp_format() {
        assert_eq!(
            parse_timestamp("2025-12-31 23:59:59"),
            NaiveDate::from_ymd_opt(2025, 12, 31)
        );
        assert_eq!(parse_timestamp("not a date"), None);
    }
}
