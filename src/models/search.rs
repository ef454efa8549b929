//! # 검색 요청/결과 값 타입
//!
//! 요청 하나를 처리하는 동안만 살아 있는 값들입니다.
//! 요청이 끝나면 버려지며, 요청 사이에 공유되는 가변 상태는 없습니다.

use crate::models::Post;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// 정렬 가능한 컬럼 (화이트리스트)
///
/// SQL에 컬럼 이름을 직접 이어붙이므로, 사용자 입력을 그대로 쓰지 않고
/// 이 enum으로 한 번 걸러냅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    CreatedAt,
    UpdatedAt,
    PublishedAt,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::PublishedAt => "published_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// 정렬 지정 (필드 + 방향), 설정 문자열 `"published_at desc"` 형태로 파싱합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: SortField::PublishedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl FromStr for SortSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        // "random"은 받지 않습니다. 요청마다 순서가 바뀌면 페이지 사이에 글이 중복/누락됩니다.
        let field = match parts.next() {
            Some("title") => SortField::Title,
            Some("created_at") => SortField::CreatedAt,
            Some("updated_at") => SortField::UpdatedAt,
            Some("published_at") => SortField::PublishedAt,
            _ => return Err(format!("unsupported sort order '{}'", s)),
        };
        // 방향이 생략되면 오름차순
        let direction = match parts.next().map(|d| d.to_ascii_lowercase()).as_deref() {
            None | Some("asc") => SortDirection::Asc,
            Some("desc") => SortDirection::Desc,
            Some(_) => return Err(format!("unsupported sort order '{}'", s)),
        };
        if parts.next().is_some() {
            return Err(format!("unsupported sort order '{}'", s));
        }
        Ok(Self { field, direction })
    }
}

impl fmt::Display for SortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dir = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{} {}", self.field.column(), dir)
    }
}

/// 검색 한 번에 필요한 입력값 묶음
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    /// 검색어. 비어 있으면 모든 글과 매칭됩니다.
    pub term: String,
    /// 요청한 페이지 번호 (1부터 시작)
    pub page: u32,
    /// 요청에 포함된 카테고리 태그 필터 (`?cat[]=1&cat[]=2`)
    ///
    /// 설정의 include/exclude와는 별개이며, 비어 있지 않으면 결과를 추가로 좁힙니다.
    pub category_tags: Vec<i64>,
    pub per_page: u32,
    pub sort: SortSpec,
}

/// 설정된 include/exclude 카테고리를 글 ID 집합으로 풀어낸 결과
///
/// - `blocked`: 제외 카테고리에 속한 글. 어떤 경우에도 결과에 나오지 않습니다.
/// - `allowed`: 포함 카테고리에 속한 글.
///   `None`이면 "제한 없음", `Some(빈 집합)`이면 "아무것도 허용하지 않음"입니다.
///   `include_ids`가 비어 있을 때만 `None`이 됩니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryConstraint {
    pub include_ids: Vec<i64>,
    pub exclude_ids: Vec<i64>,
    pub blocked: BTreeSet<i64>,
    pub allowed: Option<BTreeSet<i64>>,
}

impl CategoryConstraint {
    /// 멤버십 규칙만으로 해당 글이 후보가 될 수 있는지 확인합니다.
    /// 차단 집합이 허용 집합보다 우선합니다.
    pub fn admits(&self, post_id: i64) -> bool {
        if self.blocked.contains(&post_id) {
            return false;
        }
        match &self.allowed {
            Some(allowed) => allowed.contains(&post_id),
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current_page: u32,
    /// 마지막 페이지 번호. 결과가 없어도 1입니다.
    pub last_page: u32,
    pub per_page: u32,
    pub total: i64,
}

impl Pagination {
    pub fn new(current_page: u32, per_page: u32, total: i64) -> Self {
        let per_page = per_page.max(1);
        let pages = (total.max(0) as u64).div_ceil(per_page as u64);
        Self {
            current_page,
            last_page: pages.clamp(1, u32::MAX as u64) as u32,
            per_page,
            total,
        }
    }
}

/// 현재 페이지의 글 목록과 페이지 정보
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultPage {
    pub posts: Vec<Post>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_spec_parse() {
        let spec: SortSpec = "published_at desc".parse().unwrap();
        assert_eq!(spec.field, SortField::PublishedAt);
        assert_eq!(spec.direction, SortDirection::Desc);

        let spec: SortSpec = "title".parse().unwrap();
        assert_eq!(spec.field, SortField::Title);
        assert_eq!(spec.direction, SortDirection::Asc);

        let spec: SortSpec = "  updated_at   DESC ".parse().unwrap();
        assert_eq!(spec.to_string(), "updated_at desc");
    }

    #[test]
    fn test_sort_spec_rejects_unknown() {
        assert!("random".parse::<SortSpec>().is_err());
        assert!("title sideways".parse::<SortSpec>().is_err());
        assert!("title asc; DROP TABLE posts".parse::<SortSpec>().is_err());
        assert!("".parse::<SortSpec>().is_err());
    }

    #[test]
    fn test_pagination_last_page() {
        assert_eq!(Pagination::new(1, 10, 0).last_page, 1);
        assert_eq!(Pagination::new(1, 10, 10).last_page, 1);
        assert_eq!(Pagination::new(1, 10, 11).last_page, 2);
        assert_eq!(Pagination::new(3, 2, 5).last_page, 3);
    }

    #[test]
    fn test_constraint_exclusion_wins() {
        let constraint = CategoryConstraint {
            include_ids: vec![1],
            exclude_ids: vec![2],
            blocked: BTreeSet::from([10]),
            allowed: Some(BTreeSet::from([10, 11])),
        };
        assert!(!constraint.admits(10));
        assert!(constraint.admits(11));
        assert!(!constraint.admits(12));
    }

    #[test]
    fn test_constraint_without_include_is_unrestricted() {
        let constraint = CategoryConstraint {
            blocked: BTreeSet::from([3]),
            ..Default::default()
        };
        assert!(constraint.admits(1));
        assert!(constraint.admits(999));
        assert!(!constraint.admits(3));
    }
}
