//! # 검색 결과 주석(annotation)
//!
//! 조회된 페이지의 **복사본**에 다음을 덧붙입니다.
//! 1. 각 글과 그 카테고리의 링크 URL
//! 2. (설정 시) 제목, 요약, 본문 HTML의 검색어 하이라이트
//!
//! DB를 다시 읽거나 쓰지 않는 순수 변환입니다. 같은 입력이면 항상 같은 결과가 나옵니다.

use crate::models::ResultPage;
use crate::services::highlight::{highlight_html, highlight_text, term_pattern};
use crate::services::links::LinkTarget;

/// 결과 페이지에 링크와 하이라이트를 적용합니다.
///
/// `page`의 소유권을 받아 수정한 뒤 돌려주므로, 호출 측이 가진 다른 데이터에는
/// 영향이 없습니다.
pub fn annotate(
    mut page: ResultPage,
    post_target: &LinkTarget,
    category_target: &LinkTarget,
    highlight: bool,
    term: &str,
) -> ResultPage {
    // 패턴은 페이지당 한 번만 만듭니다. 실패하면 None → 하이라이트 생략
    let pattern = if highlight { term_pattern(term) } else { None };

    for post in &mut page.posts {
        for category in &mut post.categories {
            category.url = Some(category_target.category_url(category));
        }
        post.url = Some(post_target.post_url(post));

        if let Some(pattern) = &pattern {
            post.title = highlight_text(&post.title, pattern);
            post.excerpt = post
                .excerpt
                .as_deref()
                .map(|excerpt| highlight_text(excerpt, pattern));
            post.content_html = highlight_html(&post.content_html, pattern);
        }
    }

    page
}
