//! # 검색어 하이라이트
//!
//! 검색어와 일치하는 부분을 `<mark>...</mark>`로 감쌉니다.
//! 대소문자는 구분하지 않고 매칭하되, 원문의 대소문자는 그대로 유지합니다.
//!
//! 본문 HTML은 태그 안(`<a href="...">`의 속성 등)을 건드리면 마크업이 깨지므로,
//! 태그 바깥/안쪽을 구분하는 단순한 토큰화 과정을 거쳐 바깥 텍스트에만 적용합니다.

use regex::{Captures, Regex, RegexBuilder};

pub const MARK_OPEN: &str = "<mark>";
pub const MARK_CLOSE: &str = "</mark>";

/// 하이라이트 패턴의 컴파일 크기 상한 (바이트)
///
/// 검색어는 요청에서 오므로 길이 제한이 없습니다. 아주 긴 검색어는 이 상한에
/// 걸려 패턴 생성이 실패하고, 그러면 하이라이트만 건너뜁니다.
pub const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// 검색어를 대소문자 무시 정규식 소스로 바꿉니다. 예: `c++` → `(?i)c\+\+`
///
/// DB 매칭(`REGEXP`)과 하이라이트가 이 함수를 함께 쓰므로,
/// 하이라이트되는 부분과 검색에 걸리는 부분이 항상 같습니다.
pub fn match_source(term: &str) -> String {
    // (?i): 유니코드 단순 대소문자 접기(simple case folding) → "Ü"와 "ü"가 같은 문자
    format!("(?i){}", regex::escape(term))
}

/// 검색어로부터 대소문자 무시 매칭 패턴을 만듭니다.
///
/// `regex::escape`로 `.`, `*`, `(` 같은 특수문자를 이스케이프한 뒤 사용합니다.
/// 빈 검색어이거나 패턴 생성에 실패하면(예: 크기 제한 초과) `None`을 반환하고,
/// 호출 측은 하이라이트를 건너뜁니다.
pub fn term_pattern(term: &str) -> Option<Regex> {
    if term.is_empty() {
        return None;
    }

    match RegexBuilder::new(&match_source(term))
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
    {
        Ok(pattern) => Some(pattern),
        Err(e) => {
            // 하이라이트 실패는 요청 실패가 아님 → 경고만 남기고 원문 그대로
            tracing::warn!("Skipping highlight for term of {} bytes: {}", term.len(), e);
            None
        }
    }
}

/// 일반 텍스트(제목, 요약)의 모든 일치 부분을 감쌉니다.
pub fn highlight_text(text: &str, pattern: &Regex) -> String {
    pattern
        .replace_all(text, |caps: &Captures| {
            format!("{}{}{}", MARK_OPEN, &caps[0], MARK_CLOSE)
        })
        .into_owned()
}

/// HTML 본문에서 태그 바깥 텍스트에만 하이라이트를 적용합니다.
///
/// `<`부터 다음 `>`까지를 태그로 봅니다. 단, `>`보다 `<`가 먼저 나오면
/// 앞의 `<`는 태그가 아니라 일반 텍스트의 문자로 취급합니다 (`a < b` 같은 경우).
pub fn highlight_html(html: &str, pattern: &Regex) -> String {
    let mut out = String::with_capacity(html.len());
    // 아직 출력하지 않은 텍스트 구간의 시작 위치
    let mut text_start = 0;
    let mut cursor = 0;

    while let Some(offset) = html[cursor..].find('<') {
        let open = cursor + offset;
        let rest = &html[open + 1..];

        match rest.find(['<', '>']) {
            Some(rel) if rest.as_bytes()[rel] == b'>' => {
                let close = open + 1 + rel;
                out.push_str(&highlight_text(&html[text_start..open], pattern));
                // 태그는 그대로 복사
                out.push_str(&html[open..=close]);
                text_start = close + 1;
                cursor = close + 1;
            }
            _ => cursor = open + 1,
        }
    }

    out.push_str(&highlight_text(&html[text_start..], pattern));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(term: &str) -> Regex {
        term_pattern(term).expect("pattern")
    }

    #[test]
    fn test_empty_term_has_no_pattern() {
        assert!(term_pattern("").is_none());
    }

    #[test]
    fn test_match_source_escapes_and_ignores_case() {
        assert_eq!(match_source("c++"), "(?i)c\\+\\+");
        let re = Regex::new(&match_source("über")).unwrap();
        assert!(re.is_match("ÜBER alles"));
    }

    #[test]
    fn test_oversized_term_has_no_pattern() {
        // 40만 글자 → NFA 상태 40만 개 이상이라 1 MiB 상한을 넘김
        let term = "ab".repeat(200_000);
        assert!(term_pattern(&term).is_none());
    }

    #[test]
    fn test_highlight_preserves_case() {
        let out = highlight_text("Cats and Dogs", &pattern("cat"));
        assert_eq!(out, "<mark>Cat</mark>s and Dogs");
    }

    #[test]
    fn test_highlight_every_occurrence() {
        let out = highlight_text("cat, CAT, Cat", &pattern("cat"));
        assert_eq!(out, "<mark>cat</mark>, <mark>CAT</mark>, <mark>Cat</mark>");
    }

    #[test]
    fn test_special_characters_are_literal() {
        let out = highlight_text("Is C++ (really) fast? C+++", &pattern("c++"));
        assert_eq!(out, "Is <mark>C++</mark> (really) fast? <mark>C++</mark>+");

        let out = highlight_text("a.b axb", &pattern("a.b"));
        assert_eq!(out, "<mark>a.b</mark> axb");
    }

    #[test]
    fn test_html_skips_tag_attributes() {
        let out = highlight_html("<a href=cat>cat</a>", &pattern("cat"));
        assert_eq!(out, "<a href=cat><mark>cat</mark></a>");
    }

    #[test]
    fn test_html_skips_tag_names() {
        let out = highlight_html("<p>A paragraph</p>", &pattern("p"));
        assert_eq!(out, "<p>A <mark>p</mark>aragra<mark>p</mark>h</p>");
    }

    #[test]
    fn test_html_literal_angle_bracket_is_text() {
        let out = highlight_html("1 < 2 cat <b>cat</b>", &pattern("cat"));
        assert_eq!(out, "1 < 2 <mark>cat</mark> <b><mark>cat</mark></b>");
    }

    #[test]
    fn test_html_unterminated_tag_is_text() {
        let out = highlight_html("cat <b cat", &pattern("cat"));
        assert_eq!(out, "<mark>cat</mark> <b <mark>cat</mark>");
    }

    #[test]
    fn test_html_multibyte_text() {
        let out = highlight_html("<em>고양이</em>와 고양이", &pattern("고양이"));
        assert_eq!(out, "<em><mark>고양이</mark></em>와 <mark>고양이</mark>");
    }
}
