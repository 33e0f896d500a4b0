use crate::extract::fields::{
    NO_SNIPPET, canonicalize_url, resolve_display_url, resolve_snippet, resolve_title_and_url,
};
use scraper::{Html, Selector};

/// Parse a candidate container and run `f` on it
fn with_candidate<T>(html: &str, f: impl FnOnce(&scraper::ElementRef) -> T) -> T {
    let doc = Html::parse_document(&format!("<html><body>{html}</body></html>"));
    let selector = Selector::parse("div.g").unwrap();
    let candidate = doc.select(&selector).next().expect("fixture has no div.g");
    f(&candidate)
}

#[test]
fn test_canonicalize_redirect_wrapper_round_trip() {
    // The destination in the q parameter comes back exactly
    assert_eq!(
        canonicalize_url("/url?q=https://example.com/target&sa=U&ved=xyz").as_deref(),
        Some("https://example.com/target")
    );
    assert_eq!(
        canonicalize_url("https://www.google.com/url?q=https://example.com/target").as_deref(),
        Some("https://example.com/target")
    );
    // url parameter variant
    assert_eq!(
        canonicalize_url("/url?url=https://example.com/other").as_deref(),
        Some("https://example.com/other")
    );
    // Wrapper without a destination is useless
    assert_eq!(canonicalize_url("/url?sa=U&ved=xyz"), None);
}

#[test]
fn test_canonicalize_plain_and_relative_urls() {
    assert_eq!(
        canonicalize_url("https://example.com/page").as_deref(),
        Some("https://example.com/page")
    );
    // Protocol-relative hrefs inherit https
    assert_eq!(
        canonicalize_url("//example.com/page").as_deref(),
        Some("https://example.com/page")
    );
    // Relative page chrome is not a result destination
    assert_eq!(canonicalize_url("/search?q=rust&start=10"), None);
}

#[test]
fn test_canonicalize_rejects_pseudo_links() {
    assert_eq!(canonicalize_url("javascript:void(0)"), None);
    assert_eq!(canonicalize_url("JavaScript:doThing()"), None);
    assert_eq!(canonicalize_url("#"), None);
    assert_eq!(canonicalize_url(""), None);
    assert_eq!(canonicalize_url("about:blank"), None);
}

#[test]
fn test_title_from_heading_inside_anchor() {
    let html = r#"<div class="g">
        <a href="https://example.com/a"><h3>Heading Inside Anchor</h3></a>
        <a href="https://example.com/other">some other longer link text here</a>
    </div>"#;
    let resolved = with_candidate(html, |c| resolve_title_and_url(c));
    assert_eq!(
        resolved,
        Some((
            "Heading Inside Anchor".to_string(),
            "https://example.com/a".to_string()
        ))
    );
}

#[test]
fn test_title_from_heading_with_sibling_anchor() {
    let html = r#"<div class="g">
        <div>
            <h3>Heading With Sibling Link</h3>
            <a href="https://example.com/sibling">visit</a>
        </div>
    </div>"#;
    let resolved = with_candidate(html, |c| resolve_title_and_url(c));
    assert_eq!(
        resolved,
        Some((
            "Heading With Sibling Link".to_string(),
            "https://example.com/sibling".to_string()
        ))
    );
}

#[test]
fn test_title_from_plausible_anchor() {
    // No heading anywhere; a bare anchor with title-length text carries both
    let html = r##"<div class="g">
        <a href="#">x</a>
        <a href="https://example.com/doc">A Plausible Title Of Reasonable Length</a>
    </div>"##;
    let resolved = with_candidate(html, |c| resolve_title_and_url(c));
    assert_eq!(
        resolved,
        Some((
            "A Plausible Title Of Reasonable Length".to_string(),
            "https://example.com/doc".to_string()
        ))
    );
}

#[test]
fn test_title_from_video_block() {
    // Anchor text too short for the plausible-title strategy, so the
    // video-variant heading block must resolve it
    let html = r#"<div class="g">
        <a href="https://video.example.com/v/1">
            <div role="heading"><span>Cats</span></div>
        </a>
    </div>"#;
    let resolved = with_candidate(html, |c| resolve_title_and_url(c));
    assert_eq!(
        resolved,
        Some(("Cats".to_string(), "https://video.example.com/v/1".to_string()))
    );
}

#[test]
fn test_title_resolution_fails_cleanly() {
    let html = r#"<div class="g"><span>no links at all</span></div>"#;
    assert_eq!(with_candidate(html, |c| resolve_title_and_url(c)), None);
}

#[test]
fn test_display_url_from_citation() {
    let html = r#"<div class="g">
        <a href="https://example.com/a"><h3>Title Text Here</h3></a>
        <cite>example.com › docs</cite>
    </div>"#;
    assert_eq!(
        with_candidate(html, |c| resolve_display_url(c)),
        "example.com › docs"
    );

    let bare = r#"<div class="g"><a href="https://example.com/a"><h3>Title Text Here</h3></a></div>"#;
    assert_eq!(with_candidate(bare, |c| resolve_display_url(c)), "");
}

#[test]
fn test_snippet_excludes_heading_and_citation_text() {
    let html = r#"<div class="g">
        <a href="https://example.com/a"><h3>The Title</h3></a>
        <div class="VwiC3b">
            <h3>The Title</h3>
            <cite>example.com</cite>
            Useful snippet words live out here.
        </div>
    </div>"#;
    let snippet = with_candidate(html, |c| resolve_snippet(c, "The Title", "https://example.com/a"));
    assert_eq!(snippet, "Useful snippet words live out here.");
}

#[test]
fn test_snippet_deduplicates_repeated_fragments() {
    let html = r#"<div class="g">
        <a href="https://example.com/a"><h3>The Title</h3></a>
        <div class="VwiC3b">Repeated fragment of text.</div>
        <div class="VwiC3b">Repeated fragment of text.</div>
    </div>"#;
    let snippet = with_candidate(html, |c| resolve_snippet(c, "The Title", "https://example.com/a"));
    assert_eq!(snippet, "Repeated fragment of text.");
}

#[test]
fn test_snippet_fallback_strips_chrome_and_truncates() {
    let filler = "word ".repeat(120);
    let html = format!(
        r#"<div class="g">
            <a href="https://example.com/a"><h3>The Title</h3></a>
            <cite>example.com</cite>
            <script>var tracking = true;</script>
            <div><span>{filler}</span></div>
        </div>"#
    );
    let snippet =
        with_candidate(&html, |c| resolve_snippet(c, "The Title", "https://example.com/a"));
    // Chrome never leaks into the fallback
    assert!(!snippet.contains("The Title"));
    assert!(!snippet.contains("tracking"));
    assert!(!snippet.contains("example.com"));
    // Bounded length with an ellipsis marker
    assert!(snippet.chars().count() <= 351);
    assert!(snippet.ends_with('…'));
}

#[test]
fn test_snippet_sentinel_on_empty_or_title_echo() {
    let empty = r#"<div class="g"><a href="https://example.com/a"><h3>The Title</h3></a></div>"#;
    assert_eq!(
        with_candidate(empty, |c| resolve_snippet(c, "The Title", "https://example.com/a")),
        NO_SNIPPET
    );

    let echo = r#"<div class="g">
        <a href="https://example.com/a"><h3>The Title</h3></a>
        <div class="VwiC3b">The Title</div>
    </div>"#;
    assert_eq!(
        with_candidate(echo, |c| resolve_snippet(c, "The Title", "https://example.com/a")),
        NO_SNIPPET
    );
}
