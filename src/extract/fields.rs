//! Per-field resolution strategies.
//!
//! Each strategy is a pure function over one candidate container, returning
//! `Some` on success. Strategies are tried in fixed priority order per field,
//! first success wins.

use crate::state::ResultRecord;
use scraper::{ElementRef, Selector};
use url::Url;

/// Sentinel used when no usable snippet can be resolved
pub const NO_SNIPPET: &str = "no snippet found";

/// Base used to resolve relative redirect-wrapper hrefs
const WRAPPER_BASE: &str = "https://www.google.com";

/// Plausible visible-text length for a title-bearing anchor (chars)
const TITLE_LEN_RANGE: std::ops::RangeInclusive<usize> = 5..=150;

/// Snippet-bearing sub-elements, in priority order
const SNIPPET_SELECTORS: &[&str] = &[
    "div[data-sncf='1']",
    "div.VwiC3b",
    "div.IsZvec",
    "span.aCOpRe",
    "div[data-content-feature='1']",
];

/// Citation-like sub-elements carrying the human-readable source label
const CITATION_SELECTORS: &[&str] = &["cite", "span.VuuXrf", "div.TbwUpd"];

/// Cap on the fallback snippet length (chars)
const SNIPPET_MAX_CHARS: usize = 350;

/// Resolve a full record from one candidate container.
///
/// Accepts the record only if both title and url resolved to non-trivial
/// values; the url is already canonical and pseudo-links are rejected during
/// resolution.
pub fn resolve_record(candidate: &ElementRef) -> Option<ResultRecord> {
    let (title, url) = resolve_title_and_url(candidate)?;
    let display_url = resolve_display_url(candidate);
    let snippet = resolve_snippet(candidate, &title, &url);
    Some(ResultRecord {
        title,
        url,
        display_url,
        snippet,
    })
}

/// Title + url resolution chain, first success wins
pub fn resolve_title_and_url(candidate: &ElementRef) -> Option<(String, String)> {
    let strategies: &[fn(&ElementRef) -> Option<(String, String)>] = &[
        heading_inside_anchor,
        heading_with_sibling_anchor,
        plausible_title_anchor,
        video_title_block,
    ];
    strategies.iter().find_map(|strategy| strategy(candidate))
}

/// Strategy (a): a heading element nested inside an anchor
fn heading_inside_anchor(candidate: &ElementRef) -> Option<(String, String)> {
    let anchor_sel = Selector::parse("a[href]").unwrap();
    let heading_sel = Selector::parse("h3").unwrap();

    for anchor in candidate.select(&anchor_sel) {
        let Some(heading) = anchor.select(&heading_sel).next() else {
            continue;
        };
        let title = element_text(&heading);
        let Some(url) = anchor
            .value()
            .attr("href")
            .and_then(canonicalize_url)
        else {
            continue;
        };
        if !title.is_empty() {
            return Some((title, url));
        }
    }
    None
}

/// Strategy (b): a heading whose nearest following-sibling anchor carries the link
fn heading_with_sibling_anchor(candidate: &ElementRef) -> Option<(String, String)> {
    let heading_sel = Selector::parse("h3").unwrap();

    for heading in candidate.select(&heading_sel) {
        let title = element_text(&heading);
        if title.is_empty() {
            continue;
        }
        let sibling_anchor = heading
            .next_siblings()
            .filter_map(ElementRef::wrap)
            .find(|e| e.value().name() == "a" && e.value().attr("href").is_some());
        if let Some(anchor) = sibling_anchor {
            if let Some(url) = anchor.value().attr("href").and_then(canonicalize_url) {
                return Some((title, url));
            }
        }
    }
    None
}

/// Strategy (c): any anchor with an absolute or redirect-wrapped href whose
/// visible text is in a plausible title length range
fn plausible_title_anchor(candidate: &ElementRef) -> Option<(String, String)> {
    let anchor_sel = Selector::parse("a[href]").unwrap();

    for anchor in candidate.select(&anchor_sel) {
        let title = element_text(&anchor);
        if !TITLE_LEN_RANGE.contains(&title.chars().count()) {
            continue;
        }
        if let Some(url) = anchor.value().attr("href").and_then(canonicalize_url) {
            return Some((title, url));
        }
    }
    None
}

/// Strategy (d): video-style result variants use a role=heading block inside
/// the link instead of an h3
fn video_title_block(candidate: &ElementRef) -> Option<(String, String)> {
    let anchor_sel = Selector::parse("a[href]").unwrap();
    let heading_sel = Selector::parse("div[role='heading']").unwrap();

    for anchor in candidate.select(&anchor_sel) {
        let Some(heading) = anchor.select(&heading_sel).next() else {
            continue;
        };
        let title = element_text(&heading);
        let Some(url) = anchor
            .value()
            .attr("href")
            .and_then(canonicalize_url)
        else {
            continue;
        };
        if !title.is_empty() {
            return Some((title, url));
        }
    }
    None
}

/// Canonicalize an href into a destination URL.
///
/// Redirect-wrapper links (`/url?q=…`) are unwrapped to the destination
/// carried in their query parameter. Pseudo-links and relative page chrome
/// yield `None`.
pub fn canonicalize_url(href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href == "#" {
        return None;
    }
    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:") || lower.starts_with("about:") {
        return None;
    }

    // Protocol-relative hrefs inherit https
    let absolute = if let Some(rest) = href.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        href.to_string()
    };

    let parsed = if absolute.starts_with("http://") || absolute.starts_with("https://") {
        Url::parse(&absolute).ok()?
    } else if absolute.starts_with("/url?") {
        // Relative redirect wrapper
        Url::parse(WRAPPER_BASE).ok()?.join(&absolute).ok()?
    } else {
        // Other relative links are page chrome, not result destinations
        return None;
    };

    if parsed.path() == "/url" {
        for (key, value) in parsed.query_pairs() {
            if (key == "q" || key == "url") && value.starts_with("http") {
                return Some(value.into_owned());
            }
        }
        // Wrapper without a destination parameter is useless
        return None;
    }

    Some(parsed.to_string())
}

/// Resolve the human-readable source label from a citation-like sub-element
pub fn resolve_display_url(candidate: &ElementRef) -> String {
    for selector_str in CITATION_SELECTORS {
        let selector = Selector::parse(selector_str).unwrap();
        if let Some(citation) = candidate.select(&selector).next() {
            let text = element_text(&citation);
            if !text.is_empty() {
                return text;
            }
        }
    }
    String::new()
}

/// Resolve the snippet text for a candidate.
///
/// Tries the snippet selectors first, excluding text nested under headings,
/// citations, and the resolved title anchor, de-duplicating repeated
/// fragments. Falls back to the candidate's own text with known chrome
/// stripped and a bounded length. Empty or title-echo snippets collapse to
/// the [`NO_SNIPPET`] sentinel.
pub fn resolve_snippet(candidate: &ElementRef, title: &str, url: &str) -> String {
    let mut fragments: Vec<String> = Vec::new();

    for selector_str in SNIPPET_SELECTORS {
        let selector = Selector::parse(selector_str).unwrap();
        for matched in candidate.select(&selector) {
            let text = normalize_segment(&text_outside_chrome(matched, url, false));
            if text.is_empty() || fragments.iter().any(|f| f == &text) {
                continue;
            }
            fragments.push(text);
        }
    }

    let mut snippet = fragments.join(" ");

    if snippet.trim().is_empty() {
        // Fallback: whole candidate minus chrome, truncated
        snippet = normalize_segment(&text_outside_chrome(*candidate, url, true));
        snippet = truncate_chars(&snippet, SNIPPET_MAX_CHARS);
    }

    let snippet = snippet.trim().to_string();
    if snippet.is_empty() || is_title_echo(&snippet, title) {
        NO_SNIPPET.to_string()
    } else {
        snippet
    }
}

/// Visible text of one element, whitespace-normalized
fn element_text(el: &ElementRef) -> String {
    normalize_segment(&el.text().collect::<Vec<_>>().join(" "))
}

/// Collect text below `root`, skipping subtrees that are page chrome:
/// headings, citations, scripts/styles, nav/ad markers, and either all
/// anchors (`strip_anchors`) or just the anchor resolving to the title url
fn text_outside_chrome(root: ElementRef, title_url: &str, strip_anchors: bool) -> String {
    let mut parts: Vec<String> = Vec::new();
    collect_text(root, title_url, strip_anchors, &mut parts);
    parts.join(" ")
}

fn collect_text(el: ElementRef, title_url: &str, strip_anchors: bool, out: &mut Vec<String>) {
    for child in el.children() {
        if let Some(text) = child.value().as_text() {
            out.push(text.to_string());
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if is_chrome(&child_el, title_url, strip_anchors) {
                continue;
            }
            collect_text(child_el, title_url, strip_anchors, out);
        }
    }
}

/// Whether an element's subtree should be excluded from snippet text
fn is_chrome(el: &ElementRef, title_url: &str, strip_anchors: bool) -> bool {
    match el.value().name() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "cite" | "script" | "style" | "nav" => true,
        "a" => {
            if strip_anchors {
                return true;
            }
            el.value()
                .attr("href")
                .and_then(canonicalize_url)
                .is_some_and(|resolved| resolved == title_url)
        }
        _ => false,
    }
}

/// A snippet that merely repeats the title carries no information
fn is_title_echo(snippet: &str, title: &str) -> bool {
    if title.is_empty() {
        return false;
    }
    if snippet == title {
        return true;
    }
    // Near-identical: one contains the other with only a few chars of slack
    let longer = snippet.chars().count().max(title.chars().count());
    let shorter = snippet.chars().count().min(title.chars().count());
    (snippet.contains(title) || title.contains(snippet)) && longer - shorter <= 10
}

/// Whitespace normalization for extracted text fragments
fn normalize_segment(segment: &str) -> String {
    segment.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to a char bound, appending an ellipsis marker when cut
fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push('…');
    truncated
}
