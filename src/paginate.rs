//! Pagination: locating the next-page control and deciding when to stop.

use scraper::{Html, Selector};

/// Next-page control selectors, in priority order: accessible-label based
/// first, then the id fallback
pub const NEXT_CONTROL_SELECTORS: &[&str] = &["a[aria-label='Next page']", "a#pnnext", "#pnnext"];

/// Find the first selector that matches a next-page control in the document.
///
/// The returned selector is what the controller clicks through the live
/// session; finding it in the source snapshot first keeps the decision
/// testable without a browser.
pub fn find_next_control(html: &str) -> Option<&'static str> {
    let doc = Html::parse_document(html);
    for selector_str in NEXT_CONTROL_SELECTORS {
        let selector = Selector::parse(selector_str).unwrap();
        if doc.select(&selector).next().is_some() {
            ::log::debug!("Next-page control matched selector: {}", selector_str);
            return Some(selector_str);
        }
    }
    None
}

/// Termination predicate: stop at the configured depth bound or when the
/// page offers no way forward
pub fn should_stop(current_page: u32, max_pages: u32, has_next_control: bool) -> bool {
    current_page >= max_pages || !has_next_control
}
