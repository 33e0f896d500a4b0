//! Result extraction over a rendered results-page document.
//!
//! Extraction is defensive by construction: the target page's markup is
//! externally owned and changes without notice, so every field is resolved by
//! a chain of small strategies tried in fixed priority order. A markup change
//! that breaks one strategy degrades the output instead of failing it.

pub mod fields;

#[cfg(test)]
mod tests;

use crate::state::ResultRecord;
use scraper::{Html, Selector};

/// Candidate result-container shapes, in priority order. Organic results,
/// modern wrappers, and video blocks all use different containers, so every
/// selector is tried and the union deduplicated.
const CANDIDATE_SELECTORS: &[&str] = &[
    "div.g",                       // classic organic result
    "div.tF2Cxc",                  // organic result inner container
    "div.MjjYud",                  // modern result wrapper
    "div[data-sokoban-container]", // data-attribute based container
    "div.dURPMd > div",            // grouped results children
    "div[jscontroller][data-hveid]", // controller-bound result block
];

/// Extract an ordered sequence of result records from a results-page document.
///
/// Deterministic for a fixed document: candidates are visited in document
/// order per selector, selectors in priority order, and duplicates (same
/// title and url) are dropped keeping the first occurrence.
pub fn extract_results(html: &str) -> Vec<ResultRecord> {
    let doc = Html::parse_document(html);

    let mut records: Vec<ResultRecord> = Vec::new();

    for selector_str in CANDIDATE_SELECTORS {
        let selector = Selector::parse(selector_str).unwrap();
        let candidates: Vec<_> = doc.select(&selector).collect();

        if candidates.is_empty() {
            continue;
        }
        ::log::debug!(
            "Found {} candidate containers with selector: {}",
            candidates.len(),
            selector_str
        );

        for candidate in candidates {
            let Some(record) = fields::resolve_record(&candidate) else {
                continue;
            };
            let duplicate = records.iter().any(|r| r.key() == record.key());
            if !duplicate {
                records.push(record);
            }
        }
    }

    ::log::info!("Extracted {} unique results", records.len());
    records
}
