//! Link classification used by the catalog and program scrapers.
//!
//! All matching is plain substring search. Only the page side (URL or link
//! text) is lower-cased; keywords are used as configured, so a keyword with
//! upper-case letters never matches a URL.

use crate::domain::model::{Category, Link};

/// True if the lower-cased `text` contains any of `keywords`.
pub fn contains_any_keyword(text: &str, keywords: &[String]) -> bool {
    let lowered = text.to_lowercase();
    keywords.iter().any(|keyword| lowered.contains(keyword.as_str()))
}

/// Directory links of the form `.../<marker>/<name>` become categories named
/// after their last path segment.
pub fn category_from_link(link: &Link, marker: &str) -> Option<Category> {
    let url = link.target()?;
    if !url.contains(marker) {
        return None;
    }

    let name = url.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    Some(Category {
        name: name.to_string(),
        url: url.to_string(),
    })
}

/// Exclusion filter for institution links: keep the link unless its URL hits
/// an excluded keyword or its text is exactly an excluded name.
pub fn is_university_link(link: &Link, exclude_keywords: &[String], exclude_names: &[String]) -> bool {
    let Some(url) = link.target() else {
        return false;
    };
    if link.text.is_empty() {
        return false;
    }

    !contains_any_keyword(url, exclude_keywords) && !exclude_names.iter().any(|name| *name == link.text)
}

/// Program links need a target and a postgraduate keyword in their text.
pub fn is_program_link(link: &Link, program_keywords: &[String]) -> bool {
    link.target().is_some() && contains_any_keyword(&link.text, program_keywords)
}

/// Offer-section candidates are matched on text only; the caller decides what
/// to do with a match that has no target.
pub fn is_offer_section_link(link: &Link, offer_keywords: &[String]) -> bool {
    contains_any_keyword(&link.text, offer_keywords)
}
