//! Picks the current-issue link among the anchors of a landing page

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::AipEdition;
use crate::infrastructure::ElementHandle;

static ISSUE_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)AIRAC|CURRENT|ISSUE|(?:19|20)\d{2}").expect("valid issue marker regex")
});

static INDEX_DOCUMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)index[^/]*\.html?$").expect("valid index document regex"));

static HTML_DOCUMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.html?$").expect("valid html document regex"));

/// Filename segment of an edition hint: last non-empty path segment, no query
fn hint_segment(hint: &str) -> Option<&str> {
    let without_query = hint.split(['?', '#']).next().unwrap_or(hint);
    without_query
        .split('/')
        .rev()
        .map(str::trim)
        .find(|segment| !segment.is_empty())
}

fn href_path(anchor: &ElementHandle) -> Option<&str> {
    let href = anchor.href.as_deref()?.trim();
    if href.is_empty()
        || href.starts_with('#')
        || href.to_ascii_lowercase().starts_with("javascript:")
        || href.to_ascii_lowercase().starts_with("mailto:")
    {
        return None;
    }
    Some(href.split(['?', '#']).next().unwrap_or(href))
}

/// Choose the anchor that links to the current issue.
///
/// Priority: href containing the hint's filename segment; then anchors whose
/// href or text carries an issue marker (index documents first, then any
/// HTML document, then the first such anchor); then the first index document.
pub fn choose_current_issue<'a>(
    anchors: &'a [ElementHandle],
    edition_hint: Option<&str>,
) -> Option<&'a ElementHandle> {
    let linkable: Vec<(&ElementHandle, &str)> = anchors
        .iter()
        .filter_map(|anchor| href_path(anchor).map(|path| (anchor, path)))
        .collect();

    if let Some(segment) = edition_hint.and_then(hint_segment) {
        let hinted = linkable.iter().find(|(anchor, _)| {
            anchor
                .href
                .as_deref()
                .is_some_and(|href| href.contains(segment))
        });
        if let Some((anchor, _)) = hinted {
            return Some(anchor);
        }
    }

    let marked: Vec<&(&ElementHandle, &str)> = linkable
        .iter()
        .filter(|(anchor, _)| {
            anchor.href.as_deref().is_some_and(|href| ISSUE_MARKER.is_match(href))
                || ISSUE_MARKER.is_match(&anchor.text)
        })
        .collect();

    let preferred = marked
        .iter()
        .find(|(_, path)| INDEX_DOCUMENT.is_match(path))
        .or_else(|| marked.iter().find(|(_, path)| HTML_DOCUMENT.is_match(path)))
        .or_else(|| marked.first());
    if let Some((anchor, _)) = preferred {
        return Some(anchor);
    }

    linkable
        .iter()
        .find(|(_, path)| INDEX_DOCUMENT.is_match(path))
        .map(|(anchor, _)| *anchor)
}

/// Resolve the current edition from landing page anchors
pub fn resolve_current_edition(
    anchors: &[ElementHandle],
    edition_hint: Option<&str>,
) -> Option<AipEdition> {
    let anchor = choose_current_issue(anchors, edition_hint)?;
    let index_url = anchor.resolved_href()?;
    let text = anchor.text.trim();
    Some(AipEdition::from_index_url(index_url, &[text]))
}
