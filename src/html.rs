//! Plain-text extraction from product description markup.

use scraper::Html;

/// Strips markup from an HTML fragment and returns its text content.
///
/// Text nodes are concatenated in document order and the result is trimmed.
/// Malformed markup is parsed best-effort and never fails.
pub fn clean_html(fragment: Option<&str>) -> String {
    let Some(fragment) = fragment else {
        return String::new();
    };
    if fragment.trim().is_empty() {
        return String::new();
    }

    let document = Html::parse_fragment(fragment);
    let text = document.root_element().text().collect::<String>();
    text.trim().to_string()
}
