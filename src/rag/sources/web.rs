//! Website adapter: fetch a URL and extract its main text.
//!
//! Extraction walks the content-bearing elements with `scraper`, which
//! keeps headings, paragraphs, list items and table cells while dropping
//! scripts, styles and markup. The result is one record; the shared
//! chunking policy is applied later, same as for PDF text.

use std::time::Duration;

use scraper::{Html, Selector};

use crate::core::errors::ApiError;

use super::SourceRecord;

const FETCH_TIMEOUT_SECS: u64 = 30;

pub async fn load(url: &str) -> Result<Vec<SourceRecord>, ApiError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ApiError::SourceUnavailable(format!(
            "invalid URL '{url}': only http(s) is supported"
        )));
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(FETCH_TIMEOUT_SECS))
        .build()
        .map_err(ApiError::internal)?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ApiError::SourceUnavailable(format!("cannot reach {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(ApiError::SourceUnavailable(format!(
            "{url} returned HTTP {}",
            response.status()
        )));
    }

    let html = response
        .text()
        .await
        .map_err(|e| ApiError::SourceUnavailable(format!("cannot read {url}: {e}")))?;

    let text = extract_main_text(&html);
    if text.is_empty() {
        return Err(ApiError::SourceUnavailable(format!(
            "{url} contains no extractable text"
        )));
    }

    Ok(vec![SourceRecord::new(text)])
}

/// Collect text from content-bearing elements, in document order.
fn extract_main_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6, p, li, td, blockquote, pre")
    else {
        return String::new();
    };

    let mut blocks = Vec::new();
    for element in document.select(&selector) {
        // Skip containers whose text is already covered by a nested match.
        if element
            .children()
            .filter_map(scraper::ElementRef::wrap)
            .any(|child| selector.matches(&child))
        {
            continue;
        }

        let text = element
            .text()
            .collect::<String>()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if !text.is_empty() {
            blocks.push(text);
        }
    }

    blocks.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_headings_and_paragraphs() {
        let html = r#"
            <html>
            <head><title>Docs</title><script>var hidden = 1;</script></head>
            <body>
                <h1>Getting Started</h1>
                <p>Install the package first.</p>
                <ul><li>Step one</li><li>Step two</li></ul>
            </body>
            </html>"#;

        let text = extract_main_text(html);
        assert!(text.contains("Getting Started"));
        assert!(text.contains("Install the package first."));
        assert!(text.contains("Step one"));
        assert!(!text.contains("var hidden"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn nested_blocks_are_not_duplicated() {
        let html = "<body><blockquote><p>Quoted once.</p></blockquote></body>";
        let text = extract_main_text(html);
        assert_eq!(text.matches("Quoted once.").count(), 1);
    }

    #[test]
    fn empty_page_extracts_nothing() {
        assert!(extract_main_text("<html><body></body></html>").is_empty());
    }

    #[tokio::test]
    async fn non_http_url_is_rejected() {
        let err = load("ftp://example.com/file").await.unwrap_err();
        assert!(matches!(err, ApiError::SourceUnavailable(_)));
    }
}
