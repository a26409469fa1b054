use std::time::Duration;

use scraper::{Html, Selector};

use crate::errors::AppError;

const MAX_BODY_BYTES: usize = 2 * 1024 * 1024; // 2 MiB
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);
const MIN_STRIPPED_CHARS: usize = 100;

/// Fetches a URL and returns its stripped, whitespace-collapsed text.
///
/// Fails with `FetchFailed` on a non-2xx response, a timeout, or a body
/// exceeding the bounded size; fails with `InsufficientContent` if the
/// stripped text is shorter than 100 characters (§4.1).
pub async fn fetch_and_extract_html(url: &str) -> Result<String, AppError> {
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .build()
        .map_err(|e| AppError::FetchFailed(format!("failed to build HTTP client: {e}")))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| AppError::FetchFailed(format!("request to {url} failed: {e}")))?;

    if !response.status().is_success() {
        return Err(AppError::FetchFailed(format!(
            "{url} returned status {}",
            response.status()
        )));
    }

    if let Some(len) = response.content_length() {
        if len as usize > MAX_BODY_BYTES {
            return Err(AppError::FetchFailed(format!(
                "{url} response exceeds {MAX_BODY_BYTES} bytes"
            )));
        }
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| AppError::FetchFailed(format!("failed to read body from {url}: {e}")))?;

    if bytes.len() > MAX_BODY_BYTES {
        return Err(AppError::FetchFailed(format!(
            "{url} response exceeds {MAX_BODY_BYTES} bytes"
        )));
    }

    let html = String::from_utf8_lossy(&bytes);
    let text = strip_html(&html);

    if text.chars().count() < MIN_STRIPPED_CHARS {
        return Err(AppError::InsufficientContent(format!(
            "{url} yielded only {} characters of text after stripping",
            text.chars().count()
        )));
    }

    Ok(text)
}

/// Strips `<script>`/`<style>` elements and collapses whitespace.
fn strip_html(html: &str) -> String {
    let document = Html::parse_document(html);
    let skip_selector = Selector::parse("script, style").unwrap();
    let skip_ids: std::collections::HashSet<_> = document
        .select(&skip_selector)
        .flat_map(|el| el.descendants().map(|n| n.id()))
        .collect();

    let root_selector = Selector::parse("body").unwrap_or_else(|_| Selector::parse("html").unwrap());
    let mut chunks = Vec::new();
    if let Some(root) = document.select(&root_selector).next() {
        for node in root.descendants() {
            if skip_ids.contains(&node.id()) {
                continue;
            }
            if let Some(text_node) = node.value().as_text() {
                let trimmed = text_node.trim();
                if !trimmed.is_empty() {
                    chunks.push(trimmed.to_string());
                }
            }
        }
    }

    collapse_whitespace(&chunks.join(" "))
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_removes_script_and_style() {
        let html = "<html><head><style>.a{color:red}</style></head><body>\
            <script>alert('x')</script><p>Hello world, this is a real paragraph of content \
            that should survive stripping and easily clear the minimum length threshold set \
            for insufficient content detection in the fetch path.</p></body></html>";
        let text = strip_html(html);
        assert!(!text.contains("alert"));
        assert!(!text.contains("color:red"));
        assert!(text.contains("Hello world"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a   b\n\nc\t d"), "a b c d");
    }
}
