//! HTML → structured page content.
//!
//! Title and publication date come from the parsed DOM; the body is a
//! markdown rendering of either the whole document or the readability
//! extraction, depending on what the caller feeds downstream.

use readability::extractor;
use scraper::{Html, Selector};
use tracing::warn;
use url::Url;

use crate::core::types::PageContent;

pub const NO_TITLE: &str = "No title found";
pub const NO_PUBLICATION_DATE: &str = "No publication date found";

/// Which body rendering lands in `PageContent::content`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyMode {
    /// Whole document converted to markdown. The extraction loop wants this:
    /// the schema may name fields that live outside the readable article.
    Full,
    /// Readability pass over the document — what `/scrape` serves.
    Readable,
}

pub fn extract_page_content(html: &str, url: &str, mode: BodyMode) -> PageContent {
    let document = Html::parse_document(html);

    let content = match mode {
        BodyMode::Full => html2md::parse_html(html),
        BodyMode::Readable => extract_readable_body(html, url),
    };

    PageContent {
        url: url.to_string(),
        title: extract_title(&document),
        publication_date: extract_publication_date(&document),
        content,
    }
}

/// Page title with fallback to the first h1.
fn extract_title(document: &Html) -> String {
    if let Ok(title_selector) = Selector::parse("title") {
        if let Some(title_element) = document.select(&title_selector).next() {
            let title = title_element.text().collect::<String>().trim().to_string();
            if !title.is_empty() {
                return title;
            }
        }
    }

    if let Ok(h1_selector) = Selector::parse("h1") {
        if let Some(h1_element) = document.select(&h1_selector).next() {
            let h1_text = h1_element.text().collect::<String>().trim().to_string();
            if !h1_text.is_empty() {
                return h1_text;
            }
        }
    }

    NO_TITLE.to_string()
}

/// Publication date from article metadata, trying the OpenGraph-style
/// property first and the legacy `pubdate` meta name second.
fn extract_publication_date(document: &Html) -> String {
    for selector in [
        "meta[property=\"article:published_time\"]",
        "meta[name=\"pubdate\"]",
    ] {
        if let Ok(sel) = Selector::parse(selector) {
            if let Some(el) = document.select(&sel).next() {
                if let Some(content) = el.value().attr("content") {
                    let trimmed = content.trim();
                    if !trimmed.is_empty() {
                        return trimmed.to_string();
                    }
                }
            }
        }
    }
    NO_PUBLICATION_DATE.to_string()
}

/// Readability pass, rendered to markdown. Falls back to converting the
/// whole document when readability errors out or comes back empty.
fn extract_readable_body(html: &str, url: &str) -> String {
    let base_url = match Url::parse(url) {
        Ok(u) => u,
        Err(e) => {
            warn!("unparseable base URL {}: {} — converting whole document", url, e);
            return html2md::parse_html(html);
        }
    };

    match extractor::extract(&mut html.as_bytes(), &base_url) {
        Ok(product) if !product.content.trim().is_empty() => html2md::parse_html(&product.content),
        Ok(_) => html2md::parse_html(html),
        Err(e) => {
            warn!("readability extraction failed: {} — converting whole document", e);
            html2md::parse_html(html)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>Widget Review</title>
  <meta property="article:published_time" content="2024-03-01T09:00:00Z">
</head>
<body>
  <nav><a href="/">home</a></nav>
  <article>
    <h1>The Widget X</h1>
    <p>The Widget X is a remarkable device that costs $9.99 and ships worldwide.
    It has been reviewed by thousands of happy customers across many countries.</p>
    <p>Availability is expected to improve over the next quarter as production
    scales up to meet growing demand in several regions.</p>
  </article>
</body>
</html>"#;

    #[test]
    fn title_comes_from_title_tag() {
        let content = extract_page_content(ARTICLE, "https://example.com/widget", BodyMode::Full);
        assert_eq!(content.title, "Widget Review");
    }

    #[test]
    fn title_falls_back_to_h1() {
        let html = "<html><body><h1>Only Heading</h1><p>text</p></body></html>";
        let content = extract_page_content(html, "https://example.com", BodyMode::Full);
        assert_eq!(content.title, "Only Heading");
    }

    #[test]
    fn missing_title_uses_placeholder() {
        let html = "<html><body><p>no headings here</p></body></html>";
        let content = extract_page_content(html, "https://example.com", BodyMode::Full);
        assert_eq!(content.title, NO_TITLE);
    }

    #[test]
    fn publication_date_prefers_article_meta() {
        let content = extract_page_content(ARTICLE, "https://example.com/widget", BodyMode::Full);
        assert_eq!(content.publication_date, "2024-03-01T09:00:00Z");
    }

    #[test]
    fn publication_date_falls_back_to_pubdate_meta() {
        let html = r#"<html><head><meta name="pubdate" content="2023-07-15"></head><body></body></html>"#;
        let content = extract_page_content(html, "https://example.com", BodyMode::Full);
        assert_eq!(content.publication_date, "2023-07-15");
    }

    #[test]
    fn missing_publication_date_uses_placeholder() {
        let html = "<html><body><p>undated</p></body></html>";
        let content = extract_page_content(html, "https://example.com", BodyMode::Full);
        assert_eq!(content.publication_date, NO_PUBLICATION_DATE);
    }

    #[test]
    fn full_mode_keeps_content_outside_the_article() {
        let content = extract_page_content(ARTICLE, "https://example.com/widget", BodyMode::Full);
        assert!(content.content.contains("$9.99"));
        assert!(content.content.contains("home"));
    }

    #[test]
    fn readable_mode_keeps_the_article_body() {
        let content =
            extract_page_content(ARTICLE, "https://example.com/widget", BodyMode::Readable);
        assert!(content.content.contains("$9.99"));
    }

    #[test]
    fn url_is_carried_through() {
        let content = extract_page_content(ARTICLE, "https://example.com/widget", BodyMode::Full);
        assert_eq!(content.url, "https://example.com/widget");
    }
}
