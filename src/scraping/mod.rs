pub mod browser;
pub mod content;

pub use browser::BrowserPool;
pub use content::{extract_page_content, BodyMode};

use crate::core::error::SiftError;
use crate::core::types::PageContent;
use crate::core::AppState;

/// Fetch a page through the shared browser and reduce it to structured content.
pub async fn scrape_page(
    state: &AppState,
    url: &str,
    mode: BodyMode,
) -> Result<PageContent, SiftError> {
    let pool = state.browser_pool.as_ref().ok_or_else(|| {
        SiftError::Fetch(
            "no Chromium-family browser available — install Chrome/Chromium or set CHROME_EXECUTABLE"
                .to_string(),
        )
    })?;
    let proxy_url = state.config.proxy.resolve_proxy_url();
    let html = pool.fetch_page_html(url, proxy_url.as_deref()).await?;
    Ok(extract_page_content(&html, url, mode))
}

/// Repair URLs captured from the request path.
///
/// Wildcard-captured URLs lose one slash behind most proxies and some HTTP
/// clients (`https://host` arrives as `https:/host`), so the scheme gets
/// reassembled here before validation.
pub fn normalize_target_url(raw: &str) -> Result<String, SiftError> {
    let mut url = raw.trim().to_string();
    for scheme in ["https", "http"] {
        let broken = format!("{}:/", scheme);
        let intact = format!("{}://", scheme);
        if url.starts_with(&broken) && !url.starts_with(&intact) {
            url = format!("{}{}", intact, &url[broken.len()..]);
            break;
        }
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(SiftError::Fetch(format!(
            "invalid URL '{}': must start with http:// or https://",
            raw
        )));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_repairs_collapsed_scheme_slashes() {
        assert_eq!(
            normalize_target_url("https:/example.com/page").unwrap(),
            "https://example.com/page"
        );
        assert_eq!(
            normalize_target_url("http:/example.com").unwrap(),
            "http://example.com"
        );
    }

    #[test]
    fn normalize_keeps_intact_urls_unchanged() {
        assert_eq!(
            normalize_target_url("https://example.com/a/b?c=d").unwrap(),
            "https://example.com/a/b?c=d"
        );
    }

    #[test]
    fn normalize_rejects_non_http_schemes() {
        assert!(normalize_target_url("ftp://example.com").is_err());
        assert!(normalize_target_url("example.com").is_err());
        assert!(normalize_target_url("").is_err());
    }
}
