use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub http_client: reqwest::Client,
    // Shared persistent browser instance (tab reuse — avoids launch overhead per request).
    pub browser_pool: Option<Arc<crate::scraping::browser::BrowserPool>>,
    // Model-invocation collaborator behind a trait so tests substitute a scripted fake.
    pub model: Arc<dyn crate::llm::ModelClient>,
    /// File-based config loaded from `pagesift.json` (env-var fallback for all fields).
    pub config: Arc<crate::core::config::SiftConfig>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("browser_available", &self.browser_pool.is_some())
            .finish()
    }
}

impl AppState {
    pub fn new(http_client: reqwest::Client) -> Self {
        let config = Arc::new(crate::core::config::load_config());
        let model: Arc<dyn crate::llm::ModelClient> = Arc::new(
            crate::llm::OpenAiClient::from_config(http_client.clone(), &config.llm),
        );
        Self {
            http_client,
            browser_pool: crate::scraping::browser::BrowserPool::new_auto(),
            model,
            config,
        }
    }

    pub fn with_model(mut self, model: Arc<dyn crate::llm::ModelClient>) -> Self {
        self.model = model;
        self
    }
}
