pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_PERPLEXITY_BASE_URL: &str = "https://api.perplexity.ai";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_PERPLEXITY_MODEL: &str = "sonar";

#[derive(Clone)]
pub struct AppConfig {
    /// Bearer token for the completion provider (spelling, synthesis, winner picks).
    pub groq_api_key: String,
    /// Bearer token for the grounded-search research provider.
    pub perplexity_api_key: String,
    pub groq_model: String,
    pub perplexity_model: String,
    pub groq_base_url: String,
    pub perplexity_base_url: String,
    pub min_items: usize,
    pub max_items: usize,
    /// Upper bound on follow-up research queries per comparison run.
    pub max_additional_searches: usize,
    /// Ask the completion provider for `response_format: json_object` during synthesis.
    pub json_mode: bool,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub user_agent: String,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("groq_api_key", &"[redacted]")
            .field("perplexity_api_key", &"[redacted]")
            .field("groq_model", &self.groq_model)
            .field("perplexity_model", &self.perplexity_model)
            .field("groq_base_url", &self.groq_base_url)
            .field("perplexity_base_url", &self.perplexity_base_url)
            .field("min_items", &self.min_items)
            .field("max_items", &self.max_items)
            .field("max_additional_searches", &self.max_additional_searches)
            .field("json_mode", &self.json_mode)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("user_agent", &self.user_agent)
            .field("log_level", &self.log_level)
            .finish()
    }
}
