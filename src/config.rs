use std::time::Duration;

pub const DEFAULT_REPOSITORY: &str = "lodash/lodash";
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_LANGUAGE: &str = "JavaScript";
/// GitHub allows 30 authenticated code searches per minute.
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_MAX_RATE_LIMIT_WAIT: Duration = Duration::from_secs(2 * 60);

/// Settings for one analysis run.
///
/// Built by the caller and handed to [`crate::GitHubClient`] and
/// [`crate::LetterFrequencyFetcher`]. Nothing here is read from the
/// environment implicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyserConfig {
    pub token: String,
    pub repository: String,
    pub base_url: String,
    pub language: String,
    /// Pause before every request, retries included.
    pub request_delay: Duration,
    /// Longest rate-limit wait that is honoured. Anything longer ends the run.
    pub max_rate_limit_wait: Duration,
}

impl AnalyserConfig {
    /// Config with the default target and pacing for the given token.
    pub fn new(token: impl Into<String>) -> Self {
        AnalyserConfig {
            token: token.into(),
            repository: DEFAULT_REPOSITORY.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            request_delay: DEFAULT_REQUEST_DELAY,
            max_rate_limit_wait: DEFAULT_MAX_RATE_LIMIT_WAIT,
        }
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = repository.into();
        self
    }

    /// Trailing slashes are dropped so paths can be appended directly.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_max_rate_limit_wait(mut self, ceiling: Duration) -> Self {
        self.max_rate_limit_wait = ceiling;
        self
    }

    /// Search query for one letter, restricted to the configured language and repository.
    pub fn query_for(&self, letter: &str) -> String {
        format!(
            "{} language:{} repo:{}",
            letter, self.language, self.repository
        )
    }
}
