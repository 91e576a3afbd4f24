use reqwest::StatusCode;
use thiserror::Error;

/// Failure while issuing a single code search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid search response: {0}")]
    InvalidBody(String),
}

/// Hard failure of an analysis run. No metrics survive it.
#[derive(Debug, Error)]
pub enum AnalyserError {
    #[error("GitHub token is required")]
    MissingToken,
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    #[error("error doing GitHub search for letter '{letter}': {source}")]
    Search {
        letter: String,
        #[source]
        source: SearchError,
    },
    #[error("API error: {status} on letter '{letter}'")]
    Api { letter: String, status: StatusCode },
}
