use clap::Parser;
use std::env;
use std::time::Duration;

use crate::config::{AnalyserConfig, DEFAULT_BASE_URL, DEFAULT_LANGUAGE, DEFAULT_REPOSITORY};
use crate::error::AnalyserError;

/// Counts how many files of a GitHub repository match each letter of the
/// alphabet, using the code-search API, and prints the letters by frequency.
#[derive(Parser, Debug)]
#[clap(
    author,
    version,
    about,
    long_about = "Queries GitHub code search once per letter A-Z, restricted to one repository and language, and prints how many files match each letter, most frequent first."
)]
pub struct Args {
    /// GitHub API token. Falls back to GITHUB_TOKEN.
    #[clap(short, long)]
    pub token: Option<String>,

    /// Repository to analyse, as owner/name.
    #[clap(short, long, env = "GITHUB_REPOSITORY", default_value = DEFAULT_REPOSITORY)]
    pub repository: String,

    /// Base URL of the GitHub REST API.
    #[clap(long, env = "GITHUB_API_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Language filter applied to every query.
    #[clap(short, long, default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Pause before every request, in milliseconds.
    #[clap(long, value_name = "MS", default_value = "2000")]
    pub delay_ms: u64,

    /// Longest rate-limit wait to sit out, in seconds. Longer waits end the run early.
    #[clap(long, value_name = "SECS", default_value = "120")]
    pub max_wait_secs: u64,

    /// Also write the letter counts to this file as JSON.
    #[clap(short, long)]
    pub output: Option<String>,
}

impl Args {
    /// Build the run configuration, taking the token from the arguments or the environment.
    pub fn to_config(&self) -> Result<AnalyserConfig, AnalyserError> {
        let token = match &self.token {
            Some(t) if !t.trim().is_empty() => t.clone(),
            _ => match env::var("GITHUB_TOKEN") {
                Ok(token) if !token.trim().is_empty() => token,
                _ => return Err(AnalyserError::MissingToken),
            },
        };

        Ok(AnalyserConfig::new(token)
            .with_repository(self.repository.clone())
            .with_base_url(self.base_url.clone())
            .with_language(self.language.clone())
            .with_request_delay(Duration::from_millis(self.delay_ms))
            .with_max_rate_limit_wait(Duration::from_secs(self.max_wait_secs)))
    }
}
