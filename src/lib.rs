//! # Files Letter Analyzer
//!
//! Counts, for every letter of the English alphabet, how many files of a
//! GitHub repository match that letter in a code search, while respecting
//! the search API's rate limits.
//!
//! ## Main Components
//!
//! - [`LetterFrequencyFetcher`]: walks the alphabet one request at a time and
//!   waits out short rate limits
//! - [`GitHubClient`]: the [`SearchClient`] that talks to the GitHub REST API
//! - [`AnalyserConfig`]: explicit settings for a run
//! - [`LetterMetrics`]: the resulting letter to file-count map
//! - [`Args`]: command line arguments for the binary
//!
//! ## Example
//!
//! ```no_run
//! use files_letter_analyzer_lib::{
//!     AnalyserConfig, Analyser, GitHubClient, LetterFrequencyFetcher, Outcome,
//! };
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = AnalyserConfig::new("ghp_example")
//!         .with_repository("lodash/lodash")
//!         .with_request_delay(Duration::from_secs(2));
//!
//!     let client = GitHubClient::new(&config)?;
//!     let fetcher = LetterFrequencyFetcher::new(client, config);
//!
//!     let analysis = fetcher.analyse().await?;
//!     if analysis.outcome == Outcome::RateLimited {
//!         eprintln!("partial results");
//!     }
//!     for (letter, count) in analysis.metrics.sorted_desc() {
//!         println!("{letter}: {count}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod alphabet;
mod args;
mod config;
mod error;
mod letter_fetcher;
mod metrics;
pub mod rate_limit;
mod search_client;

pub use crate::args::Args;
pub use crate::config::{
    AnalyserConfig, DEFAULT_BASE_URL, DEFAULT_LANGUAGE, DEFAULT_MAX_RATE_LIMIT_WAIT,
    DEFAULT_REPOSITORY, DEFAULT_REQUEST_DELAY,
};
pub use crate::error::{AnalyserError, SearchError};
pub use crate::letter_fetcher::{Analyser, Analysis, FetchState, LetterFrequencyFetcher, Outcome};
pub use crate::metrics::LetterMetrics;
pub use crate::search_client::{GitHubClient, SearchClient, SearchOptions, SearchResponse};
