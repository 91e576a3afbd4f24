use async_trait::async_trait;
use chrono::Utc;
use indicatif::ProgressBar;
use tokio::time::{sleep, Duration, Instant};
use tracing::{debug, info, warn};

use crate::alphabet::ENGLISH;
use crate::config::AnalyserConfig;
use crate::error::AnalyserError;
use crate::metrics::LetterMetrics;
use crate::rate_limit::{is_throttled, RateLimitSignal, RateLimitStatus};
use crate::search_client::{SearchClient, SearchOptions, SearchResponse};

const COUNTDOWN_TICK: Duration = Duration::from_millis(500);

/// How a run that produced metrics ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every letter was counted.
    Complete,
    /// A rate limit could not be waited out; the metrics hold the letters
    /// counted before it.
    RateLimited,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub metrics: LetterMetrics,
    pub outcome: Outcome,
}

/// Something that can produce per-letter file counts.
#[async_trait]
pub trait Analyser {
    /// Hard failures discard everything; a rate-limited stop keeps what was gathered.
    async fn analyse(&self) -> Result<Analysis, AnalyserError>;
}

/// Position of a run in the alphabet.
///
/// Transitions that do not apply to the current state leave it unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    /// The letter at `index` is about to be requested.
    Pending { index: usize },
    /// The letter at `index` was throttled and is requested again at `until`.
    Waiting { index: usize, until: Instant },
    Done,
    Aborted,
}

impl FetchState {
    pub fn start() -> Self {
        FetchState::Pending { index: 0 }
    }

    pub fn letter(&self) -> Option<&'static str> {
        match self {
            FetchState::Pending { index } | FetchState::Waiting { index, .. } => {
                ENGLISH.get(*index).copied()
            }
            FetchState::Done | FetchState::Aborted => None,
        }
    }

    /// The pending letter was counted: move on, or finish after the last one.
    pub fn on_counted(self) -> Self {
        match self {
            FetchState::Pending { index } if index + 1 < ENGLISH.len() => {
                FetchState::Pending { index: index + 1 }
            }
            FetchState::Pending { .. } => FetchState::Done,
            other => other,
        }
    }

    /// The pending letter was throttled. `wait` is the admissible wait, if any;
    /// without one, or if it cannot be represented as an instant, the run is aborted.
    pub fn on_throttled(self, wait: Option<Duration>, now: Instant) -> Self {
        match (self, wait.and_then(|wait| now.checked_add(wait))) {
            (FetchState::Pending { index }, Some(until)) => FetchState::Waiting { index, until },
            (FetchState::Pending { .. }, None) => FetchState::Aborted,
            (other, _) => other,
        }
    }

    /// The wait is over: request the same letter again.
    pub fn on_resumed(self) -> Self {
        match self {
            FetchState::Waiting { index, .. } => FetchState::Pending { index },
            other => other,
        }
    }
}

/// Counts, letter by letter, the files of one repository matching each letter.
///
/// Requests are strictly sequential and paced by
/// [`AnalyserConfig::request_delay`]. Throttled letters are retried after the
/// server's wait, with no cap on the number of retries.
pub struct LetterFrequencyFetcher<C> {
    client: C,
    config: AnalyserConfig,
    progress: ProgressBar,
}

impl<C: SearchClient> LetterFrequencyFetcher<C> {
    pub fn new(client: C, config: AnalyserConfig) -> Self {
        LetterFrequencyFetcher {
            client,
            config,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report progress on `progress` instead of a hidden bar.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Run the whole alphabet.
    pub async fn run(&self) -> Result<Analysis, AnalyserError> {
        let mut metrics = LetterMetrics::new();
        let mut state = FetchState::start();
        self.progress.set_length(ENGLISH.len() as u64);

        loop {
            state = match state {
                FetchState::Pending { index } => {
                    let letter = ENGLISH[index];
                    sleep(self.config.request_delay).await;

                    let response = self.search_letter(letter).await?;

                    if is_throttled(response.status) {
                        let signal = RateLimitSignal::from_headers(&response.headers, Utc::now());
                        let wait = signal.admissible(self.config.max_rate_limit_wait);
                        match (wait, signal.wait) {
                            (Some(wait), _) => warn!(
                                "Rate limited on '{}'. Waiting {} seconds...",
                                letter,
                                wait.as_secs()
                            ),
                            (None, Some(requested)) => warn!(
                                "Rate limited on '{}' for {} seconds, longer than the {} second ceiling",
                                letter,
                                requested.as_secs(),
                                self.config.max_rate_limit_wait.as_secs()
                            ),
                            (None, None) => {
                                warn!("Rate limited on '{}' without a usable reset time", letter)
                            }
                        }
                        state.on_throttled(wait, Instant::now())
                    } else if !response.status.is_success() {
                        return Err(AnalyserError::Api {
                            letter: letter.to_string(),
                            status: response.status,
                        });
                    } else {
                        info!("Letter '{}' occurs in {} files", letter, response.total);
                        metrics.insert(letter, response.total);
                        self.progress.inc(1);
                        state.on_counted()
                    }
                }
                FetchState::Waiting { index, until } => {
                    self.wait_out(ENGLISH[index], until).await;
                    state.on_resumed()
                }
                FetchState::Done => {
                    self.progress.finish_with_message("Finished alphabet");
                    return Ok(Analysis {
                        metrics,
                        outcome: Outcome::Complete,
                    });
                }
                FetchState::Aborted => {
                    self.progress.abandon_with_message(format!(
                        "Rate limited after {} letters",
                        metrics.len()
                    ));
                    return Ok(Analysis {
                        metrics,
                        outcome: Outcome::RateLimited,
                    });
                }
            };
        }
    }

    async fn search_letter(&self, letter: &str) -> Result<SearchResponse, AnalyserError> {
        let query = self.config.query_for(letter);
        self.progress.set_message(format!("Searching '{}'", letter));
        debug!("Searching code with query: {}", query);

        let response = self
            .client
            .search_code(&query, &SearchOptions { text_match: true })
            .await
            .map_err(|source| AnalyserError::Search {
                letter: letter.to_string(),
                source,
            })?;

        if let Some(status) = RateLimitStatus::from_headers(&response.headers) {
            debug!(
                "Rate limit: {}/{} ({}% left)",
                status.remaining,
                status.limit,
                status.percentage()
            );
        }
        Ok(response)
    }

    /// Sleep until `until`, keeping a countdown on the progress bar.
    async fn wait_out(&self, letter: &str, until: Instant) {
        let original_msg = self.progress.message();

        loop {
            let now = Instant::now();
            if now >= until {
                break;
            }
            let remaining = until - now;
            self.progress.set_message(format!(
                "Rate limited on '{}' - waiting {}s",
                letter,
                remaining.as_secs()
            ));
            sleep(remaining.min(COUNTDOWN_TICK)).await;
        }

        self.progress.set_message(original_msg);
    }
}

#[async_trait]
impl<C: SearchClient> Analyser for LetterFrequencyFetcher<C> {
    async fn analyse(&self) -> Result<Analysis, AnalyserError> {
        self.run().await
    }
}
