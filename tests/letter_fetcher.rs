use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

use files_letter_analyzer_lib::{
    alphabet, Analyser, AnalyserConfig, AnalyserError, LetterFrequencyFetcher, Outcome,
    SearchClient, SearchError, SearchOptions, SearchResponse,
};

/// One canned reply.
enum Reply {
    Total(u64),
    Status(StatusCode, Vec<(&'static str, String)>),
    Broken,
}

/// Serves scripted replies per letter; letters without a script get `default_total`.
#[derive(Default)]
struct ScriptedClient {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    default_total: u64,
    queries: Mutex<Vec<(String, SearchOptions)>>,
}

impl ScriptedClient {
    fn with_default(total: u64) -> Self {
        ScriptedClient {
            default_total: total,
            ..Default::default()
        }
    }

    fn script(self, letter: &str, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(letter.to_string(), replies.into());
        self
    }

    fn letters_requested(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|(query, _)| query.split(' ').next().unwrap_or_default().to_string())
            .collect()
    }
}

#[async_trait]
impl SearchClient for ScriptedClient {
    async fn search_code(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<SearchResponse, SearchError> {
        self.queries
            .lock()
            .unwrap()
            .push((query.to_string(), *options));

        let letter = query.split(' ').next().unwrap_or_default();
        let reply = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(letter)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Reply::Total(self.default_total));

        match reply {
            Reply::Total(total) => Ok(SearchResponse {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                total,
            }),
            Reply::Status(status, pairs) => {
                let mut headers = HeaderMap::new();
                for (name, value) in pairs {
                    headers.insert(name, value.parse().unwrap());
                }
                Ok(SearchResponse {
                    status,
                    headers,
                    total: 0,
                })
            }
            Reply::Broken => Err(SearchError::InvalidBody("truncated".into())),
        }
    }
}

fn config() -> AnalyserConfig {
    AnalyserConfig::new("test-token").with_request_delay(Duration::ZERO)
}

fn throttled_with_reset_in(secs: i64) -> Reply {
    let reset = Utc::now().timestamp() + secs;
    Reply::Status(
        StatusCode::FORBIDDEN,
        vec![("X-RateLimit-Reset", reset.to_string())],
    )
}

#[tokio::test(start_paused = true)]
async fn full_run_counts_every_letter_once() {
    let client = Arc::new(ScriptedClient::with_default(7));
    let fetcher = LetterFrequencyFetcher::new(client.clone(), config());

    let analysis = fetcher.analyse().await.unwrap();

    assert_eq!(analysis.outcome, Outcome::Complete);
    assert_eq!(analysis.metrics.len(), 26);
    for letter in alphabet::ENGLISH {
        assert_eq!(analysis.metrics.get(letter), Some(7));
    }
    assert_eq!(client.letters_requested(), alphabet::ENGLISH.to_vec());
}

#[tokio::test(start_paused = true)]
async fn every_query_filters_by_language_and_repository() {
    let client = Arc::new(ScriptedClient::with_default(1));
    let cfg = config()
        .with_repository("rust-lang/regex")
        .with_language("Rust");
    let fetcher = LetterFrequencyFetcher::new(client.clone(), cfg);

    fetcher.analyse().await.unwrap();

    let queries = client.queries.lock().unwrap();
    assert_eq!(queries[0].0, "A language:Rust repo:rust-lang/regex");
    assert!(queries
        .iter()
        .all(|(query, options)| query.ends_with(" language:Rust repo:rust-lang/regex")
            && options.text_match));
}

#[tokio::test(start_paused = true)]
async fn higher_counts_sort_first() {
    let client = ScriptedClient::with_default(0)
        .script("A", vec![Reply::Total(5)])
        .script("B", vec![Reply::Total(3)]);
    let fetcher = LetterFrequencyFetcher::new(client, config());

    let analysis = fetcher.analyse().await.unwrap();

    assert_eq!(analysis.metrics.get("A"), Some(5));
    assert_eq!(analysis.metrics.get("B"), Some(3));
    let sorted = analysis.metrics.sorted_desc();
    assert_eq!(&sorted[..2], &[("A", 5), ("B", 3)]);
}

#[tokio::test(start_paused = true)]
async fn short_throttle_retries_the_same_letter() {
    let client = Arc::new(
        ScriptedClient::with_default(2).script(
            "D",
            vec![
                Reply::Status(
                    StatusCode::TOO_MANY_REQUESTS,
                    vec![("Retry-After", "30".to_string())],
                ),
                Reply::Total(11),
            ],
        ),
    );
    let fetcher = LetterFrequencyFetcher::new(client.clone(), config());

    let started = Instant::now();
    let analysis = fetcher.analyse().await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(30));
    assert_eq!(analysis.outcome, Outcome::Complete);
    assert_eq!(analysis.metrics.len(), 26);
    assert_eq!(analysis.metrics.get("D"), Some(11));

    let requested = client.letters_requested();
    assert_eq!(requested.len(), 27);
    assert_eq!(&requested[3..5], &["D".to_string(), "D".to_string()]);
    assert_eq!(requested[5], "E");
}

#[tokio::test(start_paused = true)]
async fn repeated_short_throttles_are_all_retried() {
    let throttles = (0..5).map(|_| throttled_with_reset_in(10)).collect();
    let client = Arc::new(ScriptedClient::with_default(1).script("A", throttles));
    let fetcher = LetterFrequencyFetcher::new(client.clone(), config());

    let analysis = fetcher.analyse().await.unwrap();

    assert_eq!(analysis.outcome, Outcome::Complete);
    assert_eq!(analysis.metrics.len(), 26);
    assert_eq!(client.letters_requested().len(), 26 + 5);
}

#[tokio::test(start_paused = true)]
async fn unusable_throttle_on_third_letter_keeps_first_two() {
    let client = Arc::new(ScriptedClient::with_default(4).script(
        "C",
        vec![Reply::Status(StatusCode::FORBIDDEN, vec![])],
    ));
    let fetcher = LetterFrequencyFetcher::new(client.clone(), config());

    let analysis = fetcher.analyse().await.unwrap();

    assert_eq!(analysis.outcome, Outcome::RateLimited);
    assert_eq!(analysis.metrics.len(), 2);
    assert_eq!(analysis.metrics.letters().collect::<Vec<_>>(), vec!["A", "B"]);
    assert!(!analysis.metrics.contains("C"));
    assert_eq!(client.letters_requested(), vec!["A", "B", "C"]);
}

#[tokio::test(start_paused = true)]
async fn throttle_beyond_ceiling_stops_without_waiting() {
    let client = Arc::new(
        ScriptedClient::with_default(1).script("F", vec![throttled_with_reset_in(600)]),
    );
    let fetcher = LetterFrequencyFetcher::new(client.clone(), config());

    let started = Instant::now();
    let analysis = fetcher.analyse().await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(analysis.outcome, Outcome::RateLimited);
    assert_eq!(analysis.metrics.len(), 5);
    assert_eq!(client.letters_requested().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn ceiling_is_configurable() {
    let client = ScriptedClient::with_default(1).script(
        "A",
        vec![Reply::Status(
            StatusCode::FORBIDDEN,
            vec![("Retry-After", "30".to_string())],
        )],
    );
    let cfg = config().with_max_rate_limit_wait(Duration::from_secs(10));
    let fetcher = LetterFrequencyFetcher::new(client, cfg);

    let analysis = fetcher.analyse().await.unwrap();

    assert_eq!(analysis.outcome, Outcome::RateLimited);
    assert!(analysis.metrics.is_empty());
}

#[tokio::test(start_paused = true)]
async fn other_error_status_is_a_hard_failure() {
    let client = ScriptedClient::with_default(1).script(
        "B",
        vec![Reply::Status(StatusCode::UNPROCESSABLE_ENTITY, vec![])],
    );
    let fetcher = LetterFrequencyFetcher::new(client, config());

    match fetcher.analyse().await {
        Err(AnalyserError::Api { letter, status }) => {
            assert_eq!(letter, "B");
            assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn client_error_is_a_hard_failure() {
    let client = ScriptedClient::with_default(1).script("Z", vec![Reply::Broken]);
    let fetcher = LetterFrequencyFetcher::new(client, config());

    let err = fetcher.analyse().await.unwrap_err();
    assert!(matches!(err, AnalyserError::Search { ref letter, .. } if letter == "Z"));
}

#[tokio::test(start_paused = true)]
async fn courtesy_delay_precedes_every_request() {
    let client = ScriptedClient::with_default(1);
    let cfg = config().with_request_delay(Duration::from_secs(2));
    let fetcher = LetterFrequencyFetcher::new(client, cfg);

    let started = Instant::now();
    fetcher.analyse().await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(2 * 26));
}
