use clap::Parser;
use dotenv::dotenv;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use tokio::fs;
use tokio::time::Instant;
use tracing::{error, info, warn};

use files_letter_analyzer_lib::{
    Analyser, Args, GitHubClient, LetterFrequencyFetcher, Outcome,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize the tracing logger
    tracing_subscriber::fmt::init();

    dotenv().ok();

    let args = Args::parse();
    let config = args.to_config().map_err(|e| {
        error!("GitHub token not provided - hint: `export GITHUB_TOKEN=<your-github-token>`");
        e
    })?;

    let client = GitHubClient::new(&config)?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos:>2}/{len:2} {wide_msg}")?
            .progress_chars("=>-")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.enable_steady_tick(std::time::Duration::from_millis(80));

    info!(
        "Fetching alphabet metrics for {} ({})",
        config.repository, config.language
    );
    let fetcher = LetterFrequencyFetcher::new(client, config).with_progress(pb);

    let analysis_beginning = Instant::now();
    let analysis = match fetcher.analyse().await {
        Ok(analysis) => analysis,
        Err(e) => {
            error!(
                "fatal error was encountered while trying to run the GitHub code analysis: {}",
                e
            );
            return Err(e.into());
        }
    };

    if analysis.outcome == Outcome::RateLimited {
        warn!("incomplete results, one or multiple calls to GitHub API have been rate limited");
    }

    info!(
        "{} letters counted, {} file matches in total",
        analysis.metrics.len(),
        analysis.metrics.total()
    );
    print!("{}", analysis.metrics.render_report(analysis_beginning.elapsed()));

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&analysis.metrics)?;
        fs::write(path, json).await?;
        info!("Saved letter metrics to '{}'", path);
    }

    Ok(())
}
