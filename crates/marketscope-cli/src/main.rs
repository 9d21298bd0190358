mod analyze;
mod seo;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use marketscope_analysis::AnalysisError;
use tracing_subscriber::EnvFilter;

/// Exit status for a target market missing from the dataset.
const EXIT_TARGET_NOT_FOUND: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "marketscope")]
#[command(about = "Real-estate market opportunity and competitor search analysis")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Score comparable markets and analyze competitor search rankings
    Analyze {
        /// Target city (e.g., Austin)
        #[arg(long)]
        city: String,
        /// Target state abbreviation (e.g., TX)
        #[arg(long)]
        state: String,
        /// Comparable-market radius in miles (defaults to MARKETSCOPE_DEFAULT_RADIUS_MILES)
        #[arg(long)]
        radius: Option<f64>,
        /// Score markets only; skip search and SEO lookups
        #[arg(long)]
        skip_search: bool,
    },
    /// Score comparable markets around a target without any network calls
    Score {
        /// Target city (e.g., Austin)
        #[arg(long)]
        city: String,
        /// Target state abbreviation (e.g., TX)
        #[arg(long)]
        state: String,
        /// Comparable-market radius in miles
        #[arg(long)]
        radius: Option<f64>,
    },
    /// Fetch SEO authority metrics for one domain
    Seo {
        /// Domain or URL (e.g., opendoor.com)
        #[arg(long)]
        domain: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match marketscope_core::load_app_config_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Analyze {
            city,
            state,
            radius,
            skip_search,
        } => analyze::run_analyze(&config, &city, &state, radius, skip_search).await,
        Commands::Score {
            city,
            state,
            radius,
        } => analyze::run_score(&config, &city, &state, radius),
        Commands::Seo { domain } => seo::run_seo(&config, &domain).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(AnalysisError::TargetNotFound { key }) = e.downcast_ref::<AnalysisError>() {
                eprintln!("error: target market '{key}' is not in the candidate dataset");
                return ExitCode::from(EXIT_TARGET_NOT_FOUND);
            }
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests;
