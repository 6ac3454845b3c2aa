mod config;
mod render;

use aggregator::{ShowtimeOrchestrator, ShowtimeRequest};
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use config::{Config, ProviderConfig};
use details::CatalogEnricher;
use providers::{LocationTable, ShowtimeProvider, SnapshotProvider};
use records::DateWindow;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Showtimes - aggregated movie schedules across theater chains
#[derive(Parser)]
#[command(name = "showtimes")]
#[command(about = "Aggregate movie showtimes from several theater chains", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "showtimes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every showing for a location and day, grouped by title
    Search {
        /// Location name, e.g. 강남
        #[arg(long)]
        location: String,

        /// Day of month; defaults to today
        #[arg(long)]
        day: Option<i32>,

        /// Only titles containing this text
        #[arg(long)]
        title: Option<String>,

        /// Restrict to these providers (repeatable)
        #[arg(long = "provider")]
        providers: Vec<String>,

        /// Print JSON instead of the console listing
        #[arg(long)]
        json: bool,

        /// Skip title metadata lookup
        #[arg(long)]
        no_detail: bool,
    },

    /// List the locations each provider serves
    Locations {
        /// Only this provider
        #[arg(long)]
        provider: Option<String>,
    },

    /// List configured providers and their booking windows
    Providers,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    match cli.command {
        Commands::Search {
            location,
            day,
            title,
            providers,
            json,
            no_detail,
        } => handle_search(&config, location, day, title, &providers, json, !no_detail).await?,
        Commands::Locations { provider } => handle_locations(&config, provider.as_deref())?,
        Commands::Providers => handle_providers(&config)?,
    }

    Ok(())
}

fn build_provider(config: &ProviderConfig) -> Result<SnapshotProvider> {
    let locations = LocationTable::load(&config.locations)
        .with_context(|| format!("Failed to load locations for provider {}", config.name))?;
    Ok(
        SnapshotProvider::new(config.name.clone(), locations, config.snapshots.clone())
            .with_window(DateWindow::new(config.available_days)),
    )
}

fn build_orchestrator(
    config: &Config,
    only: &[String],
    with_details: bool,
) -> Result<ShowtimeOrchestrator> {
    for name in only {
        if config.provider(name).is_none() {
            bail!("Unknown provider `{}`", name);
        }
    }

    let mut orchestrator = ShowtimeOrchestrator::new();
    for provider in &config.providers {
        if !only.is_empty() && !only.contains(&provider.name) {
            continue;
        }
        orchestrator = orchestrator.with_provider(Arc::new(build_provider(provider)?));
    }

    if with_details {
        if let Some(details) = &config.details {
            let mut enricher = CatalogEnricher::load(&details.catalog)?;
            for prefix in &details.ignored_prefixes {
                enricher = enricher.with_ignored_prefix(prefix.clone());
            }
            orchestrator = orchestrator.with_enricher(Arc::new(enricher));
        }
    }

    Ok(orchestrator)
}

/// Handle the 'search' command
async fn handle_search(
    config: &Config,
    location: String,
    day: Option<i32>,
    title: Option<String>,
    only: &[String],
    json: bool,
    with_details: bool,
) -> Result<()> {
    let orchestrator = build_orchestrator(config, only, with_details)?;

    let today = chrono::Local::now().date_naive();
    let request = ShowtimeRequest::new(location, today)
        .with_day(day)
        .with_title(title)
        .with_enrich(with_details);

    tracing::debug!("Querying providers: {}", orchestrator.provider_names().join(", "));
    let start = Instant::now();
    let result = orchestrator.get_showtimes(&request).await?;

    if json {
        println!("{}", result.showtimes.to_json()?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Showtimes in {} on {}:", request.location, result.date)
            .bold()
            .blue()
    );
    println!(
        "{} {} titles from {} in {:.2?}\n",
        "✓".green(),
        result.showtimes.len(),
        result.contributed.join(", "),
        start.elapsed()
    );

    if result.showtimes.is_empty() {
        println!("No showings found.");
    } else if let Ok(enriched) = result.showtimes.to_enriched_list() {
        render::print_enriched(enriched);
    } else {
        render::print_grouped(&result.showtimes.to_grouped_list()?);
    }

    for failure in &result.failures {
        eprintln!("{} {}: {}", "✗".red(), failure.provider, failure.error);
    }
    if !result.skipped.is_empty() {
        eprintln!(
            "{} on {} not served by: {}",
            request.location.dimmed(),
            result.date,
            result.skipped.join(", ")
        );
    }

    Ok(())
}

/// Handle the 'locations' command
fn handle_locations(config: &Config, only: Option<&str>) -> Result<()> {
    if let Some(name) = only {
        if config.provider(name).is_none() {
            bail!("Unknown provider `{}`", name);
        }
    }

    for provider in &config.providers {
        if only.is_some_and(|name| name != provider.name) {
            continue;
        }
        let locations = LocationTable::load(&provider.locations)
            .with_context(|| format!("Failed to load locations for provider {}", provider.name))?;

        println!(
            "{} ({} locations)",
            provider.label().bold().blue(),
            locations.len()
        );
        for name in locations.names() {
            println!("  {}", name);
        }
    }
    Ok(())
}

/// Handle the 'providers' command
fn handle_providers(config: &Config) -> Result<()> {
    if config.providers.is_empty() {
        println!("No providers configured.");
        return Ok(());
    }

    let today = chrono::Local::now().date_naive();
    for entry in &config.providers {
        let provider = build_provider(entry)?;
        println!(
            "{} {} [{}] ({} locations)",
            "•".green(),
            entry.label().bold(),
            provider.name(),
            provider.locations().len()
        );
        println!("  snapshots: {}", provider.root().display());
        println!(
            "  bookable days: {}",
            provider.window().reachable_days(today).join(" ")
        );
    }

    match &config.details {
        Some(details) => println!("\nDetails catalog: {}", details.catalog.display()),
        None => println!("\nNo details catalog configured."),
    }
    Ok(())
}
