// Price-per-point ranking entry point.
//
// Startup sequence:
// 1. Parse CLI flags
// 2. Initialize tracing (stderr; stdout carries the report)
// 3. Load config
// 4. Open the store; scrape if the store file is new or --refresh is set,
//    otherwise reload the persisted tables
// 5. Run the KPI engine and print the ranking

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use court_value::app;
use court_value::cli::Cli;
use court_value::config;
use court_value::db::Store;
use court_value::kpi;
use court_value::report;
use court_value::scrape;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing()?;

    let config = config::load_config().context("failed to load configuration")?;

    // File presence alone gates whether we scrape; opening the store below
    // creates the file, so check first.
    let store_exists = Path::new(&config.db_path).exists();
    let store = Store::open(&config.db_path)
        .with_context(|| format!("failed to open store at {}", config.db_path))?;

    let (stats, salaries) = if !store_exists || cli.refresh {
        info!("scraping fresh data for season {}", config.season);
        let fetcher = scrape::HttpFetcher::new().context("failed to build HTTP client")?;
        app::refresh_store(&fetcher, &store, &config).await?
    } else {
        info!("reading from store {}", config.db_path);
        app::load_datasets(&store)?
    };

    let ranked = kpi::top_by_price_per_point(&stats, &salaries, config.top_n);

    println!(
        "\nTop {} players of the {}/{} post season by price per point (ascending)\n",
        config.top_n,
        config.season - 1,
        config.season
    );
    if cli.print_csv {
        report::write_csv(std::io::stdout().lock(), &ranked)?;
    } else {
        print!("{}", report::render_table(&ranked));
    }

    Ok(())
}

/// Initialize tracing to stderr so the report on stdout stays clean.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("court_value=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
