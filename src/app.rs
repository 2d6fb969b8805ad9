// Pipeline orchestration: scrape-and-persist or reload, then rank.

use anyhow::{Context, Result};
use tracing::info;

use crate::config::Config;
use crate::db::Store;
use crate::model::{SalaryRecord, StatRecord};
use crate::scrape::{self, PageFetcher};

/// Run the full collection pipeline and overwrite all store tables.
/// Collectors run sequentially: teams drive stats; salaries are independent.
pub async fn refresh_store(
    fetcher: &dyn PageFetcher,
    store: &Store,
    config: &Config,
) -> Result<(Vec<StatRecord>, Vec<SalaryRecord>)> {
    let teams = scrape::teams::collect_teams(fetcher, config)
        .await
        .context("failed to collect post-season teams")?;
    store.replace_teams(&teams).context("failed to persist teams")?;

    let stats = scrape::stats::collect_stats(fetcher, config, &teams)
        .await
        .context("failed to collect team statistics")?;
    store.replace_stats(&stats).context("failed to persist stats")?;

    let salaries = scrape::salaries::collect_salaries(fetcher, config)
        .await
        .context("failed to collect salaries")?;
    store
        .replace_salaries(&salaries)
        .context("failed to persist salaries")?;

    store.set_meta("scraped_at", &chrono::Utc::now().to_rfc3339())?;
    store.set_meta("season", &config.season.to_string())?;

    info!(
        "scraped {} teams, {} stat lines, {} salary rows",
        teams.len(),
        stats.len(),
        salaries.len()
    );
    Ok((stats, salaries))
}

/// Reload the persisted datasets from a previous run.
pub fn load_datasets(store: &Store) -> Result<(Vec<StatRecord>, Vec<SalaryRecord>)> {
    let stats = store.load_stats().context("failed to load stats table")?;
    let salaries = store
        .load_salaries()
        .context("failed to load saleries table")?;
    Ok((stats, salaries))
}
