// Salary collector: paginated salary listing -> SalaryRecords.

use scraper::Html;
use tokio::time::{sleep, Duration};
use tracing::{info, warn};

use super::table::{self, RawTable};
use super::{PageFetcher, ScrapeError};
use crate::config::Config;
use crate::model::SalaryRecord;

/// Class fragment locating the salary table on each listing page.
const SALARY_TABLE_CLASS: &str = "tablehead";

/// First cell of the header rows the site repeats inside the data table.
const HEADER_SENTINEL: &str = "RK";

/// Class fragment locating the "page M of N" pagination indicator.
const PAGE_NUMBERS_CLASS: &str = "page-numbers";

/// Collect all salary rows across every listing page. One request per page,
/// with the configured courtesy delay before each page after the first.
pub async fn collect_salaries(
    fetcher: &dyn PageFetcher,
    config: &Config,
) -> Result<Vec<SalaryRecord>, ScrapeError> {
    let first_url = config.salary_first_page_url();
    info!("getting salaries page 1");
    let body = fetcher.fetch(&first_url).await?;

    let (mut raw_rows, pages) = {
        let doc = Html::parse_document(&body);
        let pages = page_count(&doc)?;
        let table = salary_table(&doc)?;
        (table.rows, pages)
    };

    for page in 2..=pages {
        if config.request_delay_ms > 0 {
            sleep(Duration::from_millis(config.request_delay_ms)).await;
        }
        info!("getting salaries page {page}/{pages}");
        let url = config.salary_page_url(page);
        let body = fetcher.fetch(&url).await?;
        let doc = Html::parse_document(&body);
        raw_rows.extend(salary_table(&doc)?.rows);
    }

    Ok(raw_rows.iter().filter_map(|row| salary_from_row(row)).collect())
}

fn salary_table(doc: &Html) -> Result<RawTable, ScrapeError> {
    let region = table::region(doc, SALARY_TABLE_CLASS)?;
    table::read_table(region, Some(HEADER_SENTINEL))
}

/// Total page count from the pagination indicator ("1 of 15").
fn page_count(doc: &Html) -> Result<usize, ScrapeError> {
    let region = table::region(doc, PAGE_NUMBERS_CLASS).map_err(|_| ScrapeError::Pagination {
        text: String::new(),
    })?;
    let text = region
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let pages = text
        .split_once("of ")
        .and_then(|(_, n)| n.trim().parse::<usize>().ok())
        .ok_or_else(|| ScrapeError::Pagination { text: text.clone() })?;
    if pages == 0 {
        return Err(ScrapeError::Pagination { text });
    }
    Ok(pages)
}

/// Build a record from one raw row: [RK, "Name, Pos", Team, "$x,yyy,zzz"].
/// A malformed row is dropped, not fatal.
fn salary_from_row(cells: &[String]) -> Option<SalaryRecord> {
    if cells.len() < 4 {
        warn!("skipping short salary row: {cells:?}");
        return None;
    }
    let (name, position) = split_name_position(&cells[1]);
    let Some(salary) = parse_currency(&cells[3]) else {
        warn!("skipping salary row for {name:?}: unparsable amount {:?}", cells[3]);
        return None;
    };
    Some(SalaryRecord {
        name,
        team: cells[2].to_lowercase(),
        position,
        salary,
    })
}

/// Split a raw "Name, Position" field on the first `", "`. Fields without a
/// comma keep the whole text as the name and no position.
fn split_name_position(raw: &str) -> (String, Option<String>) {
    match raw.split_once(", ") {
        Some((name, position)) => (name.to_string(), Some(position.to_string())),
        None => (raw.to_string(), None),
    }
}

/// Parse a currency string like "$1,234,567" into its numeric value.
/// Returns `None` for non-numeric or negative results.
fn parse_currency(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}
