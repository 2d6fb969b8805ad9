// Table extraction from parsed documents.
//
// The source sites share one markup convention: the interesting tabular
// region is addressable by a class-name fragment, and data tables repeat
// their header row inline (first cell "RK") every screenful.

use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

use super::ScrapeError;

/// One extracted tabular region: header cell texts (empty when the table has
/// no `<th>` header row) and data rows of cell texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

fn parse_selector(css: &str) -> Result<Selector, ScrapeError> {
    Selector::parse(css).map_err(|e| ScrapeError::Layout {
        message: format!("invalid selector `{css}`: {e}"),
    })
}

/// Find the first element whose class attribute contains `class_fragment`.
/// Fails with `TableNotFound` when nothing matches: the site layout has
/// changed and no content is recoverable.
pub fn region<'a>(doc: &'a Html, class_fragment: &str) -> Result<ElementRef<'a>, ScrapeError> {
    let selector = parse_selector(&format!("[class*=\"{class_fragment}\"]"))?;
    doc.select(&selector)
        .next()
        .ok_or_else(|| ScrapeError::TableNotFound {
            locator: class_fragment.to_string(),
        })
}

/// All `<table>` elements inside `region`, in document order. When the
/// region is itself a table, it is the only result.
pub fn tables_within(region: ElementRef<'_>) -> Result<Vec<ElementRef<'_>>, ScrapeError> {
    if region.value().name() == "table" {
        return Ok(vec![region]);
    }
    let selector = parse_selector("table")?;
    Ok(region.select(&selector).collect())
}

/// Read a `<table>` element into header and data rows.
///
/// A row made only of `<th>` cells becomes the header (first one wins); rows
/// with `<td>` cells are data. When `header_sentinel` is given, data rows
/// whose first cell equals it are dropped (repeated inline headers). An
/// empty table yields an empty row list, not an error.
pub fn read_table(
    table: ElementRef<'_>,
    header_sentinel: Option<&str>,
) -> Result<RawTable, ScrapeError> {
    let tr = parse_selector("tr")?;
    let th = parse_selector("th")?;
    let td = parse_selector("td")?;

    let mut header = Vec::new();
    let mut rows = Vec::new();

    for row in table.select(&tr) {
        let cells: Vec<String> = row.select(&td).map(cell_text).collect();
        if cells.is_empty() {
            if header.is_empty() {
                let heads: Vec<String> = row.select(&th).map(cell_text).collect();
                if !heads.is_empty() {
                    header = heads;
                }
            }
            continue;
        }
        if let Some(sentinel) = header_sentinel {
            if cells.first().map(String::as_str) == Some(sentinel) {
                continue;
            }
        }
        rows.push(cells);
    }

    Ok(RawTable { header, rows })
}

/// Hyperlink targets inside `region`, in document order, first occurrence
/// only (team rows carry the same link on both the logo and the name).
pub fn links_within(region: ElementRef<'_>) -> Result<Vec<String>, ScrapeError> {
    let selector = parse_selector("a[href]")?;
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for anchor in region.select(&selector) {
        if let Some(href) = anchor.value().attr("href") {
            if seen.insert(href.to_string()) {
                links.push(href.to_string());
            }
        }
    }
    Ok(links)
}

/// Element text with runs of whitespace collapsed to single spaces.
fn cell_text(el: ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
