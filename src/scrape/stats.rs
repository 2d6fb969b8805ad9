// Team statistics collector: per-team stats pages -> StatRecords.
//
// Each team page embeds two adjacent sub-tables inside one responsive-table
// container: the first holds player display names (suffixed with a position
// token and an optional "*" starter marker), the second the numeric
// per-player stats in the same row order. Row i of one corresponds to row i
// of the other; a length mismatch is a layout error, never trusted silently.

use std::collections::BTreeMap;

use scraper::Html;
use tracing::{info, warn};

use super::table;
use super::{PageFetcher, ScrapeError};
use crate::config::Config;
use crate::model::{StatRecord, TeamRef};

/// Class fragment locating the stats container on a team page.
const STATS_CONTAINER_CLASS: &str = "ResponsiveTable";

/// Name-group sentinel marking the team-aggregate row.
const TOTAL_SENTINEL: &str = "Total";

/// Collect stat lines for every team, concatenated in team order. A single
/// team's page failing to parse drops that team with a warning; it does not
/// abort the run.
pub async fn collect_stats(
    fetcher: &dyn PageFetcher,
    config: &Config,
    teams: &[TeamRef],
) -> Result<Vec<StatRecord>, ScrapeError> {
    let mut stats = Vec::new();
    for team in teams {
        info!("getting stats for: {}", team.team);
        match team_stats(fetcher, config, team).await {
            Ok(mut rows) => stats.append(&mut rows),
            Err(e) => warn!("skipping team {}: {e}", team.team),
        }
    }
    Ok(stats)
}

async fn team_stats(
    fetcher: &dyn PageFetcher,
    config: &Config,
    team: &TeamRef,
) -> Result<Vec<StatRecord>, ScrapeError> {
    let url = config.team_stats_url(&team.slug);
    let body = fetcher.fetch(&url).await?;
    let doc = Html::parse_document(&body);

    let region = table::region(&doc, STATS_CONTAINER_CLASS)?;
    let tables = table::tables_within(region)?;
    if tables.len() < 2 {
        return Err(ScrapeError::Layout {
            message: format!(
                "expected name and stat sub-tables at {url}, found {}",
                tables.len()
            ),
        });
    }

    let names = table::read_table(tables[0], None)?;
    let numbers = table::read_table(tables[1], None)?;
    if names.rows.len() != numbers.rows.len() {
        return Err(ScrapeError::Layout {
            message: format!(
                "name rows ({}) and stat rows ({}) misaligned at {url}",
                names.rows.len(),
                numbers.rows.len()
            ),
        });
    }

    let header = &numbers.header;
    let gp_idx = column_index(header, "GP", &url)?;
    let pts_idx = column_index(header, "PTS", &url)?;

    let mut out = Vec::new();
    for (name_cells, stat_cells) in names.rows.iter().zip(&numbers.rows) {
        let Some(raw_name) = name_cells.first() else {
            continue;
        };
        let (name, position) = split_trailing_position(raw_name);
        if position == TOTAL_SENTINEL {
            continue;
        }

        let Some(gp) = numeric_cell(stat_cells, gp_idx) else {
            warn!("skipping {name:?} ({}): unparsable GP", team.team);
            continue;
        };
        let Some(pts) = numeric_cell(stat_cells, pts_idx) else {
            warn!("skipping {name:?} ({}): unparsable PTS", team.team);
            continue;
        };

        let mut extras = BTreeMap::new();
        for (i, (column, value)) in header.iter().zip(stat_cells).enumerate() {
            if i == gp_idx || i == pts_idx {
                continue;
            }
            if let Ok(v) = value.parse::<f64>() {
                extras.insert(column.clone(), v);
            }
        }

        out.push(StatRecord {
            name,
            position,
            team: team.team.clone(),
            gp: gp.round() as u32,
            pts,
            extras,
        });
    }
    Ok(out)
}

fn column_index(header: &[String], column: &str, url: &str) -> Result<usize, ScrapeError> {
    header
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| ScrapeError::Layout {
            message: format!("stat table at {url} has no {column} column"),
        })
}

fn numeric_cell(cells: &[String], idx: usize) -> Option<f64> {
    cells
        .get(idx)
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Split a display name into (name, position): strip the "*" starter marker,
/// trim, take the final whitespace token as the position code and rejoin the
/// rest as the name.
fn split_trailing_position(raw: &str) -> (String, String) {
    let cleaned = raw.replace('*', "");
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    let position = tokens.pop().unwrap_or_default().to_string();
    (tokens.join(" "), position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct FixtureFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait::async_trait]
    impl PageFetcher for FixtureFetcher {
        async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| ScrapeError::Layout {
                    message: format!("no fixture for {url}"),
                })
        }
    }

    fn team(slug: &str, name: &str) -> TeamRef {
        TeamRef {
            url: format!("/nba/team/_/name/{slug}/x"),
            slug: slug.to_string(),
            team: name.to_string(),
        }
    }

    /// Build a team stats page with aligned name/number sub-tables.
    fn stats_page(names: &[&str], rows: &[(&str, &str, &str)]) -> String {
        let name_rows: String = names
            .iter()
            .map(|n| format!("<tr><td>{n}</td></tr>"))
            .collect();
        let stat_rows: String = rows
            .iter()
            .map(|(gp, min, pts)| format!("<tr><td>{gp}</td><td>{min}</td><td>{pts}</td></tr>"))
            .collect();
        format!(
            r#"<html><body><div class="ResponsiveTable">
            <table><thead><tr><th>Name</th></tr></thead><tbody>{name_rows}</tbody></table>
            <table><thead><tr><th>GP</th><th>MIN</th><th>PTS</th></tr></thead><tbody>{stat_rows}</tbody></table>
            </div></body></html>"#
        )
    }

    // -- name parsing --

    #[test]
    fn starter_marker_stripped_and_last_token_is_position() {
        let (name, position) = split_trailing_position("LeBron James* F");
        assert_eq!(name, "LeBron James");
        assert_eq!(position, "F");
    }

    #[test]
    fn plain_name_splits_on_last_token() {
        let (name, position) = split_trailing_position(" Giannis Antetokounmpo F ");
        assert_eq!(name, "Giannis Antetokounmpo");
        assert_eq!(position, "F");
    }

    #[test]
    fn total_row_has_empty_name_and_total_position() {
        let (name, position) = split_trailing_position("Total");
        assert_eq!(name, "");
        assert_eq!(position, "Total");
    }

    // -- collection --

    #[tokio::test]
    async fn total_rows_never_reach_output() {
        let config = Config::default();
        let bucks = team("mil", "milwaukee bucks");
        let mut pages = HashMap::new();
        pages.insert(
            config.team_stats_url("mil"),
            stats_page(
                &["Giannis Antetokounmpo* F", "Khris Middleton F", "Total"],
                &[("10", "35.7", "28.2"), ("10", "37.1", "23.5"), ("10", "240.0", "110.0")],
            ),
        );
        let fetcher = FixtureFetcher { pages };

        let stats = collect_stats(&fetcher, &config, &[bucks]).await.unwrap();
        assert_eq!(stats.len(), 2);
        assert!(stats.iter().all(|s| s.position != "Total"));
        assert_eq!(stats[0].name, "Giannis Antetokounmpo");
        assert_eq!(stats[0].gp, 10);
        assert_eq!(stats[0].pts, 28.2);
        assert_eq!(stats[0].team, "milwaukee bucks");
        assert_eq!(stats[0].extras.get("MIN"), Some(&35.7));
    }

    #[tokio::test]
    async fn misaligned_subtables_drop_the_team() {
        let config = Config::default();
        let bucks = team("mil", "milwaukee bucks");
        let suns = team("phx", "phoenix suns");

        // Bucks page: two names, one stat row. Suns page: aligned.
        let mut pages = HashMap::new();
        pages.insert(
            config.team_stats_url("mil"),
            stats_page(
                &["Giannis Antetokounmpo F", "Khris Middleton F"],
                &[("10", "35.7", "28.2")],
            ),
        );
        pages.insert(
            config.team_stats_url("phx"),
            stats_page(&["Chris Paul G"], &[("10", "33.0", "19.2")]),
        );
        let fetcher = FixtureFetcher { pages };

        let stats = collect_stats(&fetcher, &config, &[bucks, suns]).await.unwrap();
        // The misaligned team is skipped entirely; the healthy one survives.
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].team, "phoenix suns");
    }

    #[tokio::test]
    async fn failing_team_page_skips_only_that_team() {
        let config = Config::default();
        let bucks = team("mil", "milwaukee bucks");
        let suns = team("phx", "phoenix suns");

        // No fixture for mil at all; phx parses fine.
        let mut pages = HashMap::new();
        pages.insert(
            config.team_stats_url("phx"),
            stats_page(&["Chris Paul G"], &[("10", "33.0", "19.2")]),
        );
        let fetcher = FixtureFetcher { pages };

        let stats = collect_stats(&fetcher, &config, &[bucks, suns]).await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].name, "Chris Paul");
    }

    #[tokio::test]
    async fn missing_pts_column_drops_the_team() {
        let config = Config::default();
        let bucks = team("mil", "milwaukee bucks");
        let page = r#"<html><body><div class="ResponsiveTable">
            <table><tbody><tr><td>Giannis Antetokounmpo F</td></tr></tbody></table>
            <table><thead><tr><th>GP</th><th>MIN</th></tr></thead>
                   <tbody><tr><td>10</td><td>35.7</td></tr></tbody></table>
            </div></body></html>"#;
        let mut pages = HashMap::new();
        pages.insert(config.team_stats_url("mil"), page.to_string());
        let fetcher = FixtureFetcher { pages };

        let stats = collect_stats(&fetcher, &config, &[bucks]).await.unwrap();
        assert!(stats.is_empty());
    }

    #[tokio::test]
    async fn unparsable_gp_drops_only_that_row() {
        let config = Config::default();
        let bucks = team("mil", "milwaukee bucks");
        let mut pages = HashMap::new();
        pages.insert(
            config.team_stats_url("mil"),
            stats_page(
                &["Giannis Antetokounmpo F", "Khris Middleton F"],
                &[("--", "35.7", "28.2"), ("10", "37.1", "23.5")],
            ),
        );
        let fetcher = FixtureFetcher { pages };

        let stats = collect_stats(&fetcher, &config, &[bucks]).await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].name, "Khris Middleton");
    }

    #[tokio::test]
    async fn teams_stay_contiguous_in_output() {
        let config = Config::default();
        let bucks = team("mil", "milwaukee bucks");
        let suns = team("phx", "phoenix suns");
        let mut pages = HashMap::new();
        pages.insert(
            config.team_stats_url("mil"),
            stats_page(
                &["Giannis Antetokounmpo F", "Khris Middleton F"],
                &[("10", "35.7", "28.2"), ("10", "37.1", "23.5")],
            ),
        );
        pages.insert(
            config.team_stats_url("phx"),
            stats_page(
                &["Chris Paul G", "Devin Booker G"],
                &[("10", "33.0", "19.2"), ("10", "38.0", "27.3")],
            ),
        );
        let fetcher = FixtureFetcher { pages };

        let stats = collect_stats(&fetcher, &config, &[bucks, suns]).await.unwrap();
        let teams: Vec<&str> = stats.iter().map(|s| s.team.as_str()).collect();
        assert_eq!(
            teams,
            vec!["milwaukee bucks", "milwaukee bucks", "phoenix suns", "phoenix suns"]
        );
    }
}
