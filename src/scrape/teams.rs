// Post-season roster collector: leaderboard page -> TeamRefs.

use scraper::Html;
use tracing::info;

use super::table;
use super::{PageFetcher, ScrapeError};
use crate::config::Config;
use crate::model::TeamRef;

/// Class fragment locating the fixed-left results table on the leaderboard.
const TEAM_TABLE_CLASS: &str = "Table--fixed-left";

/// Fetch the post-season offensive leaderboard and read one `TeamRef` per
/// embedded team link, in document order (the site's ranking by average
/// points, descending).
///
/// The link structure is load-bearing: a team whose row carries no link
/// simply never enters the pipeline, which silently forfeits its stats
/// downstream. A present-but-malformed link is a layout error instead.
pub async fn collect_teams(
    fetcher: &dyn PageFetcher,
    config: &Config,
) -> Result<Vec<TeamRef>, ScrapeError> {
    let url = config.leaderboard_url();
    info!("getting teams for post season {}", config.season);
    let body = fetcher.fetch(&url).await?;
    let doc = Html::parse_document(&body);

    let region = table::region(&doc, TEAM_TABLE_CLASS)?;
    let links = table::links_within(region)?;
    if links.is_empty() {
        return Err(ScrapeError::Layout {
            message: format!("no team links in leaderboard table at {url}"),
        });
    }

    links.iter().map(|href| team_from_href(href)).collect()
}

/// Parse a team link into a `TeamRef`. Path segment 5 (zero-based, counting
/// the empty segment before the leading slash) is the slug, segment 6 the
/// display name with hyphens standing in for spaces.
fn team_from_href(href: &str) -> Result<TeamRef, ScrapeError> {
    let path = strip_origin(href);
    let segments: Vec<&str> = path.split('/').collect();
    let (Some(slug), Some(raw_team)) = (segments.get(5), segments.get(6)) else {
        return Err(ScrapeError::Layout {
            message: format!("team link {href:?} lacks slug/name path segments"),
        });
    };
    if slug.is_empty() || raw_team.is_empty() {
        return Err(ScrapeError::Layout {
            message: format!("team link {href:?} has empty slug/name path segments"),
        });
    }
    Ok(TeamRef {
        url: href.to_string(),
        slug: slug.to_string(),
        team: raw_team.replace('-', " "),
    })
}

/// Reduce an absolute URL to its path; relative hrefs pass through.
fn strip_origin(href: &str) -> &str {
    let Some(scheme_end) = href.find("://") else {
        return href;
    };
    let rest = &href[scheme_end + 3..];
    match rest.find('/') {
        Some(path_start) => &rest[path_start..],
        None => "",
    }
}
