// Core record types shared by the collectors, the store, and the KPI engine.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One player's salary listing row, normalized.
///
/// `name` is the portion of the raw "Name, Position" field before the first
/// comma; `position` is `None` when the raw field carries no comma. `team` is
/// lowercased at ingest so the two sources agree on casing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRecord {
    pub name: String,
    pub team: String,
    pub position: Option<String>,
    pub salary: f64,
}

/// A post-season team as addressed on the stats site.
///
/// `slug` is the short URL path segment identifying the team; `team` is the
/// human-readable name with hyphens replaced by spaces. Rows keep the site's
/// default ordering (average points, descending).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub url: String,
    pub slug: String,
    pub team: String,
}

/// One player's post-season stat line for a single team.
///
/// `gp` and `pts` are the columns the KPI engine consumes; every other
/// numeric column of the source table passes through in `extras`, keyed by
/// its header name. Team-aggregate "Total" rows never become `StatRecord`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    pub name: String,
    pub position: String,
    pub team: String,
    pub gp: u32,
    pub pts: f64,
    pub extras: BTreeMap<String, f64>,
}

/// A ranked output row: stats joined with salary plus the efficiency metric.
///
/// `price_per_point = salary / (gp * pts)`; only rows with GP > 0, PTS > 0
/// and a matched salary are ever constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiRecord {
    pub name: String,
    pub team: String,
    pub position: String,
    pub gp: u32,
    pub pts: f64,
    pub salary: f64,
    pub price_per_point: f64,
}
