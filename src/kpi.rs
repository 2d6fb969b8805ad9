// KPI engine: join stats onto salaries by player name and rank by price
// per point.

use std::collections::HashMap;

use tracing::warn;

use crate::model::{KpiRecord, SalaryRecord, StatRecord};

/// Left-join stats onto salaries by player name and return the `n` cheapest
/// players by price per point, ascending.
///
/// Join semantics: the first salary row with a matching name wins when the
/// listing carries duplicates (traded players appear once per team). Stat
/// rows without a salary match, or with GP = 0 or PTS = 0, fail the
/// eligibility mask and are dropped. Fewer than `n` eligible rows is not an
/// error; everything that qualifies comes back.
pub fn top_by_price_per_point(
    stats: &[StatRecord],
    salaries: &[SalaryRecord],
    n: usize,
) -> Vec<KpiRecord> {
    let mut by_name: HashMap<&str, &SalaryRecord> = HashMap::new();
    for salary in salaries {
        by_name.entry(salary.name.as_str()).or_insert(salary);
    }

    let mut ranked: Vec<KpiRecord> = stats
        .iter()
        .filter_map(|stat| {
            let Some(salary) = by_name.get(stat.name.as_str()) else {
                warn!("no salary listed for {:?}, excluded from ranking", stat.name);
                return None;
            };
            if stat.gp == 0 || stat.pts <= 0.0 {
                return None;
            }
            let price_per_point = salary.salary / (stat.gp as f64 * stat.pts);
            Some(KpiRecord {
                name: stat.name.clone(),
                team: stat.team.clone(),
                position: stat.position.clone(),
                gp: stat.gp,
                pts: stat.pts,
                salary: salary.salary,
                price_per_point,
            })
        })
        .collect();

    ranked.sort_by(|a, b| a.price_per_point.total_cmp(&b.price_per_point));
    ranked.truncate(n);
    ranked
}
