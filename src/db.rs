// SQLite persistence layer for scraped datasets.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use crate::model::{SalaryRecord, StatRecord, TeamRef};

/// SQLite-backed store for the three scraped tables plus a key-value meta
/// table. Writes are whole-table replacements: each collector's full output
/// overwrites its table inside one transaction.
///
/// The `saleries` table name is kept misspelled for compatibility with
/// stores written by earlier versions of this tool.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Open (or create) a SQLite database at `path` and ensure all tables
    /// exist. Pass `":memory:"` for an ephemeral in-memory database (useful
    /// for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open store at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set store pragmas")?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS teams (
                url  TEXT NOT NULL,
                slug TEXT NOT NULL,
                team TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS stats (
                name     TEXT NOT NULL,
                position TEXT NOT NULL,
                team     TEXT NOT NULL,
                gp       INTEGER NOT NULL,
                pts      REAL NOT NULL,
                extras   TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS saleries (
                name     TEXT NOT NULL,
                team     TEXT NOT NULL,
                position TEXT,
                salary   REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS meta (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            ",
        )
        .context("failed to create store schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Acquire the database connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("store mutex poisoned")
    }

    // ------------------------------------------------------------------
    // Whole-table replace writes
    // ------------------------------------------------------------------

    /// Replace the `teams` table with the given rows, preserving their order.
    pub fn replace_teams(&self, teams: &[TeamRef]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin teams transaction")?;
        tx.execute("DELETE FROM teams", [])
            .context("failed to clear teams table")?;
        for team in teams {
            tx.execute(
                "INSERT INTO teams (url, slug, team) VALUES (?1, ?2, ?3)",
                params![team.url, team.slug, team.team],
            )
            .context("failed to insert team row")?;
        }
        tx.commit().context("failed to commit teams")?;
        Ok(())
    }

    /// Replace the `stats` table with the given rows, preserving their order.
    /// Extra stat columns are stored as a JSON object per row.
    pub fn replace_stats(&self, stats: &[StatRecord]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn.transaction().context("failed to begin stats transaction")?;
        tx.execute("DELETE FROM stats", [])
            .context("failed to clear stats table")?;
        for stat in stats {
            let extras_json = serde_json::to_string(&stat.extras)
                .context("failed to serialize stat extras")?;
            tx.execute(
                "INSERT INTO stats (name, position, team, gp, pts, extras)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    stat.name,
                    stat.position,
                    stat.team,
                    stat.gp,
                    stat.pts,
                    extras_json,
                ],
            )
            .context("failed to insert stat row")?;
        }
        tx.commit().context("failed to commit stats")?;
        Ok(())
    }

    /// Replace the `saleries` table with the given rows, preserving their order.
    pub fn replace_salaries(&self, salaries: &[SalaryRecord]) -> Result<()> {
        let mut conn = self.conn();
        let tx = conn
            .transaction()
            .context("failed to begin salaries transaction")?;
        tx.execute("DELETE FROM saleries", [])
            .context("failed to clear saleries table")?;
        for salary in salaries {
            tx.execute(
                "INSERT INTO saleries (name, team, position, salary)
                 VALUES (?1, ?2, ?3, ?4)",
                params![salary.name, salary.team, salary.position, salary.salary],
            )
            .context("failed to insert salary row")?;
        }
        tx.commit().context("failed to commit salaries")?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Whole-table reads
    // ------------------------------------------------------------------

    /// Load all stat rows in insertion order.
    pub fn load_stats(&self) -> Result<Vec<StatRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT name, position, team, gp, pts, extras
                 FROM stats ORDER BY rowid",
            )
            .context("failed to prepare load_stats query")?;

        let stats = stmt
            .query_map([], |row| {
                let gp: i64 = row.get(3)?;
                let extras_json: String = row.get(5)?;
                let extras = serde_json::from_str::<BTreeMap<String, f64>>(&extras_json)
                    .unwrap_or_default();
                Ok(StatRecord {
                    name: row.get(0)?,
                    position: row.get(1)?,
                    team: row.get(2)?,
                    gp: gp as u32,
                    pts: row.get(4)?,
                    extras,
                })
            })
            .context("failed to query stats")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map stat rows")?;

        Ok(stats)
    }

    /// Load all salary rows in insertion order.
    pub fn load_salaries(&self) -> Result<Vec<SalaryRecord>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare(
                "SELECT name, team, position, salary
                 FROM saleries ORDER BY rowid",
            )
            .context("failed to prepare load_salaries query")?;

        let salaries = stmt
            .query_map([], |row| {
                Ok(SalaryRecord {
                    name: row.get(0)?,
                    team: row.get(1)?,
                    position: row.get(2)?,
                    salary: row.get(3)?,
                })
            })
            .context("failed to query salaries")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map salary rows")?;

        Ok(salaries)
    }

    /// Load all team rows in insertion order.
    pub fn load_teams(&self) -> Result<Vec<TeamRef>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT url, slug, team FROM teams ORDER BY rowid")
            .context("failed to prepare load_teams query")?;

        let teams = stmt
            .query_map([], |row| {
                Ok(TeamRef {
                    url: row.get(0)?,
                    slug: row.get(1)?,
                    team: row.get(2)?,
                })
            })
            .context("failed to query teams")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .context("failed to map team rows")?;

        Ok(teams)
    }

    // ------------------------------------------------------------------
    // Meta key-value store
    // ------------------------------------------------------------------

    /// Persist a string value under `key`. Uses INSERT OR REPLACE so
    /// repeated saves overwrite the previous value.
    pub fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn();
        conn.execute(
            "INSERT OR REPLACE INTO meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .context("failed to save meta value")?;
        Ok(())
    }

    /// Load a previously saved value by `key`. Returns `None` if the key
    /// does not exist.
    pub fn get_meta(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare("SELECT value FROM meta WHERE key = ?1")
            .context("failed to prepare get_meta query")?;

        let mut rows = stmt
            .query_map(params![key], |row| row.get::<_, String>(0))
            .context("failed to query meta")?;

        match rows.next() {
            Some(row) => Ok(Some(row.context("failed to read meta row")?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper: create a fresh in-memory store for each test.
    fn test_store() -> Store {
        Store::open(":memory:").expect("in-memory store should open")
    }

    fn sample_stat(name: &str) -> StatRecord {
        let mut extras = BTreeMap::new();
        extras.insert("MIN".to_string(), 33.4);
        extras.insert("REB".to_string(), 11.0);
        StatRecord {
            name: name.to_string(),
            position: "F".to_string(),
            team: "milwaukee bucks".to_string(),
            gp: 10,
            pts: 28.2,
            extras,
        }
    }

    fn sample_salary(name: &str) -> SalaryRecord {
        SalaryRecord {
            name: name.to_string(),
            team: "milwaukee bucks".to_string(),
            position: Some("F".to_string()),
            salary: 27_528_088.0,
        }
    }

    #[test]
    fn open_creates_tables() {
        let store = test_store();
        let conn = store.conn();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"teams".to_string()));
        assert!(tables.contains(&"stats".to_string()));
        assert!(tables.contains(&"saleries".to_string()));
        assert!(tables.contains(&"meta".to_string()));
    }

    #[test]
    fn stats_round_trip_preserves_rows_and_order() {
        let store = test_store();
        let stats = vec![sample_stat("Giannis Antetokounmpo"), sample_stat("Khris Middleton")];

        store.replace_stats(&stats).unwrap();
        let loaded = store.load_stats().unwrap();

        assert_eq!(loaded, stats);
    }

    #[test]
    fn salaries_round_trip_preserves_rows_and_order() {
        let store = test_store();
        let salaries = vec![sample_salary("Giannis Antetokounmpo"), sample_salary("Jrue Holiday")];

        store.replace_salaries(&salaries).unwrap();
        let loaded = store.load_salaries().unwrap();

        assert_eq!(loaded, salaries);
    }

    #[test]
    fn salary_position_none_survives_round_trip() {
        let store = test_store();
        let salaries = vec![SalaryRecord {
            position: None,
            ..sample_salary("Mystery Player")
        }];

        store.replace_salaries(&salaries).unwrap();
        let loaded = store.load_salaries().unwrap();
        assert_eq!(loaded[0].position, None);
    }

    #[test]
    fn teams_round_trip_preserves_site_ordering() {
        let store = test_store();
        let teams = vec![
            TeamRef {
                url: "/nba/team/_/name/mil/milwaukee-bucks".into(),
                slug: "mil".into(),
                team: "milwaukee bucks".into(),
            },
            TeamRef {
                url: "/nba/team/_/name/phx/phoenix-suns".into(),
                slug: "phx".into(),
                team: "phoenix suns".into(),
            },
        ];

        store.replace_teams(&teams).unwrap();
        assert_eq!(store.load_teams().unwrap(), teams);
    }

    #[test]
    fn replace_overwrites_previous_contents() {
        let store = test_store();

        store
            .replace_stats(&[sample_stat("A"), sample_stat("B")])
            .unwrap();
        store.replace_stats(&[sample_stat("C")]).unwrap();

        let loaded = store.load_stats().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "C");
    }

    #[test]
    fn empty_replace_clears_table() {
        let store = test_store();
        store.replace_salaries(&[sample_salary("A")]).unwrap();
        store.replace_salaries(&[]).unwrap();
        assert!(store.load_salaries().unwrap().is_empty());
    }

    #[test]
    fn meta_round_trip_and_overwrite() {
        let store = test_store();
        assert!(store.get_meta("scraped_at").unwrap().is_none());

        store.set_meta("scraped_at", "2021-07-21T00:00:00Z").unwrap();
        assert_eq!(
            store.get_meta("scraped_at").unwrap().as_deref(),
            Some("2021-07-21T00:00:00Z")
        );

        store.set_meta("scraped_at", "2021-07-22T00:00:00Z").unwrap();
        assert_eq!(
            store.get_meta("scraped_at").unwrap().as_deref(),
            Some("2021-07-22T00:00:00Z")
        );
    }

    #[test]
    fn extras_survive_round_trip() {
        let store = test_store();
        let stat = sample_stat("Giannis Antetokounmpo");
        store.replace_stats(&[stat.clone()]).unwrap();

        let loaded = store.load_stats().unwrap();
        assert_eq!(loaded[0].extras.get("MIN"), Some(&33.4));
        assert_eq!(loaded[0].extras.get("REB"), Some(&11.0));
    }
}
