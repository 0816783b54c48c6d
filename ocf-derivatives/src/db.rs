//! Read-only access to the externally-owned derivatives database, attached
//! via DuckDB's `ATTACH ... (READ_ONLY)` (§4.5) — the same attachment
//! mechanism `ocf-store` documents for cross-database reads. The schema of
//! the attached database is owned by whatever process populates it; this
//! module assumes two tables, `funding_rates(ts, funding_rate)` and
//! `open_interest(ts, open_interest)`, each ordered by `ts`.

use std::path::Path;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use duckdb::{params, Connection};
use ocf_core::config::Config;
use parking_lot::Mutex;
use tracing::warn;

use crate::error::DerivativesError;
use crate::model::{FundingRateRow, OpenInterestRow};

/// Nearest-row alignment tolerance (§4.5: "within ±10 minutes of the
/// target"). Both the alignment check and the staleness check share this
/// window — a row further away than this is treated as absent.
///
/// Takes `config.derivatives_staleness_tolerance` rather than hardcoding it,
/// so C5's actual tolerance always matches the process-wide config (§9).
pub fn alignment_tolerance(config: &Config) -> TimeDelta {
    TimeDelta::from_std(config.derivatives_staleness_tolerance).unwrap_or_else(|_| TimeDelta::minutes(10))
}

/// Backoff policy mirroring `ocf_store::RetryPolicy`'s shape; duplicated
/// rather than shared because the two crates' retryable operations (SQL
/// queries vs. price-feed fetches) have different error types. [`Self::default`]
/// stays a literal convenience for tests; production callers should build
/// this from [`Config`] via [`Self::from_config`].
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub base: Duration,
    pub factor: f64,
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(1),
            factor: 2.0,
            max_attempts: 3,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base: config.retry_base,
            factor: config.retry_factor,
            max_attempts: config.retry_max_attempts,
        }
    }
}

fn retry<T>(policy: RetryPolicy, mut op: impl FnMut() -> Result<T, duckdb::Error>) -> Result<T, DerivativesError> {
    let mut delay = policy.base;
    let mut last_err = None;
    for attempt in 1..=policy.max_attempts {
        match op() {
            Ok(v) => return Ok(v),
            Err(e) => {
                warn!(attempt, error = %e, "derivatives query failed, retrying");
                last_err = Some(e);
                if attempt < policy.max_attempts {
                    thread::sleep(delay);
                    delay = Duration::from_secs_f64(delay.as_secs_f64() * policy.factor);
                }
            }
        }
    }
    Err(DerivativesError::Engine(last_err.expect("loop runs at least once")))
}

pub struct DerivativesDb {
    conn: Mutex<Connection>,
    retry_policy: RetryPolicy,
    alignment_tolerance: TimeDelta,
}

impl DerivativesDb {
    /// Opens an in-memory DuckDB handle and attaches `derivatives_path`
    /// read-only. Failure to attach is reported as `Unavailable` rather
    /// than propagated, so callers can degrade both adapters to `None`.
    pub fn open(derivatives_path: impl AsRef<Path>, retry_policy: RetryPolicy, alignment_tolerance: TimeDelta) -> Result<Self, DerivativesError> {
        let conn = Connection::open_in_memory().map_err(|e| DerivativesError::Unavailable(e.to_string()))?;
        let path = derivatives_path.as_ref().to_string_lossy().replace('\'', "''");
        conn.execute_batch(&format!("ATTACH '{path}' AS derivatives (READ_ONLY)"))
            .map_err(|e| DerivativesError::Unavailable(e.to_string()))?;
        Ok(Self {
            conn: Mutex::new(conn),
            retry_policy,
            alignment_tolerance,
        })
    }

    /// Opens against `config`'s retry policy and staleness tolerance,
    /// rather than the crate's bare test defaults (§9).
    pub fn open_with_config(derivatives_path: impl AsRef<Path>, config: &Config) -> Result<Self, DerivativesError> {
        Self::open(derivatives_path, RetryPolicy::from_config(config), alignment_tolerance(config))
    }

    /// Nearest funding-rate row to `target`, or `None` if the nearest row
    /// falls outside the configured alignment tolerance or the table is
    /// empty.
    pub fn latest_funding_rate(&self, target: DateTime<Utc>) -> Result<Option<FundingRateRow>, DerivativesError> {
        let policy = self.retry_policy;
        let row: Option<(DateTime<Utc>, f64)> = retry(policy, || {
            let conn = self.conn.lock();
            conn.query_row(
                "SELECT ts, funding_rate FROM derivatives.funding_rates \
                 ORDER BY ABS(epoch(ts) - epoch(?)) ASC LIMIT 1",
                params![target],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map(Some)
            .or_else(|e| if matches!(e, duckdb::Error::QueryReturnedNoRows) { Ok(None) } else { Err(e) })
        })?;

        Ok(row
            .filter(|(ts, _)| (*ts - target).abs() <= self.alignment_tolerance)
            .map(|(ts, funding_rate)| FundingRateRow { ts, funding_rate }))
    }

    /// Nearest open-interest row to `target`, same alignment rule as
    /// [`Self::latest_funding_rate`].
    pub fn nearest_open_interest(&self, target: DateTime<Utc>) -> Result<Option<OpenInterestRow>, DerivativesError> {
        let policy = self.retry_policy;
        let row: Option<(DateTime<Utc>, f64)> = retry(policy, || {
            let conn = self.conn.lock();
            conn.query_row(
                "SELECT ts, open_interest FROM derivatives.open_interest \
                 ORDER BY ABS(epoch(ts) - epoch(?)) ASC LIMIT 1",
                params![target],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .map(Some)
            .or_else(|e| if matches!(e, duckdb::Error::QueryReturnedNoRows) { Ok(None) } else { Err(e) })
        })?;

        Ok(row
            .filter(|(ts, _)| (*ts - target).abs() <= self.alignment_tolerance)
            .map(|(ts, open_interest)| OpenInterestRow { ts, open_interest }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn seed_derivatives_db(path: &Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE funding_rates (ts TIMESTAMP, funding_rate DOUBLE); \
             INSERT INTO funding_rates VALUES ('2021-01-01 00:00:00', 0.0005); \
             CREATE TABLE open_interest (ts TIMESTAMP, open_interest DOUBLE); \
             INSERT INTO open_interest VALUES ('2021-01-01 00:00:00', 1000.0);",
        )
        .unwrap();
    }

    #[test]
    fn returns_row_within_alignment_tolerance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("derivatives.duckdb");
        seed_derivatives_db(&path);

        let db = DerivativesDb::open(&path, RetryPolicy::default(), TimeDelta::minutes(10)).unwrap();
        let target = Utc.with_ymd_and_hms(2021, 1, 1, 0, 5, 0).unwrap();
        let row = db.latest_funding_rate(target).unwrap();
        assert_eq!(row.unwrap().funding_rate, 0.0005);
    }

    #[test]
    fn none_when_nearest_row_outside_tolerance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("derivatives.duckdb");
        seed_derivatives_db(&path);

        let db = DerivativesDb::open(&path, RetryPolicy::default(), TimeDelta::minutes(10)).unwrap();
        let target = Utc.with_ymd_and_hms(2021, 1, 1, 1, 0, 0).unwrap();
        assert!(db.latest_funding_rate(target).unwrap().is_none());
    }

    #[test]
    fn unavailable_when_path_does_not_exist() {
        let err = DerivativesDb::open("/nonexistent/path/derivatives.duckdb", RetryPolicy::default(), TimeDelta::minutes(10));
        assert!(err.is_err());
    }

    #[test]
    fn open_with_config_uses_configured_staleness_tolerance() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("derivatives.duckdb");
        seed_derivatives_db(&path);

        let config = Config::default();
        let db = DerivativesDb::open_with_config(&path, &config).unwrap();
        let target = Utc.with_ymd_and_hms(2021, 1, 1, 0, 5, 0).unwrap();
        assert_eq!(db.latest_funding_rate(target).unwrap().unwrap().funding_rate, 0.0005);
    }
}
