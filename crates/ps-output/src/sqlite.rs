//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! tables `agent_states`, `tick_summaries` and `risk_events`.

use std::path::Path;

use rusqlite::Connection;

use crate::writer::OutputWriter;
use crate::{AgentStateRow, OutputResult, RiskEventRow, TickSummaryRow};

/// Writes simulation output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS agent_states (
                 tick               INTEGER NOT NULL,
                 agent_id           INTEGER NOT NULL,
                 x                  REAL    NOT NULL,
                 y                  REAL    NOT NULL,
                 z                  REAL    NOT NULL,
                 status             TEXT    NOT NULL,
                 replan_attempts    INTEGER NOT NULL,
                 cooldown           INTEGER NOT NULL,
                 max_risk           REAL    NOT NULL,
                 distance_travelled REAL    NOT NULL,
                 completion_pct     REAL    NOT NULL,
                 reroute_count      INTEGER NOT NULL,
                 stall_count        INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick            INTEGER PRIMARY KEY,
                 elapsed_secs    REAL    NOT NULL,
                 active_agents   INTEGER NOT NULL,
                 mean_risk       REAL    NOT NULL,
                 max_risk        REAL    NOT NULL,
                 risk_events     INTEGER NOT NULL,
                 replans         INTEGER NOT NULL,
                 stalls          INTEGER NOT NULL,
                 arrivals        INTEGER NOT NULL,
                 warnings        INTEGER NOT NULL,
                 pairs_evaluated INTEGER NOT NULL,
                 pairs_pruned    INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS risk_events (
                 tick    INTEGER NOT NULL,
                 agent_a INTEGER NOT NULL,
                 agent_b INTEGER NOT NULL,
                 score   REAL    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_agent_states(&mut self, rows: &[AgentStateRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO agent_states \
                 (tick, agent_id, x, y, z, status, replan_attempts, cooldown, max_risk, \
                  distance_travelled, completion_pct, reroute_count, stall_count) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![
                    row.tick as i64,
                    row.agent_id,
                    row.x,
                    row.y,
                    row.z,
                    row.status,
                    row.replan_attempts,
                    row.cooldown,
                    row.max_risk,
                    row.distance_travelled,
                    row.completion_pct,
                    row.reroute_count,
                    row.stall_count,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, elapsed_secs, active_agents, mean_risk, max_risk, risk_events, \
              replans, stalls, arrivals, warnings, pairs_evaluated, pairs_pruned) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            rusqlite::params![
                row.tick as i64,
                row.elapsed_secs,
                row.active_agents,
                row.mean_risk,
                row.max_risk,
                row.risk_events,
                row.replans,
                row.stalls,
                row.arrivals,
                row.warnings,
                row.pairs_evaluated as i64,
                row.pairs_pruned as i64,
            ],
        )?;
        Ok(())
    }

    fn write_risk_events(&mut self, rows: &[RiskEventRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO risk_events (tick, agent_a, agent_b, score) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for row in rows {
                stmt.execute(rusqlite::params![row.tick as i64, row.agent_a, row.agent_b, row.score])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
