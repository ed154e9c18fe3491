//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `agent_states.csv`
//! - `tick_summaries.csv`
//! - `risk_events.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentStateRow, OutputResult, RiskEventRow, TickSummaryRow};

pub const AGENT_STATE_HEADERS: [&str; 13] = [
    "tick",
    "agent_id",
    "x",
    "y",
    "z",
    "status",
    "replan_attempts",
    "cooldown",
    "max_risk",
    "distance_travelled",
    "completion_pct",
    "reroute_count",
    "stall_count",
];

pub const TICK_SUMMARY_HEADERS: [&str; 12] = [
    "tick",
    "elapsed_secs",
    "active_agents",
    "mean_risk",
    "max_risk",
    "risk_events",
    "replans",
    "stalls",
    "arrivals",
    "warnings",
    "pairs_evaluated",
    "pairs_pruned",
];

pub const RISK_EVENT_HEADERS: [&str; 4] = ["tick", "agent_a", "agent_b", "score"];

/// Writes simulation output to three CSV files.
pub struct CsvWriter {
    states:    Writer<File>,
    summaries: Writer<File>,
    events:    Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Open (or create) the three CSV files in `dir` and write the header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut states = Writer::from_path(dir.join("agent_states.csv"))?;
        states.write_record(AGENT_STATE_HEADERS)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(TICK_SUMMARY_HEADERS)?;

        let mut events = Writer::from_path(dir.join("risk_events.csv"))?;
        events.write_record(RISK_EVENT_HEADERS)?;

        Ok(Self { states, summaries, events, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_agent_states(&mut self, rows: &[AgentStateRow]) -> OutputResult<()> {
        for row in rows {
            self.states.write_record(&[
                row.tick.to_string(),
                row.agent_id.to_string(),
                row.x.to_string(),
                row.y.to_string(),
                row.z.to_string(),
                row.status.to_owned(),
                row.replan_attempts.to_string(),
                row.cooldown.to_string(),
                row.max_risk.to_string(),
                row.distance_travelled.to_string(),
                row.completion_pct.to_string(),
                row.reroute_count.to_string(),
                row.stall_count.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.elapsed_secs.to_string(),
            row.active_agents.to_string(),
            row.mean_risk.to_string(),
            row.max_risk.to_string(),
            row.risk_events.to_string(),
            row.replans.to_string(),
            row.stalls.to_string(),
            row.arrivals.to_string(),
            row.warnings.to_string(),
            row.pairs_evaluated.to_string(),
            row.pairs_pruned.to_string(),
        ])?;
        Ok(())
    }

    fn write_risk_events(&mut self, rows: &[RiskEventRow]) -> OutputResult<()> {
        for row in rows {
            self.events.write_record(&[
                row.tick.to_string(),
                row.agent_a.to_string(),
                row.agent_b.to_string(),
                row.score.to_string(),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.states.flush()?;
        self.summaries.flush()?;
        self.events.flush()?;
        Ok(())
    }
}
