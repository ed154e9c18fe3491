//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use tracing::warn;

use ps_core::{SimClock, SimConfig, Tick};
use ps_sim::{SimObserver, SimState, TickRecord};

use crate::row::{AgentStateRow, RiskEventRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult, RunSummary};

/// A [`SimObserver`] that writes agent states, tick summaries and risk events
/// to any [`OutputWriter`] backend, and accumulates a [`RunSummary`].
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:         W,
    clock:          SimClock,
    state_interval: u64,
    summary:        RunSummary,
    last_error:     Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    /// Create an observer backed by `writer`, using `config` for simulated
    /// time conversion.  Agent states are written every tick.
    pub fn new(writer: W, config: &SimConfig) -> Self {
        Self {
            writer,
            clock:          SimClock::new(config.step_duration()),
            state_interval: 1,
            summary:        RunSummary::new(),
            last_error:     None,
        }
    }

    /// Write agent states only on ticks divisible by `every` (minimum 1).
    /// Tick summaries and risk events are always written.
    pub fn with_state_interval(mut self, every: u64) -> Self {
        self.state_interval = every.max(1);
        self
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    ///
    /// Returns `None` if all writes succeeded.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Unwrap the inner writer (e.g. to inspect files after the sim).
    pub fn into_writer(self) -> W {
        self.writer
    }

    pub fn into_parts(self) -> (W, RunSummary) {
        (self.writer, self.summary)
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                warn!(error = %e, "output write failed");
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, record: &TickRecord) {
        let tick = record.tick.0;
        self.summary.record_tick(record);

        let row = TickSummaryRow::new(record, self.clock.secs_at(record.tick));
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);

        if tick % self.state_interval == 0 && !record.agent_states.is_empty() {
            let rows: Vec<AgentStateRow> =
                record.agent_states.iter().map(|s| AgentStateRow::new(tick, s)).collect();
            let result = self.writer.write_agent_states(&rows);
            self.store_err(result);
        }

        if !record.risk_events.is_empty() {
            let rows: Vec<RiskEventRow> =
                record.risk_events.iter().map(|e| RiskEventRow::new(tick, e)).collect();
            let result = self.writer.write_risk_events(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, final_tick: Tick, state: &SimState) {
        self.summary.finish(final_tick, state);
        let result = self.writer.finish();
        self.store_err(result);
    }
}
