//! `ps-output`: analytics sinks for the probability-shadow simulator.
//!
//! | Feature   | Backend | Files created                                                  |
//! |-----------|---------|----------------------------------------------------------------|
//! | *(none)*  | CSV     | `agent_states.csv`, `tick_summaries.csv`, `risk_events.csv`    |
//! | `sqlite`  | SQLite  | `output.db`                                                    |
//!
//! All backends implement [`OutputWriter`] and are driven by
//! [`SimOutputObserver`], which implements `ps_sim::SimObserver` and keeps a
//! serialisable [`RunSummary`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use ps_output::{CsvWriter, SimOutputObserver};
//!
//! let writer = CsvWriter::new(Path::new("./output"))?;
//! let mut obs = SimOutputObserver::new(writer, sim.config());
//! sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() { eprintln!("output error: {e}"); }
//! println!("{}", serde_json::to_string_pretty(obs.summary())?);
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod row;
pub mod summary;
pub mod writer;

#[cfg(feature = "sqlite")]
pub mod sqlite;


pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use row::{AgentStateRow, RiskEventRow, TickSummaryRow};
pub use summary::{AgentSummary, RunSummary};
pub use writer::OutputWriter;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
