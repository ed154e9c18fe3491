//! Simulation observer trait for progress reporting and data collection.

use ps_core::Tick;
use ps_risk::NumericWarning;

use crate::{SimState, TickRecord};

/// Callbacks invoked by [`Simulation::step`][crate::Simulation::step] and
/// [`Simulation::run`][crate::Simulation::run].
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: stall printer
///
/// ```rust,ignore
/// struct StallPrinter;
///
/// impl SimObserver for StallPrinter {
///     fn on_tick_end(&mut self, record: &TickRecord) {
///         for e in &record.stall_events {
///             println!("{}: {} stalled for {} ticks", record.tick, e.agent, e.cooldown);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before the snapshot is taken.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per repaired covariance degeneracy, before any agent is
    /// mutated.  Risk-map warnings come first, then those raised while
    /// scoring replan candidates, in ascending agent order.
    fn on_numeric_warning(&mut self, _tick: Tick, _warning: &NumericWarning) {}

    /// Called after the commit phase with the complete tick record.
    fn on_tick_end(&mut self, _record: &TickRecord) {}

    /// Called once when a run ends or the simulation is terminated.
    fn on_sim_end(&mut self, _final_tick: Tick, _state: &SimState) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
