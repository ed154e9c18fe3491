//! The `Simulation` struct and its tick loop.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use ps_agent::{Agent, AgentStatus, AgentStore};
use ps_core::geom::is_finite;
use ps_core::{AgentId, SimClock, SimConfig, Tick, Vec3};
use ps_planner::{CandidateGenerator, DetourFan, PathPlanner, ReplanDecision, ReplanFailure, needs_replan};
use ps_risk::{NumericWarning, RiskEstimator, RiskMap};
use ps_shadow::{Shadow, ShadowGenerator};

use crate::{
    AgentState, ReplanEvent, RiskEvent, SimBuilder, SimError, SimObserver, SimResult, SimState,
    StallEvent, StopHandle, TickRecord,
};

// ── Run outcome ───────────────────────────────────────────────────────────────

/// Why [`Simulation::run`] returned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Every agent has arrived (or there are no agents).
    AllArrived,
    /// The clock reached `config.max_ticks`.
    MaxTicks,
    /// A [`StopHandle`] requested a stop.
    StopRequested,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RunOutcome {
    pub reason:     StopReason,
    /// Ticks processed by this call.
    pub ticks_run:  u64,
    /// The next tick to be processed.
    pub final_tick: Tick,
}

/// Output of the read-only phases 1–3.
struct Assessment {
    shadows: Vec<Shadow>,
    map:     RiskMap,
}

// ── Simulation ────────────────────────────────────────────────────────────────

/// The simulation context.
///
/// `Simulation<G>` owns every agent and drives the four-phase tick loop:
///
/// 1. **Snapshot**: a read-only view of all agents.
/// 2. **Shadows**: one uncertainty shadow per agent (parallel with the
///    `parallel` feature), then a trace-monotonicity check.
/// 3. **Risk map**: pairwise overlap risk over pruned pairs (parallel).
/// 4. **Commit**: replan candidates are searched from the snapshot (parallel),
///    then decisions, status transitions and position advances are applied
///    sequentially in ascending `AgentId` order.
///
/// A tick either completes or leaves the simulation exactly as it was
/// before it: phases 1–3 never mutate agents, and the commit phase works on
/// a copy of the agent store that replaces the live one only on success.
///
/// Create via [`SimBuilder`].
pub struct Simulation<G: CandidateGenerator = DetourFan> {
    config:       SimConfig,
    clock:        SimClock,
    agents:       AgentStore,
    shadows:      ShadowGenerator,
    risk:         RiskEstimator,
    planner:      PathPlanner<G>,
    stop:         StopHandle,
    terminated:   bool,
    end_reported: bool,
}

impl Simulation<DetourFan> {
    /// An empty simulation with the default candidate generator.
    pub fn new(config: SimConfig) -> SimResult<Self> {
        SimBuilder::new(config).build()
    }
}

impl<G: CandidateGenerator> Simulation<G> {
    pub(crate) fn with_generator(config: SimConfig, generator: G) -> SimResult<Self> {
        let shadows = ShadowGenerator::from_config(&config)?;
        let risk = RiskEstimator::from_config(&config)?;
        let planner = PathPlanner::with_generator(&config, generator)?;
        Ok(Self {
            clock: SimClock::new(config.step_duration()),
            config,
            agents: AgentStore::new(),
            shadows,
            risk,
            planner,
            stop: StopHandle::new(),
            terminated: false,
            end_reported: false,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// The next tick to be processed.
    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn agents(&self) -> &AgentStore {
        &self.agents
    }

    /// A handle that stops [`run`](Self::run) at the next tick boundary.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    // ── Commands ──────────────────────────────────────────────────────────

    /// Add an agent at `start` heading for `goal`.
    ///
    /// An agent whose start is within `arrival_epsilon` of its goal is
    /// `Arrived` immediately.
    pub fn initialize_agent(&mut self, id: AgentId, start: Vec3, goal: Vec3) -> SimResult<()> {
        self.ensure_live()?;
        if !is_finite(&start) {
            return Err(SimError::InvalidPosition { agent: id, what: "start" });
        }
        if !is_finite(&goal) {
            return Err(SimError::InvalidPosition { agent: id, what: "goal" });
        }
        if let Some(b) = self.config.bounds {
            if !b.contains(&start) {
                return Err(SimError::OutOfBounds { agent: id, what: "start" });
            }
            if !b.contains(&goal) {
                return Err(SimError::OutOfBounds { agent: id, what: "goal" });
            }
        }
        let agent = Agent::new(id, start, goal, self.config.arrival_epsilon);
        debug!(agent = %id, status = %agent.status, "agent initialised");
        self.agents.insert(agent)?;
        Ok(())
    }

    /// Remove an agent and return its final record.
    pub fn remove_agent(&mut self, id: AgentId) -> SimResult<Agent> {
        self.ensure_live()?;
        let agent = self.agents.remove(id)?;
        debug!(agent = %id, "agent removed");
        Ok(agent)
    }

    /// Owned read-only copy of every agent's state.
    pub fn get_state(&self) -> SimState {
        SimState {
            tick:   self.clock.current_tick,
            agents: self.agents.iter().map(AgentState::capture).collect(),
        }
    }

    /// Run phases 1–3 only and return the current risk map.
    ///
    /// Never mutates the simulation; two calls without an intervening
    /// `step` return identical maps.
    pub fn risk_map(&self) -> SimResult<RiskMap> {
        Ok(self.assess()?.map)
    }

    /// Process exactly one tick.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickRecord> {
        self.ensure_live()?;
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        // ── Phases 1–3: snapshot, shadows, risk map ───────────────────────
        let Assessment { shadows, map } = self.assess()?;
        for warning in map.warnings() {
            observer.on_numeric_warning(now, warning);
        }

        let arrived: BTreeSet<AgentId> = self
            .agents
            .iter()
            .filter(|a| a.status == AgentStatus::Arrived)
            .map(|a| a.id)
            .collect();

        // ── Phase 4a: candidate search from the snapshot ──────────────────
        let mut plans = self.plan(&shadows, &map, &arrived);
        if let Some(e) = take_fatal(&mut plans) {
            return Err(e);
        }
        let plan_warnings: Vec<NumericWarning> =
            plans.values().flat_map(|d| d.warnings.iter().copied()).collect();
        for warning in &plan_warnings {
            observer.on_numeric_warning(now, warning);
        }

        // ── Phase 4b: sequential commit on a copy of the store ────────────
        let mut record = TickRecord { tick: now, ..TickRecord::default() };
        let mut agents = self.agents.clone();
        self.commit(&mut agents, &map, &arrived, plans, &mut record)?;
        self.agents = agents;

        let threshold = self.config.collision_threshold;
        record.risk_events = map
            .above(threshold)
            .filter(|(pair, _)| !arrived.contains(&pair.lo()) && !arrived.contains(&pair.hi()))
            .map(|(pair, score)| RiskEvent { pair, score })
            .collect();
        record.warnings = map.warnings().iter().copied().chain(plan_warnings).collect();
        record.mean_risk = map.mean();
        record.max_risk = map.max();
        record.pairs_evaluated = map.evaluated();
        record.pairs_pruned = map.pruned();
        record.agent_states = self.agents.iter().map(AgentState::capture).collect();

        debug!(
            tick = now.0,
            max_risk = record.max_risk,
            risk_events = record.risk_events.len(),
            replans = record.replan_events.len(),
            stalls = record.stall_events.len(),
            arrivals = record.arrivals.len(),
            "tick complete"
        );

        self.clock.advance();
        self.end_reported = false;
        observer.on_tick_end(&record);
        Ok(record)
    }

    /// Step until every agent has arrived, `config.max_ticks` is reached, or
    /// a stop is requested.  The stop flag is checked between ticks only.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunOutcome> {
        self.ensure_live()?;
        let start = self.clock.current_tick;
        let reason = loop {
            if self.stop.is_stop_requested() {
                break StopReason::StopRequested;
            }
            if self.agents.all_arrived() {
                break StopReason::AllArrived;
            }
            if self.config.max_ticks.is_some_and(|max| self.clock.current_tick.since(start) >= max) {
                break StopReason::MaxTicks;
            }
            self.step(observer)?;
        };

        let final_tick = self.clock.current_tick;
        info!(?reason, ticks = final_tick.since(start), tick = final_tick.0, "run finished");
        self.report_end(observer);
        Ok(RunOutcome { reason, ticks_run: final_tick.since(start), final_tick })
    }

    /// Shut the simulation down and return its final state.
    ///
    /// Reports `on_sim_end` unless a run has already reported it since the
    /// last tick.  Every later command fails with [`SimError::Terminated`].
    pub fn terminate<O: SimObserver>(&mut self, observer: &mut O) -> SimState {
        if !self.terminated {
            if !self.end_reported {
                self.report_end(observer);
            }
            self.terminated = true;
            info!(tick = self.clock.current_tick.0, "simulation terminated");
        }
        self.get_state()
    }

    // ── Tick internals ────────────────────────────────────────────────────

    fn ensure_live(&self) -> SimResult<()> {
        if self.terminated { Err(SimError::Terminated) } else { Ok(()) }
    }

    fn report_end<O: SimObserver>(&mut self, observer: &mut O) {
        let state = self.get_state();
        observer.on_sim_end(self.clock.current_tick, &state);
        self.end_reported = true;
    }

    /// Phases 1–3.  Pure.
    fn assess(&self) -> SimResult<Assessment> {
        let snapshot: Vec<&Agent> = self.agents.iter().collect();
        let shadows = self.shadows.generate_all(&snapshot);
        check_shadows(&shadows)?;
        let map = self.risk.build_risk_map(&shadows)?;
        Ok(Assessment { shadows, map })
    }

    /// Phase 4a: one replan decision per agent that needs one, computed
    /// against the snapshot only.
    fn plan(
        &self,
        shadows: &[Shadow],
        map:     &RiskMap,
        arrived: &BTreeSet<AgentId>,
    ) -> BTreeMap<AgentId, ReplanDecision> {
        let threshold = self.config.collision_threshold;
        let active = |o: AgentId| !arrived.contains(&o);

        let work: Vec<(&Agent, Vec<&Shadow>)> = self
            .agents
            .iter()
            .filter(|a| needs_replan(a, map, threshold, active))
            .map(|a| {
                let obstacles = shadows.iter().filter(|s| s.agent != a.id && active(s.agent)).collect();
                (a, obstacles)
            })
            .collect();

        let planner = &self.planner;

        #[cfg(not(feature = "parallel"))]
        {
            work.iter().map(|(a, obs)| (a.id, planner.decide(a, obs, map))).collect()
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            let plans: Vec<(AgentId, ReplanDecision)> =
                work.par_iter().map(|(a, obs)| (a.id, planner.decide(a, obs, map))).collect();
            plans.into_iter().collect()
        }
    }

    /// Phase 4b: apply decisions, transitions and movement in ascending id.
    fn commit(
        &self,
        agents:    &mut AgentStore,
        map:       &RiskMap,
        arrived:   &BTreeSet<AgentId>,
        mut plans: BTreeMap<AgentId, ReplanDecision>,
        record:    &mut TickRecord,
    ) -> SimResult<()> {
        let threshold = self.config.collision_threshold;
        let max_attempts = self.config.max_replan_attempts;
        let pause = self.config.reroute_pause;
        let step_distance = self.config.step_distance();
        let epsilon = self.config.arrival_epsilon;
        let active = |o: AgentId| !arrived.contains(&o);

        let mut rerouted: BTreeSet<AgentId> = BTreeSet::new();
        let ids: Vec<AgentId> = agents.ids().collect();

        for id in ids {
            let agent = agents.get_mut(id).ok_or(SimError::AgentNotFound(id))?;
            let risk = map.max_for(id, active);
            agent.last_risk = risk;

            match agent.status {
                AgentStatus::Arrived => continue,
                AgentStatus::Stalled if agent.cooldown > 0 => {
                    agent.cooldown -= 1;
                    continue;
                }
                AgentStatus::Stalled => {
                    agent.transition(AgentStatus::EnRoute)?;
                    debug!(agent = %id, "cooldown elapsed");
                }
                AgentStatus::EnRoute | AgentStatus::Replanning => {}
            }

            let conflicts: Vec<AgentId> =
                map.conflicts_of(id, threshold).into_iter().filter(|&o| active(o)).collect();

            if conflicts.is_empty() {
                if agent.status == AgentStatus::Replanning {
                    agent.transition(AgentStatus::EnRoute)?;
                    agent.replan_attempts = 0;
                    debug!(agent = %id, risk, "risk cleared without reroute");
                }
            } else if conflicts.iter().all(|o| rerouted.contains(o)) {
                debug!(agent = %id, risk, "keeping course; conflicts already rerouted");
            } else {
                let decision = plans.remove(&id).ok_or_else(|| {
                    SimError::Invariant(format!("{id}: conflict without a replan decision"))
                })?;
                agent.transition(AgentStatus::Replanning)?;
                match decision.outcome {
                    Ok(candidate) => {
                        record.replan_events.push(ReplanEvent {
                            agent:       id,
                            risk_before: risk,
                            risk_after:  candidate.risk,
                            path_length: candidate.length,
                            cost:        candidate.cost,
                        });
                        agent.commit_path(candidate.path);
                        agent.transition(AgentStatus::EnRoute)?;
                        rerouted.insert(id);
                        debug!(agent = %id, risk_before = risk, risk_after = candidate.risk, "rerouted");
                    }
                    Err(ReplanFailure::Risk(e)) => return Err(e.into()),
                    Err(failure) => {
                        agent.replan_attempts += 1;
                        if agent.replan_attempts >= max_attempts {
                            agent.transition(AgentStatus::Stalled)?;
                            agent.cooldown = pause;
                            agent.replan_attempts = 0;
                            agent.stall_count += 1;
                            record.stall_events.push(StallEvent { agent: id, risk, cooldown: pause });
                            info!(agent = %id, risk, cooldown = pause, %failure, "stalled");
                        } else {
                            debug!(agent = %id, attempts = agent.replan_attempts, %failure, "replan attempt failed");
                        }
                    }
                }
            }

            if agent.advance(step_distance, epsilon)? {
                record.arrivals.push(id);
                info!(agent = %id, distance = agent.distance_travelled, "arrived");
            }
        }
        Ok(())
    }
}

/// Remove and return the first fatal decision's error, if any.
fn take_fatal(plans: &mut BTreeMap<AgentId, ReplanDecision>) -> Option<SimError> {
    let id = plans.iter().find(|(_, d)| d.is_fatal()).map(|(&id, _)| id)?;
    match plans.remove(&id)?.outcome {
        Err(ReplanFailure::Risk(e)) => {
            warn!(agent = %id, error = %e, "tick aborted before commit");
            Some(e.into())
        }
        Err(other) => Some(SimError::Invariant(format!("{id}: fatal replan failure {other}"))),
        Ok(_) => None,
    }
}

/// Reject any shadow whose covariance trace shrinks between steps.
pub(crate) fn check_shadows(shadows: &[Shadow]) -> SimResult<()> {
    for s in shadows {
        if let Some(step) = s.first_shrinking_step() {
            return Err(SimError::Invariant(format!(
                "{}: covariance trace shrinks at shadow step {step}",
                s.agent
            )));
        }
    }
    Ok(())
}
