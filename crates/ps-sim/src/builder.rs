//! Fluent builder for constructing a [`Simulation`].

use ps_core::{AgentId, SimConfig, Vec3};
use ps_planner::{CandidateGenerator, DetourFan};

use crate::{SimResult, Simulation};

/// Fluent builder for [`Simulation<G>`].
///
/// The configuration is validated once in [`build`](Self::build); no
/// simulation is ever constructed from an invalid one.
///
/// # Optional inputs (have defaults)
///
/// | Method            | Default                                   |
/// |-------------------|-------------------------------------------|
/// | `.generator(g)`   | `DetourFan::from_config(&config)`         |
/// | `.agent(..)`      | no agents                                 |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(SimConfig::default())
///     .agent(AgentId(0), Vec3::new(0.0, 0.0, 0.0), Vec3::new(10.0, 10.0, 0.0))
///     .agent(AgentId(1), Vec3::new(10.0, 0.0, 0.0), Vec3::new(0.0, 10.0, 0.0))
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<G: CandidateGenerator = DetourFan> {
    config:    SimConfig,
    generator: G,
    agents:    Vec<(AgentId, Vec3, Vec3)>,
}

impl SimBuilder<DetourFan> {
    pub fn new(config: SimConfig) -> Self {
        let generator = DetourFan::from_config(&config);
        Self { config, generator, agents: Vec::new() }
    }
}

impl<G: CandidateGenerator> SimBuilder<G> {
    /// Replace the candidate generator.
    pub fn generator<H: CandidateGenerator>(self, generator: H) -> SimBuilder<H> {
        SimBuilder { config: self.config, generator, agents: self.agents }
    }

    /// Queue an agent for initialisation.  Errors surface from `build`.
    pub fn agent(mut self, id: AgentId, start: Vec3, goal: Vec3) -> Self {
        self.agents.push((id, start, goal));
        self
    }

    /// Validate the configuration, build every component and initialise the
    /// queued agents in the order they were added.
    pub fn build(self) -> SimResult<Simulation<G>> {
        self.config.validate()?;
        let mut sim = Simulation::with_generator(self.config, self.generator)?;
        for (id, start, goal) in self.agents {
            sim.initialize_agent(id, start, goal)?;
        }
        Ok(sim)
    }
}
