//! Unit tests for ps-planner.

#[cfg(test)]
mod helpers {
    use ps_agent::Agent;
    use ps_core::{AgentId, Cov3, SimConfig, Vec3};
    use ps_risk::{RiskEstimator, RiskMap};
    use ps_shadow::{Shadow, ShadowGenerator, ShadowStep};

    pub fn agent(id: u32, start: [f64; 3], goal: [f64; 3]) -> Agent {
        Agent::new(AgentId(id), Vec3::from(start), Vec3::from(goal), SimConfig::default().arrival_epsilon)
    }

    pub fn shadows(cfg: &SimConfig, agents: &[&Agent]) -> Vec<Shadow> {
        ShadowGenerator::from_config(cfg).unwrap().generate_all(agents)
    }

    pub fn risk_map(cfg: &SimConfig, shadows: &[Shadow]) -> RiskMap {
        RiskEstimator::from_config(cfg).unwrap().build_risk_map(shadows).unwrap()
    }

    /// A shadow that never moves, with the same covariance at every step.
    pub fn static_shadow(id: u32, at: [f64; 3], var: f64, steps: u32) -> Shadow {
        Shadow {
            agent: AgentId(id),
            steps: (0..=steps)
                .map(|k| ShadowStep { step: k, mean: Vec3::from(at), covariance: Cov3::identity() * var })
                .collect(),
            degenerate: false,
        }
    }
}

#[cfg(test)]
mod trigger {
    use ps_agent::AgentStatus;
    use ps_core::{AgentId, SimConfig};

    use super::helpers::{agent, risk_map, shadows};
    use crate::needs_replan;

    fn coincident() -> (SimConfig, ps_agent::Agent, ps_agent::Agent, ps_risk::RiskMap) {
        let cfg = SimConfig::default();
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let b = agent(1, [0.0, 0.0, 0.0], [-10.0, 0.0, 0.0]);
        let map = risk_map(&cfg, &shadows(&cfg, &[&a, &b]));
        (cfg, a, b, map)
    }

    #[test]
    fn high_risk_triggers_en_route_agent() {
        let (cfg, a, _, map) = coincident();
        assert!(needs_replan(&a, &map, cfg.collision_threshold, |_| true));
    }

    #[test]
    fn arrived_partners_are_ignored() {
        let (cfg, a, _, map) = coincident();
        assert!(!needs_replan(&a, &map, cfg.collision_threshold, |o| o != AgentId(1)));
    }

    #[test]
    fn stalled_waits_for_cooldown() {
        let (cfg, mut a, _, map) = coincident();
        a.status = AgentStatus::Stalled;
        a.cooldown = 3;
        assert!(!needs_replan(&a, &map, cfg.collision_threshold, |_| true));
        a.cooldown = 0;
        assert!(needs_replan(&a, &map, cfg.collision_threshold, |_| true));
    }

    #[test]
    fn arrived_agent_never_replans() {
        let (cfg, mut a, _, map) = coincident();
        a.status = AgentStatus::Arrived;
        assert!(!needs_replan(&a, &map, cfg.collision_threshold, |_| true));
    }

    #[test]
    fn distant_agents_do_not_trigger() {
        let cfg = SimConfig::default();
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let b = agent(1, [0.0, 40.0, 0.0], [10.0, 40.0, 0.0]);
        let map = risk_map(&cfg, &shadows(&cfg, &[&a, &b]));
        assert!(!needs_replan(&a, &map, cfg.collision_threshold, |_| true));
    }
}

#[cfg(test)]
mod candidates {
    use ps_core::{Bounds, SimConfig, Vec3};

    use super::helpers::agent;
    use crate::{CandidateGenerator, DetourFan};

    #[test]
    fn fan_layout() {
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let paths = DetourFan::new(4.0).candidates(&a, 100);
        assert_eq!(paths.len(), 1 + 2 * 9 + 4);
        assert_eq!(paths[0], vec![a.goal]);
        for p in &paths {
            assert_eq!(*p.last().unwrap(), a.goal);
        }
        // First fan detour: hard right of the bearing at the inner radius.
        let right = paths[1][0];
        assert!((right - Vec3::new(0.0, -6.0, 0.0)).norm() < 1e-9);
        // Middle detour lies on the bearing.
        let ahead = paths[5][0];
        assert!((ahead - Vec3::new(6.0, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn vertical_detours_climb_and_descend() {
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let paths = DetourFan::new(4.0).candidates(&a, 100);
        let zs: Vec<f64> = paths[19..].iter().map(|p| p[0].z).collect();
        assert!(zs[0] > 0.0 && zs[1] < 0.0);
    }

    #[test]
    fn capped_at_limit() {
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        assert_eq!(DetourFan::new(4.0).candidates(&a, 5).len(), 5);
    }

    #[test]
    fn bounded_fan_stays_inside() {
        let cfg = SimConfig { bounds: Some(Bounds::cube(10.0)), ..SimConfig::default() };
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 10.0, 0.0]);
        let fan = DetourFan::from_config(&cfg);
        let paths = fan.candidates(&a, 100);
        assert_eq!(paths.len(), 1 + 2 * 9 + 4);
        let b = Bounds::cube(10.0);
        assert!(paths.iter().flatten().all(|w| b.contains(w)));
        // The descend detour from ground level is pinned to z = 0.
        assert_eq!(paths[20][0].z, 0.0);
    }

    #[test]
    fn detours_pinned_onto_the_agent_are_skipped() {
        let cfg = SimConfig { bounds: Some(Bounds::cube(10.0)), ..SimConfig::default() };
        // From the corner, the hard-right heading points straight out of the box.
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let paths = DetourFan::from_config(&cfg).candidates(&a, 100);
        assert_eq!(paths.len(), 1 + 2 * 9 + 4 - 2);
        assert!(paths.iter().all(|p| p[0] != a.position));
    }

    #[test]
    fn unbounded_fan_leaves_the_quadrant() {
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 10.0, 0.0]);
        let paths = DetourFan::new(4.0).candidates(&a, 100);
        assert!(paths.iter().flatten().any(|w| w.iter().any(|&c| c < 0.0)));
    }

    #[test]
    fn vertical_goal_uses_fallback_bearing() {
        let a = agent(0, [0.0, 0.0, 0.0], [0.0, 0.0, 10.0]);
        let paths = DetourFan::new(1.0).candidates(&a, 100);
        assert!(paths.iter().flatten().all(|w| w.iter().all(|c| c.is_finite())));
    }
}

#[cfg(test)]
mod replan {
    use ps_agent::Agent;
    use ps_core::{AgentId, AgentPair, Bounds, SimConfig, Vec3};
    use ps_risk::{Degeneracy, RiskMap};

    use super::helpers::{agent, risk_map, shadows, static_shadow};
    use crate::{CandidateGenerator, PathPlanner, ReplanFailure};

    #[test]
    fn crossing_finds_viable_detour() {
        let cfg = SimConfig::default();
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 10.0, 0.0]);
        let b = agent(1, [10.0, 0.0, 0.0], [0.0, 10.0, 0.0]);
        let snap = shadows(&cfg, &[&a, &b]);
        let map = risk_map(&cfg, &snap);
        assert!(map.get(a.id, b.id) > cfg.collision_threshold);

        let planner = PathPlanner::from_config(&cfg).unwrap();
        let c = planner.replan(&a, &[&snap[1]], &map).unwrap();
        assert!(c.risk <= cfg.collision_threshold);
        assert_ne!(c.index, 0);
        assert_eq!(*c.path.last().unwrap(), a.goal);
        assert!((c.cost - (c.length + cfg.risk_weight * c.risk)).abs() < 1e-12);
    }

    #[test]
    fn replan_is_deterministic() {
        let cfg = SimConfig::default();
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 10.0, 0.0]);
        let b = agent(1, [10.0, 0.0, 0.0], [0.0, 10.0, 0.0]);
        let snap = shadows(&cfg, &[&a, &b]);
        let map = risk_map(&cfg, &snap);
        let planner = PathPlanner::from_config(&cfg).unwrap();
        assert_eq!(
            planner.replan(&a, &[&snap[1]], &map).unwrap(),
            planner.replan(&a, &[&snap[1]], &map).unwrap()
        );
    }

    #[test]
    fn coincident_agents_cannot_improve() {
        let cfg = SimConfig::default();
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let b = agent(1, [0.0, 0.0, 0.0], [-10.0, 0.0, 0.0]);
        let snap = shadows(&cfg, &[&a, &b]);
        let map = risk_map(&cfg, &snap);
        let planner = PathPlanner::from_config(&cfg).unwrap();
        let err = planner.replan(&a, &[&snap[1]], &map).unwrap_err();
        assert!(matches!(err, ReplanFailure::NoImprovement { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn falls_back_to_improving_candidate() {
        let cfg = SimConfig { collision_threshold: 0.0, ..SimConfig::default() };
        let a = agent(0, [-6.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let obstacle = static_shadow(1, [0.0, 0.0, 0.0], 0.5, cfg.prediction_steps);
        let mut snap = shadows(&cfg, &[&a]);
        snap.push(obstacle);
        let map = risk_map(&cfg, &snap);
        let current = map.get(AgentId(0), AgentId(1));

        let planner = PathPlanner::from_config(&cfg).unwrap();
        let c = planner.replan(&a, &[&snap[1]], &map).unwrap();
        assert!(c.risk < current);
        assert_ne!(c.index, 0);
    }

    struct Fixed(Vec<Vec<Vec3>>);

    impl CandidateGenerator for Fixed {
        fn candidates(&self, _agent: &Agent, limit: usize) -> Vec<Vec<Vec3>> {
            self.0.iter().take(limit).cloned().collect()
        }
    }

    #[test]
    fn ties_go_to_generation_order() {
        let cfg = SimConfig::default();
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let detour = Vec3::new(5.0, 5.0, 0.0);
        let planner = PathPlanner::with_generator(
            &cfg,
            Fixed(vec![vec![detour, a.goal], vec![a.goal], vec![a.goal]]),
        )
        .unwrap();
        let c = planner.replan(&a, &[], &ps_risk::RiskMap::new()).unwrap();
        assert_eq!(c.index, 1);
        assert_eq!(c.risk, 0.0);
    }

    #[test]
    fn empty_generator_fails() {
        let cfg = SimConfig::default();
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let planner = PathPlanner::with_generator(&cfg, Fixed(Vec::new())).unwrap();
        assert!(matches!(
            planner.replan(&a, &[], &ps_risk::RiskMap::new()),
            Err(ReplanFailure::NoCandidates)
        ));
    }

    #[test]
    fn out_of_bounds_candidates_are_dropped() {
        let cfg = SimConfig { bounds: Some(Bounds::cube(10.0)), ..SimConfig::default() };
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let outside = Vec3::new(-5.0, 5.0, 0.0);
        let planner =
            PathPlanner::with_generator(&cfg, Fixed(vec![vec![outside, a.goal], vec![a.goal]])).unwrap();
        let c = planner.replan(&a, &[], &RiskMap::new()).unwrap();
        assert_eq!(c.index, 1);

        let planner = PathPlanner::with_generator(&cfg, Fixed(vec![vec![outside, a.goal]])).unwrap();
        assert!(matches!(planner.replan(&a, &[], &RiskMap::new()), Err(ReplanFailure::NoCandidates)));
    }

    #[test]
    fn scoring_degeneracies_are_reported() {
        let cfg = SimConfig::default();
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let broken = static_shadow(1, [30.0, 30.0, 0.0], f64::NAN, cfg.prediction_steps);
        let planner = PathPlanner::from_config(&cfg).unwrap();

        let decision = planner.decide(&a, &[&broken], &RiskMap::new());
        assert!(!decision.is_fatal());
        assert!(decision.outcome.is_ok());
        assert!(!decision.warnings.is_empty());
        let pair = AgentPair::new(AgentId(0), AgentId(1));
        assert!(decision.warnings.iter().all(|w| w.pair == pair && w.kind == Degeneracy::NonFinite));

        let chosen = decision.outcome.unwrap();
        assert!(!chosen.warnings.is_empty());
        assert!(chosen.warnings.len() <= decision.warnings.len());
    }
}
