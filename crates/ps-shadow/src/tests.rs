//! Unit tests for ps-shadow.

#[cfg(test)]
mod helpers {
    use ps_agent::Agent;
    use ps_core::{AgentId, Vec3};

    pub const EPS: f64 = 0.1;

    pub fn agent(id: u32, start: [f64; 3], goal: [f64; 3]) -> Agent {
        Agent::new(AgentId(id), Vec3::from(start), Vec3::from(goal), EPS)
    }

    pub fn assert_close(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "{a} != {b} (tol {tol})");
    }
}

#[cfg(test)]
mod generate {
    use ps_core::{SimConfig, Vec3};

    use super::helpers::{agent, assert_close};
    use crate::{ShadowGenerator, generate};

    #[test]
    fn one_step_per_horizon_index() {
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let s = generate(&a, 20, 0.3, 0.08).unwrap();
        assert_eq!(s.len(), 21);
        for (k, step) in s.steps.iter().enumerate() {
            assert_eq!(step.step as usize, k);
        }
    }

    #[test]
    fn step_zero_is_current_position_with_floor() {
        let cfg = SimConfig::default();
        let g = ShadowGenerator::from_config(&cfg).unwrap();
        let a = agent(0, [1.0, 2.0, 3.0], [10.0, 2.0, 3.0]);
        let s = g.generate(&a);
        assert_eq!(s.steps[0].mean, Vec3::new(1.0, 2.0, 3.0));
        assert_close(s.steps[0].covariance.trace(), 3.0 * cfg.covariance_floor, 1e-15);
    }

    #[test]
    fn means_follow_path_at_nominal_speed() {
        let cfg = SimConfig::default();
        let g = ShadowGenerator::from_config(&cfg).unwrap();
        let a = agent(0, [0.0, 0.0, 0.0], [100.0, 0.0, 0.0]);
        let s = g.generate(&a);
        let d = cfg.step_distance();
        for step in &s.steps {
            assert_close(step.mean.x, d * step.step as f64, 1e-9);
            assert_close(step.mean.y, 0.0, 1e-12);
        }
    }

    #[test]
    fn means_clamp_at_goal() {
        let a = agent(0, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        let s = generate(&a, 20, 0.3, 0.08).unwrap();
        let last = s.steps.last().unwrap();
        assert_eq!(last.mean, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn isotropic_variance_grows_linearly() {
        let cfg = SimConfig::default();
        let g = ShadowGenerator::from_config(&cfg).unwrap();
        let a = agent(0, [0.0, 0.0, 0.0], [100.0, 0.0, 0.0]);
        let s = g.generate(&a);
        for step in s.steps.iter().skip(1) {
            let v = cfg.base_variance + cfg.uncertainty_growth_rate * step.step as f64;
            assert_close(step.covariance[(0, 0)], v, 1e-12);
            assert_close(step.covariance[(0, 1)], 0.0, 1e-15);
        }
    }

    #[test]
    fn trace_is_monotone() {
        let a = agent(0, [0.0, 0.0, 0.0], [3.0, 4.0, 0.0]);
        let s = generate(&a, 40, 0.3, 0.5).unwrap();
        assert_eq!(s.first_shrinking_step(), None);
        let traces: Vec<f64> = s.traces().collect();
        assert!(traces.windows(2).all(|w| w[1] >= w[0]));
    }

    #[test]
    fn zero_growth_keeps_trace_flat_after_step_one() {
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        let s = generate(&a, 10, 0.3, 0.0).unwrap();
        let traces: Vec<f64> = s.traces().skip(1).collect();
        assert!(traces.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(s.first_shrinking_step(), None);
    }

    #[test]
    fn extent_covers_travel_and_spread() {
        let a = agent(0, [0.0, 0.0, 0.0], [100.0, 0.0, 0.0]);
        let s = generate(&a, 10, 1.0, 0.1).unwrap();
        let last = s.steps.last().unwrap();
        assert!(s.extent() >= last.mean.norm());
        assert!(s.extent() >= 3.0 * last.covariance.trace().sqrt());
    }
}

#[cfg(test)]
mod degenerate {
    use ps_agent::AgentStatus;
    use ps_core::{SimConfig, Vec3};

    use super::helpers::agent;
    use crate::ShadowGenerator;

    #[test]
    fn stalled_agent_is_static_with_floor() {
        let cfg = SimConfig::default();
        let g = ShadowGenerator::from_config(&cfg).unwrap();
        let mut a = agent(3, [5.0, 5.0, 0.0], [10.0, 5.0, 0.0]);
        a.status = AgentStatus::Stalled;
        let s = g.generate(&a);
        assert!(s.degenerate);
        assert_eq!(s.len(), cfg.prediction_steps as usize + 1);
        for step in &s.steps {
            assert_eq!(step.mean, Vec3::new(5.0, 5.0, 0.0));
            assert_eq!(step.covariance[(2, 2)], cfg.covariance_floor);
        }
    }

    #[test]
    fn arrived_agent_is_degenerate() {
        let g = ShadowGenerator::from_config(&SimConfig::default()).unwrap();
        let a = agent(0, [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]);
        assert_eq!(a.status, AgentStatus::Arrived);
        let s = g.generate(&a);
        assert!(s.degenerate);
        assert!((s.extent() - 3.0 * (3.0 * g.floor()).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn empty_path_is_degenerate() {
        let g = ShadowGenerator::from_config(&SimConfig::default()).unwrap();
        let s = g.generate_along(ps_core::AgentId(1), Vec3::zeros(), &[], true);
        assert!(s.degenerate);
    }
}

#[cfg(test)]
mod along_track {
    use ps_core::{GrowthModel, SimConfig};

    use super::helpers::{agent, assert_close};
    use crate::ShadowGenerator;

    fn generator(ratio: f64) -> ShadowGenerator {
        let cfg = SimConfig {
            growth_model: GrowthModel::AlongTrack { ratio },
            ..SimConfig::default()
        };
        ShadowGenerator::from_config(&cfg).unwrap()
    }

    #[test]
    fn stretches_along_heading() {
        let g = generator(4.0);
        let a = agent(0, [0.0, 0.0, 0.0], [100.0, 0.0, 0.0]);
        let s = g.generate(&a);
        let c = s.steps[5].covariance;
        assert!(c[(0, 0)] > c[(1, 1)]);
        assert_close(c[(1, 1)], c[(2, 2)], 1e-12);
    }

    #[test]
    fn ratio_one_matches_isotropic() {
        let iso = ShadowGenerator::from_config(&SimConfig::default()).unwrap();
        let a = agent(0, [0.0, 0.0, 0.0], [3.0, 4.0, 0.0]);
        assert_eq!(generator(1.0).generate(&a).steps, iso.generate(&a).steps);
    }

    #[test]
    fn stays_monotone_after_reaching_goal() {
        let g = generator(3.0);
        let a = agent(0, [0.0, 0.0, 0.0], [2.0, 1.0, 0.0]);
        let s = g.generate(&a);
        assert_eq!(s.first_shrinking_step(), None);
    }
}

#[cfg(test)]
mod config {
    use ps_core::SimConfig;

    use super::helpers::agent;
    use crate::{ShadowError, ShadowGenerator, generate};

    #[test]
    fn negative_growth_rejected() {
        let a = agent(0, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        assert!(matches!(generate(&a, 10, 0.3, -0.1), Err(ShadowError::Config(_))));
    }

    #[test]
    fn zero_horizon_rejected() {
        assert!(matches!(ShadowGenerator::new(0, 0.3, 0.1), Err(ShadowError::Config(_))));
    }

    #[test]
    fn non_positive_step_duration_rejected() {
        assert!(ShadowGenerator::new(10, 0.0, 0.1).is_err());
        assert!(ShadowGenerator::new(10, f64::NAN, 0.1).is_err());
    }

    #[test]
    fn invalid_sim_config_surfaces_core_error() {
        let cfg = SimConfig { safe_distance: -1.0, ..SimConfig::default() };
        assert!(matches!(ShadowGenerator::from_config(&cfg), Err(ShadowError::Core(_))));
    }
}
