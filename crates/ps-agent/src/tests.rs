//! Unit tests for ps-agent.

#[cfg(test)]
mod helpers {
    use ps_core::{AgentId, Vec3};

    use crate::Agent;

    pub const EPS: f64 = 0.1;

    pub fn agent(id: u32, start: [f64; 3], goal: [f64; 3]) -> Agent {
        Agent::new(AgentId(id), Vec3::from(start), Vec3::from(goal), EPS)
    }
}

#[cfg(test)]
mod status {
    use crate::AgentStatus::*;

    #[test]
    fn table_allows_documented_edges() {
        assert!(EnRoute.can_transition_to(Replanning));
        assert!(Replanning.can_transition_to(EnRoute));
        assert!(Replanning.can_transition_to(Stalled));
        assert!(Stalled.can_transition_to(EnRoute));
        assert!(EnRoute.can_transition_to(Arrived));
    }

    #[test]
    fn arrived_is_terminal() {
        for next in [EnRoute, Replanning, Stalled] {
            assert!(!Arrived.can_transition_to(next), "Arrived -> {next}");
        }
    }

    #[test]
    fn stall_requires_replanning_first() {
        assert!(!EnRoute.can_transition_to(Stalled));
        assert!(!Stalled.can_transition_to(Replanning));
    }

    #[test]
    fn moving_and_active() {
        assert!(EnRoute.is_moving());
        assert!(Replanning.is_moving());
        assert!(!Stalled.is_moving());
        assert!(Stalled.is_active());
        assert!(!Arrived.is_active());
    }
}

#[cfg(test)]
mod agent {
    use ps_core::Vec3;

    use super::helpers::{EPS, agent};
    use crate::AgentStatus;

    #[test]
    fn start_equals_goal_is_arrived() {
        let a = agent(0, [1.0, 1.0, 1.0], [1.0, 1.0, 1.0]);
        assert_eq!(a.status, AgentStatus::Arrived);
        assert!(a.path.is_empty());
        assert_eq!(a.completion_pct(), 100.0);
    }

    #[test]
    fn new_agent_heads_for_goal() {
        let a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        assert_eq!(a.status, AgentStatus::EnRoute);
        assert_eq!(a.path, vec![Vec3::new(10.0, 0.0, 0.0)]);
        assert!((a.remaining_distance() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn advance_moves_and_accumulates_distance() {
        let mut a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        assert!(!a.advance(2.0, EPS).unwrap());
        assert!((a.position - Vec3::new(2.0, 0.0, 0.0)).norm() < 1e-12);
        assert!((a.distance_travelled - 2.0).abs() < 1e-12);
        assert!((a.completion_pct() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn advance_drops_reached_waypoints() {
        let mut a = agent(0, [0.0, 0.0, 0.0], [4.0, 4.0, 0.0]);
        a.commit_path(vec![Vec3::new(4.0, 0.0, 0.0), Vec3::new(4.0, 4.0, 0.0)]);
        a.advance(5.0, EPS).unwrap();
        assert_eq!(a.path, vec![Vec3::new(4.0, 4.0, 0.0)]);
        assert!((a.position - Vec3::new(4.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn advance_to_goal_arrives() {
        let mut a = agent(0, [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]);
        assert!(a.advance(5.0, EPS).unwrap());
        assert_eq!(a.status, AgentStatus::Arrived);
        assert_eq!(a.position, a.goal);
        assert!(a.path.is_empty());
    }

    #[test]
    fn stalled_agent_holds_position() {
        let mut a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        a.transition(AgentStatus::Replanning).unwrap();
        a.transition(AgentStatus::Stalled).unwrap();
        assert!(!a.advance(2.0, EPS).unwrap());
        assert_eq!(a.position, Vec3::zeros());
    }

    #[test]
    fn illegal_transition_is_invariant_error() {
        let mut a = agent(0, [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]);
        let err = a.transition(AgentStatus::EnRoute).unwrap_err();
        assert!(matches!(err, ps_core::CoreError::Invariant(_)));
        assert_eq!(a.status, AgentStatus::Arrived);
    }

    #[test]
    fn commit_resets_attempts_and_counts_reroute() {
        let mut a = agent(0, [0.0, 0.0, 0.0], [10.0, 0.0, 0.0]);
        a.replan_attempts = 2;
        a.commit_path(vec![Vec3::new(5.0, 5.0, 0.0), a.goal]);
        assert_eq!(a.replan_attempts, 0);
        assert_eq!(a.reroute_count, 1);
    }
}

#[cfg(test)]
mod store {
    use ps_core::{AgentId, CoreError};

    use super::helpers::agent;
    use crate::AgentStore;

    #[test]
    fn duplicate_insert_rejected() {
        let mut s = AgentStore::new();
        s.insert(agent(1, [0.0; 3], [1.0, 0.0, 0.0])).unwrap();
        let err = s.insert(agent(1, [5.0; 3], [6.0, 0.0, 0.0])).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateAgent(AgentId(1))));
        assert_eq!(s.get(AgentId(1)).unwrap().start, ps_core::Vec3::zeros());
    }

    #[test]
    fn iteration_is_ascending() {
        let mut s = AgentStore::new();
        for id in [7, 2, 5] {
            s.insert(agent(id, [id as f64, 0.0, 0.0], [20.0, 0.0, 0.0])).unwrap();
        }
        let ids: Vec<_> = s.ids().collect();
        assert_eq!(ids, [AgentId(2), AgentId(5), AgentId(7)]);
    }

    #[test]
    fn remove_missing_errors() {
        let mut s = AgentStore::new();
        assert!(matches!(s.remove(AgentId(3)), Err(CoreError::AgentNotFound(_))));
    }

    #[test]
    fn all_arrived() {
        let mut s = AgentStore::new();
        assert!(s.all_arrived());
        s.insert(agent(0, [0.0; 3], [0.0; 3])).unwrap();
        assert!(s.all_arrived());
        s.insert(agent(1, [0.0; 3], [3.0, 0.0, 0.0])).unwrap();
        assert!(!s.all_arrived());
    }
}
