//! Test utilities and mock types for Crowdnav development.
//!
//! Provides scripted and goal-seeking [`Policy`] implementations for
//! driving worlds in tests, and state fixture builders for exercising
//! encoders and serializers without hand-writing records.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use crowdnav_core::{Action, JointState, Policy};

pub mod fixtures;

/// Plays back a fixed action sequence, then holds the last action.
///
/// Every observed state is recorded, so tests can assert on what the
/// policy was shown as well as on what the world did.
pub struct ScriptedPolicy {
    script: Vec<Action>,
    cursor: usize,
    seen: Vec<JointState>,
}

impl ScriptedPolicy {
    pub fn new(script: Vec<Action>) -> Self {
        Self {
            script,
            cursor: 0,
            seen: Vec::new(),
        }
    }

    /// Every state this policy has been shown, in order.
    pub fn seen(&self) -> &[JointState] {
        &self.seen
    }
}

impl Policy for ScriptedPolicy {
    fn name(&self) -> &str {
        "scripted"
    }

    fn predict(&mut self, state: &JointState) -> Action {
        self.seen.push(state.clone());
        let action = self
            .script
            .get(self.cursor)
            .or_else(|| self.script.last())
            .copied()
            .unwrap_or_else(Action::stop);
        self.cursor += 1;
        action
    }
}

/// Heads straight for the goal at the robot's preferred speed.
///
/// Ignores pedestrians and obstacles entirely, which makes it the
/// reference policy for goal-arrival and collision tests: its behavior
/// is a pure function of the self state.
#[derive(Default)]
pub struct GoalSeekPolicy;

impl GoalSeekPolicy {
    pub fn new() -> Self {
        GoalSeekPolicy
    }
}

impl Policy for GoalSeekPolicy {
    fn name(&self) -> &str {
        "goal_seek"
    }

    fn predict(&mut self, state: &JointState) -> Action {
        let robot = state.self_state();
        let (px, py) = robot.position();
        let (dx, dy) = (robot.gx() - px, robot.gy() - py);
        let dist = dx.hypot(dy);
        if dist < 1e-9 {
            Action::stop()
        } else {
            let v = robot.v_pref();
            Action::Holonomic {
                vx: dx / dist * v,
                vy: dy / dist * v,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::joint_state;

    #[test]
    fn scripted_policy_replays_then_holds() {
        let mut policy = ScriptedPolicy::new(vec![
            Action::Holonomic { vx: 1.0, vy: 0.0 },
            Action::Holonomic { vx: 0.0, vy: 1.0 },
        ]);
        let state = joint_state(1);
        assert_eq!(
            policy.predict(&state),
            Action::Holonomic { vx: 1.0, vy: 0.0 }
        );
        assert_eq!(
            policy.predict(&state),
            Action::Holonomic { vx: 0.0, vy: 1.0 }
        );
        // Past the end of the script: hold the last action.
        assert_eq!(
            policy.predict(&state),
            Action::Holonomic { vx: 0.0, vy: 1.0 }
        );
        assert_eq!(policy.seen().len(), 3);
    }

    #[test]
    fn empty_script_stops() {
        let mut policy = ScriptedPolicy::new(vec![]);
        assert_eq!(policy.predict(&joint_state(0)), Action::stop());
    }

    #[test]
    fn goal_seek_moves_toward_goal_at_v_pref() {
        let mut policy = GoalSeekPolicy::new();
        let state = joint_state(0);
        let action = policy.predict(&state);
        let robot = state.self_state();
        match action {
            Action::Holonomic { vx, vy } => {
                assert!((vx.hypot(vy) - robot.v_pref()).abs() < 1e-12);
                // Pointing at the goal.
                let (dx, dy) = (robot.gx() - robot.px(), robot.gy() - robot.py());
                assert!((vx * dy - vy * dx).abs() < 1e-9);
            }
            other => panic!("expected holonomic action, got {other:?}"),
        }
    }
}
