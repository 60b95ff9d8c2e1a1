//! Per-step reward decomposition.
//!
//! The scalar reward handed to the learner is the sum of the terms in
//! [`RewardTerms`]. Keeping the decomposition visible in the step outcome
//! lets telemetry attribute return to shaping components without re-running
//! the episode.

use crate::config::RewardConfig;
use crate::world::Termination;

/// Additive components of one step's reward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RewardTerms {
    /// Goal-progress shaping: weight times the decrease in goal distance.
    pub potential: f64,
    /// Personal-space intrusion penalty (zero or negative).
    pub discomfort: f64,
    /// Constant per-step term from [`RewardConfig::slack_reward`].
    pub slack: f64,
    /// Terminal term: success reward, collision penalty, or zero.
    pub terminal: f64,
}

impl RewardTerms {
    /// The scalar reward: the sum of all components.
    pub fn total(&self) -> f64 {
        self.potential + self.discomfort + self.slack + self.terminal
    }

    /// Compute the terms for one completed step.
    ///
    /// `min_separation` is the surface-to-surface closest approach between
    /// the robot and any pedestrian during the step interval;
    /// `goal_progress` is the decrease in goal distance over the step.
    pub(crate) fn compute(
        config: &RewardConfig,
        event: Option<Termination>,
        min_separation: f64,
        goal_progress: f64,
        time_step: f64,
    ) -> Self {
        let terminal = match event {
            Some(Termination::ReachedGoal) => config.success_reward,
            Some(Termination::Collision) => config.collision_penalty,
            Some(Termination::Timeout) | None => 0.0,
        };
        // Intrusion penalty scales with depth and duration, matching the
        // shaping used by the crowd-navigation training setup.
        let discomfort = if event == Some(Termination::Collision) {
            // The collision penalty subsumes the intrusion term.
            0.0
        } else if min_separation < config.discomfort_dist {
            (min_separation - config.discomfort_dist) * config.discomfort_penalty_factor * time_step
        } else {
            0.0
        };
        RewardTerms {
            potential: config.potential_reward_weight * goal_progress,
            discomfort,
            slack: config.slack_reward,
            terminal,
        }
    }
}
