//! Environment configuration, validation, and error types.
//!
//! [`EnvConfig`] is the builder-input for constructing a [`CrowdWorld`](crate::CrowdWorld).
//! [`validate()`](EnvConfig::validate) checks structural invariants at startup
//! so that a misconfigured world fails loudly before the first episode rather
//! than mid-training. Agent contracts (positive radii, positive preferred
//! speed) are checked by round-tripping through the validating state
//! constructors in `crowdnav-core`, so the two layers cannot drift apart.

use std::error::Error;
use std::fmt;

use crowdnav_core::{FullState, ObservableState, ObstacleState, StateError, Vertex};

// ── Kinematics ─────────────────────────────────────────────────────

/// Kinematic model of the robot, fixing which [`Action`](crowdnav_core::Action)
/// variant [`step_sync()`](crate::CrowdWorld::step_sync) accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kinematics {
    /// Direct velocity control; the robot state carries no heading.
    Holonomic,
    /// Forward-speed-plus-rotation control; the robot state carries a
    /// heading component.
    Unicycle,
}

// ── RobotConfig ────────────────────────────────────────────────────

/// Physical parameters of the robot.
#[derive(Clone, Debug)]
pub struct RobotConfig {
    /// Collision radius in metres. Default: 0.3.
    pub radius: f64,
    /// Personal-space margin beyond the collision radius. Default: 0.2.
    pub personal_space: f64,
    /// Preferred (maximum commanded) speed in m/s. Default: 1.0.
    pub v_pref: f64,
    /// Goal tolerance radius. `None` = the robot's own collision radius.
    pub goal_radius: Option<f64>,
    /// Kinematic model. Default: holonomic.
    pub kinematics: Kinematics,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            radius: 0.3,
            personal_space: 0.2,
            v_pref: 1.0,
            goal_radius: None,
            kinematics: Kinematics::Holonomic,
        }
    }
}

// ── HumanConfig ────────────────────────────────────────────────────

/// Physical parameters shared by every simulated pedestrian.
#[derive(Clone, Debug)]
pub struct HumanConfig {
    /// Collision radius in metres. Default: 0.3.
    pub radius: f64,
    /// Personal-space margin beyond the collision radius. Default: 0.2.
    pub personal_space: f64,
    /// Preferred walking speed in m/s. Default: 1.0.
    pub v_pref: f64,
}

impl Default for HumanConfig {
    fn default() -> Self {
        Self {
            radius: 0.3,
            personal_space: 0.2,
            v_pref: 1.0,
        }
    }
}

// ── Scenario ───────────────────────────────────────────────────────

/// Initial-placement rule for the robot and pedestrians.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Scenario {
    /// Agents start on a circle and cross to the antipodal point.
    CircleCrossing {
        /// Circle radius in metres.
        circle_radius: f64,
    },
    /// Pedestrians cross a square corridor side to side; the robot
    /// crosses bottom to top.
    SquareCrossing {
        /// Side length of the square in metres.
        square_width: f64,
    },
}

impl Default for Scenario {
    fn default() -> Self {
        Self::CircleCrossing { circle_radius: 4.0 }
    }
}

// ── ObstacleSpec ───────────────────────────────────────────────────

/// A static obstacle placed in the scene at reset.
///
/// An empty `vertices` list is a disc of the given `radius` centred at
/// `(px, py)`; a non-empty list is a polygon in world coordinates with
/// `radius` as an inflation margin.
#[derive(Clone, Debug, Default)]
pub struct ObstacleSpec {
    /// World x position of the obstacle reference point.
    pub px: f64,
    /// World y position of the obstacle reference point.
    pub py: f64,
    /// Obstacle orientation in radians.
    pub theta: f64,
    /// Disc radius, or polygon inflation margin.
    pub radius: f64,
    /// Polygon outline in world coordinates, in declared order.
    pub vertices: Vec<Vertex>,
}

// ── RewardConfig ───────────────────────────────────────────────────

/// Reward-shaping weights applied each step.
///
/// The per-step reward is the sum of a terminal term (success or
/// collision), a personal-space discomfort penalty, a goal-progress
/// potential term, and a constant slack term.
#[derive(Clone, Debug)]
pub struct RewardConfig {
    /// Terminal reward for reaching the goal. Default: 1.0.
    pub success_reward: f64,
    /// Terminal reward for a collision (negative). Default: -0.25.
    pub collision_penalty: f64,
    /// Separation below which the discomfort penalty activates. Default: 0.2.
    pub discomfort_dist: f64,
    /// Scale of the discomfort penalty per metre of intrusion per second.
    /// Default: 0.5.
    pub discomfort_penalty_factor: f64,
    /// Weight on the decrease in goal distance this step. Default: 1.0.
    pub potential_reward_weight: f64,
    /// Constant per-step reward (negative = time cost). Default: 0.0.
    pub slack_reward: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            success_reward: 1.0,
            collision_penalty: -0.25,
            discomfort_dist: 0.2,
            discomfort_penalty_factor: 0.5,
            potential_reward_weight: 1.0,
            slack_reward: 0.0,
        }
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected during [`EnvConfig::validate()`].
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// `time_step` is NaN, infinite, zero, or negative.
    InvalidTimeStep {
        /// The invalid value.
        value: f64,
    },
    /// `time_limit` is not finite, not positive, or shorter than one step.
    InvalidTimeLimit {
        /// The invalid value.
        value: f64,
    },
    /// Zero pedestrians and zero obstacles: nothing to navigate around.
    EmptyScene,
    /// Scenario geometry parameter out of range.
    InvalidScenario {
        /// Description of which parameter failed.
        reason: String,
    },
    /// An agent parameter violates the state contracts.
    InvalidAgent {
        /// Which agent spec failed (`"robot"` or `"human"`).
        agent: &'static str,
        /// The underlying contract violation.
        source: StateError,
    },
    /// An obstacle spec violates the state contracts.
    InvalidObstacle {
        /// Index into [`EnvConfig::obstacles`].
        index: usize,
        /// The underlying contract violation.
        source: StateError,
    },
    /// A reward weight is NaN or infinite.
    InvalidReward {
        /// Name of the offending field.
        field: &'static str,
        /// The non-finite value.
        value: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTimeStep { value } => {
                write!(f, "time_step must be finite and positive, got {value}")
            }
            Self::InvalidTimeLimit { value } => {
                write!(
                    f,
                    "time_limit must be finite and cover at least one step, got {value}"
                )
            }
            Self::EmptyScene => write!(f, "scene has no pedestrians and no obstacles"),
            Self::InvalidScenario { reason } => write!(f, "invalid scenario: {reason}"),
            Self::InvalidAgent { agent, source } => {
                write!(f, "invalid {agent} config: {source}")
            }
            Self::InvalidObstacle { index, source } => {
                write!(f, "invalid obstacle at index {index}: {source}")
            }
            Self::InvalidReward { field, value } => {
                write!(f, "reward weight {field} must be finite, got {value}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidAgent { source, .. } | Self::InvalidObstacle { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

// ── EnvConfig ──────────────────────────────────────────────────────

/// Complete configuration for constructing a [`CrowdWorld`](crate::CrowdWorld).
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// Simulation timestep in seconds. Default: 0.25.
    pub time_step: f64,
    /// Episode wall-clock limit in simulated seconds. Default: 25.0.
    pub time_limit: f64,
    /// Number of pedestrians placed at reset. Default: 5.
    pub human_num: usize,
    /// RNG seed for the initial episode. Default: 0.
    pub seed: u64,
    /// Initial-placement rule.
    pub scenario: Scenario,
    /// Robot parameters.
    pub robot: RobotConfig,
    /// Pedestrian parameters.
    pub human: HumanConfig,
    /// Static obstacles placed at every reset.
    pub obstacles: Vec<ObstacleSpec>,
    /// Reward-shaping weights.
    pub reward: RewardConfig,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            time_step: 0.25,
            time_limit: 25.0,
            human_num: 5,
            seed: 0,
            scenario: Scenario::default(),
            robot: RobotConfig::default(),
            human: HumanConfig::default(),
            obstacles: Vec::new(),
            reward: RewardConfig::default(),
        }
    }
}

impl EnvConfig {
    /// Validate all structural invariants.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered, in declaration order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 1. Timestep and episode limit.
        if !self.time_step.is_finite() || self.time_step <= 0.0 {
            return Err(ConfigError::InvalidTimeStep {
                value: self.time_step,
            });
        }
        if !self.time_limit.is_finite() || self.time_limit < self.time_step {
            return Err(ConfigError::InvalidTimeLimit {
                value: self.time_limit,
            });
        }
        // 2. Something must exist to navigate around.
        if self.human_num == 0 && self.obstacles.is_empty() {
            return Err(ConfigError::EmptyScene);
        }
        // 3. Scenario geometry.
        match self.scenario {
            Scenario::CircleCrossing { circle_radius } => {
                if !circle_radius.is_finite() || circle_radius <= 0.0 {
                    return Err(ConfigError::InvalidScenario {
                        reason: format!(
                            "circle_radius must be finite and positive, got {circle_radius}"
                        ),
                    });
                }
            }
            Scenario::SquareCrossing { square_width } => {
                if !square_width.is_finite() || square_width <= 0.0 {
                    return Err(ConfigError::InvalidScenario {
                        reason: format!(
                            "square_width must be finite and positive, got {square_width}"
                        ),
                    });
                }
            }
        }
        // 4. Agent contracts, checked through the core constructors so the
        //    rules cannot diverge from what the state records enforce.
        let r = &self.robot;
        let probe = FullState::new(
            0.0,
            0.0,
            0.0,
            0.0,
            r.radius,
            r.personal_space,
            0.0,
            0.0,
            r.v_pref,
        )
        .map_err(|source| ConfigError::InvalidAgent {
            agent: "robot",
            source,
        })?;
        if let Some(gr) = r.goal_radius {
            probe
                .with_goal_radius(gr)
                .map_err(|source| ConfigError::InvalidAgent {
                    agent: "robot",
                    source,
                })?;
        }
        let h = &self.human;
        ObservableState::new(0.0, 0.0, 0.0, 0.0, h.radius, h.personal_space).map_err(
            |source| ConfigError::InvalidAgent {
                agent: "human",
                source,
            },
        )?;
        if h.v_pref <= 0.0 || !h.v_pref.is_finite() {
            return Err(ConfigError::InvalidAgent {
                agent: "human",
                source: StateError::NonPositive {
                    field: "v_pref",
                    value: h.v_pref,
                },
            });
        }
        // 5. Obstacle contracts.
        for (index, spec) in self.obstacles.iter().enumerate() {
            ObstacleState::new(
                spec.px,
                spec.py,
                spec.theta,
                spec.radius,
                spec.vertices.iter().copied(),
            )
            .map_err(|source| ConfigError::InvalidObstacle { index, source })?;
        }
        // 6. Reward weights must be finite (sign is the caller's business).
        let w = &self.reward;
        for (field, value) in [
            ("success_reward", w.success_reward),
            ("collision_penalty", w.collision_penalty),
            ("discomfort_dist", w.discomfort_dist),
            ("discomfort_penalty_factor", w.discomfort_penalty_factor),
            ("potential_reward_weight", w.potential_reward_weight),
            ("slack_reward", w.slack_reward),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidReward { field, value });
            }
        }
        Ok(())
    }

    /// The robot's effective goal tolerance.
    pub(crate) fn goal_radius(&self) -> f64 {
        self.robot.goal_radius.unwrap_or(self.robot.radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EnvConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_time_step_fails() {
        let cfg = EnvConfig {
            time_step: 0.0,
            ..EnvConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::InvalidTimeStep { value }) => assert_eq!(value, 0.0),
            other => panic!("expected InvalidTimeStep, got {other:?}"),
        }
    }

    #[test]
    fn time_limit_shorter_than_one_step_fails() {
        let cfg = EnvConfig {
            time_step: 0.25,
            time_limit: 0.1,
            ..EnvConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidTimeLimit { .. })
        ));
    }

    #[test]
    fn empty_scene_fails() {
        let cfg = EnvConfig {
            human_num: 0,
            ..EnvConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::EmptyScene)));
    }

    #[test]
    fn zero_humans_with_obstacles_is_valid() {
        let cfg = EnvConfig {
            human_num: 0,
            obstacles: vec![ObstacleSpec {
                px: 1.0,
                py: 1.0,
                radius: 0.5,
                ..ObstacleSpec::default()
            }],
            ..EnvConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn negative_circle_radius_fails() {
        let cfg = EnvConfig {
            scenario: Scenario::CircleCrossing {
                circle_radius: -1.0,
            },
            ..EnvConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidScenario { .. })
        ));
    }

    #[test]
    fn zero_robot_radius_fails_through_state_contract() {
        let cfg = EnvConfig {
            robot: RobotConfig {
                radius: 0.0,
                ..RobotConfig::default()
            },
            ..EnvConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::InvalidAgent {
                agent: "robot",
                source: StateError::NonPositive { field, .. },
            }) => assert_eq!(field, "radius"),
            other => panic!("expected InvalidAgent(robot), got {other:?}"),
        }
    }

    #[test]
    fn negative_goal_radius_fails() {
        let cfg = EnvConfig {
            robot: RobotConfig {
                goal_radius: Some(-0.1),
                ..RobotConfig::default()
            },
            ..EnvConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidAgent { agent: "robot", .. })
        ));
    }

    #[test]
    fn nonpositive_human_v_pref_fails() {
        let cfg = EnvConfig {
            human: HumanConfig {
                v_pref: 0.0,
                ..HumanConfig::default()
            },
            ..EnvConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidAgent { agent: "human", .. })
        ));
    }

    #[test]
    fn non_finite_obstacle_vertex_fails() {
        let cfg = EnvConfig {
            obstacles: vec![ObstacleSpec {
                vertices: vec![[f64::NAN, 0.0]],
                ..ObstacleSpec::default()
            }],
            ..EnvConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidObstacle { index: 0, .. })
        ));
    }

    #[test]
    fn nan_reward_weight_fails() {
        let cfg = EnvConfig {
            reward: RewardConfig {
                slack_reward: f64::NAN,
                ..RewardConfig::default()
            },
            ..EnvConfig::default()
        };
        match cfg.validate() {
            Err(ConfigError::InvalidReward { field, .. }) => assert_eq!(field, "slack_reward"),
            other => panic!("expected InvalidReward, got {other:?}"),
        }
    }

    #[test]
    fn goal_radius_defaults_to_robot_radius() {
        let cfg = EnvConfig::default();
        assert_eq!(cfg.goal_radius(), cfg.robot.radius);
        let explicit = EnvConfig {
            robot: RobotConfig {
                goal_radius: Some(0.5),
                ..RobotConfig::default()
            },
            ..EnvConfig::default()
        };
        assert_eq!(explicit.goal_radius(), 0.5);
    }

    #[test]
    fn config_error_display_names_the_field() {
        let err = ConfigError::InvalidReward {
            field: "discomfort_dist",
            value: f64::INFINITY,
        };
        assert!(format!("{err}").contains("discomfort_dist"));
    }
}
