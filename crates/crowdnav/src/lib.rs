//! Crowdnav: crowd-navigation simulation and state aggregation for
//! reinforcement learning.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Crowdnav sub-crates. For most users, adding `crowdnav` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use crowdnav::prelude::*;
//!
//! // A policy that drives straight at the goal.
//! struct GoalSeek;
//! impl Policy for GoalSeek {
//!     fn name(&self) -> &str { "goal_seek" }
//!     fn predict(&mut self, state: &JointState) -> Action {
//!         let robot = state.self_state();
//!         let (dx, dy) = (robot.gx() - robot.px(), robot.gy() - robot.py());
//!         let dist = dx.hypot(dy).max(1e-9);
//!         let v = robot.v_pref();
//!         Action::Holonomic { vx: dx / dist * v, vy: dy / dist * v }
//!     }
//! }
//!
//! // A small open scene: no pedestrians, one disc obstacle off the path.
//! let config = EnvConfig {
//!     human_num: 0,
//!     obstacles: vec![ObstacleSpec { px: 3.0, py: 0.0, radius: 0.5, ..Default::default() }],
//!     ..EnvConfig::default()
//! };
//! let mut world = CrowdWorld::new(config).unwrap();
//! let summary = run_episode(&mut world, &mut GoalSeek, 7).unwrap();
//! assert_eq!(summary.termination, Termination::ReachedGoal);
//!
//! // Encode the final state for network input.
//! let encoder = JointEncoder::compile(EncoderConfig {
//!     max_obstacles: 1,
//!     ..EncoderConfig::default()
//! }).unwrap();
//! let obs = encoder.encode(&world.snapshot().unwrap()).unwrap();
//! assert_eq!(obs.values().len(), encoder.layout().total_len());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the
//! prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `crowdnav-core` | State records, actions, IDs, core traits |
//! | [`obs`] | `crowdnav-obs` | Tensor encoding, feature layout, state traces |
//! | [`env`] | `crowdnav-env` | Simulation world, scenarios, rewards, runner |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// State records, actions, IDs, and core traits (`crowdnav-core`).
///
/// The four state records ([`types::ObservableState`], [`types::FullState`],
/// [`types::ObstacleState`], [`types::JointState`]), their serialization
/// contracts, and the [`types::Policy`] / [`types::FeatureEncode`] traits.
pub use crowdnav_core as types;

/// Observation encoding and state tracing (`crowdnav-obs`).
///
/// Compile an [`obs::EncoderConfig`] into a [`obs::JointEncoder`], extract
/// flat `f32` tensors with validity masks, and read/write text traces with
/// [`obs::TraceWriter`] / [`obs::TraceReader`].
pub use crowdnav_obs as obs;

/// Simulation world, scenarios, rewards, and the episode runner
/// (`crowdnav-env`).
///
/// [`env::CrowdWorld`] for lockstep stepping, [`env::run_episode`] for
/// synchronous episode collection.
pub use crowdnav_env as env;

/// Common imports for typical Crowdnav usage.
///
/// ```rust
/// use crowdnav::prelude::*;
/// ```
///
/// This imports the state records, the policy and encoding traits, the
/// world and its configuration, and the episode runner.
pub mod prelude {
    // State records and core traits
    pub use crowdnav_core::{
        Action, AgentId, FeatureEncode, FullState, Heading, JointState, ObservableState,
        ObstacleState, Policy, TickId,
    };

    // Errors
    pub use crowdnav_core::{ParseError, StateError};

    // Observation encoding
    pub use crowdnav_obs::{EncoderConfig, FeatureLayout, JointEncoder, Observation};

    // Environment
    pub use crowdnav_env::{
        run_episode, ConfigError, CrowdWorld, EnvConfig, EpisodeSummary, Kinematics, ObstacleSpec,
        RewardConfig, RobotConfig, Scenario, StepError, StepOutcome, Termination,
    };
}
