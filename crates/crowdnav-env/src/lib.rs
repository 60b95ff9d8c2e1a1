//! Crowd-navigation simulation world for Crowdnav training.
//!
//! Provides the lockstep [`CrowdWorld`] that places a robot and a seeded
//! crowd of pedestrians, integrates their kinematics one timestep per
//! [`step_sync()`](CrowdWorld::step_sync) call, detects collisions and goal
//! arrival, and emits shaped rewards plus fresh
//! [`JointState`](crowdnav_core::JointState) snapshots. [`run_episode`]
//! drives a [`Policy`](crowdnav_core::Policy) through a full episode.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod metrics;
pub mod reward;
pub mod runner;
mod scenario;
pub mod world;

pub use config::{
    ConfigError, EnvConfig, HumanConfig, Kinematics, ObstacleSpec, RewardConfig, RobotConfig,
    Scenario,
};
pub use metrics::StepMetrics;
pub use reward::RewardTerms;
pub use runner::{run_episode, run_episode_traced, EpisodeSummary, RunError};
pub use world::{CrowdWorld, StepError, StepOutcome, Termination};
