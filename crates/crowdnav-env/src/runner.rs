//! Synchronous episode collection.
//!
//! [`run_episode`] is the collect-side of the training loop: it resets the
//! world, queries the policy once per tick, and accumulates return until the
//! episode terminates. Learner internals (replay buffers, gradient steps)
//! live on the other side of the [`Policy`] trait.

use std::io::Write;

use crowdnav_core::Policy;
use crowdnav_obs::{TraceError, TraceWriter};

use crate::world::{CrowdWorld, StepError, Termination};

/// Accounting for one completed episode.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeSummary {
    /// Undiscounted sum of per-step rewards.
    pub episode_return: f64,
    /// Number of steps taken.
    pub length: u32,
    /// How the episode ended.
    pub termination: Termination,
    /// Closest surface-to-surface approach to any pedestrian over the
    /// whole episode.
    pub min_separation: f64,
}

/// Run one episode to termination.
///
/// Resets `world` with `seed`, then alternates `policy.predict` and
/// [`CrowdWorld::step_sync`] until a [`Termination`] event arrives.
///
/// # Errors
///
/// Propagates any [`StepError`] from the world. A policy that emits only
/// finite actions of the configured kinematics never triggers one.
pub fn run_episode(
    world: &mut CrowdWorld,
    policy: &mut dyn Policy,
    seed: u64,
) -> Result<EpisodeSummary, StepError> {
    let mut state = world.reset(seed)?;
    let mut episode_return = 0.0;
    let mut length = 0u32;
    let mut min_separation = f64::INFINITY;
    loop {
        let action = policy.predict(&state);
        let outcome = world.step_sync(action)?;
        episode_return += outcome.reward;
        length += 1;
        min_separation = min_separation.min(outcome.metrics.min_separation);
        match outcome.event {
            Some(termination) => {
                return Ok(EpisodeSummary {
                    episode_return,
                    length,
                    termination,
                    min_separation,
                });
            }
            None => state = outcome.state,
        }
    }
}

/// Error from a traced episode run: a world failure or a trace-sink failure.
#[derive(Debug)]
pub enum RunError {
    /// The world rejected a step.
    Step(StepError),
    /// The trace sink failed.
    Trace(TraceError),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Step(e) => write!(f, "step failed: {e}"),
            Self::Trace(e) => write!(f, "trace failed: {e}"),
        }
    }
}

impl std::error::Error for RunError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Step(e) => Some(e),
            Self::Trace(e) => Some(e),
        }
    }
}

impl From<StepError> for RunError {
    fn from(e: StepError) -> Self {
        Self::Step(e)
    }
}

impl From<TraceError> for RunError {
    fn from(e: TraceError) -> Self {
        Self::Trace(e)
    }
}

/// Run one episode to termination, logging every snapshot to a trace.
///
/// Writes the initial state at tick 0 and one frame per step, so the trace
/// replays the full episode including the reset.
///
/// # Errors
///
/// Returns [`RunError`] if the world rejects a step or the trace sink
/// fails. The trace is flushed before returning.
pub fn run_episode_traced<W: Write>(
    world: &mut CrowdWorld,
    policy: &mut dyn Policy,
    seed: u64,
    trace: &mut TraceWriter<W>,
) -> Result<EpisodeSummary, RunError> {
    let mut state = world.reset(seed)?;
    trace.write_frame(world.current_tick(), &state)?;
    let mut episode_return = 0.0;
    let mut length = 0u32;
    let mut min_separation = f64::INFINITY;
    loop {
        let action = policy.predict(&state);
        let outcome = world.step_sync(action)?;
        trace.write_frame(world.current_tick(), &outcome.state)?;
        episode_return += outcome.reward;
        length += 1;
        min_separation = min_separation.min(outcome.metrics.min_separation);
        if let Some(termination) = outcome.event {
            trace.flush()?;
            return Ok(EpisodeSummary {
                episode_return,
                length,
                termination,
                min_separation,
            });
        }
        state = outcome.state;
    }
}
