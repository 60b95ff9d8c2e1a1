//! Strongly-typed identifiers.

use std::fmt;

/// Monotonically increasing decision-step counter.
///
/// Incremented each time the simulation advances one step. Tick 0 is the
/// state immediately after a reset, before any action has been applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifies a pedestrian within an episode.
///
/// Agent IDs are assigned sequentially at scenario generation and are the
/// index of the agent in [`JointState::human_states`](crate::JointState);
/// that ordering is stable for the lifetime of an episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(pub u32);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for AgentId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}
