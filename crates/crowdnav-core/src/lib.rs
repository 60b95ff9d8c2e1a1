//! Core types and traits for the Crowdnav simulation workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the per-agent state records ([`ObservableState`], [`ObstacleState`],
//! [`FullState`]), the per-tick aggregate handed to policies
//! ([`JointState`]), the [`Action`] type, the policy/encoding traits,
//! and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod action;
pub mod error;
pub mod id;
pub mod state;
pub mod text;
pub mod traits;

pub use action::Action;
pub use error::{ParseError, StateError};
pub use id::{AgentId, TickId};
pub use state::{FullState, Heading, JointState, ObservableState, ObstacleState, Vertex};
pub use traits::{FeatureEncode, Policy};
