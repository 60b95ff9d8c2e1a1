//! Observation encoding and state tracing for Crowdnav simulations.
//!
//! Turns the variable-shape [`JointState`](crowdnav_core::JointState) into
//! the fixed-size flat `f32` tensor a network input adapter consumes
//! ([`JointEncoder`]), describes where each record landed in that tensor
//! ([`FeatureLayout`]), and reads/writes the one-line-per-state text trace
//! used for logging and offline inspection ([`TraceWriter`],
//! [`TraceReader`]).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod encoder;
pub mod error;
pub mod layout;
pub mod trace;

pub use encoder::{EncoderConfig, JointEncoder, Observation, OverflowPolicy};
pub use error::{EncodeError, TraceError};
pub use layout::{FeatureLayout, Span};
pub use trace::{TraceFrame, TraceReader, TraceWriter};
