//! Error types for the observation pipeline.

use std::error::Error;
use std::fmt;
use std::io;

use crowdnav_core::ParseError;

/// Errors from tensor encoding.
///
/// A state whose field set disagrees with the compiled layout indicates
/// an integration bug upstream, so `ShapeMismatch` fails the encode
/// rather than substituting default values.
#[derive(Clone, Debug, PartialEq)]
pub enum EncodeError {
    /// The encoder configuration is malformed.
    InvalidConfig {
        /// Description of the configuration issue.
        reason: String,
    },
    /// A state's field set disagrees with the compiled layout
    /// (heading or goal-radius presence).
    ShapeMismatch {
        /// Which record disagreed.
        record: &'static str,
        /// Description of the disagreement.
        reason: String,
    },
    /// More pedestrians or obstacles than the layout has slots for,
    /// with [`OverflowPolicy::Error`](crate::OverflowPolicy) in effect.
    SlotOverflow {
        /// Which collection overflowed (`"humans"`, `"obstacles"`, or
        /// `"vertices"` within one obstacle slot).
        collection: &'static str,
        /// Number of records supplied.
        supplied: usize,
        /// Number of slots in the layout.
        slots: usize,
    },
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => write!(f, "invalid encoder config: {reason}"),
            Self::ShapeMismatch { record, reason } => {
                write!(f, "shape mismatch in {record}: {reason}")
            }
            Self::SlotOverflow {
                collection,
                supplied,
                slots,
            } => {
                write!(f, "{supplied} {collection} exceed the {slots} layout slots")
            }
        }
    }
}

impl Error for EncodeError {}

/// Errors reading or writing a state trace.
#[derive(Debug)]
pub enum TraceError {
    /// An I/O error on the underlying sink or source.
    Io(io::Error),
    /// The stream does not start with the expected trace header.
    InvalidHeader {
        /// The first line actually found, if any.
        found: Option<String>,
    },
    /// A frame marker line is structurally malformed.
    MalformedFrame {
        /// One-based line number of the bad line.
        line: usize,
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// A state line failed to parse or re-validate.
    BadStateLine {
        /// One-based line number of the bad line.
        line: usize,
        /// The underlying parse failure.
        source: ParseError,
    },
}

impl fmt::Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidHeader { found } => match found {
                Some(line) => write!(f, "invalid trace header: '{line}'"),
                None => write!(f, "empty trace stream"),
            },
            Self::MalformedFrame { line, detail } => {
                write!(f, "malformed frame marker at line {line}: {detail}")
            }
            Self::BadStateLine { line, source } => {
                write!(f, "bad state line {line}: {source}")
            }
        }
    }
}

impl Error for TraceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::BadStateLine { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for TraceError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
