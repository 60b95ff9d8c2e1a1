//! Error types for state construction and trace-line parsing.
//!
//! Contract violations are surfaced eagerly at record construction so that
//! malformed state is caught at the simulation boundary rather than inside
//! a policy's forward pass. Parsing errors arise only at the serialization
//! boundary (reading logged state traces back in).

use std::error::Error;
use std::fmt;

/// A contract violation detected while constructing a state record.
///
/// None of these are recoverable locally: a violation indicates an upstream
/// simulation bug, and the caller must not proceed to a policy decision on
/// the invalid state.
#[derive(Clone, Debug, PartialEq)]
pub enum StateError {
    /// A field that must be strictly positive was zero or negative
    /// (`radius`, `v_pref`).
    NonPositive {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A field that must be non-negative was negative
    /// (`personal_space`, goal radius, obstacle radius).
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
    /// A field was NaN or infinite.
    NonFinite {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: f64,
    },
}

impl fmt::Display for StateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositive { field, value } => {
                write!(f, "{field} must be strictly positive, got {value}")
            }
            Self::Negative { field, value } => {
                write!(f, "{field} must be non-negative, got {value}")
            }
            Self::NonFinite { field, value } => {
                write!(f, "{field} must be finite, got {value}")
            }
        }
    }
}

impl Error for StateError {}

/// Errors decoding a state record from its textual trace form.
#[derive(Clone, Debug, PartialEq)]
pub enum ParseError {
    /// The line has a token count that matches no known field-set variant.
    WrongTokenCount {
        /// The token counts accepted for this record kind, e.g. `"6 or 8"`.
        expected: &'static str,
        /// The number of tokens found on the line.
        found: usize,
    },
    /// A token could not be parsed as a decimal float.
    InvalidFloat {
        /// Zero-based position of the bad token on the line.
        index: usize,
        /// The offending token text.
        token: String,
    },
    /// An obstacle vertex tail had an odd number of coordinates.
    OddVertexTail {
        /// The number of trailing coordinate tokens found.
        found: usize,
    },
    /// The tokens parsed but the resulting record violates a state contract.
    Contract(StateError),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongTokenCount { expected, found } => {
                write!(f, "expected {expected} tokens, found {found}")
            }
            Self::InvalidFloat { index, token } => {
                write!(f, "token {index} is not a float: '{token}'")
            }
            Self::OddVertexTail { found } => {
                write!(f, "vertex tail must be coordinate pairs, found {found} tokens")
            }
            Self::Contract(e) => write!(f, "contract violation: {e}"),
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Contract(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StateError> for ParseError {
    fn from(e: StateError) -> Self {
        Self::Contract(e)
    }
}
