use crate::{AbsolutePos, Axis, Bound, Scalar};
use std::fmt;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors produced while building or decoding G-code
#[derive(Debug)]
pub enum Error {
    /// Drawing space coordinate is negative
    InvalidPosition { axis: Axis, value: Scalar },
    /// Hardware coordinate is outside of the workspace envelope
    OutOfBounds {
        axis: Axis,
        bound: Bound,
        value: Scalar,
        limit: Scalar,
    },
    /// Pen or continuous line state toggled out of turn
    DrawStateConflict { operation: &'static str },
    /// Continuous line primitive does not start at the current position
    ContinuityMismatch {
        operation: &'static str,
        start: AbsolutePos,
        current: AbsolutePos,
    },
    /// Argument of a G-code line is not a valid number
    ParseError {
        line: usize,
        token: String,
        reason: String,
    },
    /// Head size must be positive to fill shapes
    InvalidHeadSize(Scalar),
    /// Head size is too small for the filled shape
    TooManyPasses {
        operation: &'static str,
        passes: Scalar,
    },
    /// No workspace with this name is registered
    UnknownWorkspace(String),
    /// Shape producer failed
    Producer(Box<dyn std::error::Error + Send + Sync>),
    /// JSON error
    #[cfg(feature = "serde")]
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Error::*;
        match self {
            InvalidPosition { axis, value } => {
                write!(f, "absolute position must be positive, got {axis}={value}")
            }
            OutOfBounds {
                axis,
                bound: Bound::Min,
                value,
                limit,
            } => write!(f, "hardware position {axis}={value} is less than {limit}"),
            OutOfBounds {
                axis,
                bound: Bound::Max,
                value,
                limit,
            } => write!(f, "hardware position {axis}={value} is larger than {limit}"),
            DrawStateConflict { operation } => {
                write!(f, "cannot change drawing state: {operation}")
            }
            ContinuityMismatch {
                operation,
                start,
                current,
            } => write!(
                f,
                "{operation} inside continuous line starts at {start:?} but current position is {current:?}"
            ),
            ParseError {
                line,
                token,
                reason,
            } => write!(f, "line {line}: cannot parse `{token}`: {reason}"),
            InvalidHeadSize(size) => write!(f, "head size must be positive, got {size}"),
            TooManyPasses { operation, passes } => write!(
                f,
                "{operation} needs {passes} passes, at most {} are allowed",
                crate::MAX_FILL_PASSES
            ),
            UnknownWorkspace(name) => write!(f, "unknown workspace `{name}`"),
            Producer(error) => write!(f, "shape producer failed: {error}"),
            #[cfg(feature = "serde")]
            Json(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Producer(error) => Some(error.as_ref()),
            #[cfg(feature = "serde")]
            Error::Json(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error)
    }
}

impl From<Error> for std::io::Error {
    fn from(error: Error) -> Self {
        Self::new(std::io::ErrorKind::InvalidData, error)
    }
}
