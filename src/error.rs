use std::fmt;
use std::io;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    /// A shape-sensitive matrix operation received incompatible operands.
    /// Carries both shapes as (rows, cols).
    DimensionMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
    /// Division by a zero scalar or by an element that is exactly zero.
    DivisionByZero,
    /// An activation or loss name was not recognized during construction
    /// or while decoding a persisted model.
    UnknownFunctionName(String),
    /// The output activation cannot be combined with the configured loss
    /// (softmax is only valid together with cross-entropy).
    UnsupportedPairing {
        activation: &'static str,
        loss: &'static str,
    },
    /// An operation that needs at least one layer ran on an empty network.
    EmptyNetwork,
    /// A persisted model stream is malformed or truncated.
    CorruptStream(String),
    /// An underlying I/O failure while reading or writing a model stream.
    Io(io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::DimensionMismatch { left, right } => {
                write!(
                    f,
                    "Dimension mismatch: {}x{} is incompatible with {}x{}.",
                    left.0, left.1, right.0, right.1
                )
            }
            Error::DivisionByZero => write!(f, "Division by zero."),
            Error::UnknownFunctionName(name) => {
                write!(f, "Unknown function name '{name}'.")
            }
            Error::UnsupportedPairing { activation, loss } => {
                write!(
                    f,
                    "Output activation '{activation}' cannot be paired with loss '{loss}'."
                )
            }
            Error::EmptyNetwork => write!(f, "The network has no layers."),
            Error::CorruptStream(reason) => write!(f, "Corrupt model stream: {reason}."),
            Error::Io(err) => write!(f, "I/O error: {err}."),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
