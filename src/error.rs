use std::fmt::Display;
use std::io::Error as IoError;

#[derive(Debug, ::thiserror::Error)]
pub enum Error {
    #[error("Error::Io")]
    Io(#[source] IoError),

    #[error(
        "Error::TruncatedInput: offset - {}, wanted - {}, available - {}",
        offset,
        wanted,
        available
    )]
    TruncatedInput {
        offset: usize,
        wanted: usize,
        available: usize,
    },

    #[error("Error::BadVersion: version - {} (expected 131)", version)]
    BadVersion { version: u8 },

    #[error("Error::UnsupportedTag: tag - {} ({:?})", tag, char::from(*tag))]
    UnsupportedTag { tag: u8 },

    #[error("Error::UnexpectedTag: tag - {}, expected - {}", tag, expected)]
    UnexpectedTag { tag: u8, expected: &'static str },

    #[error("Error::InvalidText: {} at offset {}", what, offset)]
    InvalidText { what: &'static str, offset: usize },

    #[error("Error::ImproperListUnsupported: tail tag - {}", tail_tag)]
    ImproperListUnsupported { tail_tag: u8 },

    #[error("Error::LengthMismatch: expected - {}, actual - {}", expected, actual)]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Error::CompressionUnavailable")]
    CompressionUnavailable,

    #[error("Error::UnsupportedValue: {}", description)]
    UnsupportedValue { description: String },

    #[error("Error::Overflow: {} of length {} does not fit its length prefix", what, len)]
    Overflow { what: &'static str, len: usize },

    #[error("Error::DepthLimitExceeded: limit - {}", limit)]
    DepthLimitExceeded { limit: usize },
}

impl Error {
    pub(crate) fn unsupported_value<T: Display>(description: T) -> Self {
        Self::UnsupportedValue {
            description: description.to_string(),
        }
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

impl serde::ser::Error for Error {
    fn custom<T: Display>(msg: T) -> Self {
        Self::unsupported_value(msg)
    }
}
