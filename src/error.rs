// src/error.rs

//! Error type shared by `StreamedText` and the parsers that drive it.
//!
//! Every variant signals a programmer error in the pipeline, never bad input:
//! raw serial bytes can at worst produce unrecognised escape sequences, which
//! are swallowed or passed through as text. Callers treat these as fatal.

/// Failure of a `StreamedText` operation whose preconditions did not hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamedTextError {
    /// A colour marker was placed outside the text or before an existing marker.
    #[error("invalid colour position {position} (text length {len}, last marker at {last:?})")]
    InvalidPosition {
        position: usize,
        len: usize,
        last: Option<usize>,
    },
    /// A shift, copy or removal asked for more characters than exist.
    #[error("requested {requested} chars but only {available} are available")]
    RangeExceeded { requested: usize, available: usize },
    /// The colour marker list was found unsorted after an operation.
    #[error("colour markers out of order at marker index {index}")]
    InvariantBroken { index: usize },
}

pub type Result<T, E = StreamedTextError> = std::result::Result<T, E>;
