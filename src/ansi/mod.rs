// src/ansi/mod.rs

//! Handles ANSI SGR escape sequence parsing.
//!
//! `AnsiEscapeParser` moves text from an input `StreamedText` to an output
//! one, dropping every SGR sequence on the way and turning the recognised
//! colour codes into pending colours on the output. A sequence cut off by
//! the end of a chunk stays in the input until the next call decides it.

mod sgr;

pub use sgr::{SgrParams, SgrPattern};

use crate::error::Result;
use crate::streamed_text::{StreamPattern, StreamedText};
use log::{debug, trace, warn};

/// Incremental SGR parser. Holds no state of its own: withheld characters
/// stay in the caller's input buffer.
#[derive(Debug, Default)]
pub struct AnsiEscapeParser {
    pattern: SgrPattern,
}

impl AnsiEscapeParser {
    /// Creates a new `AnsiEscapeParser`.
    pub fn new() -> Self {
        AnsiEscapeParser::default()
    }

    /// Consumes as much of `input` as can be decided, appending the text to
    /// `output`.
    pub fn parse(&self, input: &mut StreamedText, output: &mut StreamedText) -> Result<()> {
        trace!("parsing {} chars", input.len());

        while let Some(found) = self.pattern.find(input.chars(), 0) {
            let params =
                SgrParams::from_sequence(&input.chars()[found.clone()]).unwrap_or_default();

            output.shift_chars_in(input, found.start)?;
            input.remove_chars(found.len())?;

            match params.colour() {
                Some(colour) => {
                    debug!("SGR {:?} selects colour {:?}", params.0, colour);
                    output.set_pending_colour(colour);
                }
                None => warn!("swallowing unsupported SGR {:?}", params.0),
            }
        }

        output.shift_chars_in_until_partial_match(input, &self.pattern)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
