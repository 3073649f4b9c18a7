// src/control/mod.rs

//! ASCII control character handling.
//!
//! `AsciiControlCharParser` marks every LF as a line break in its output
//! and, when asked, swaps control characters for visible glyphs so a user
//! can see exactly what arrived on the wire. Every swap is one char for one
//! char, so colour and new-line positions stay valid.

use crate::error::Result;
use crate::streamed_text::StreamedText;
use log::trace;
use std::collections::BTreeMap;

const CR: char = '\u{0d}';
const LF: char = '\u{0a}';

/// Visible stand-ins used when replacement is enabled.
const CR_SYMBOL: char = '\u{21b5}'; // ↵
const LF_SYMBOL: char = '\u{2424}'; // ␤

#[derive(Debug, Clone)]
pub struct AsciiControlCharParser {
    replace_with_visible_symbols: bool,
    replacements: BTreeMap<char, char>,
}

impl Default for AsciiControlCharParser {
    fn default() -> Self {
        Self::new()
    }
}

impl AsciiControlCharParser {
    /// Creates a parser with replacement disabled and the CR/LF glyphs
    /// registered.
    pub fn new() -> Self {
        AsciiControlCharParser {
            replace_with_visible_symbols: false,
            replacements: BTreeMap::from([(CR, CR_SYMBOL), (LF, LF_SYMBOL)]),
        }
    }

    pub fn replace_with_visible_symbols(&self) -> bool {
        self.replace_with_visible_symbols
    }

    pub fn set_replace_with_visible_symbols(&mut self, enabled: bool) {
        self.replace_with_visible_symbols = enabled;
    }

    /// Registers (or overrides) the glyph shown for `control`.
    pub fn add_replacement(&mut self, control: char, glyph: char) {
        self.replacements.insert(control, glyph);
    }

    pub fn replacement_for(&self, c: char) -> Option<char> {
        self.replacements.get(&c).copied()
    }

    /// Moves all of `input` into `output`, recording a new-line marker at
    /// each LF and substituting glyphs if enabled.
    pub fn parse(&self, input: &mut StreamedText, output: &mut StreamedText) -> Result<()> {
        let start = output.len();
        let count = input.len();
        output.shift_chars_in(input, count)?;
        trace!("scanning {} chars for control characters", count);

        for index in start..output.len() {
            let c = output.chars()[index];
            // Markers use the position before substitution; with 1:1 swaps
            // it is the same position after.
            if c == LF {
                output.add_new_line_marker(index);
            }
            if self.replace_with_visible_symbols {
                if let Some(glyph) = self.replacement_for(c) {
                    output.replace_char(index, glyph)?;
                }
            }
        }
        Ok(())
    }
}
