// src/ansi/sgr.rs

//! Recognition of SGR (Select Graphic Rendition) escape sequences,
//! `ESC '[' [0-9;]* 'm'`, over a `char` slice.
//!
//! The matcher is a small state machine rather than a regex because the
//! parser needs one thing regex engines rarely expose: whether a slice that
//! failed to match ran out of input before it could fail.

use crate::color::{NamedColor, Rgb};
use crate::streamed_text::StreamPattern;
use std::ops::Range;

pub(super) const ESC: char = '\u{1b}';
const CSI_OPEN: char = '[';
const SGR_FINAL: char = 'm';
const PARAM_SEPARATOR: char = ';';

// Length of the `ESC [` introducer.
const INTRODUCER_LEN: usize = 2;
const SGR_BOLD: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Ground,
    /// Received ESC, expecting '['.
    Escape,
    /// Inside the parameter list, expecting digits, ';' or the final 'm'.
    Params,
}

/// Outcome of running the grammar from the start of a slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scan {
    /// A whole sequence of this many chars starts the slice.
    Complete(usize),
    /// The slice is a proper prefix of a sequence.
    Incomplete,
    Mismatch,
}

fn scan(text: &[char]) -> Scan {
    if text.is_empty() {
        return Scan::Mismatch;
    }
    let mut state = ScanState::Ground;
    for (i, &c) in text.iter().enumerate() {
        state = match (state, c) {
            (ScanState::Ground, ESC) => ScanState::Escape,
            (ScanState::Escape, CSI_OPEN) => ScanState::Params,
            (ScanState::Params, SGR_FINAL) => return Scan::Complete(i + 1),
            (ScanState::Params, c) if c.is_ascii_digit() || c == PARAM_SEPARATOR => {
                ScanState::Params
            }
            _ => return Scan::Mismatch,
        };
    }
    Scan::Incomplete
}

/// The SGR sequence grammar as a `StreamPattern`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SgrPattern;

impl StreamPattern for SgrPattern {
    fn find(&self, text: &[char], from: usize) -> Option<Range<usize>> {
        (from..text.len())
            .filter(|&i| text[i] == ESC)
            .find_map(|i| match scan(&text[i..]) {
                Scan::Complete(len) => Some(i..i + len),
                _ => None,
            })
    }

    fn is_partial_match(&self, tail: &[char]) -> bool {
        scan(tail) == Scan::Incomplete
    }
}

/// Numeric parameters of an SGR sequence. An empty or overflowing field is
/// `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SgrParams(pub Vec<Option<u16>>);

impl SgrParams {
    /// Extracts the parameters from a complete sequence as found by
    /// `SgrPattern::find`. Returns `None` unless `sequence` is exactly one
    /// whole SGR sequence.
    pub fn from_sequence(sequence: &[char]) -> Option<Self> {
        if scan(sequence) != Scan::Complete(sequence.len()) {
            return None;
        }
        let inner: String = sequence[INTRODUCER_LEN..sequence.len() - 1].iter().collect();
        Some(SgrParams(
            inner
                .split(PARAM_SEPARATOR)
                .map(|field| field.parse::<u16>().ok())
                .collect(),
        ))
    }

    /// Colour selected by these parameters: `n` picks from the normal
    /// palette and `n;1` from the bold palette, for `n` in 30-37. Anything
    /// else selects nothing.
    pub fn colour(&self) -> Option<Rgb> {
        match self.0.as_slice() {
            [Some(code)] => NamedColor::from_sgr_code(*code).map(NamedColor::normal_rgb),
            [Some(code), Some(SGR_BOLD)] => {
                NamedColor::from_sgr_code(*code).map(NamedColor::bold_rgb)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test_log::test]
    fn find_locates_first_complete_sequence() {
        let text = chars("ab\x1b[12;\x1b[31mcd");
        assert_eq!(SgrPattern.find(&text, 0), Some(7..12));
        assert_eq!(SgrPattern.find(&chars("plain"), 0), None);
        assert_eq!(SgrPattern.find(&chars("\x1b[m"), 0), Some(0..3));
    }

    #[test_log::test]
    fn partial_match_requires_proper_prefix() {
        assert!(SgrPattern.is_partial_match(&chars("\x1b")));
        assert!(SgrPattern.is_partial_match(&chars("\x1b[")));
        assert!(SgrPattern.is_partial_match(&chars("\x1b[31;1")));
        assert!(!SgrPattern.is_partial_match(&chars("\x1b[31m")));
        assert!(!SgrPattern.is_partial_match(&chars("\x1b[20d")));
        assert!(!SgrPattern.is_partial_match(&chars("\x1bx")));
        assert!(!SgrPattern.is_partial_match(&chars("a\x1b")));
        assert!(!SgrPattern.is_partial_match(&[]));
    }

    #[test_log::test]
    fn params_select_palette() {
        let params = |s: &str| SgrParams::from_sequence(&chars(s)).unwrap();
        assert_eq!(params("\x1b[31m").colour(), Some(Rgb(170, 0, 0)));
        assert_eq!(params("\x1b[31;1m").colour(), Some(Rgb(255, 85, 85)));
        assert_eq!(params("\x1b[20m").colour(), None);
        assert_eq!(params("\x1b[31;5m").colour(), None);
        assert_eq!(params("\x1b[1;31m").colour(), None);
        assert_eq!(params("\x1b[m").colour(), None);
        assert_eq!(params("\x1b[99999m").0, vec![None]);
    }

    #[test_log::test]
    fn params_reject_anything_but_one_whole_sequence() {
        assert_eq!(SgrParams::from_sequence(&[]), None);
        assert_eq!(SgrParams::from_sequence(&chars("\x1b")), None);
        assert_eq!(SgrParams::from_sequence(&chars("\x1b[")), None);
        assert_eq!(SgrParams::from_sequence(&chars("\x1b[31")), None);
        assert_eq!(SgrParams::from_sequence(&chars("x[31m")), None);
        assert_eq!(SgrParams::from_sequence(&chars("\x1b[31mx")), None);
        assert_eq!(
            SgrParams::from_sequence(&chars("\x1b[m")),
            Some(SgrParams(vec![None]))
        );
    }
}
