// src/streamed_text/mod.rs

//! `StreamedText`: a run of characters plus aligned colour-change and
//! new-line markers, and the buffer type that flows between pipeline stages.
//!
//! Characters move between buffers with `shift_chars_in` (the source loses
//! them) or `copy_chars_from` (the source is untouched). Both carry the
//! markers that fall inside the transferred range and re-index whatever
//! remains, so a buffer never has to know where its characters came from.
//!
//! Positions are measured in `char`s, not bytes.

use crate::color::Rgb;
use crate::error::{Result, StreamedTextError};
use log::{debug, trace};
use std::fmt;
use std::ops::Range;

/// A colour change that applies from `position` up to the next marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColourMarker {
    pub position: usize,
    pub colour: Rgb,
}

impl ColourMarker {
    pub fn new(position: usize, colour: Rgb) -> Self {
        ColourMarker { position, colour }
    }
}

/// A maximal run of characters sharing one colour. `colour` is `None` for
/// text before the first marker (the renderer's default colour).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub colour: Option<Rgb>,
}

/// A token grammar that can be located in a stream and that may be cut in
/// half by a chunk boundary.
pub trait StreamPattern {
    /// Finds the first complete match starting at or after `from`.
    fn find(&self, text: &[char], from: usize) -> Option<Range<usize>>;

    /// Returns true if `tail` is a non-empty proper prefix of some match,
    /// i.e. more input is needed before it can be classified.
    fn is_partial_match(&self, tail: &[char]) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamedText {
    text: Vec<char>,
    colours: Vec<ColourMarker>,
    /// A line break falls between `text[m - 1]` and `text[m]` for every
    /// marker `m`. Entries may briefly exceed `text.len()` while a marker is
    /// recorded ahead of the text it belongs to.
    new_line_markers: Vec<usize>,
    /// Colour waiting for the next character to land on.
    pending_colour: Option<Rgb>,
}

impl StreamedText {
    pub fn new() -> Self {
        StreamedText::default()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn text(&self) -> String {
        self.text.iter().collect()
    }

    pub fn chars(&self) -> &[char] {
        &self.text
    }

    pub fn colours(&self) -> &[ColourMarker] {
        &self.colours
    }

    pub fn new_line_markers(&self) -> &[usize] {
        &self.new_line_markers
    }

    pub fn pending_colour(&self) -> Option<Rgb> {
        self.pending_colour
    }

    pub fn set_pending_colour(&mut self, colour: Rgb) {
        debug!("pending colour set to {:?}", colour);
        self.pending_colour = Some(colour);
    }

    /// Clears the pending slot, returning what it held.
    pub fn take_pending_colour(&mut self) -> Option<Rgb> {
        self.pending_colour.take()
    }

    /// Appends `s`. A pending colour is bound to the first appended
    /// character. Appending an empty string does nothing.
    pub fn append(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        trace!("append {:?}", s);
        let start = self.text.len();
        self.text.extend(s.chars());
        if let Some(colour) = self.pending_colour.take() {
            // Every existing marker is below `start`, so this keeps the order.
            self.colours.push(ColourMarker::new(start, colour));
        }
    }

    /// Records a colour change at `position`.
    ///
    /// `position` must index an existing character and must not precede the
    /// last marker. A marker already at `position` has its colour replaced.
    pub fn add_colour(&mut self, position: usize, colour: Rgb) -> Result<()> {
        let len = self.text.len();
        let last = self.colours.last().map(|m| m.position);
        if position >= len || last.is_some_and(|l| position < l) {
            return Err(StreamedTextError::InvalidPosition {
                position,
                len,
                last,
            });
        }
        match self.colours.last_mut() {
            Some(marker) if marker.position == position => marker.colour = colour,
            _ => self.colours.push(ColourMarker::new(position, colour)),
        }
        Ok(())
    }

    /// Records a line break before `index`.
    ///
    /// Not range checked: `copy_chars_from` records markers before the text
    /// they refer to has landed. Callers must append that text before the
    /// next read.
    pub fn add_new_line_marker(&mut self, index: usize) {
        self.new_line_markers.push(index);
    }

    /// Removes the character at `index`, pulling later new-line markers back
    /// by one. Colour markers are left alone.
    pub fn remove_char(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.text.remove(index);
        for marker in self.new_line_markers.iter_mut().filter(|m| **m > index) {
            *marker -= 1;
        }
        Ok(())
    }

    /// Overwrites the character at `index`. The character count is
    /// unchanged, so no marker moves.
    pub fn replace_char(&mut self, index: usize, c: char) -> Result<()> {
        self.check_index(index)?;
        self.text[index] = c;
        Ok(())
    }

    /// Discards the first `num_chars` characters along with their markers.
    ///
    /// This shifts them into a throwaway buffer, so a pending colour is
    /// discarded too.
    pub fn remove_chars(&mut self, num_chars: usize) -> Result<()> {
        let mut discarded = StreamedText::new();
        discarded.shift_chars_in(self, num_chars)?;
        self.check_colours_in_order()
    }

    /// Like `remove_chars`, but the colour in effect at `num_chars` keeps
    /// applying to the surviving text, and the pending colour survives.
    pub fn trim_front(&mut self, num_chars: usize) -> Result<()> {
        let carried = if self.is_colour_at(num_chars) {
            None
        } else {
            self.colour_at(num_chars)
        };
        let pending = self.pending_colour;
        self.remove_chars(num_chars)?;
        self.pending_colour = pending;

        if let Some(colour) = carried {
            if self.text.is_empty() {
                self.pending_colour.get_or_insert(colour);
            } else {
                self.colours.insert(0, ColourMarker::new(0, colour));
            }
        }
        self.check_colours_in_order()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.colours.clear();
        self.new_line_markers.clear();
        self.pending_colour = None;
    }

    /// Appends the first `num_chars` characters of `src` (and their markers)
    /// to this buffer, leaving `src` untouched.
    pub fn copy_chars_from(&mut self, src: &StreamedText, num_chars: usize) -> Result<()> {
        if num_chars > src.len() {
            return Err(StreamedTextError::RangeExceeded {
                requested: num_chars,
                available: src.len(),
            });
        }
        let base = self.text.len();

        // A marker at exactly `num_chars` ends its line on the last
        // transferred character, so it travels with the text.
        self.new_line_markers.extend(
            src.new_line_markers
                .iter()
                .filter(|&&m| m <= num_chars)
                .map(|m| base + m),
        );

        self.text.extend_from_slice(&src.text[..num_chars]);

        if num_chars > 0 {
            if let Some(colour) = self.take_pending_colour() {
                self.add_colour(base, colour)?;
            }
        }

        // A colour marker at exactly `num_chars` applies to text that stays
        // in `src`.
        for marker in src.colours.iter().filter(|m| m.position < num_chars) {
            self.add_colour(base + marker.position, marker.colour)?;
        }

        // Overwrites our own pending colour when nothing was transferred.
        if let Some(colour) = src.pending_colour {
            self.pending_colour = Some(colour);
        }

        self.check_colours_in_order()
    }

    /// Moves the first `num_chars` characters of `src` (and their markers)
    /// to the end of this buffer.
    pub fn shift_chars_in(&mut self, src: &mut StreamedText, num_chars: usize) -> Result<()> {
        self.copy_chars_from(src, num_chars)?;
        src.drop_front(num_chars);
        src.check_colours_in_order()
    }

    /// Shifts the longest prefix of `src` that contains no partial match of
    /// `pattern`. Any incomplete token at the tail stays in `src`.
    ///
    /// Returns the number of characters shifted.
    pub fn shift_chars_in_until_partial_match<P: StreamPattern + ?Sized>(
        &mut self,
        src: &mut StreamedText,
        pattern: &P,
    ) -> Result<usize> {
        let split = (0..src.len())
            .find(|&k| pattern.is_partial_match(&src.text[k..]))
            .unwrap_or(src.len());
        if split < src.len() {
            trace!("withholding {} chars of partial match", src.len() - split);
        }
        self.shift_chars_in(src, split)?;
        Ok(split)
    }

    /// Splits the text at the new-line markers. `m` markers give `m + 1`
    /// lines.
    pub fn split_at_new_lines(&self) -> Vec<String> {
        let len = self.text.len();
        let mut lines = Vec::with_capacity(self.new_line_markers.len() + 1);
        let mut start = 0;
        for &marker in &self.new_line_markers {
            let end = marker.clamp(start, len);
            lines.push(self.text[start..end].iter().collect());
            start = end;
        }
        lines.push(self.text[start..].iter().collect());
        lines
    }

    /// Splits the text into maximal same-colour runs.
    pub fn runs(&self) -> Vec<TextRun> {
        let len = self.text.len();
        let mut runs = Vec::with_capacity(self.colours.len() + 1);

        let first = self.colours.first().map_or(len, |m| m.position);
        if first > 0 {
            runs.push(TextRun {
                text: self.text[..first].iter().collect(),
                colour: None,
            });
        }
        for (i, marker) in self.colours.iter().enumerate() {
            let end = self.colours.get(i + 1).map_or(len, |next| next.position);
            runs.push(TextRun {
                text: self.text[marker.position..end].iter().collect(),
                colour: Some(marker.colour),
            });
        }
        runs
    }

    /// Returns true if a colour marker sits exactly at `index`.
    pub fn is_colour_at(&self, index: usize) -> bool {
        self.colours
            .binary_search_by_key(&index, |m| m.position)
            .is_ok()
    }

    /// Returns the colour in effect for the character at `index`.
    pub fn colour_at(&self, index: usize) -> Option<Rgb> {
        let upto = self.colours.partition_point(|m| m.position <= index);
        upto.checked_sub(1).map(|i| self.colours[i].colour)
    }

    pub fn check_colours_in_order(&self) -> Result<()> {
        match self
            .colours
            .windows(2)
            .position(|pair| pair[0].position >= pair[1].position)
        {
            Some(i) => Err(StreamedTextError::InvariantBroken { index: i + 1 }),
            None => Ok(()),
        }
    }

    /// Returns true if every character that follows a `\n` has a colour
    /// marker on it. A trailing `\n` has no follower and is not checked.
    pub fn check_new_lines_have_colours(&self) -> bool {
        for x in 0..self.text.len().saturating_sub(1) {
            if self.text[x] != '\n' {
                continue;
            }
            if !self.is_colour_at(x + 1) {
                debug!("no colour on the line starting at {}", x + 1);
                return false;
            }
        }
        true
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.text.len() {
            return Err(StreamedTextError::RangeExceeded {
                requested: index + 1,
                available: self.text.len(),
            });
        }
        Ok(())
    }

    /// Source-side half of a shift: drops the first `num_chars` characters
    /// and re-indexes the markers that stay.
    fn drop_front(&mut self, num_chars: usize) {
        self.new_line_markers.retain(|&m| m > num_chars);
        for marker in &mut self.new_line_markers {
            *marker -= num_chars;
        }
        self.colours.retain(|m| m.position >= num_chars);
        for marker in &mut self.colours {
            marker.position -= num_chars;
        }
        self.text.drain(..num_chars);
        self.pending_colour = None;
    }
}

impl From<&str> for StreamedText {
    fn from(s: &str) -> Self {
        let mut text = StreamedText::new();
        text.append(s);
        text
    }
}

impl fmt::Display for StreamedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{ text: \"")?;
        for c in &self.text {
            write!(f, "{}", c.escape_debug())?;
        }
        write!(f, "\"")?;
        for (i, marker) in self.colours.iter().enumerate() {
            write!(f, ", colour[{}]: {} {:?}", i, marker.position, marker.colour)?;
        }
        write!(
            f,
            ", new_lines: {:?}, pending: {:?} }}",
            self.new_line_markers, self.pending_colour
        )
    }
}
