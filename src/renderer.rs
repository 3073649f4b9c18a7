// src/renderer.rs

//! This module defines the `Renderer`.
//!
//! Once per frame the `Renderer` shifts characters out of the pipeline
//! output, writes them to a byte sink as 24-bit colour ANSI text, and keeps
//! them in a scroll-back `StreamedText` capped at a configured size.
//!
//! Characters are batched into runs of identical colour, so the sink sees
//! one colour switch per run rather than per character.

use crate::color::Rgb;
use crate::config::Config;
use crate::streamed_text::StreamedText;

use anyhow::{Context, Result};
use log::trace;
use std::io::Write;

const CR: char = '\r';
const LF: char = '\n';
const SGR_RESET: &str = "\x1b[0m";

#[derive(Debug)]
pub struct Renderer {
    /// Everything drawn so far, oldest characters trimmed first.
    scrollback: StreamedText,
    max_scrollback_chars: usize,
    /// 0 means draw everything available.
    max_chars_per_frame: usize,
    default_foreground: Rgb,
    /// Colour most recently sent to the sink.
    sink_colour: Option<Rgb>,
}

impl Renderer {
    pub fn new(config: &Config) -> Self {
        Renderer {
            scrollback: StreamedText::new(),
            max_scrollback_chars: config.scrollback.max_chars,
            max_chars_per_frame: config.performance.max_chars_per_frame,
            default_foreground: config.colors.default_foreground,
            sink_colour: None,
        }
    }

    pub fn scrollback(&self) -> &StreamedText {
        &self.scrollback
    }

    /// The retained text, one string per line.
    pub fn lines(&self) -> Vec<String> {
        self.scrollback.split_at_new_lines()
    }

    /// Draws up to one frame's worth of `source` into `sink`.
    ///
    /// Returns the number of characters drawn. Characters over the frame
    /// budget stay in `source` for the next frame.
    pub fn render_frame<W: Write>(&mut self, source: &mut StreamedText, sink: &mut W) -> Result<usize> {
        let count = match self.max_chars_per_frame {
            0 => source.len(),
            max => source.len().min(max),
        };

        let start = self.scrollback.len();
        let markers_before = self.scrollback.new_line_markers().len();
        // The scroll-back holds any pending colour from earlier frames, so
        // shifting straight into it binds that colour correctly.
        self.scrollback
            .shift_chars_in(source, count)
            .context("Failed to take frame from pipeline output")?;

        if count > 0 {
            let frame = self.format_range(start, markers_before);
            sink.write_all(frame.as_bytes())
                .context("Failed to write frame to sink")?;
            sink.flush().context("Failed to flush sink")?;
            trace!("drew {} chars", count);
        }

        self.trim_scrollback()?;
        Ok(count)
    }

    /// Restores the sink's default attributes.
    pub fn finish<W: Write>(&mut self, sink: &mut W) -> Result<()> {
        if self.sink_colour.take().is_some() {
            sink.write_all(SGR_RESET.as_bytes())
                .context("Failed to reset sink colour")?;
            sink.flush().context("Failed to flush sink")?;
        }
        Ok(())
    }

    /// Formats scroll-back characters from `start` onwards, with a line
    /// break at each new-line marker from index `first_marker` onwards.
    fn format_range(&mut self, start: usize, first_marker: usize) -> String {
        let chars = self.scrollback.chars();
        let markers = &self.scrollback.new_line_markers()[first_marker..];
        let mut out = String::with_capacity(chars.len() - start);
        let mut next_marker = 0;

        for (i, &c) in chars.iter().enumerate().skip(start) {
            while markers.get(next_marker) == Some(&i) {
                out.push(LF);
                next_marker += 1;
            }
            let colour = self
                .scrollback
                .colour_at(i)
                .unwrap_or(self.default_foreground);
            if self.sink_colour != Some(colour) {
                let Rgb(r, g, b) = colour;
                out.push_str(&format!("\x1b[38;2;{};{};{}m", r, g, b));
                self.sink_colour = Some(colour);
            }
            // Line structure comes from the markers; raw CR/LF would
            // break it twice.
            if c != CR && c != LF {
                out.push(c);
            }
        }
        // Markers at the end of the frame break before the next frame's text.
        for _ in markers.iter().skip(next_marker) {
            out.push(LF);
        }
        out
    }

    fn trim_scrollback(&mut self) -> Result<()> {
        let len = self.scrollback.len();
        if len > self.max_scrollback_chars {
            let excess = len - self.max_scrollback_chars;
            self.scrollback
                .trim_front(excess)
                .context("Failed to trim scroll-back")?;
            trace!("trimmed {} chars of scroll-back", excess);
        }
        Ok(())
    }
}
