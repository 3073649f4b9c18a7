// src/pipeline/mod.rs

//! Threads raw serial input through the parsing stages:
//!
//! ```text
//! bytes -> Utf8Decoder -> raw_in -> AnsiEscapeParser -> after_ansi
//!       -> AsciiControlCharParser -> after_control -> renderer
//! ```
//!
//! Each buffer belongs to exactly one stage; characters only move between
//! them by shifting. The renderer drains `after_control` at its own pace.

mod inbound;

pub use inbound::{inbound_channel, spawn_reader, ChunkReceiver, ChunkSender, Drained};

use crate::ansi::AnsiEscapeParser;
use crate::config::ParserConfig;
use crate::control::AsciiControlCharParser;
use crate::decoder::Utf8Decoder;
use crate::error::Result;
use crate::streamed_text::StreamedText;
use log::trace;

#[derive(Debug, Default)]
pub struct Pipeline {
    decoder: Utf8Decoder,
    ansi_parser: AnsiEscapeParser,
    control_parser: AsciiControlCharParser,
    /// Decoded text not yet claimed by the ANSI parser; holds a withheld
    /// partial escape sequence between chunks.
    raw_in: StreamedText,
    after_ansi: StreamedText,
    after_control: StreamedText,
}

impl Pipeline {
    pub fn new(config: &ParserConfig) -> Self {
        let mut pipeline = Pipeline::default();
        pipeline.set_replace_control_chars_with_visible_symbols(
            config.replace_control_chars_with_visible_symbols,
        );
        pipeline
    }

    pub fn set_replace_control_chars_with_visible_symbols(&mut self, enabled: bool) {
        self.control_parser.set_replace_with_visible_symbols(enabled);
    }

    pub fn replace_control_chars_with_visible_symbols(&self) -> bool {
        self.control_parser.replace_with_visible_symbols()
    }

    /// Decodes a raw chunk from the serial link and runs it through the
    /// parsers. A code point split across chunks is completed by the next
    /// call.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let decoded = self.decoder.decode(bytes);
        self.push_str(&decoded)
    }

    /// Ends the byte stream. An unfinished code point left in the decoder
    /// goes through the parsers as U+FFFD. Calling it again does nothing.
    pub fn finish(&mut self) -> Result<()> {
        match self.decoder.finish() {
            Some(replacement) => self.push_str(replacement.encode_utf8(&mut [0; 4])),
            None => Ok(()),
        }
    }

    /// Runs already-decoded text through the parsers.
    pub fn push_str(&mut self, chunk: &str) -> Result<()> {
        trace!("pipeline received {} chars", chunk.chars().count());
        self.raw_in.append(chunk);
        self.ansi_parser
            .parse(&mut self.raw_in, &mut self.after_ansi)?;
        self.control_parser
            .parse(&mut self.after_ansi, &mut self.after_control)?;
        Ok(())
    }

    /// Parsed text waiting for the renderer.
    pub fn output(&self) -> &StreamedText {
        &self.after_control
    }

    /// The renderer shifts characters out of this buffer as it draws them.
    pub fn output_mut(&mut self) -> &mut StreamedText {
        &mut self.after_control
    }

    /// Input held back because it may be the start of an escape sequence.
    pub fn withheld(&self) -> &StreamedText {
        &self.raw_in
    }

    pub fn clear(&mut self) {
        self.decoder.reset();
        self.raw_in.clear();
        self.after_ansi.clear();
        self.after_control.clear();
    }
}
