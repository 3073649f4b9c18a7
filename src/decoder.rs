// src/decoder.rs

//! Incremental UTF-8 decoding of raw serial bytes.
//! A code point split across reads is buffered until its remaining bytes
//! arrive; malformed input becomes U+FFFD.

use log::warn;
use std::str;

/// Unicode replacement character (U+FFFD).
/// Used when encountering invalid UTF-8 sequences.
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

// --- Constants for UTF-8 byte classification ---
const UTF8_ASCII_MAX: u8 = 0x7F;
const UTF8_CONT_MIN: u8 = 0x80;
const UTF8_CONT_MAX: u8 = 0xBF;
const UTF8_2_BYTE_MIN: u8 = 0xC2; // Excludes overlong 0xC0, 0xC1
const UTF8_2_BYTE_MAX: u8 = 0xDF;
const UTF8_3_BYTE_MIN: u8 = 0xE0;
const UTF8_3_BYTE_MAX: u8 = 0xEF;
const UTF8_4_BYTE_MIN: u8 = 0xF0;
const UTF8_4_BYTE_MAX: u8 = 0xF4; // Max valid start for 4-byte sequence (RFC 3629)

/// Outcome of a single byte being processed by the decoder.
#[derive(Debug, PartialEq, Eq)]
enum Utf8DecodeResult {
    Decoded(char),
    /// The byte cannot continue (or start) a sequence. Decoder is reset.
    InvalidSequence,
    /// The sequence completed but is not a Unicode scalar value (overlong
    /// form or surrogate). The byte was consumed.
    Malformed,
    /// Byte was buffered; more bytes needed.
    NeedsMoreBytes,
}

#[derive(Debug, Clone, Default)]
pub struct Utf8Decoder {
    buffer: [u8; 4],
    len: usize,
    expected: usize,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Utf8Decoder::default()
    }

    /// Number of bytes of an unfinished code point held back from the last
    /// call.
    pub fn pending_bytes(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn reset(&mut self) {
        self.len = 0;
        self.expected = 0;
    }

    /// Decodes `bytes`, returning every complete code point. Trailing bytes
    /// of an unfinished code point are kept for the next call.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len());
        for &byte in bytes {
            self.decode_byte(byte, &mut out);
        }
        out
    }

    /// Flushes an unfinished code point as U+FFFD, e.g. at end of stream.
    pub fn finish(&mut self) -> Option<char> {
        if self.len == 0 {
            return None;
        }
        warn!("stream ended mid utf8 sequence ({} bytes)", self.len);
        self.reset();
        Some(REPLACEMENT_CHARACTER)
    }

    fn decode_byte(&mut self, byte: u8, out: &mut String) {
        if self.len == 0 {
            self.decode_as_new_char(byte, out);
            return;
        }
        match self.decode_continuation_byte(byte) {
            Utf8DecodeResult::Decoded(c) => out.push(c),
            Utf8DecodeResult::NeedsMoreBytes => {}
            Utf8DecodeResult::Malformed => {
                warn!("malformed utf8 sequence ending in {:#04X}", byte);
                out.push(REPLACEMENT_CHARACTER);
            }
            Utf8DecodeResult::InvalidSequence => {
                // The buffered sequence is broken; `byte` may still start
                // something valid (an ESC, say), so reprocess it from ground.
                warn!("byte {:#04X} broke a utf8 sequence", byte);
                out.push(REPLACEMENT_CHARACTER);
                self.decode_as_new_char(byte, out);
            }
        }
    }

    fn decode_as_new_char(&mut self, byte: u8, out: &mut String) {
        match self.decode_first_byte(byte) {
            Utf8DecodeResult::Decoded(c) => out.push(c),
            Utf8DecodeResult::NeedsMoreBytes => {}
            Utf8DecodeResult::InvalidSequence | Utf8DecodeResult::Malformed => {
                warn!("invalid utf8 byte {:#04X}, printing replacement character", byte);
                out.push(REPLACEMENT_CHARACTER);
            }
        }
    }

    #[inline]
    fn decode_first_byte(&mut self, byte: u8) -> Utf8DecodeResult {
        let expected = match byte {
            0x00..=UTF8_ASCII_MAX => return Utf8DecodeResult::Decoded(byte as char),
            UTF8_2_BYTE_MIN..=UTF8_2_BYTE_MAX => 2,
            UTF8_3_BYTE_MIN..=UTF8_3_BYTE_MAX => 3,
            UTF8_4_BYTE_MIN..=UTF8_4_BYTE_MAX => 4,
            // Continuation bytes, overlong 0xC0/0xC1 and 0xF5-0xFF.
            _ => {
                self.reset();
                return Utf8DecodeResult::InvalidSequence;
            }
        };
        self.expected = expected;
        self.buffer[0] = byte;
        self.len = 1;
        Utf8DecodeResult::NeedsMoreBytes
    }

    #[inline]
    fn decode_continuation_byte(&mut self, byte: u8) -> Utf8DecodeResult {
        if !(UTF8_CONT_MIN..=UTF8_CONT_MAX).contains(&byte) {
            self.reset();
            return Utf8DecodeResult::InvalidSequence;
        }

        self.buffer[self.len] = byte;
        self.len += 1;
        if self.len != self.expected {
            return Utf8DecodeResult::NeedsMoreBytes;
        }

        // `from_utf8` rejects overlong forms and surrogates.
        let result = str::from_utf8(&self.buffer[..self.len])
            .ok()
            .and_then(|s| s.chars().next());
        self.reset();
        match result {
            Some(c) => Utf8DecodeResult::Decoded(c),
            None => Utf8DecodeResult::Malformed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_decode_ascii() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"hello\x1b[31m"), "hello\x1b[31m");
        assert_eq!(decoder.pending_bytes(), 0);
    }

    #[test_log::test]
    fn test_decode_multibyte_split_across_calls() {
        let bytes = "a→b".as_bytes(); // '→' is E2 86 92
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(&bytes[..2]), "a");
        assert_eq!(decoder.pending_bytes(), 1);
        assert_eq!(decoder.decode(&bytes[2..3]), "");
        assert_eq!(decoder.decode(&bytes[3..]), "→b");
        assert_eq!(decoder.pending_bytes(), 0);
    }

    #[test_log::test]
    fn test_decode_invalid_start_byte() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"a\xFFb"), "a\u{FFFD}b");
        assert_eq!(decoder.decode(b"\xC0"), "\u{FFFD}");
    }

    #[test_log::test]
    fn test_decode_escape_interrupts_sequence() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"\xE2\x86\x1b[31m"), "\u{FFFD}\x1b[31m");
    }

    #[test_log::test]
    fn test_decode_surrogate_is_invalid() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"\xED\xA0\x80"), "\u{FFFD}");
    }

    #[test_log::test]
    fn test_finish_flushes_partial_sequence() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.decode(b"\xF0\x9F"), "");
        assert_eq!(decoder.finish(), Some(REPLACEMENT_CHARACTER));
        assert_eq!(decoder.finish(), None);
    }
}
