// src/ansi/tests.rs

use crate::ansi::AnsiEscapeParser;
use crate::color::Rgb;
use crate::streamed_text::{ColourMarker, StreamedText};

const RED: Rgb = Rgb(170, 0, 0);
const GREEN: Rgb = Rgb(0, 170, 0);
const BOLD_RED: Rgb = Rgb(255, 85, 85);

/// Feeds each chunk through one parser, as the pipeline does, and returns
/// the output together with whatever is still withheld.
fn parse_chunks(chunks: &[&str]) -> (StreamedText, StreamedText) {
    let parser = AnsiEscapeParser::new();
    let mut input = StreamedText::new();
    let mut output = StreamedText::new();
    for chunk in chunks {
        input.append(chunk);
        parser.parse(&mut input, &mut output).unwrap();
    }
    (output, input)
}

fn parse(s: &str) -> StreamedText {
    parse_chunks(&[s]).0
}

fn marker(position: usize, colour: Rgb) -> ColourMarker {
    ColourMarker::new(position, colour)
}

// --- Complete sequences ---

#[test_log::test]
fn test_parse_plain_text() {
    let output = parse("hello");
    assert_eq!(output.text(), "hello");
    assert!(output.colours().is_empty());
    assert_eq!(output.pending_colour(), None);
}

#[test_log::test]
fn test_parse_one_sequence() {
    let output = parse("default\x1b[31mred");
    assert_eq!(output.text(), "defaultred");
    assert_eq!(output.colours(), &[marker(7, RED)]);
}

#[test_log::test]
fn test_parse_two_sequences() {
    let output = parse("default\x1b[31mred\x1b[32mgreen");
    assert_eq!(output.text(), "defaultredgreen");
    assert_eq!(output.colours(), &[marker(7, RED), marker(10, GREEN)]);
}

#[test_log::test]
fn test_parse_bold_colour() {
    let output = parse("default\x1b[31;1mred");
    assert_eq!(output.text(), "defaultred");
    assert_eq!(output.colours(), &[marker(7, BOLD_RED)]);
}

#[test_log::test]
fn test_parse_sequence_at_end_leaves_pending_colour() {
    let output = parse("abc\x1b[32m");
    assert_eq!(output.text(), "abc");
    assert!(output.colours().is_empty());
    assert_eq!(output.pending_colour(), Some(GREEN));
}

#[test_log::test]
fn test_parse_back_to_back_sequences_keep_last_colour() {
    let output = parse("a\x1b[31m\x1b[32mb");
    assert_eq!(output.text(), "ab");
    assert_eq!(output.colours(), &[marker(1, GREEN)]);
}

#[test_log::test]
fn test_parse_sequence_at_start() {
    let output = parse("\x1b[31mred");
    assert_eq!(output.colours(), &[marker(0, RED)]);
}

// --- Unsupported / malformed sequences ---

#[test_log::test]
fn test_parse_unsupported_code_is_swallowed() {
    let output = parse("abc\x1b[20mdef");
    assert_eq!(output.text(), "abcdef");
    assert!(output.colours().is_empty());
}

#[test_log::test]
fn test_parse_unsupported_code_pair_is_swallowed() {
    let output = parse("abc\x1b[20;5mdef");
    assert_eq!(output.text(), "abcdef");
    assert!(output.colours().is_empty());
}

#[test_log::test]
fn test_parse_reset_is_swallowed_without_colour() {
    let output = parse("\x1b[31mred\x1b[0mplain");
    assert_eq!(output.text(), "redplain");
    assert_eq!(output.colours(), &[marker(0, RED)]);
}

#[test_log::test]
fn test_parse_truncated_sequence_is_literal() {
    let output = parse("abc\x1b[20def");
    assert_eq!(output.text(), "abc\x1b[20def");
    assert!(output.colours().is_empty());
}

#[test_log::test]
fn test_parse_truncated_sequence_without_digits_is_literal() {
    let output = parse("abc\x1b[def");
    assert_eq!(output.text(), "abc\x1b[def");
}

#[test_log::test]
fn test_parse_lone_escape_followed_by_text_is_literal() {
    let output = parse("a\x1bbc");
    assert_eq!(output.text(), "a\x1bbc");
}

// --- Sequences split across calls ---

#[test_log::test]
fn test_parse_split_after_escape() {
    let (output, withheld) = parse_chunks(&["default\x1b"]);
    assert_eq!(output.text(), "default");
    assert!(output.colours().is_empty());
    assert_eq!(withheld.text(), "\x1b");

    let (output, withheld) = parse_chunks(&["default\x1b", "[31mred"]);
    assert_eq!(output.text(), "defaultred");
    assert_eq!(output.colours(), &[marker(7, RED)]);
    assert!(withheld.is_empty());
}

#[test_log::test]
fn test_parse_split_in_three() {
    let (output, withheld) = parse_chunks(&["default\x1b", "["]);
    assert_eq!(output.text(), "default");
    assert_eq!(withheld.text(), "\x1b[");

    let (output, _) = parse_chunks(&["default\x1b", "[", "31mred"]);
    assert_eq!(output.text(), "defaultred");
    assert_eq!(output.colours(), &[marker(7, RED)]);
}

#[test_log::test]
fn test_parse_withheld_fragment_released_when_disproved() {
    let (output, withheld) = parse_chunks(&["abc\x1b["]);
    assert_eq!(output.text(), "abc");
    assert_eq!(withheld.text(), "\x1b[");

    let (output, withheld) = parse_chunks(&["abc\x1b[", "def"]);
    assert_eq!(output.text(), "abc\x1b[def");
    assert!(withheld.is_empty());
}

#[test_log::test]
fn test_parse_withheld_fragment_interrupted_by_new_escape() {
    let (output, withheld) = parse_chunks(&["abc\x1b[", "12;\x1b[def"]);
    assert_eq!(output.text(), "abc\x1b[12;\x1b[def");
    assert!(output.colours().is_empty());
    assert!(withheld.is_empty());
}

#[test_log::test]
fn test_parse_incomplete_fragment_is_held_indefinitely() {
    let (output, withheld) = parse_chunks(&["abc\x1b[3", "1;", "", "1"]);
    assert_eq!(output.text(), "abc");
    assert_eq!(withheld.text(), "\x1b[31;1");

    let (output, _) = parse_chunks(&["abc\x1b[3", "1;", "", "1", "mX"]);
    assert_eq!(output.text(), "abcX");
    assert_eq!(output.colours(), &[marker(3, BOLD_RED)]);
}

#[test_log::test]
fn test_parse_pending_colour_survives_empty_chunk() {
    let (output, _) = parse_chunks(&["abc\x1b[31m", "", "x"]);
    assert_eq!(output.text(), "abcx");
    assert_eq!(output.colours(), &[marker(3, RED)]);
}
