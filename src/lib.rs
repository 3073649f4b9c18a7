//! Serial terminal viewer library.
//!
//! Raw bytes from a serial link go through a chain of incremental parsers
//! (`pipeline`) that produce a colour-annotated, line-marked
//! `StreamedText` for the `renderer` to draw.

pub mod ansi;
pub mod color;
pub mod config;
pub mod control;
pub mod decoder;
pub mod error;
pub mod pipeline;
pub mod renderer;
pub mod streamed_text;

pub use error::StreamedTextError;
pub use streamed_text::{ColourMarker, StreamedText};
