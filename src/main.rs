// src/main.rs

use serial_term::{
    config::CONFIG,
    pipeline::{inbound_channel, spawn_reader, Pipeline},
    renderer::Renderer,
};

// Logging
use anyhow::Context;
use log::{error, info};
use std::io::{self, Write};
use std::time::Duration;

/// Main entry point for the `serial-term` viewer.
///
/// Stdin stands in for the serial port: a producer thread reads it while
/// this thread runs the frame loop.
fn main() -> anyhow::Result<()> {
    // Default filter is "info" if RUST_LOG is not set. env_logger writes to
    // stderr, so it never interleaves with rendered text.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting serial-term...");
    let config = &*CONFIG;

    let (chunk_tx, chunk_rx) = inbound_channel();
    let reader = spawn_reader(io::stdin(), chunk_tx)?;

    let mut pipeline = Pipeline::new(&config.parser);
    let mut renderer = Renderer::new(config);
    let frame_interval = Duration::from_millis(config.performance.frame_interval_ms);
    let stdout = io::stdout();
    let mut sink = stdout.lock();

    info!("Starting frame loop...");
    let result = loop {
        let drained = chunk_rx.drain();
        let step = drained
            .chunks
            .iter()
            .try_for_each(|chunk| pipeline.push_bytes(chunk))
            .and_then(|()| {
                // Flush a code point cut off by the end of the stream.
                if drained.disconnected {
                    pipeline.finish()
                } else {
                    Ok(())
                }
            })
            .context("Pipeline failed on inbound chunk")
            .and_then(|()| renderer.render_frame(pipeline.output_mut(), &mut sink));

        match step {
            Ok(_) if drained.disconnected && pipeline.output().is_empty() => {
                info!("Input closed and pipeline drained. Exiting frame loop.");
                break Ok(());
            }
            Ok(_) => std::thread::sleep(frame_interval),
            Err(e) => {
                error!("Error in frame loop: {:#}. Exiting.", e);
                break Err(e);
            }
        }
    };

    renderer.finish(&mut sink)?;
    sink.write_all(b"\n").context("Failed to write final newline")?;
    if !pipeline.withheld().is_empty() {
        info!(
            "Discarding {} chars of unfinished escape sequence",
            pipeline.withheld().len()
        );
    }

    if reader.join().is_err() {
        error!("Serial reader thread panicked");
    }
    info!("serial-term exited.");
    result
}
