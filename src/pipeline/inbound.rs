// src/pipeline/inbound.rs

//! The only object shared between threads: a FIFO of byte chunks from the
//! serial reader (producer) to the render loop (consumer).

use anyhow::Context;
use log::{debug, error, info, trace};
use std::io::{ErrorKind, Read};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

/// Size of each read from the serial source.
const READ_BUFFER_SIZE: usize = 4096;

pub fn inbound_channel() -> (ChunkSender, ChunkReceiver) {
    let (tx, rx) = mpsc::channel();
    (ChunkSender { tx }, ChunkReceiver { rx })
}

#[derive(Debug, Clone)]
pub struct ChunkSender {
    tx: Sender<Vec<u8>>,
}

impl ChunkSender {
    /// Queues a chunk. Returns false once the receiver is gone.
    pub fn send(&self, chunk: Vec<u8>) -> bool {
        self.tx.send(chunk).is_ok()
    }
}

#[derive(Debug)]
pub struct ChunkReceiver {
    rx: Receiver<Vec<u8>>,
}

/// Everything queued since the last drain.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Drained {
    /// Chunks in arrival order.
    pub chunks: Vec<Vec<u8>>,
    /// The producer has hung up; no more chunks will arrive.
    pub disconnected: bool,
}

impl ChunkReceiver {
    /// Takes every queued chunk without blocking.
    pub fn drain(&self) -> Drained {
        let mut drained = Drained::default();
        loop {
            match self.rx.try_recv() {
                Ok(chunk) => drained.chunks.push(chunk),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    drained.disconnected = true;
                    break;
                }
            }
        }
        trace!("drained {} chunks", drained.chunks.len());
        drained
    }
}

/// Spawns a producer thread that reads `source` and queues each read as a
/// chunk. The thread ends (dropping `sender`) on EOF, on a read error, or
/// when the receiver is gone.
pub fn spawn_reader<R>(mut source: R, sender: ChunkSender) -> anyhow::Result<JoinHandle<()>>
where
    R: Read + Send + 'static,
{
    thread::Builder::new()
        .name("serial-reader".to_string())
        .spawn(move || {
            let mut buf = [0u8; READ_BUFFER_SIZE];
            loop {
                match source.read(&mut buf) {
                    Ok(0) => {
                        info!("serial source reached EOF");
                        break;
                    }
                    Ok(count) => {
                        debug!("read {} bytes", count);
                        if !sender.send(buf[..count].to_vec()) {
                            debug!("receiver gone, stopping reader");
                            break;
                        }
                    }
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => {
                        error!("serial read error: {}", e);
                        break;
                    }
                }
            }
        })
        .context("Failed to spawn serial reader thread")
}
