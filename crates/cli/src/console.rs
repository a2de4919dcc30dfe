//! Line input shared by the REPL prompt and the terminal operator.
//!
//! Stdin is read on a dedicated thread so a pending read never holds up
//! runtime shutdown. Each read races the next line against Ctrl-C.

use std::io::BufRead;

use tokio::sync::{Mutex, mpsc};
use tracing::debug;

/// What came back from one read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadResult {
    Line(String),
    /// Ctrl-C while waiting
    Interrupted,
    /// Stdin closed
    Eof,
}

pub struct Console {
    lines: Mutex<mpsc::Receiver<String>>,
    watch_interrupts: bool,
}

impl Console {
    /// Start reading lines from stdin.
    pub fn stdin() -> Self {
        let (tx, rx) = mpsc::channel(16);
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
            debug!("Stdin reader finished");
        });
        Self {
            lines: Mutex::new(rx),
            watch_interrupts: true,
        }
    }

    /// A console fed from a channel, with no Ctrl-C handling.
    #[cfg(test)]
    pub fn from_receiver(rx: mpsc::Receiver<String>) -> Self {
        Self {
            lines: Mutex::new(rx),
            watch_interrupts: false,
        }
    }

    /// Wait for the next line.
    pub async fn read_line(&self) -> ReadResult {
        let mut lines = self.lines.lock().await;
        if !self.watch_interrupts {
            return lines.recv().await.map_or(ReadResult::Eof, ReadResult::Line);
        }

        tokio::select! {
            line = lines.recv() => line.map_or(ReadResult::Eof, ReadResult::Line),
            _ = tokio::signal::ctrl_c() => ReadResult::Interrupted,
        }
    }
}
