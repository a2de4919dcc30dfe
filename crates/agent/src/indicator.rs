//! "Thinking..." indicator shown while waiting for the first token.
//!
//! The animation runs on its own task and owns the terminal line until it
//! is stopped. [`ThinkingIndicator::stop`] signals the task, waits for it
//! (at most one second) and clears the line, so streamed tokens never
//! interleave with a frame.

use std::io::Write;
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::execute;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::trace;

const FRAMES: [&str; 3] = [".", "..", "..."];
const TICK: Duration = Duration::from_millis(500);
const JOIN_BOUND: Duration = Duration::from_secs(1);

/// A running indicator. Dropping it without [`stop`](Self::stop) aborts the
/// task but leaves the line as it was.
pub struct ThinkingIndicator {
    stop_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Box<dyn Write + Send>>>,
}

impl ThinkingIndicator {
    /// Start animating on `out`.
    pub fn start_on(mut out: Box<dyn Write + Send>) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel();

        let task = tokio::spawn(async move {
            for frame in FRAMES.iter().cycle() {
                let _ = execute!(
                    out,
                    MoveToColumn(0),
                    SetForegroundColor(Color::DarkGrey),
                    Print(format!("  Thinking{frame}")),
                    ResetColor,
                    Clear(ClearType::UntilNewLine)
                );
                tokio::select! {
                    _ = &mut stop_rx => break,
                    _ = tokio::time::sleep(TICK) => {}
                }
            }
            out
        });

        Self {
            stop_tx: Some(stop_tx),
            task: Some(task),
        }
    }

    /// Stop the animation and clear its line.
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        let Some(task) = self.task.take() else {
            return;
        };
        match tokio::time::timeout(JOIN_BOUND, task).await {
            Ok(Ok(mut out)) => {
                let _ = execute!(out, MoveToColumn(0), Clear(ClearType::CurrentLine));
            }
            Ok(Err(e)) => trace!(error = %e, "Indicator task ended abnormally"),
            Err(_) => trace!("Indicator did not stop within its join bound"),
        }
    }
}

impl Drop for ThinkingIndicator {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
