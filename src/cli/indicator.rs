use std::io::{self, Write};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// Spinner shown while waiting for the first reply fragment.
pub struct ThinkingIndicator {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl ThinkingIndicator {
    pub fn start() -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(FRAME_INTERVAL);
            let mut frame = 0usize;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let mut stdout = io::stdout();
                        let _ = write!(stdout, "\r{} thinking...", FRAMES[frame % FRAMES.len()]);
                        let _ = stdout.flush();
                        frame += 1;
                    }
                }
            }
            let mut stdout = io::stdout();
            let _ = write!(stdout, "\r\x1b[2K");
            let _ = stdout.flush();
        });
        Self { cancel, handle }
    }

    /// Cancel the spinner and wait until its line is cleared.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(err) = self.handle.await {
            tracing::debug!("Indicator task ended abnormally: {err}");
        }
    }
}
