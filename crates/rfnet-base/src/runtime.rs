//! Process runtime for the base station.
//!
//! Device reads run on tokio's blocking pool and cannot be cancelled. Dropping
//! a runtime waits for them, so an idle radio would hold the process open
//! after Ctrl-C. The runtime built here is shut down with a bounded grace
//! period instead.

use crate::error::{BaseError, BaseResult};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// How long blocking work may delay process exit.
pub const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

/// Drive `future` on a current-thread runtime, then shut the runtime down
/// without waiting more than `grace` for outstanding blocking reads.
pub fn block_on_bounded<F: Future>(future: F, grace: Duration) -> BaseResult<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| BaseError::Runtime(e.to_string()))?;

    let output = runtime.block_on(future);
    debug!(grace_ms = grace.as_millis() as u64, "Shutting down runtime");
    runtime.shutdown_timeout(grace);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_returns_future_output() {
        let value = block_on_bounded(async { 7 }, SHUTDOWN_GRACE).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_pending_blocking_read_does_not_hold_exit() {
        let started = Instant::now();

        block_on_bounded(
            async {
                // Stands in for a device read that never completes.
                let _pending = tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_secs(30)));
                tokio::task::yield_now().await;
            },
            Duration::from_millis(100),
        )
        .unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
