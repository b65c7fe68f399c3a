//! Run-scoped handles for a started worker.

use crate::detector::ChangeDetector;
use crate::worker::event_loop::{EventLoop, Timers};
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;

pub(crate) struct LifecycleHandles {
    run_token: CancellationToken,
    loop_handle: JoinHandle<()>,
}

impl LifecycleHandles {
    /// Spawns the event loop under a child of `shutdown_root`, so cancelling the
    /// root from any context also ends the loop.
    pub(crate) fn spawn<D: ChangeDetector>(
        shutdown_root: &CancellationToken,
        event_loop: EventLoop<D>,
        timers: Timers,
    ) -> Self {
        let run_token = shutdown_root.child_token();
        let loop_handle = tokio::spawn(event_loop.run(timers, run_token.clone()));
        Self {
            run_token,
            loop_handle,
        }
    }

    pub(crate) fn cancel(&self) {
        self.run_token.cancel();
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.loop_handle.is_finished()
    }

    /// Cancels the loop and waits for the task to exit.
    pub(crate) async fn shutdown(self) -> Result<(), JoinError> {
        self.run_token.cancel();
        self.loop_handle.await
    }
}
