use crate::imports::*;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/*
    Types:
    * TimerHandle - Cancels a scheduled task that has not fired yet
    * Debouncer - Trailing debounce: every schedule() cancels the pending one and restarts the delay

    Both the execution trigger and the snapshot sync use a Debouncer, each with their own delay.
    Once the delay has elapsed the task runs to completion; cancelling only affects the wait.
*/

#[derive(Debug, Clone)]
pub struct TimerHandle {
    token: CancellationToken,
}

impl TimerHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Runs `task` after `delay` unless the returned handle is cancelled first.
/// Without a tokio runtime there is nothing to drive the timer, so the task is dropped.
pub fn schedule<F>(delay: Duration, task: F) -> TimerHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    let token = CancellationToken::new();
    let handle = TimerHandle {
        token: token.clone(),
    };
    match tokio::runtime::Handle::try_current() {
        Ok(runtime) => {
            runtime.spawn(async move {
                tokio::select! {
                    _ = token.cancelled() => {
                        tracing::trace!("Scheduled task cancelled");
                    }
                    _ = tokio::time::sleep(delay) => task.await,
                }
            });
        }
        Err(_) => {
            tracing::warn!("No tokio runtime available, dropping scheduled task");
            token.cancel();
        }
    }
    handle
}

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<TimerHandle>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn schedule<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = schedule(self.delay, task);
        if let Some(previous) = self.pending.lock().replace(handle) {
            previous.cancel();
        }
    }

    pub fn cancel(&self) {
        if let Some(pending) = self.pending.lock().take() {
            pending.cancel();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
