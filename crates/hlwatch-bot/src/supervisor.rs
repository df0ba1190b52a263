//! Restart-on-failure wrapper for the long-running loops.

use hlwatch_telemetry::Metrics;
use std::any::Any;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Aborts the wrapped task when dropped.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}

/// Run the task built by `task` forever.
///
/// Whenever the task panics or returns, `on_failure` is awaited with a
/// description of what happened, then the task is rebuilt after
/// `restart_delay`. Dropping the returned future aborts the running task.
pub async fn supervise<F, Fut, H, HFut>(
    name: &'static str,
    restart_delay: Duration,
    mut task: F,
    mut on_failure: H,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
    H: FnMut(String) -> HFut,
    HFut: Future<Output = ()>,
{
    loop {
        info!(task = name, "Starting supervised task");
        let mut guard = AbortOnDrop(tokio::spawn(task()));

        let reason = match (&mut guard.0).await {
            Ok(()) => "task exited unexpectedly".to_string(),
            Err(e) if e.is_panic() => panic_message(e.into_panic().as_ref()),
            Err(_) => {
                info!(task = name, "Supervised task cancelled");
                return;
            }
        };
        drop(guard);

        error!(
            task = name,
            reason = %reason,
            restart_in_secs = restart_delay.as_secs(),
            "Supervised task failed"
        );
        Metrics::task_restarted(name);
        on_failure(reason).await;
        tokio::time::sleep(restart_delay).await;
    }
}
