//! In-process worker thread.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};
use ttest_model::{UnitResults, WorkerRequest, WorkerResponse};

use super::{ChannelEvent, ComputeChannel};
use crate::error::ChannelError;

/// The statistics engine run by a [`ThreadChannel`].
///
/// Returns the raw results for one unit, or an error message that becomes a
/// per-unit failure.
pub trait UnitComputation: Send + Sync + 'static {
    fn compute(&self, request: &WorkerRequest) -> Result<UnitResults, String>;
}

impl<F> UnitComputation for F
where
    F: Fn(&WorkerRequest) -> Result<UnitResults, String> + Send + Sync + 'static,
{
    fn compute(&self, request: &WorkerRequest) -> Result<UnitResults, String> {
        self(request)
    }
}

/// Runs a [`UnitComputation`] on a dedicated thread, one request at a time in
/// arrival order.
///
/// A panic inside the computation is reported as a critical error.
pub struct ThreadChannel {
    requests: Option<Sender<WorkerRequest>>,
    events: Receiver<ChannelEvent>,
    terminated: Arc<AtomicBool>,
}

impl ThreadChannel {
    pub fn spawn(computation: Arc<dyn UnitComputation>) -> Result<Self, ChannelError> {
        let (request_tx, request_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        let terminated = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&terminated);

        thread::Builder::new()
            .name("ttest-worker".into())
            .spawn(move || worker_loop(computation.as_ref(), &request_rx, &event_tx, &flag))
            .map_err(|e| ChannelError::Spawn {
                message: e.to_string(),
            })?;
        tracing::debug!("worker thread started");

        Ok(Self {
            requests: Some(request_tx),
            events: event_rx,
            terminated,
        })
    }
}

fn worker_loop(
    computation: &dyn UnitComputation,
    requests: &Receiver<WorkerRequest>,
    events: &Sender<ChannelEvent>,
    terminated: &AtomicBool,
) {
    while let Ok(request) = requests.recv() {
        if terminated.load(Ordering::Acquire) {
            break;
        }
        let response = match catch_unwind(AssertUnwindSafe(|| computation.compute(&request))) {
            Ok(Ok(results)) => WorkerResponse::success(&request, results),
            Ok(Err(message)) => WorkerResponse::failure(&request, message),
            Err(_) => {
                let _ = events.send(ChannelEvent::CriticalError(format!(
                    "worker panicked while computing {}",
                    request.unit_label()
                )));
                break;
            }
        };
        if terminated.load(Ordering::Acquire) {
            break;
        }
        // Receiver dropped means nobody is listening anymore.
        if events.send(ChannelEvent::Response(response)).is_err() {
            break;
        }
    }
    tracing::debug!("worker thread stopped");
}

impl ComputeChannel for ThreadChannel {
    fn send(&mut self, request: WorkerRequest) -> Result<(), ChannelError> {
        let sender = self.requests.as_ref().ok_or(ChannelError::Closed)?;
        sender.send(request).map_err(|e| ChannelError::Send {
            message: e.to_string(),
        })
    }

    fn events(&self) -> Receiver<ChannelEvent> {
        self.events.clone()
    }

    fn terminate(&mut self) {
        self.terminated.store(true, Ordering::Release);
        // Dropping the sender ends the worker loop once the current unit is done.
        self.requests = None;
    }
}

impl Drop for ThreadChannel {
    fn drop(&mut self) {
        self.terminate();
    }
}
