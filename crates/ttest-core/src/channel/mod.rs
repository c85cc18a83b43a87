//! Compute channels: the seam between the orchestrator and the worker.
//!
//! A channel accepts [`WorkerRequest`]s and delivers [`ChannelEvent`]s on a
//! `crossbeam-channel` receiver. Exactly one channel is opened per run; all
//! units of work are pipelined through it.
//!
//! ```text
//! [Orchestrator] --send(request)--> [Channel] --> worker (thread | process)
//!       ^                                              |
//!       +------------- events(): Receiver <------------+
//! ```

mod process;
mod thread;

pub use process::ProcessChannel;
pub use thread::{ThreadChannel, UnitComputation};

use crossbeam_channel::Receiver;
use ttest_model::{WorkerRequest, WorkerResponse};

use crate::error::ChannelError;

/// Inbound event from a worker.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// Reply to exactly one request, successful or not.
    Response(WorkerResponse),
    /// The transport failed; no further responses will arrive.
    CriticalError(String),
}

/// A message-passing connection to a compute worker.
pub trait ComputeChannel: Send {
    /// Post one unit of work. Does not wait for the response.
    fn send(&mut self, request: WorkerRequest) -> Result<(), ChannelError>;

    /// Receiver of inbound events. Each call returns a handle to the same
    /// stream.
    fn events(&self) -> Receiver<ChannelEvent>;

    /// Stop the worker. Events not yet received are discarded. Calling it
    /// more than once is harmless.
    fn terminate(&mut self);
}

/// Opens one channel per analysis run.
pub trait ChannelFactory: Send {
    fn open(&mut self) -> Result<Box<dyn ComputeChannel>, ChannelError>;
}

impl<F> ChannelFactory for F
where
    F: FnMut() -> Result<Box<dyn ComputeChannel>, ChannelError> + Send,
{
    fn open(&mut self) -> Result<Box<dyn ComputeChannel>, ChannelError> {
        self()
    }
}
