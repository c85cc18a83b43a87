//! External worker process speaking JSON lines.
//!
//! Each request is written to the child's stdin as one line of JSON; each
//! line the child prints on stdout must be one [`WorkerResponse`]. Malformed
//! output or an early exit is a critical error.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, unbounded};
use ttest_model::{WorkerRequest, WorkerResponse};

use super::{ChannelEvent, ComputeChannel};
use crate::error::ChannelError;

pub struct ProcessChannel {
    child: Child,
    stdin: Option<ChildStdin>,
    events: Receiver<ChannelEvent>,
    terminated: Arc<AtomicBool>,
}

impl ProcessChannel {
    /// Start `program` with `args` and attach to its stdio.
    ///
    /// A child that cannot be attached is killed before the error returns.
    pub fn spawn(program: &str, args: &[String]) -> Result<Self, ChannelError> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| spawn_error(format!("{program}: {e}")))?;

        match attach(&mut child) {
            Ok(attached) => {
                tracing::info!(program, pid = child.id(), "worker process started");
                Ok(Self {
                    child,
                    stdin: attached.stdin,
                    events: attached.events,
                    terminated: attached.terminated,
                })
            }
            Err(error) => {
                tracing::error!(program, %error, "failed to attach to worker process");
                reap(&mut child);
                Err(error)
            }
        }
    }
}

fn spawn_error(message: String) -> ChannelError {
    ChannelError::Spawn { message }
}

struct Attached {
    stdin: Option<ChildStdin>,
    events: Receiver<ChannelEvent>,
    terminated: Arc<AtomicBool>,
}

/// Take the child's pipes and start the stdout reader thread.
fn attach(child: &mut Child) -> Result<Attached, ChannelError> {
    let stdin = child.stdin.take();
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| spawn_error("worker stdout is not available".to_string()))?;

    let (event_tx, event_rx) = unbounded();
    let terminated = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&terminated);

    thread::Builder::new()
        .name("ttest-worker-reader".into())
        .spawn(move || read_responses(BufReader::new(stdout), &event_tx, &flag))
        .map_err(|e| spawn_error(e.to_string()))?;

    Ok(Attached {
        stdin,
        events: event_rx,
        terminated,
    })
}

/// Kill the child and wait for it so no zombie is left behind.
fn reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!(error = %e, "worker process already exited");
    }
    if let Err(e) = child.wait() {
        tracing::warn!(error = %e, "failed to reap worker process");
    }
}

fn read_responses(reader: impl BufRead, events: &Sender<ChannelEvent>, terminated: &AtomicBool) {
    for line in reader.lines() {
        if terminated.load(Ordering::Acquire) {
            return;
        }
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                let _ = events.send(ChannelEvent::CriticalError(format!(
                    "failed to read worker output: {e}"
                )));
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let event = match serde_json::from_str::<WorkerResponse>(&line) {
            Ok(response) => ChannelEvent::Response(response),
            Err(e) => ChannelEvent::CriticalError(format!("malformed worker output: {e}")),
        };
        let fatal = matches!(event, ChannelEvent::CriticalError(_));
        if events.send(event).is_err() || fatal {
            return;
        }
    }
    if !terminated.load(Ordering::Acquire) {
        let _ = events.send(ChannelEvent::CriticalError(
            "worker process exited unexpectedly".to_string(),
        ));
    }
}

impl ComputeChannel for ProcessChannel {
    fn send(&mut self, request: WorkerRequest) -> Result<(), ChannelError> {
        let stdin = self.stdin.as_mut().ok_or(ChannelError::Closed)?;
        let mut line = serde_json::to_string(&request).map_err(|e| ChannelError::Send {
            message: e.to_string(),
        })?;
        line.push('\n');
        stdin
            .write_all(line.as_bytes())
            .and_then(|()| stdin.flush())
            .map_err(|e| ChannelError::Send {
                message: e.to_string(),
            })
    }

    fn events(&self) -> Receiver<ChannelEvent> {
        self.events.clone()
    }

    fn terminate(&mut self) {
        if self.terminated.swap(true, Ordering::AcqRel) {
            return;
        }
        self.stdin = None;
        reap(&mut self.child);
        tracing::info!("worker process terminated");
    }
}

impl Drop for ProcessChannel {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use std::time::Duration;

    use ttest_model::{
        GroupDefinition, IndependentOptions, IndependentRequest, ResponseStatus, Variable,
    };

    use super::*;

    fn request() -> WorkerRequest {
        WorkerRequest::Independent(IndependentRequest {
            analysis_type: Vec::new(),
            variable: Variable::new("score", 0),
            data: Vec::new(),
            grouping_variable: Variable::new("group", 1),
            grouping_data: Vec::new(),
            options: IndependentOptions {
                group_definition: GroupDefinition::specified(1, 2),
                estimate_effect_size: false,
                confidence_level: 0.95,
            },
        })
    }

    fn shell(script: &str) -> ProcessChannel {
        ProcessChannel::spawn("sh", &["-c".to_string(), script.to_string()]).unwrap()
    }

    fn next(channel: &ProcessChannel) -> ChannelEvent {
        channel
            .events()
            .recv_timeout(Duration::from_secs(10))
            .unwrap()
    }

    #[test]
    fn forwards_json_line_responses() {
        let mut channel = shell(
            r#"read line; echo '{"status":"error","variableName":"score","error":"boom"}'; sleep 5"#,
        );
        channel.send(request()).unwrap();
        match next(&channel) {
            ChannelEvent::Response(response) => {
                assert_eq!(response.status, ResponseStatus::Error);
                assert_eq!(response.error.as_deref(), Some("boom"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        channel.terminate();
        channel.terminate();
    }

    #[test]
    fn echoed_request_is_malformed_output() {
        let mut channel = shell("head -n 1; sleep 5");
        channel.send(request()).unwrap();
        assert!(matches!(next(&channel), ChannelEvent::CriticalError(m) if m.starts_with("malformed")));
    }

    #[test]
    fn early_exit_is_critical() {
        let channel = shell("exit 0");
        assert!(matches!(next(&channel), ChannelEvent::CriticalError(m) if m.contains("exited")));
    }

    #[test]
    fn reap_kills_and_waits_for_a_running_child() {
        let mut child = Command::new("sleep")
            .arg("30")
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        reap(&mut child);
        let status = child.try_wait().unwrap().expect("child was reaped");
        assert!(!status.success());
    }

    #[test]
    fn attach_without_stdout_fails() {
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        let err = attach(&mut child).err().unwrap();
        assert!(matches!(err, ChannelError::Spawn { .. }));
        reap(&mut child);
    }

    #[test]
    fn missing_program_fails_to_spawn() {
        let err = ProcessChannel::spawn("/nonexistent/ttest-worker", &[]).err().unwrap();
        assert!(matches!(err, ChannelError::Spawn { .. }));
    }
}
