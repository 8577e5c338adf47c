//! End-to-end tests for log and exec capture through the [`Engine`].
//!
//! A scripted in-memory runtime stands in for the Docker daemon:
//! 1. Unknown containers are rejected at attach / exec creation
//! 2. Exec requests reach the runtime with empty defaults
//! 3. Finite streams return complete output before the deadline
//! 4. Endless streams are cut at the deadline and closed exactly once

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use fluxnode_common::error::{FluxError, Result};
use fluxnode_common::types::{ContainerRef, ExecRequest};
use fluxnode_runtime::backend::{AttachedStream, ContainerRuntime, FrameStream, OutputFrame};
use fluxnode_runtime::engine::Engine;
use tokio::time::Instant;

/// What the scripted runtime streams back for a known container.
#[derive(Clone, Copy)]
enum Script {
    /// A few frames, then end of stream.
    Finite,
    /// One frame every 250 ms, forever.
    Endless,
}

struct ScriptedRuntime {
    container: &'static str,
    script: Script,
    closes: Arc<AtomicUsize>,
    execs: Mutex<Vec<ExecRequest>>,
}

impl ScriptedRuntime {
    fn new(container: &'static str, script: Script) -> Self {
        Self {
            container,
            script,
            closes: Arc::new(AtomicUsize::new(0)),
            execs: Mutex::new(Vec::new()),
        }
    }

    fn stream(&self) -> AttachedStream {
        let frames: FrameStream = match self.script {
            Script::Finite => {
                let items: Vec<Result<OutputFrame>> = vec![
                    Ok(OutputFrame::stdout("starting\n")),
                    Ok(OutputFrame::stderr("warning: low disk\n")),
                    Ok(OutputFrame::stdout("ready\n")),
                ];
                Box::pin(futures::stream::iter(items))
            }
            Script::Endless => Box::pin(futures::stream::unfold(0_u32, |n| async move {
                tokio::time::sleep(Duration::from_millis(250)).await;
                let frame: Result<OutputFrame> = Ok(OutputFrame::stdout(format!("line {n}\n")));
                Some((frame, n + 1))
            })),
        };
        let closes = Arc::clone(&self.closes);
        AttachedStream::new(frames).with_close_hook(Box::new(move || {
            Box::pin(async move {
                let _ = closes.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        }))
    }
}

#[async_trait]
impl ContainerRuntime for ScriptedRuntime {
    async fn attach_logs(&self, container: &ContainerRef) -> Result<AttachedStream> {
        if container.as_str() != self.container {
            return Err(FluxError::Attach {
                target: container.to_string(),
                message: format!("No such container: {container}"),
                status: Some(404),
            });
        }
        Ok(self.stream())
    }

    async fn exec(&self, request: &ExecRequest) -> Result<AttachedStream> {
        if request.container.as_str() != self.container {
            return Err(FluxError::ExecCreation {
                target: request.container.to_string(),
                message: format!("No such container: {}", request.container),
                status: Some(404),
            });
        }
        self.execs.lock().unwrap().push(request.clone());
        Ok(self.stream())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

fn engine(runtime: &Arc<ScriptedRuntime>) -> Engine {
    let runtime: Arc<dyn ContainerRuntime> = runtime.clone();
    Engine::new(runtime, Duration::from_secs(2))
}

// ── Attach failures ─────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn logs_of_unknown_container_fail_to_attach() {
    let runtime = Arc::new(ScriptedRuntime::new("web", Script::Finite));
    let err = engine(&runtime)
        .logs(&ContainerRef::new("ghost"))
        .await
        .unwrap_err();
    assert_eq!(err.name(), "AttachError");
    assert_eq!(err.code().as_deref(), Some("404"));
}

#[tokio::test(start_paused = true)]
async fn exec_in_unknown_container_fails_before_capture() {
    let runtime = Arc::new(ScriptedRuntime::new("web", Script::Finite));
    let request = ExecRequest::new(ContainerRef::new("ghost"), Some(vec!["ls".into()]), None);
    let err = engine(&runtime).exec(&request).await.unwrap_err();
    assert_eq!(err.name(), "ExecCreationError");
    assert!(runtime.execs.lock().unwrap().is_empty());
}

// ── Exec ─────────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn exec_forwards_request_with_empty_defaults() {
    let runtime = Arc::new(ScriptedRuntime::new("web", Script::Finite));
    let request = ExecRequest::new(ContainerRef::new("web"), None, None);
    let capture = engine(&runtime).exec(&request).await.unwrap();

    assert_eq!(capture.text, "starting\nwarning: low disk\nready\n");
    let seen = runtime.execs.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].cmd.is_empty());
    assert!(seen[0].env.is_empty());
}

#[tokio::test(start_paused = true)]
async fn finite_exec_returns_without_waiting_for_deadline() {
    let runtime = Arc::new(ScriptedRuntime::new("web", Script::Finite));
    let request = ExecRequest::new(
        ContainerRef::new("web"),
        Some(vec!["sh".into(), "-c".into(), "echo ready".into()]),
        Some(vec!["MODE=test".into()]),
    );
    let started = Instant::now();
    let capture = engine(&runtime).exec(&request).await.unwrap();
    assert!(!capture.truncated);
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(runtime.closes.load(Ordering::SeqCst), 0);
}

// ── Deadline ─────────────────────────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn endless_logs_are_truncated_at_deadline() {
    let runtime = Arc::new(ScriptedRuntime::new("web", Script::Endless));
    let started = Instant::now();
    let capture = engine(&runtime)
        .logs(&ContainerRef::new("web"))
        .await
        .unwrap();

    assert!(capture.truncated);
    assert!(started.elapsed() < Duration::from_millis(2250));
    // Frames at 250..=1750 ms; the one due at 2000 ms races the deadline.
    assert!(capture.text.starts_with("line 0\nline 1\n"));
    assert!(capture.text.contains("line 6\n"));
    assert!(!capture.text.contains("line 8\n"));

    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    assert_eq!(runtime.closes.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn concurrent_captures_are_independent() {
    let runtime = Arc::new(ScriptedRuntime::new("web", Script::Endless));
    let engine = engine(&runtime);
    let request = ExecRequest::new(ContainerRef::new("web"), Some(vec!["top".into()]), None);

    let container = ContainerRef::new("web");
    let (logs, exec) = tokio::join!(engine.logs(&container), engine.exec(&request));
    assert!(logs.unwrap().truncated);
    assert!(exec.unwrap().truncated);

    tokio::task::yield_now().await;
    tokio::task::yield_now().await;
    assert_eq!(runtime.closes.load(Ordering::SeqCst), 2);
}
