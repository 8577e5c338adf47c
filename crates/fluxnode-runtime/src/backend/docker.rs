//! Docker Engine backend built on `bollard`.
//!
//! The engine's 8-byte stream multiplexing header is decoded by `bollard`;
//! this module maps its `LogOutput` frames onto [`OutputFrame`] and runtime
//! failures onto the workspace error taxonomy.

use std::time::Duration;

use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{InspectContainerOptions, LogOutput, LogsOptions};
use bollard::errors::Error as DockerError;
use bollard::exec::{CreateExecOptions, StartExecOptions, StartExecResults};
use fluxnode_common::config::DockerConfig;
use fluxnode_common::error::{FluxError, Result};
use fluxnode_common::types::{ContainerRef, ExecRequest};
use futures::StreamExt;
use tokio::io::AsyncWriteExt;

use super::{AttachedStream, Channel, CloseHook, ContainerRuntime, OutputFrame};

/// Container runtime backed by the local Docker daemon.
#[derive(Debug, Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connects to the daemon using the configured socket, or the platform
    /// default (`DOCKER_HOST` or `/var/run/docker.sock`) when none is set.
    ///
    /// An explicit socket must exist on disk. No request is made, so a
    /// daemon that is not answering on an existing socket surfaces on first
    /// use.
    ///
    /// # Errors
    ///
    /// Returns [`FluxError::Config`] if the configured socket does not exist
    /// or the client cannot be constructed.
    pub fn connect(config: &DockerConfig) -> Result<Self> {
        let docker = match config.socket.as_deref() {
            Some(socket) => connect_socket(socket, config.timeout_secs)?,
            None => Docker::connect_with_local_defaults().map_err(|e| FluxError::Config {
                message: format!("cannot create docker client: {e}"),
            })?,
        };
        tracing::debug!(socket = ?config.socket, "docker client created");
        Ok(Self {
            docker: docker.with_timeout(Duration::from_secs(config.timeout_secs)),
        })
    }
}

#[cfg(unix)]
fn connect_socket(socket: &str, timeout_secs: u64) -> Result<Docker> {
    Docker::connect_with_unix(socket, timeout_secs, bollard::API_DEFAULT_VERSION).map_err(|e| {
        FluxError::Config {
            message: format!("cannot connect to docker socket {socket}: {e}"),
        }
    })
}

#[cfg(not(unix))]
fn connect_socket(socket: &str, _timeout_secs: u64) -> Result<Docker> {
    Err(FluxError::Config {
        message: format!("unix socket {socket} is not supported on this platform"),
    })
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn attach_logs(&self, container: &ContainerRef) -> Result<AttachedStream> {
        // The logs endpoint only reports an unknown container once polled, so
        // resolve it up front to fail before any capture begins.
        let _ = self
            .docker
            .inspect_container(container.as_str(), None::<InspectContainerOptions>)
            .await
            .map_err(|e| attach_error(container, &e))?;

        let options = LogsOptions::<String> {
            follow: true,
            stdout: true,
            stderr: true,
            ..Default::default()
        };
        let frames = self
            .docker
            .logs(container.as_str(), Some(options))
            .map(|item| item.map(OutputFrame::from).map_err(|e| stream_error(&e)));
        tracing::debug!(container = %container, "attached to log stream");
        Ok(AttachedStream::new(Box::pin(frames)))
    }

    async fn exec(&self, request: &ExecRequest) -> Result<AttachedStream> {
        let container = &request.container;
        let options = CreateExecOptions::<String> {
            attach_stdin: Some(true),
            attach_stdout: Some(true),
            attach_stderr: Some(true),
            tty: Some(false),
            cmd: Some(request.cmd.clone()),
            env: Some(request.env.clone()),
            ..Default::default()
        };
        let created = self
            .docker
            .create_exec(container.as_str(), options)
            .await
            .map_err(|e| FluxError::ExecCreation {
                target: container.to_string(),
                message: runtime_message(&e),
                status: runtime_status(&e),
            })?;
        tracing::debug!(container = %container, exec_id = %created.id, "exec created");

        let started = self
            .docker
            .start_exec(
                &created.id,
                Some(StartExecOptions {
                    detach: false,
                    tty: false,
                    output_capacity: None,
                }),
            )
            .await
            .map_err(|e| attach_error(container, &e))?;

        match started {
            StartExecResults::Attached { output, mut input } => {
                let frames =
                    output.map(|item| item.map(OutputFrame::from).map_err(|e| stream_error(&e)));
                let exec_id = created.id;
                let close: CloseHook = Box::new(move || {
                    Box::pin(async move {
                        tracing::debug!(exec_id = %exec_id, "closing exec stdin");
                        input.shutdown().await.map_err(|e| FluxError::Io {
                            path: format!("exec:{exec_id}").into(),
                            source: e,
                        })
                    })
                });
                Ok(AttachedStream::new(Box::pin(frames)).with_close_hook(close))
            }
            StartExecResults::Detached => Err(FluxError::Attach {
                target: container.to_string(),
                message: "exec started detached".into(),
                status: None,
            }),
        }
    }

    async fn ping(&self) -> Result<()> {
        let _ = self.docker.ping().await.map_err(|e| FluxError::Attach {
            target: "docker daemon".into(),
            message: runtime_message(&e),
            status: runtime_status(&e),
        })?;
        Ok(())
    }
}

impl From<LogOutput> for OutputFrame {
    fn from(output: LogOutput) -> Self {
        let (channel, bytes) = match output {
            LogOutput::StdOut { message } => (Channel::Stdout, message),
            LogOutput::StdErr { message } => (Channel::Stderr, message),
            LogOutput::StdIn { message } => (Channel::Stdin, message),
            LogOutput::Console { message } => (Channel::Console, message),
        };
        Self { channel, bytes }
    }
}

fn attach_error(container: &ContainerRef, err: &DockerError) -> FluxError {
    FluxError::Attach {
        target: container.to_string(),
        message: runtime_message(err),
        status: runtime_status(err),
    }
}

fn stream_error(err: &DockerError) -> FluxError {
    FluxError::Capture {
        message: runtime_message(err),
    }
}

const fn runtime_status(err: &DockerError) -> Option<u16> {
    match err {
        DockerError::DockerResponseServerError { status_code, .. } => Some(*status_code),
        _ => None,
    }
}

fn runtime_message(err: &DockerError) -> String {
    match err {
        DockerError::DockerResponseServerError { message, .. } => message.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn log_output_maps_to_channels() {
        let frame = OutputFrame::from(LogOutput::StdErr {
            message: Bytes::from_static(b"boom\n"),
        });
        assert_eq!(frame.channel, Channel::Stderr);
        assert_eq!(&frame.bytes[..], b"boom\n");

        let frame = OutputFrame::from(LogOutput::StdOut {
            message: Bytes::from_static(b"ok\n"),
        });
        assert_eq!(frame.channel, Channel::Stdout);
    }

    #[test]
    fn server_errors_keep_status_and_message() {
        let err = DockerError::DockerResponseServerError {
            status_code: 404,
            message: "No such container: web".into(),
        };
        let mapped = attach_error(&ContainerRef::new("web"), &err);
        match mapped {
            FluxError::Attach {
                target,
                message,
                status,
            } => {
                assert_eq!(target, "web");
                assert_eq!(message, "No such container: web");
                assert_eq!(status, Some(404));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn stream_failures_become_capture_errors() {
        let err = DockerError::DockerResponseServerError {
            status_code: 500,
            message: "stream reset".into(),
        };
        assert!(matches!(stream_error(&err), FluxError::Capture { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn explicit_socket_client_can_be_built() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("docker.sock");
        let _listener = std::os::unix::net::UnixListener::bind(&socket).unwrap();
        let config = DockerConfig {
            socket: Some(socket.to_string_lossy().into_owned()),
            timeout_secs: 5,
        };
        assert!(DockerRuntime::connect(&config).is_ok());
    }

    #[test]
    fn missing_socket_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let socket = dir.path().join("absent.sock");
        let config = DockerConfig {
            socket: Some(socket.to_string_lossy().into_owned()),
            timeout_secs: 5,
        };
        let err = DockerRuntime::connect(&config).unwrap_err();
        assert_eq!(err.name(), "ConfigError");
    }
}
