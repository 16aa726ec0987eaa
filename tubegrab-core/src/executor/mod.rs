//! A tool for executing commands.
//!
//! Two modes are offered: [`Executor::execute`] runs the command to completion and captures
//! its output, [`Executor::stream`] hands back a [`RunningProcess`] whose merged output is
//! consumed line by line while the command runs.

use crate::error::{Error, Result};
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};

mod stream;

pub use stream::RunningProcess;

/// Represents a command executor.
///
/// # Example
///
/// ```rust,no_run
/// # use tubegrab_core::utils;
/// # use std::path::PathBuf;
/// # use std::time::Duration;
/// # use tubegrab_core::executor::Executor;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let args = vec!["--version"];
///
/// let executor = Executor {
///     executable_path: PathBuf::from("yt-dlp"),
///     timeout: Some(Duration::from_secs(30)),
///     args: utils::to_owned(args),
/// };
///
/// let output = executor.execute().await?;
/// println!("Output: {}", output.stdout);
///
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Executor {
    /// The path to the command executable.
    pub executable_path: PathBuf,
    /// The timeout for the process, `None` waits forever.
    pub timeout: Option<Duration>,

    /// The arguments to pass to the command.
    pub args: Vec<String>,
}

/// Represents the output of a process.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutput {
    /// The stdout of the process.
    pub stdout: String,
    /// The stderr of the process.
    pub stderr: String,
    /// The exit code of the process, -1 when it was killed by a signal.
    pub code: i32,
}

impl ProcessOutput {
    /// Returns true if the process exited with code 0.
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Returns stdout followed by stderr, for diagnostics.
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (_, true) => self.stdout.trim().to_string(),
            (true, false) => self.stderr.trim().to_string(),
            (false, false) => format!("{}\n{}", self.stdout.trim(), self.stderr.trim()),
        }
    }
}

impl Executor {
    /// Executes the command and returns its output, whatever the exit code is.
    ///
    /// # Errors
    ///
    /// This function will return an error if the command could not be started, or if the process timed out.
    pub async fn execute(&self) -> Result<ProcessOutput> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Executing command: {:?}", self);

        let mut child = self.spawn()?;

        // Continually read from both pipes so that a large JSON dump does not fill the pipe and hang.
        let stdout_handle = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("Failed to capture stdout"))?;
        let stderr_handle = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("Failed to capture stderr"))?;

        let stdout_task = tokio::spawn(async move {
            let mut buffer = Vec::new();
            tokio::io::copy(&mut tokio::io::BufReader::new(stdout_handle), &mut buffer).await?;
            Ok::<Vec<u8>, std::io::Error>(buffer)
        });

        let stderr_task = tokio::spawn(async move {
            let mut buffer = Vec::new();
            tokio::io::copy(&mut tokio::io::BufReader::new(stderr_handle), &mut buffer).await?;
            Ok::<Vec<u8>, std::io::Error>(buffer)
        });

        let exit_status = match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, child.wait()).await {
                Ok(result) => result?,
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("Process timed out after {:?}, killing it", timeout);

                    if let Err(_e) = child.kill().await {
                        #[cfg(feature = "tracing")]
                        tracing::error!("Failed to kill process after timeout: {}", _e);
                    }

                    return Err(Error::Timeout(timeout));
                }
            },
            None => child.wait().await?,
        };

        let stdout = collect(stdout_task).await?;
        let stderr = collect(stderr_task).await?;

        Ok(ProcessOutput {
            stdout,
            stderr,
            code: exit_status.code().unwrap_or(-1),
        })
    }

    /// Starts the command and returns a handle streaming its merged stdout and stderr lines.
    ///
    /// The timeout of the executor is not applied here, the caller owns the read loop.
    ///
    /// # Errors
    ///
    /// This function will return an error if the command could not be started.
    pub fn stream(&self) -> Result<RunningProcess> {
        #[cfg(feature = "tracing")]
        tracing::debug!("Streaming command: {:?}", self);

        let child = self.spawn()?;
        Ok(RunningProcess::attach(child))
    }

    fn spawn(&self) -> Result<Child> {
        let mut command = Command::new(&self.executable_path);
        command.stdin(Stdio::null());
        command.stdout(Stdio::piped());
        command.stderr(Stdio::piped());
        command.kill_on_drop(true);

        cfg_if::cfg_if! {
            if #[cfg(target_os = "windows")] {
                // CREATE_NO_WINDOW
                command.creation_flags(0x08000000);
            }
        }

        command.args(&self.args);
        command.spawn().map_err(|source| Error::ProcessSpawn {
            executable: self.executable_path.display().to_string(),
            source,
        })
    }
}

async fn collect(
    task: tokio::task::JoinHandle<std::result::Result<Vec<u8>, std::io::Error>>,
) -> Result<String> {
    let buffer = match task.await {
        Ok(result) => result?,
        Err(e) => return Err(Error::IO(std::io::Error::other(e))),
    };

    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::utils;
    use assert_matches::assert_matches;

    fn shell(script: &str) -> Executor {
        Executor {
            executable_path: PathBuf::from("/bin/sh"),
            timeout: Some(Duration::from_secs(10)),
            args: utils::to_owned(vec!["-c", script]),
        }
    }

    #[tokio::test]
    async fn execute_captures_both_pipes_and_code() {
        let output = shell("echo out; echo err >&2; exit 3")
            .execute()
            .await
            .unwrap();

        assert_eq!(output.stdout, "out\n");
        assert_eq!(output.stderr, "err\n");
        assert_eq!(output.code, 3);
        assert!(!output.success());
        assert_eq!(output.combined(), "out\nerr");
    }

    #[tokio::test]
    async fn execute_times_out() {
        let mut executor = shell("sleep 5");
        executor.timeout = Some(Duration::from_millis(100));

        let result = executor.execute().await;
        assert_matches!(result, Err(Error::Timeout(_)));
    }

    #[tokio::test]
    async fn missing_executable_is_a_spawn_error() {
        let executor = Executor {
            executable_path: PathBuf::from("/nonexistent/definitely-not-yt-dlp"),
            timeout: None,
            args: Vec::new(),
        };

        assert_matches!(
            executor.execute().await,
            Err(Error::ProcessSpawn { .. })
        );
        assert_matches!(executor.stream(), Err(Error::ProcessSpawn { .. }));
    }
}
