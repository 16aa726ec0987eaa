//! Line streaming over a running child process.

use crate::error::Result;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::sync::mpsc;

/// The number of lines buffered between the pipe readers and the consumer.
const LINE_BUFFER: usize = 256;

/// A running process whose stdout and stderr are merged into one stream of lines.
///
/// Lines are delivered in arrival order. Carriage returns split lines as well, so progress
/// redrawn in place still shows up as separate lines. Invalid UTF-8 is replaced lossily.
///
/// The child is killed if the handle is dropped before the process exited.
#[derive(Debug)]
pub struct RunningProcess {
    child: Child,
    lines: mpsc::Receiver<String>,
}

impl RunningProcess {
    pub(crate) fn attach(mut child: Child) -> Self {
        let (sender, lines) = mpsc::channel(LINE_BUFFER);

        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(forward_lines(stdout, sender.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(stderr, sender));
        }

        Self { child, lines }
    }

    /// Returns the next line of output, or `None` once both pipes are closed.
    pub async fn next_line(&mut self) -> Option<String> {
        self.lines.recv().await
    }

    /// Waits for the process to exit and returns its exit code, -1 when killed by a signal.
    ///
    /// # Errors
    ///
    /// This function will return an error if the process status could not be read.
    pub async fn wait(&mut self) -> Result<i32> {
        let status = self.child.wait().await?;
        Ok(status.code().unwrap_or(-1))
    }

    /// Kills the process if it is still running. Failures are logged and swallowed.
    pub async fn terminate(&mut self) {
        match self.child.try_wait() {
            Ok(Some(_)) => {}
            _ => {
                if let Err(_e) = self.child.kill().await {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("Failed to terminate the downloader process: {}", _e);
                }
            }
        }
    }
}

async fn forward_lines<R>(reader: R, sender: mpsc::Sender<String>)
where
    R: AsyncRead + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();

    loop {
        buffer.clear();
        match reader.read_until(b'\n', &mut buffer).await {
            Ok(0) => break,
            Ok(_) => {
                let text = String::from_utf8_lossy(&buffer);
                for segment in text.split(|c: char| c == '\r' || c == '\n') {
                    if segment.trim().is_empty() {
                        continue;
                    }
                    if sender.send(segment.to_string()).await.is_err() {
                        // Consumer is gone, nothing left to deliver to.
                        return;
                    }
                }
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Failed to read downloader output: {}", _e);
                break;
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use crate::executor::Executor;
    use crate::utils;
    use std::path::PathBuf;

    #[tokio::test]
    async fn merges_stdout_and_stderr_lines() {
        let executor = Executor {
            executable_path: PathBuf::from("/bin/sh"),
            timeout: None,
            args: utils::to_owned(vec![
                "-c",
                "echo one; echo two >&2; printf 'three\\rfour\\n'",
            ]),
        };

        let mut process = executor.stream().unwrap();
        let mut lines = Vec::new();
        while let Some(line) = process.next_line().await {
            lines.push(line);
        }
        let code = process.wait().await.unwrap();

        assert_eq!(code, 0);
        lines.sort();
        assert_eq!(lines, vec!["four", "one", "three", "two"]);
    }

    #[tokio::test]
    async fn terminate_kills_a_running_process() {
        let executor = Executor {
            executable_path: PathBuf::from("/bin/sh"),
            timeout: None,
            args: utils::to_owned(vec!["-c", "sleep 30"]),
        };

        let mut process = executor.stream().unwrap();
        process.terminate().await;
        let code = process.wait().await.unwrap();

        assert_eq!(code, -1);
    }
}
