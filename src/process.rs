use chrono::Utc;
use std::process::Stdio;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::Error;
use crate::tasks::Execution;


/// A shell command whose stdout and stderr lines are collected in the
/// order they arrive.
#[derive(Debug)]
pub struct Process {
    inner: Mutex<ProcessState>,
}

impl Process {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(ProcessState { lines: vec![] }),
        }
    }

    pub async fn run(self: Arc<Self>, command: &str) -> Result<Execution, Error> {
        let start_time = Utc::now();
        let mut process = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| Error::CommandFailed(Arc::new(err)))?;

        let stdout = process.stdout.take()
            .map(|stdout| tokio::spawn(self.clone().collect(stdout)));
        let stderr = process.stderr.take()
            .map(|stderr| tokio::spawn(self.clone().collect(stderr)));

        let status = process.wait().await
            .map_err(|err| Error::CommandFailed(Arc::new(err)))?;

        for reader in [stdout, stderr].into_iter().flatten() {
            reader.await.map_err(|err| Error::Internal(err.to_string()))??;
        }

        let end_time = Utc::now();
        debug!("`{}` exited with {}", command, status);

        Ok(Execution {
            start_time,
            end_time,
            output: self.inner.lock().await.output(),
        })
    }

    async fn collect<R>(self: Arc<Self>, reader: R) -> Result<(), Error>
    where
        R: AsyncRead + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut line = Vec::new();
        loop {
            line.clear();
            let read = reader.read_until(b'\n', &mut line).await
                .map_err(|err| Error::CommandFailed(Arc::new(err)))?;
            if read == 0 {
                return Ok(());
            }

            // Output is not guaranteed to be UTF-8; keep what decodes.
            let decoded = String::from_utf8_lossy(&line);
            let text: &str = &decoded;
            let text = text.strip_suffix('\n').unwrap_or(text);
            let text = text.strip_suffix('\r').unwrap_or(text);
            self.inner.lock().await.lines.push(text.to_string());
        }
    }
}


#[derive(Debug)]
struct ProcessState {
    lines: Vec<String>,
}

impl ProcessState {
    fn output(&self) -> String {
        let mut text = String::new();
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }
}
