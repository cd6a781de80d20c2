use crate::domain::ports::{ExpectOutcome, Interaction, Spawner};
use crate::utils::error::{CircleError, Result};
use regex::Regex;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::time::Instant;

const READ_CHUNK: usize = 4096;

/// Spawns real child processes with piped stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessSpawner;

impl Spawner for ProcessSpawner {
    type Session = ChildSession;

    fn spawn(&self, argv: &[String]) -> Result<ChildSession> {
        ChildSession::spawn(argv)
    }
}

/// Unconsumed program output, decoded as UTF-8.
#[derive(Debug, Default)]
struct OutputBuffer {
    text: String,
    pending: Vec<u8>,
    closed: bool,
}

impl OutputBuffer {
    /// Decodes a chunk, holding back a UTF-8 sequence split across reads.
    fn absorb(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);
        loop {
            match std::str::from_utf8(&self.pending) {
                Ok(text) => {
                    self.text.push_str(text);
                    self.pending.clear();
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    self.text
                        .push_str(&String::from_utf8_lossy(&self.pending[..valid]));
                    match e.error_len() {
                        Some(len) => {
                            self.text.push(char::REPLACEMENT_CHARACTER);
                            self.pending.drain(..valid + len);
                        }
                        None => {
                            self.pending.drain(..valid);
                            return;
                        }
                    }
                }
            }
        }
    }

    fn close(&mut self) {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.text.push_str(&String::from_utf8_lossy(&rest));
        }
        self.closed = true;
    }

    /// Consumes output up to the end of the first match.
    fn take_match(&mut self, pattern: &Regex) -> Option<String> {
        let (end, text) = pattern
            .find(&self.text)
            .map(|m| (m.end(), m.as_str().to_string()))?;
        self.text.drain(..end);
        Some(text)
    }
}

/// A running child whose stdout and stderr are merged into one text stream.
pub struct ChildSession {
    command: String,
    child: Child,
    stdin: Option<ChildStdin>,
    rx: mpsc::UnboundedReceiver<Vec<u8>>,
    output: OutputBuffer,
}

impl ChildSession {
    pub fn spawn(argv: &[String]) -> Result<Self> {
        let command = shell_words::join(argv);
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| CircleError::config("cannot spawn an empty command"))?;

        let mut child = Command::new(program)
            .args(args)
            .env("TERM", "dumb")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CircleError::CommandError {
                command: command.clone(),
                message: e.to_string(),
            })?;

        let missing = |stream: &str| CircleError::CommandError {
            command: command.clone(),
            message: format!("{} was not captured", stream),
        };
        let stdin = child.stdin.take().ok_or_else(|| missing("stdin"))?;
        let stdout = child.stdout.take().ok_or_else(|| missing("stdout"))?;
        let stderr = child.stderr.take().ok_or_else(|| missing("stderr"))?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(forward(stdout, tx.clone()));
        tokio::spawn(forward(stderr, tx));

        tracing::debug!("spawned {} (pid {:?})", command, child.id());

        Ok(Self {
            command,
            child,
            stdin: Some(stdin),
            rx,
            output: OutputBuffer::default(),
        })
    }

    /// Waits for the next chunk. Returns false once `deadline` passes.
    async fn pump(&mut self, deadline: Instant) -> bool {
        match tokio::time::timeout_at(deadline, self.rx.recv()).await {
            Ok(Some(chunk)) => {
                self.output.absorb(&chunk);
                true
            }
            Ok(None) => {
                self.output.close();
                true
            }
            Err(_) => false,
        }
    }
}

async fn forward<R: AsyncRead + Unpin>(mut reader: R, tx: mpsc::UnboundedSender<Vec<u8>>) {
    let mut buf = [0u8; READ_CHUNK];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if tx.send(buf[..n].to_vec()).is_err() {
                    break;
                }
            }
        }
    }
}

impl Interaction for ChildSession {
    async fn send_line(&mut self, data: &str) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| CircleError::CommandError {
                command: self.command.clone(),
                message: "stdin is closed".to_string(),
            })?;
        stdin.write_all(format!("{}\n", data).as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn expect(&mut self, pattern: &Regex, timeout: Duration) -> Result<ExpectOutcome> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(text) = self.output.take_match(pattern) {
                return Ok(ExpectOutcome::Matched(text));
            }
            if self.output.closed {
                return Ok(ExpectOutcome::Eof(std::mem::take(&mut self.output.text)));
            }
            if !self.pump(deadline).await {
                return Ok(ExpectOutcome::Timeout(self.output.text.clone()));
            }
        }
    }

    async fn expect_eof(&mut self, timeout: Duration) -> Result<ExpectOutcome> {
        let deadline = Instant::now() + timeout;
        while !self.output.closed {
            if !self.pump(deadline).await {
                return Ok(ExpectOutcome::Timeout(self.output.text.clone()));
            }
        }
        Ok(ExpectOutcome::Eof(std::mem::take(&mut self.output.text)))
    }

    async fn finish(mut self, timeout: Duration, force: bool) -> Result<Option<i32>> {
        // Closing stdin lets a program blocked on input see end of file.
        drop(self.stdin.take());

        if !force {
            if let Ok(status) = tokio::time::timeout(timeout, self.child.wait()).await {
                return Ok(status?.code());
            }
            tracing::debug!("{} still running after {:?}", self.command, timeout);
        }

        tracing::debug!("killing {}", self.command);
        if let Err(e) = self.child.kill().await {
            tracing::warn!("failed to kill {}: {}", self.command, e);
        }
        Ok(None)
    }
}
