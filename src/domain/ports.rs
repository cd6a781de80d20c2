use crate::utils::error::Result;
use regex::Regex;
use std::time::Duration;

/// What an expect step saw. Each variant carries the text read for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpectOutcome {
    Matched(String),
    Eof(String),
    Timeout(String),
}

/// A running program that a script talks to.
pub trait Interaction: Send {
    fn send_line(&mut self, data: &str) -> impl std::future::Future<Output = Result<()>> + Send;

    fn expect(
        &mut self,
        pattern: &Regex,
        timeout: Duration,
    ) -> impl std::future::Future<Output = Result<ExpectOutcome>> + Send;

    fn expect_eof(
        &mut self,
        timeout: Duration,
    ) -> impl std::future::Future<Output = Result<ExpectOutcome>> + Send;

    /// Waits for the program to exit. With `force`, or when `timeout` elapses
    /// first, the program is killed and no exit status is reported.
    fn finish(
        self,
        timeout: Duration,
        force: bool,
    ) -> impl std::future::Future<Output = Result<Option<i32>>> + Send
    where
        Self: Sized;
}

pub trait Spawner: Send + Sync {
    type Session: Interaction;

    fn spawn(&self, argv: &[String]) -> Result<Self::Session>;
}
