//! Request/response correlation over an unframed output stream.
//!
//! The interpreter's stdout carries no delimiters, so a response is whatever
//! arrives after a command is written: the first chunk, everything already
//! queued behind it, and anything that follows within the drain grace period.
//! Commands are written strictly one at a time, so the Nth response always
//! belongs to the Nth command.

use tracing::{debug, warn};

use frotzer_core::{OutputFilter, Result, TimingSettings};
use frotzer_process::ProcessHandle;

/// Correlates commands written to a process with the output they produce.
#[derive(Debug)]
pub struct Correlator<'a> {
    /// Process being driven
    process: &'a mut ProcessHandle,
    /// Filter applied to each response
    filter: OutputFilter,
    /// Response timeout and drain grace period
    timing: TimingSettings,
}

impl<'a> Correlator<'a> {
    /// Create a correlator for `process`.
    pub fn new(process: &'a mut ProcessHandle, filter: OutputFilter, timing: TimingSettings) -> Self {
        Self {
            process,
            filter,
            timing,
        }
    }

    /// Wait for output the process produces on its own, such as its banner.
    pub async fn await_output(&mut self) -> Result<String> {
        let bytes = self
            .process
            .output()
            .next_burst(self.timing.response_timeout(), self.timing.drain_grace())
            .await?;
        Ok(self.normalize(&bytes))
    }

    /// Send one command and return its response.
    pub async fn exchange(&mut self, command: &str) -> Result<String> {
        self.discard_stale();

        debug!("Sending command: {:?}", command);
        self.process.write_line(command).await?;

        let response = self.await_output().await?;
        debug!("Received response: {} chars", response.len());
        Ok(response)
    }

    /// Send every command in order and return one response per command.
    pub async fn correlate<I, S>(&mut self, commands: I) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut responses = Vec::new();
        for command in commands {
            responses.push(self.exchange(command.as_ref()).await?);
        }
        Ok(responses)
    }

    fn discard_stale(&mut self) {
        let stale = self.process.output().drain();
        if !stale.is_empty() {
            warn!(
                "Discarding {} bytes of unsolicited output: {:?}",
                stale.len(),
                String::from_utf8_lossy(&stale)
            );
        }
    }

    fn normalize(&self, bytes: &[u8]) -> String {
        self.filter.apply(&String::from_utf8_lossy(bytes))
    }
}
