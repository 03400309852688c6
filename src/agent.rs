//! Run loop.
//!
//! Drives the whole pipeline: once per cycle the agent visits every
//! registered collector in order, drains its output into the parser,
//! forwards each parsed event, reaps the child, then sleeps for the
//! configured interval and starts over. No collector, line, or send
//! failure ever stops the loop.

use std::time::Duration;

use crate::forwarder::Forwarder;
use crate::protocol;
use crate::registry::CollectorRegistry;
use crate::runner::CollectorProcess;

/// The collector orchestration loop.
pub struct Agent {
    registry: CollectorRegistry,
    forwarder: Forwarder,
    interval: Duration,
    attached: bool,
}

impl Agent {
    /// Create an agent over a loaded registry and a connected forwarder.
    ///
    /// `attached` controls whether collector stderr reaches the terminal
    /// (foreground mode) or a discard sink (detached mode).
    pub fn new(
        registry: CollectorRegistry,
        forwarder: Forwarder,
        interval: Duration,
        attached: bool,
    ) -> Self {
        Self {
            registry,
            forwarder,
            interval,
            attached,
        }
    }

    /// Run cycles forever: collect, sleep, repeat.
    ///
    /// Never returns; termination is external (signal handling lives in
    /// the binary).
    pub async fn run(&mut self) {
        tracing::info!(
            collectors = self.registry.len(),
            interval = ?self.interval,
            endpoint = self.forwarder.endpoint(),
            "agent started"
        );

        loop {
            self.run_cycle().await;
            tracing::debug!(interval = ?self.interval, "cycle complete, sleeping");
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One full pass over the registry, strictly sequential: each
    /// collector is spawned, drained, and reaped before the next starts.
    pub async fn run_cycle(&mut self) {
        for command in self.registry.commands() {
            run_collector(&mut self.forwarder, command, self.attached).await;
        }
    }

    /// Best-effort close of the broker socket on shutdown.
    pub async fn shutdown(self) {
        self.forwarder.close().await;
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("collectors", &self.registry.len())
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

/// Run one collector to completion: spawn, forward every parsed output
/// line, reap, log the exit status.
///
/// Every failure here is recoverable: a spawn or read error abandons this
/// collector and the cycle moves on to the next one.
async fn run_collector(forwarder: &mut Forwarder, command: &str, attached: bool) {
    let mut process = match CollectorProcess::spawn(command, attached) {
        Ok(process) => process,
        Err(e) => {
            tracing::warn!(command, error = %e, "failed to start collector");
            return;
        }
    };

    let mut forwarded = 0u64;
    let mut dropped = 0u64;

    loop {
        match process.next_line().await {
            Ok(Some(line)) => match protocol::parse_line(&line) {
                Some(event) => {
                    if let Err(e) = forwarder.send(&event).await {
                        tracing::warn!(command, error = %e, "failed to forward event");
                    } else {
                        forwarded += 1;
                    }
                }
                // Malformed or unrecognized lines are dropped silently.
                None => dropped += 1,
            },
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(command, error = %e, "failed to read collector output");
                break;
            }
        }
    }

    match process.wait().await {
        Ok(status) if status.success() => {}
        Ok(status) => {
            // Non-zero exit is diagnostic only; events already forwarded
            // from this collector stand.
            tracing::warn!(command, code = status.code(), "collector exited with error");
        }
        Err(e) => tracing::warn!(command, error = %e, "failed to reap collector"),
    }

    tracing::debug!(command, forwarded, dropped, "collector drained");
}
