//! Skopos - Lightweight Telemetry Agent
//!
//! Skopos periodically runs a configured list of external collector
//! commands, parses their stdout line protocol into typed metric events,
//! and forwards each event as a multi-frame message to a metrics broker
//! over a ZeroMQ PUSH socket. Forwarding is best-effort: individual
//! collector, parse, or send failures are logged and never stop the loop.
//!
//! # Architecture
//!
//! - [`CollectorRegistry`]: ordered, bounded list of collector commands
//! - [`CollectorProcess`]: one child process per collector run, stdout piped
//! - [`protocol`]: line protocol parser producing [`MetricEvent`]s
//! - [`Forwarder`]: wire encoding and PUSH transport to the broker
//! - [`Agent`]: the collect/sleep cycle driving everything
//!
//! # Example
//!
//! ```rust,no_run
//! use skopos::{Agent, CollectorRegistry, Forwarder};
//! use std::time::Duration;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = CollectorRegistry::load("/etc/skopos.conf")?;
//! let forwarder = Forwarder::connect("tcp://127.0.0.1:2999").await?;
//! let mut agent = Agent::new(registry, forwarder, Duration::from_secs(30), true);
//! agent.run().await;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod forwarder;
pub mod protocol;
pub mod registry;
pub mod runner;

pub use agent::Agent;
pub use forwarder::{ForwardError, Forwarder};
pub use protocol::{parse_line, MetricEvent};
pub use registry::{CollectorRegistry, RegistryError, COMMAND_CAPACITY};
pub use runner::{CollectorProcess, RunnerError};
