//! Collector line protocol.
//!
//! Collectors print one metric per line: a kind tag, whitespace-separated
//! tokens, and (for some kinds) a free-text remainder. This module parses
//! those lines into typed [`MetricEvent`]s and projects them back into the
//! frame sequence the broker expects.
//!
//! Timestamps and values are opaque string tokens: the agent passes them
//! through verbatim and never interprets them numerically.

/// A parsed metric event, ready for forwarding.
///
/// One variant per protocol kind. Events are transient: created by
/// [`parse_line`] and consumed immediately by the forwarder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetricEvent {
    /// State transition with a free-text summary (may be empty).
    State {
        timestamp: String,
        name: String,
        value: String,
        summary: String,
    },
    /// Counter increment; defaults to `"1"` when the line omits it.
    Counter {
        timestamp: String,
        name: String,
        increment: String,
    },
    /// Point-in-time sampled value.
    Sample {
        timestamp: String,
        name: String,
        value: String,
    },
    /// Rate measurement.
    Rate {
        timestamp: String,
        name: String,
        value: String,
    },
    /// Free-form event; detail defaults to `""` when omitted.
    Event {
        timestamp: String,
        name: String,
        detail: String,
    },
}

impl MetricEvent {
    /// Wire tag for this event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::State { .. } => "STATE",
            Self::Counter { .. } => "COUNTER",
            Self::Sample { .. } => "SAMPLE",
            Self::Rate { .. } => "RATE",
            Self::Event { .. } => "EVENT",
        }
    }

    /// Hierarchical, colon-delimited metric path (e.g. `host:memory:used`).
    pub fn name(&self) -> &str {
        match self {
            Self::State { name, .. }
            | Self::Counter { name, .. }
            | Self::Sample { name, .. }
            | Self::Rate { name, .. }
            | Self::Event { name, .. } => name,
        }
    }

    /// Timestamp token, verbatim from the collector.
    pub fn timestamp(&self) -> &str {
        match self {
            Self::State { timestamp, .. }
            | Self::Counter { timestamp, .. }
            | Self::Sample { timestamp, .. }
            | Self::Rate { timestamp, .. }
            | Self::Event { timestamp, .. } => timestamp,
        }
    }

    /// Data frames in wire order, tag first.
    ///
    /// `STATE` yields 5 frames, every other kind 4. The leading empty
    /// delimiter frame is the transport's concern, not part of the event.
    pub fn frames(&self) -> Vec<&str> {
        match self {
            Self::State {
                timestamp,
                name,
                value,
                summary,
            } => vec!["STATE", timestamp, name, value, summary],
            Self::Counter {
                timestamp,
                name,
                increment,
            } => vec!["COUNTER", timestamp, name, increment],
            Self::Sample {
                timestamp,
                name,
                value,
            } => vec!["SAMPLE", timestamp, name, value],
            Self::Rate {
                timestamp,
                name,
                value,
            } => vec!["RATE", timestamp, name, value],
            Self::Event {
                timestamp,
                name,
                detail,
            } => vec!["EVENT", timestamp, name, detail],
        }
    }
}

/// Parse one collector output line into a [`MetricEvent`].
///
/// Tokens are split on runs of whitespace; the first token selects the
/// kind. Returns `None` for unrecognized kinds and for lines missing a
/// required token — malformed lines are dropped, never errors, so the
/// caller can keep consuming the stream.
pub fn parse_line(line: &str) -> Option<MetricEvent> {
    let (tag, rest) = token(line)?;
    match tag {
        "STATE" => {
            let (timestamp, rest) = token(rest)?;
            let (name, rest) = token(rest)?;
            let (value, rest) = token(rest)?;
            Some(MetricEvent::State {
                timestamp: timestamp.to_owned(),
                name: name.to_owned(),
                value: value.to_owned(),
                summary: remainder(rest).to_owned(),
            })
        }
        "COUNTER" => {
            let (timestamp, rest) = token(rest)?;
            let (name, rest) = token(rest)?;
            let increment = remainder(rest);
            Some(MetricEvent::Counter {
                timestamp: timestamp.to_owned(),
                name: name.to_owned(),
                increment: if increment.is_empty() { "1" } else { increment }.to_owned(),
            })
        }
        "SAMPLE" => {
            let (timestamp, rest) = token(rest)?;
            let (name, rest) = token(rest)?;
            let (value, _) = token(rest)?;
            Some(MetricEvent::Sample {
                timestamp: timestamp.to_owned(),
                name: name.to_owned(),
                value: value.to_owned(),
            })
        }
        "RATE" => {
            let (timestamp, rest) = token(rest)?;
            let (name, rest) = token(rest)?;
            let (value, _) = token(rest)?;
            Some(MetricEvent::Rate {
                timestamp: timestamp.to_owned(),
                name: name.to_owned(),
                value: value.to_owned(),
            })
        }
        "EVENT" => {
            let (timestamp, rest) = token(rest)?;
            let (name, rest) = token(rest)?;
            Some(MetricEvent::Event {
                timestamp: timestamp.to_owned(),
                name: name.to_owned(),
                detail: remainder(rest).to_owned(),
            })
        }
        _ => None,
    }
}

/// Take the next whitespace-delimited token, returning it and the rest of
/// the input. `None` when only whitespace (or nothing) is left.
fn token(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    match input.find(char::is_whitespace) {
        Some(end) => Some((&input[..end], &input[end..])),
        None => Some((input, "")),
    }
}

/// Everything after the leading whitespace, kept verbatim.
fn remainder(input: &str) -> &str {
    input.trim_start()
}
