//! Latency and payload-size instrumentation for backend operations.
//!
//! Observers are advisory: they are called after an operation has been
//! measured and can never change its outcome.

use std::fmt;
use std::time::Duration;

/// The kind of backend work that was measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Fetching the wire value from the service.
    Read,
    /// Parsing the wire value back into a record.
    Parse,
    /// Serializing a record and writing it to the service.
    Write,
}

impl Operation {
    /// Short lowercase name used in log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Parse => "parse",
            Operation::Write => "write",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One measured backend operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    /// What was measured.
    pub op: Operation,
    /// Namespace of the store that issued the operation.
    pub namespace: String,
    /// Caller-supplied id.
    pub id: String,
    /// Wire payload size in bytes (0 for a missing key).
    pub bytes: usize,
    /// Wall-clock duration.
    pub elapsed: Duration,
}

/// Receives measurements from a networked store.
pub trait StoreObserver: Send + Sync {
    /// Called once per measured operation.
    fn observe(&self, measurement: &Measurement);
}

/// Observer that drops every measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl StoreObserver for NoopObserver {
    fn observe(&self, _measurement: &Measurement) {}
}

/// Observer that reports measurements as `tracing` events.
///
/// Events go to the `shared_state_store::perf` target at info level and are
/// only emitted when perf logging is enabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver {
    enabled: bool,
}

impl TracingObserver {
    /// Create an observer that is on or off.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Create an observer driven by the `PERF_LOG` environment toggle.
    pub fn from_env() -> Self {
        Self::new(perf_log_enabled())
    }
}

impl StoreObserver for TracingObserver {
    fn observe(&self, m: &Measurement) {
        if !self.enabled {
            return;
        }
        tracing::info!(
            target: "shared_state_store::perf",
            op = m.op.as_str(),
            namespace = %m.namespace,
            id = %m.id,
            bytes = m.bytes,
            mib = m.bytes / (1024 * 1024),
            elapsed_ms = m.elapsed.as_secs_f64() * 1000.0,
            "{}:{} {}",
            m.namespace,
            m.id,
            m.op
        );
    }
}

/// Check the `PERF_LOG` environment toggle; any non-empty value enables it.
pub fn perf_log_enabled() -> bool {
    std::env::var("PERF_LOG")
        .map(|v| !v.is_empty())
        .unwrap_or(false)
}
