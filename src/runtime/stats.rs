//! Runtime counters.
//!
//! Updated concurrently by compiler threads, so every counter is atomic.
//! [`RuntimeStats::snapshot`] takes a plain copy for reporting.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct RuntimeStats {
    compile_requests: AtomicU64,
    compile_successes: AtomicU64,
    compile_failures: AtomicU64,
    /// Failures that came from a panicking compiler.
    compiler_panics: AtomicU64,
    installs: AtomicU64,
    invalidations: AtomicU64,
    installed_bytes: AtomicU64,
}

/// Point-in-time copy of [`RuntimeStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub compile_requests: u64,
    pub compile_successes: u64,
    pub compile_failures: u64,
    pub compiler_panics: u64,
    pub installs: u64,
    pub invalidations: u64,
    pub installed_bytes: u64,
}

impl RuntimeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_request(&self) {
        self.compile_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_success(&self) {
        self.compile_successes.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self, panicked: bool) {
        self.compile_failures.fetch_add(1, Ordering::Relaxed);
        if panicked {
            self.compiler_panics.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_install(&self, code_size: usize) {
        self.installs.fetch_add(1, Ordering::Relaxed);
        self.installed_bytes.fetch_add(code_size as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_invalidation(&self) {
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            compile_requests: self.compile_requests.load(Ordering::Relaxed),
            compile_successes: self.compile_successes.load(Ordering::Relaxed),
            compile_failures: self.compile_failures.load(Ordering::Relaxed),
            compiler_panics: self.compiler_panics.load(Ordering::Relaxed),
            installs: self.installs.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            installed_bytes: self.installed_bytes.load(Ordering::Relaxed),
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Runtime Statistics:")?;
        writeln!(f, "  Compile requests: {}", self.compile_requests)?;
        writeln!(f, "  Succeeded: {}", self.compile_successes)?;
        writeln!(f, "  Failed: {}", self.compile_failures)?;
        if self.compiler_panics > 0 {
            writeln!(f, "    of which compiler panics: {}", self.compiler_panics)?;
        }
        writeln!(f, "  Installed: {} ({} bytes)", self.installs, self.installed_bytes)?;
        writeln!(f, "  Invalidated: {}", self.invalidations)
    }
}

impl fmt::Display for RuntimeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.snapshot().fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_summary() {
        let stats = RuntimeStats::new();
        stats.record_request();
        stats.record_request();
        stats.record_success();
        stats.record_failure(true);
        stats.record_install(48);
        stats.record_invalidation();

        let snap = stats.snapshot();
        assert_eq!(snap.compile_requests, 2);
        assert_eq!(snap.compile_failures, 1);
        assert_eq!(snap.compiler_panics, 1);
        assert_eq!(snap.installed_bytes, 48);

        let text = stats.to_string();
        assert!(text.starts_with("Runtime Statistics:"));
        assert!(text.contains("of which compiler panics: 1"));
        assert!(text.contains("Installed: 1 (48 bytes)"));
    }
}
