//! Structured logging and lightweight metrics for cipher operations.
//!
//! Every public entry point emits a `tracing` span around its work and
//! records a count in [`CipherMetrics`]. Neither ever logs key material,
//! plaintext, or derived secrets — only sizes, durations, and outcomes.

use parking_lot::RwLock;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

/// A named cipher operation, for metrics bucketing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    KeyExpansion,
    EncryptCtr,
    DecryptCtr,
    AeadEncrypt,
    AeadDecrypt,
    KdfDerive,
}

impl Operation {
    fn label(self) -> &'static str {
        match self {
            Operation::KeyExpansion => "key_expansion",
            Operation::EncryptCtr => "encrypt_ctr",
            Operation::DecryptCtr => "decrypt_ctr",
            Operation::AeadEncrypt => "aead_encrypt",
            Operation::AeadDecrypt => "aead_decrypt",
            Operation::KdfDerive => "kdf_derive",
        }
    }
}

/// Running counts and average latency, one bucket per [`Operation`].
#[derive(Debug, Clone, Default)]
pub struct CipherMetrics {
    counts: [u64; 6],
    failures: [u64; 6],
    avg_duration_ms: [f64; 6],
}

impl CipherMetrics {
    /// Number of successful and failed calls recorded for `op`.
    pub fn counts_for(&self, op: Operation) -> (u64, u64) {
        let i = op as usize;
        (self.counts[i], self.failures[i])
    }

    fn record(&mut self, op: Operation, duration: Duration, failed: bool) {
        let i = op as usize;
        self.counts[i] += 1;
        if failed {
            self.failures[i] += 1;
        }
        let sample_ms = duration.as_secs_f64() * 1000.0;
        let n = self.counts[i] as f64;
        self.avg_duration_ms[i] += (sample_ms - self.avg_duration_ms[i]) / n;
    }
}

/// Shared metrics handle. Cheap to clone (an `Arc` around a `RwLock`).
#[derive(Clone, Default)]
pub struct CipherObservability {
    metrics: Arc<RwLock<CipherMetrics>>,
}

impl CipherObservability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start timing `op`. The returned guard records on drop (via
    /// [`OperationTimer::finish`] or [`OperationTimer::fail`]) and opens a
    /// `tracing::debug_span` for the duration of the call.
    pub fn start(&self, op: Operation) -> OperationTimer<'_> {
        let span = tracing::debug_span!("ruc_operation", op = op.label());
        let _entered = span.clone().entered();
        tracing::trace!(op = op.label(), "starting");
        OperationTimer {
            op,
            start: Instant::now(),
            observability: self,
            span,
        }
    }

    pub fn metrics(&self) -> CipherMetrics {
        self.metrics.read().clone()
    }
}

/// The process-wide observability handle every public entry point records
/// through. A single shared instance, not one per call, so metrics
/// accumulate across the whole process lifetime.
pub fn global() -> &'static CipherObservability {
    static INSTANCE: OnceLock<CipherObservability> = OnceLock::new();
    INSTANCE.get_or_init(CipherObservability::new)
}

/// Guard returned by [`CipherObservability::start`]. Must be finalized with
/// [`Self::finish`] or [`Self::fail`] — dropping it without doing so still
/// records a success, on the assumption the caller returned normally
/// through a `?` would have called `fail` first.
pub struct OperationTimer<'a> {
    op: Operation,
    start: Instant,
    observability: &'a CipherObservability,
    span: tracing::Span,
}

impl<'a> OperationTimer<'a> {
    /// Record a successful completion.
    pub fn finish(self, input_len: usize) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        tracing::debug!(op = self.op.label(), input_len, ?duration, "completed");
        self.observability.metrics.write().record(self.op, duration, false);
    }

    /// Record a failure. `reason` is logged but never the data that
    /// triggered it.
    pub fn fail(self, reason: &str) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();
        tracing::warn!(op = self.op.label(), reason, ?duration, "failed");
        self.observability.metrics.write().record(self.op, duration, true);
    }
}
