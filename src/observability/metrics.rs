//! Thread-safe dispatch metrics
//!
//! Each [`Dispatcher`](crate::dispatch::Dispatcher) owns one collector. Atomic
//! counters track envelope outcomes; a mutex-protected map tracks per-handler
//! match counts and processing times.

use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Samples kept per handler before the oldest are dropped
const MAX_TIMING_SAMPLES: usize = 1000;

/// Thread-safe metrics collector using atomics and mutexes
#[derive(Debug)]
pub struct DispatchMetrics {
    envelopes_received: AtomicU64,
    envelopes_processed: AtomicU64,
    envelopes_failed: AtomicU64,
    envelopes_unrecognized: AtomicU64,
    envelopes_rejected: AtomicU64,
    handler_panics: AtomicU64,
    predicate_evaluations: AtomicU64,
    started_at: AtomicU64,

    handler_stats: Mutex<HashMap<String, HandlerStats>>,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self {
            envelopes_received: AtomicU64::new(0),
            envelopes_processed: AtomicU64::new(0),
            envelopes_failed: AtomicU64::new(0),
            envelopes_unrecognized: AtomicU64::new(0),
            envelopes_rejected: AtomicU64::new(0),
            handler_panics: AtomicU64::new(0),
            predicate_evaluations: AtomicU64::new(0),
            started_at: AtomicU64::new(current_timestamp()),
            handler_stats: Mutex::new(HashMap::new()),
        }
    }

    pub fn envelope_received(&self) {
        self.envelopes_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Envelope was already terminal when handed to the dispatcher
    pub fn envelope_rejected(&self) {
        self.envelopes_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn predicates_evaluated(&self, count: u64) {
        self.predicate_evaluations.fetch_add(count, Ordering::Relaxed);
    }

    pub fn envelope_processed(&self, handler: &str, duration: Duration) {
        self.envelopes_processed.fetch_add(1, Ordering::Relaxed);
        self.record_handler(handler, duration, true);
    }

    pub fn envelope_failed(&self, handler: &str, duration: Duration) {
        self.envelopes_failed.fetch_add(1, Ordering::Relaxed);
        self.record_handler(handler, duration, false);
    }

    /// Fallback reached; counted in addition to the failure itself
    pub fn envelope_unrecognized(&self) {
        self.envelopes_unrecognized.fetch_add(1, Ordering::Relaxed);
    }

    pub fn handler_panicked(&self) {
        self.handler_panics.fetch_add(1, Ordering::Relaxed);
    }

    /// Update handler statistics (pure function)
    fn update_handler_stats(stats: &mut HandlerStats, duration: Duration, success: bool) {
        stats.matches += 1;
        stats.last_match = current_timestamp();
        stats.processing_times_us.push_back(duration.as_micros() as u64);

        if stats.processing_times_us.len() > MAX_TIMING_SAMPLES {
            stats.processing_times_us.pop_front();
        }

        if !success {
            stats.failures += 1;
        }
    }

    fn record_handler(&self, handler: &str, duration: Duration, success: bool) {
        if let Ok(mut stats) = self.handler_stats.lock() {
            let entry = stats
                .entry(handler.to_string())
                .or_insert_with(|| HandlerStats::new(handler));
            Self::update_handler_stats(entry, duration, success);
        }
    }

    /// Handler names ordered by how often they matched, most frequent first
    ///
    /// A chain whose order follows this list wastes the fewest predicate
    /// evaluations. Ties are broken by name so the result is stable.
    pub fn frequency_order(&self) -> Vec<String> {
        let Ok(stats) = self.handler_stats.lock() else {
            return Vec::new();
        };

        let mut ranked: Vec<(&String, u64)> =
            stats.iter().map(|(name, s)| (name, s.matches)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.into_iter().map(|(name, _)| name.clone()).collect()
    }

    /// Create handler snapshot (pure function)
    fn create_handler_snapshot(stats: &HandlerStats) -> HandlerStatsSnapshot {
        let mut sorted: Vec<u64> = stats.processing_times_us.iter().copied().collect();
        sorted.sort_unstable();

        let avg = if sorted.is_empty() {
            0.0
        } else {
            sorted.iter().sum::<u64>() as f64 / sorted.len() as f64
        };

        HandlerStatsSnapshot {
            name: stats.name.clone(),
            matches: stats.matches,
            failures: stats.failures,
            avg_processing_time_us: avg,
            processing_time_p95_us: percentile(&sorted, 95.0),
            last_match: stats.last_match,
        }
    }

    /// Get complete metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let now = current_timestamp();

        let handlers = self
            .handler_stats
            .lock()
            .map(|stats| {
                stats
                    .iter()
                    .map(|(name, s)| (name.clone(), Self::create_handler_snapshot(s)))
                    .collect()
            })
            .unwrap_or_default();

        let received = self.envelopes_received.load(Ordering::Relaxed);
        let evaluations = self.predicate_evaluations.load(Ordering::Relaxed);

        MetricsSnapshot {
            envelopes: EnvelopeMetrics {
                received,
                processed: self.envelopes_processed.load(Ordering::Relaxed),
                failed: self.envelopes_failed.load(Ordering::Relaxed),
                unrecognized: self.envelopes_unrecognized.load(Ordering::Relaxed),
                rejected: self.envelopes_rejected.load(Ordering::Relaxed),
                handler_panics: self.handler_panics.load(Ordering::Relaxed),
            },
            predicate_evaluations: evaluations,
            avg_predicates_per_envelope: if received == 0 {
                0.0
            } else {
                evaluations as f64 / received as f64
            },
            handlers,
            uptime_seconds: now.saturating_sub(self.started_at.load(Ordering::Relaxed)),
            timestamp: now,
        }
    }

    /// Reset all metrics (useful for testing)
    pub fn reset(&self) {
        self.envelopes_received.store(0, Ordering::Relaxed);
        self.envelopes_processed.store(0, Ordering::Relaxed);
        self.envelopes_failed.store(0, Ordering::Relaxed);
        self.envelopes_unrecognized.store(0, Ordering::Relaxed);
        self.envelopes_rejected.store(0, Ordering::Relaxed);
        self.handler_panics.store(0, Ordering::Relaxed);
        self.predicate_evaluations.store(0, Ordering::Relaxed);
        self.started_at.store(current_timestamp(), Ordering::Relaxed);
        if let Ok(mut stats) = self.handler_stats.lock() {
            stats.clear();
        }
    }
}

impl Default for DispatchMetrics {
    fn default() -> Self {
        Self::new()
    }
}

// Internal per-handler statistics (with timing data)
#[derive(Debug)]
struct HandlerStats {
    name: String,
    matches: u64,
    failures: u64,
    processing_times_us: VecDeque<u64>,
    last_match: u64,
}

impl HandlerStats {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            matches: 0,
            failures: 0,
            processing_times_us: VecDeque::new(),
            last_match: 0,
        }
    }
}

// Public metrics structures
#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub envelopes: EnvelopeMetrics,
    pub predicate_evaluations: u64,
    pub avg_predicates_per_envelope: f64,
    pub handlers: HashMap<String, HandlerStatsSnapshot>,
    pub uptime_seconds: u64,
    pub timestamp: u64,
}

#[derive(Debug, Serialize)]
pub struct EnvelopeMetrics {
    pub received: u64,
    pub processed: u64,
    pub failed: u64,
    pub unrecognized: u64,
    pub rejected: u64,
    pub handler_panics: u64,
}

#[derive(Debug, Serialize)]
pub struct HandlerStatsSnapshot {
    pub name: String,
    pub matches: u64,
    pub failures: u64,
    pub avg_processing_time_us: f64,
    pub processing_time_p95_us: f64,
    pub last_match: u64,
}

// Helper functions
fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn percentile(sorted_data: &[u64], percentile: f64) -> f64 {
    if sorted_data.is_empty() {
        return 0.0;
    }

    let len = sorted_data.len();
    let index = (percentile / 100.0) * (len - 1) as f64;

    if index.fract() == 0.0 {
        sorted_data[index as usize] as f64
    } else {
        let lower_value = sorted_data[index.floor() as usize] as f64;
        let upper_value = sorted_data[index.ceil() as usize] as f64;

        lower_value + (upper_value - lower_value) * index.fract()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_envelope_counters() {
        let metrics = DispatchMetrics::new();

        metrics.envelope_received();
        metrics.predicates_evaluated(4);
        metrics.envelope_processed("user", Duration::from_micros(120));

        metrics.envelope_received();
        metrics.predicates_evaluated(26);
        metrics.envelope_unrecognized();
        metrics.envelope_failed("default", Duration::from_micros(10));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.envelopes.received, 2);
        assert_eq!(snapshot.envelopes.processed, 1);
        assert_eq!(snapshot.envelopes.failed, 1);
        assert_eq!(snapshot.envelopes.unrecognized, 1);
        assert_eq!(snapshot.predicate_evaluations, 30);
        assert_eq!(snapshot.avg_predicates_per_envelope, 15.0);
    }

    #[test]
    fn test_handler_stats() {
        let metrics = DispatchMetrics::new();

        metrics.envelope_processed("object", Duration::from_micros(500));
        metrics.envelope_failed("object", Duration::from_micros(300));

        let snapshot = metrics.snapshot();
        let object = snapshot.handlers.get("object").unwrap();
        assert_eq!(object.matches, 2);
        assert_eq!(object.failures, 1);
        assert_eq!(object.avg_processing_time_us, 400.0);
    }

    #[test]
    fn test_frequency_order() {
        let metrics = DispatchMetrics::new();
        for _ in 0..3 {
            metrics.envelope_processed("object", Duration::ZERO);
        }
        metrics.envelope_processed("user", Duration::ZERO);
        metrics.envelope_processed("action", Duration::ZERO);

        assert_eq!(metrics.frequency_order(), vec!["object", "action", "user"]);
    }

    #[test]
    fn test_thread_safety() {
        let metrics = Arc::new(DispatchMetrics::new());

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..100 {
                        metrics.envelope_received();
                        metrics.envelope_processed("user", Duration::from_micros(1));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.envelopes.received, 1000);
        assert_eq!(snapshot.handlers["user"].matches, 1000);
    }

    #[test]
    fn test_timing_samples_are_bounded() {
        let metrics = DispatchMetrics::new();
        for i in 0..1500 {
            metrics.envelope_processed("object", Duration::from_micros(i));
        }

        let stats = metrics.handler_stats.lock().unwrap();
        let samples = &stats["object"].processing_times_us;
        assert_eq!(samples.len(), MAX_TIMING_SAMPLES);
        assert_eq!(samples.front(), Some(&500));
        assert_eq!(samples.back(), Some(&1499));
        assert_eq!(stats["object"].matches, 1500);
    }

    #[test]
    fn test_percentile_calculation() {
        let data = vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        assert!((percentile(&data, 50.0) - 5.5).abs() < 0.1);
        assert!((percentile(&data, 100.0) - 10.0).abs() < 0.1);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn test_reset() {
        let metrics = DispatchMetrics::new();
        metrics.envelope_received();
        metrics.envelope_processed("user", Duration::ZERO);

        metrics.reset();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.envelopes.received, 0);
        assert!(snapshot.handlers.is_empty());
    }
}
