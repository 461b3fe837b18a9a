//! Delivery metrics.
//!
//! [`DeliveryMetrics`] counts send attempts by channel and status and sums
//! send durations by channel, using lock-free counters in `DashMap`s. It
//! renders itself in the Prometheus text exposition format for
//! `GET /metrics`.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;

const SENT_TOTAL: &str = "herald_notifications_sent_total";
const SEND_DURATION: &str = "herald_notification_send_duration_seconds";

/// Receives one observation per dispatch attempt.
pub trait MetricsSink: Send + Sync {
    fn observe_send(&self, channel: &str, status: &str, duration: Duration);
}

// ---------------------------------------------------------------------------
// DeliveryMetrics
// ---------------------------------------------------------------------------

/// In-process collector behind the Prometheus endpoint.
#[derive(Debug, Default)]
pub struct DeliveryMetrics {
    sent_total: DashMap<(String, String), AtomicU64>,
    duration_total_micros: DashMap<String, AtomicU64>,
    duration_count: DashMap<String, AtomicU64>,
}

/// Point-in-time copy of the counters, sorted by label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub sent: Vec<SendCount>,
    pub durations: Vec<DurationStat>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendCount {
    pub channel: String,
    pub status: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStat {
    pub channel: String,
    pub count: u64,
    pub total_seconds: f64,
}

impl DeliveryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut sent: Vec<SendCount> = self
            .sent_total
            .iter()
            .map(|entry| SendCount {
                channel: entry.key().0.clone(),
                status: entry.key().1.clone(),
                count: entry.value().load(Ordering::Relaxed),
            })
            .collect();
        sent.sort_by(|a, b| (&a.channel, &a.status).cmp(&(&b.channel, &b.status)));

        let mut durations: Vec<DurationStat> = self
            .duration_total_micros
            .iter()
            .map(|entry| {
                let channel = entry.key().clone();
                let count = self
                    .duration_count
                    .get(&channel)
                    .map(|c| c.load(Ordering::Relaxed))
                    .unwrap_or(0);
                DurationStat {
                    total_seconds: entry.value().load(Ordering::Relaxed) as f64 / 1_000_000.0,
                    channel,
                    count,
                }
            })
            .collect();
        durations.sort_by(|a, b| a.channel.cmp(&b.channel));

        MetricsSnapshot { sent, durations }
    }

    /// Render the counters in Prometheus text format.
    pub fn export_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = String::new();

        let _ = writeln!(out, "# HELP {SENT_TOTAL} Notification delivery attempts by channel and status.");
        let _ = writeln!(out, "# TYPE {SENT_TOTAL} counter");
        for s in &snapshot.sent {
            let _ = writeln!(
                out,
                "{SENT_TOTAL}{{channel=\"{}\",status=\"{}\"}} {}",
                escape_label(&s.channel),
                escape_label(&s.status),
                s.count
            );
        }

        let _ = writeln!(out, "# HELP {SEND_DURATION} Time spent in channel send calls.");
        let _ = writeln!(out, "# TYPE {SEND_DURATION} summary");
        for d in &snapshot.durations {
            let channel = escape_label(&d.channel);
            let _ = writeln!(out, "{SEND_DURATION}_sum{{channel=\"{channel}\"}} {}", d.total_seconds);
            let _ = writeln!(out, "{SEND_DURATION}_count{{channel=\"{channel}\"}} {}", d.count);
        }

        out
    }
}

impl MetricsSink for DeliveryMetrics {
    fn observe_send(&self, channel: &str, status: &str, duration: Duration) {
        self.sent_total
            .entry((channel.to_string(), status.to_string()))
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);

        let micros = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.duration_total_micros
            .entry(channel.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(micros, Ordering::Relaxed);
        self.duration_count
            .entry(channel.to_string())
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
    }
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
