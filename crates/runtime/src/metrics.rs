use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use cr_core::Segment;

#[derive(Clone, Default)]
pub struct MetricsRegistry {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    transactions_read: AtomicU64,
    transactions_kept: AtomicU64,
    customers_scored: AtomicU64,
    segment_save: AtomicU64,
    segment_protect: AtomicU64,
    segment_nurture: AtomicU64,
    segment_let_go: AtomicU64,
    customers_selected: AtomicU64,
    scenarios_run: AtomicU64,
}

impl MetricsRegistry {
    pub fn inc_transactions_read(&self, delta: u64) {
        self.inner.transactions_read.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_transactions_kept(&self, delta: u64) {
        self.inner.transactions_kept.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_customers_scored(&self, delta: u64) {
        self.inner.customers_scored.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_segment(&self, segment: Segment) {
        let counter = match segment {
            Segment::Save => &self.inner.segment_save,
            Segment::Protect => &self.inner.segment_protect,
            Segment::Nurture => &self.inner.segment_nurture,
            Segment::LetGo => &self.inner.segment_let_go,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_customers_selected(&self, delta: u64) {
        self.inner.customers_selected.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn inc_scenarios_run(&self, delta: u64) {
        self.inner.scenarios_run.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            transactions_read: self.inner.transactions_read.load(Ordering::Relaxed),
            transactions_kept: self.inner.transactions_kept.load(Ordering::Relaxed),
            customers_scored: self.inner.customers_scored.load(Ordering::Relaxed),
            segment_save: self.inner.segment_save.load(Ordering::Relaxed),
            segment_protect: self.inner.segment_protect.load(Ordering::Relaxed),
            segment_nurture: self.inner.segment_nurture.load(Ordering::Relaxed),
            segment_let_go: self.inner.segment_let_go.load(Ordering::Relaxed),
            customers_selected: self.inner.customers_selected.load(Ordering::Relaxed),
            scenarios_run: self.inner.scenarios_run.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub transactions_read: u64,
    pub transactions_kept: u64,
    pub customers_scored: u64,
    pub segment_save: u64,
    pub segment_protect: u64,
    pub segment_nurture: u64,
    pub segment_let_go: u64,
    pub customers_selected: u64,
    pub scenarios_run: u64,
}

impl MetricsSnapshot {
    pub fn to_json_line(&self, label: &str, elapsed: Option<Duration>) -> String {
        #[derive(Serialize)]
        struct Line<'a> {
            label: &'a str,
            #[serde(flatten)]
            counters: &'a MetricsSnapshot,
            elapsed_ms: Option<u128>,
        }

        let payload = Line {
            label,
            counters: self,
            elapsed_ms: elapsed.map(|d| d.as_millis()),
        };
        serde_json::to_string(&payload).unwrap_or_else(|_| String::from("{}"))
    }
}

pub struct StageTimer {
    start: Instant,
}

impl StageTimer {
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
