use std::sync::{Arc, OnceLock};

use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};

/// Task-local observability counters for the record execution core.
#[derive(Clone, Debug)]
pub struct MetricsRegistry {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    registry: Registry,
    operator_records_in: CounterVec,
    operator_records_out: CounterVec,
    operator_records_trapped: CounterVec,
    raw_comparisons: CounterVec,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::new()),
        }
    }

    pub fn record_operator(&self, element: &str, records_in: u64, records_out: u64) {
        let labels = [element];
        self.inner
            .operator_records_in
            .with_label_values(&labels)
            .inc_by(records_in as f64);
        self.inner
            .operator_records_out
            .with_label_values(&labels)
            .inc_by(records_out as f64);
    }

    pub fn record_trapped(&self, element: &str, trap: &str, count: u64) {
        self.inner
            .operator_records_trapped
            .with_label_values(&[element, trap])
            .inc_by(count as f64);
    }

    pub fn record_raw_comparisons(&self, count: u64) {
        self.inner
            .raw_comparisons
            .with_label_values(&["group"])
            .inc_by(count as f64);
    }

    pub fn render_prometheus(&self) -> String {
        let metric_families = self.inner.registry.gather();
        let mut out = Vec::new();
        let enc = TextEncoder::new();
        if enc.encode(&metric_families, &mut out).is_err() {
            return String::new();
        }
        String::from_utf8_lossy(&out).to_string()
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsInner {
    fn new() -> Self {
        let registry = Registry::new();

        let operator_records_in = counter_vec(
            &registry,
            "grist_operator_records_in_total",
            "Input records processed per stack element",
            &["element"],
        );
        let operator_records_out = counter_vec(
            &registry,
            "grist_operator_records_out_total",
            "Output records emitted per stack element",
            &["element"],
        );
        let operator_records_trapped = counter_vec(
            &registry,
            "grist_operator_records_trapped_total",
            "Records diverted to a trap sink per stack element",
            &["element", "trap"],
        );
        let raw_comparisons = counter_vec(
            &registry,
            "grist_raw_comparisons_total",
            "Serialized record comparisons during shuffle sort",
            &["kind"],
        );

        Self {
            registry,
            operator_records_in,
            operator_records_out,
            operator_records_trapped,
            raw_comparisons,
        }
    }
}

fn counter_vec(registry: &Registry, name: &str, help: &str, labels: &[&str]) -> CounterVec {
    let c = CounterVec::new(Opts::new(name, help), labels).expect("counter vec");
    registry
        .register(Box::new(c.clone()))
        .expect("register counter");
    c
}

static GLOBAL_METRICS: OnceLock<MetricsRegistry> = OnceLock::new();

pub fn global_metrics() -> &'static MetricsRegistry {
    GLOBAL_METRICS.get_or_init(MetricsRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::MetricsRegistry;

    #[test]
    fn renders_prometheus_text() {
        let m = MetricsRegistry::new();
        m.record_operator("Each(upper)", 10, 8);
        m.record_trapped("Each(upper)", "bad-records", 2);
        m.record_raw_comparisons(3);
        let text = m.render_prometheus();
        assert!(text.contains("grist_operator_records_in_total"));
        assert!(text.contains("grist_operator_records_trapped_total"));
        assert!(text.contains("grist_raw_comparisons_total"));
        assert!(text.contains("Each(upper)"));
    }
}
