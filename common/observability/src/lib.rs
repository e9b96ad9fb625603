use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};

pub const OUTCOME_ADMITTED: &str = "admitted";
pub const OUTCOME_REJECTED: &str = "rejected";

pub const STAGE_VALIDATION: &str = "validation";
pub const STAGE_TOKEN: &str = "token";

/// Counters recorded by the invocation gate.
#[derive(Clone)]
pub struct GateMetrics {
    pub registry: Registry,
    pub invocations_total: IntCounterVec,
    pub rejections_total: IntCounterVec,
    pub admission_duration_seconds: Histogram,
}

impl GateMetrics {
    pub fn new() -> prometheus::Result<Self> {
        Self::with_registry(Registry::new())
    }

    pub fn with_registry(registry: Registry) -> prometheus::Result<Self> {
        let invocations_total = IntCounterVec::new(
            Opts::new(
                "gate_invocations_total",
                "Invocations seen by the gate, by admission outcome",
            ),
            &["outcome"],
        )?;
        let rejections_total = IntCounterVec::new(
            Opts::new(
                "gate_rejections_total",
                "Invocations rejected before the handler ran",
            ),
            &["stage", "code"],
        )?;
        let admission_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "gate_admission_duration_seconds",
                "Time spent validating and verifying an event",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        )?;

        registry.register(Box::new(invocations_total.clone()))?;
        registry.register(Box::new(rejections_total.clone()))?;
        registry.register(Box::new(admission_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            invocations_total,
            rejections_total,
            admission_duration_seconds,
        })
    }

    pub fn record_admitted(&self) {
        self.invocations_total
            .with_label_values(&[OUTCOME_ADMITTED])
            .inc();
    }

    pub fn record_rejected(&self, stage: &str, code: &str) {
        self.invocations_total
            .with_label_values(&[OUTCOME_REJECTED])
            .inc();
        self.rejections_total.with_label_values(&[stage, code]).inc();
    }

    pub fn admitted(&self) -> u64 {
        self.invocations_total
            .with_label_values(&[OUTCOME_ADMITTED])
            .get()
    }

    pub fn rejected(&self, stage: &str, code: &str) -> u64 {
        self.rejections_total.with_label_values(&[stage, code]).get()
    }

    /// Render the registry in the Prometheus text exposition format.
    pub fn encode(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_track_outcomes() {
        let metrics = GateMetrics::new().expect("metrics");
        metrics.record_admitted();
        metrics.record_rejected(STAGE_VALIDATION, "ValidationError");
        metrics.record_rejected(STAGE_VALIDATION, "ValidationError");

        assert_eq!(metrics.admitted(), 1);
        assert_eq!(metrics.rejected(STAGE_VALIDATION, "ValidationError"), 2);
        assert_eq!(metrics.rejected(STAGE_TOKEN, "InvalidToken"), 0);
    }

    #[test]
    fn encode_exposes_registered_series() {
        let metrics = GateMetrics::new().expect("metrics");
        metrics.record_rejected(STAGE_TOKEN, "MissingToken");
        metrics.admission_duration_seconds.observe(0.002);

        let text = metrics.encode().expect("encode");
        assert!(text.contains("gate_invocations_total{outcome=\"rejected\"} 1"));
        assert!(text.contains("gate_rejections_total{code=\"MissingToken\",stage=\"token\"} 1"));
        assert!(text.contains("gate_admission_duration_seconds_count 1"));
    }

    #[test]
    fn registering_twice_in_one_registry_fails() {
        let registry = Registry::new();
        GateMetrics::with_registry(registry.clone()).expect("first");
        assert!(GateMetrics::with_registry(registry).is_err());
    }
}
