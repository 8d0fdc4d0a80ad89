// SPDX-License-Identifier: MIT
//! Status aggregator — runs the fixed probe set and collects [`ProbeResult`]s.
//!
//! Probes are independent: each runs in its own task, so a hung or panicking
//! probe cannot block the others or suppress their results. Every invocation
//! is stateless — nothing persists between calls.

use crate::config::ServiceConfig;
use crate::probe::{DatabaseProbe, DependencyProbe, HttpProbe, ProbeKind, ProbeResult};
use std::sync::Arc;
use tracing::debug;

/// Runs all registered probes and aggregates the results.
pub struct StatusAggregator {
    probes: Vec<Arc<dyn DependencyProbe>>,
}

impl StatusAggregator {
    /// Create an aggregator with no probes registered.
    pub fn new() -> Self {
        Self { probes: Vec::new() }
    }

    /// Register a probe. Results come back in registration order.
    pub fn with_probe(mut self, probe: impl DependencyProbe + 'static) -> Self {
        self.probes.push(Arc::new(probe));
        self
    }

    /// The statically known probe set: the database plus the two egress APIs.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new()
            .with_probe(DatabaseProbe::new(config.database.clone()))
            .with_probe(HttpProbe::github())
            .with_probe(HttpProbe::cloudflare(
                config.egress.cloudflare_accept_invalid_certs,
            ))
    }

    /// Run every probe concurrently and return the results in registration
    /// order.
    ///
    /// Each probe runs in its own `tokio::spawn` task. A probe that panics is
    /// reported as unreachable in its slot; its peers are unaffected.
    pub async fn collect(&self) -> Vec<ProbeResult> {
        debug!("running {} dependency probes", self.probes.len());

        let handles: Vec<_> = self
            .probes
            .iter()
            .map(|probe| {
                let name = probe.name().to_string();
                let label = probe.label().to_string();
                let kind = probe.kind();
                let probe = Arc::clone(probe);
                (name, label, kind, tokio::spawn(async move { probe.run().await }))
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for (name, label, kind, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    results.push(ProbeResult::unreachable(
                        name,
                        label,
                        "",
                        kind,
                        format!("probe panicked: {e}"),
                    ));
                }
            }
        }
        results
    }
}

impl Default for StatusAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{DependencyProbe, ProbeResult};
    use async_trait::async_trait;

    struct OkProbe(&'static str);

    #[async_trait]
    impl DependencyProbe for OkProbe {
        fn name(&self) -> &str {
            self.0
        }

        fn label(&self) -> &str {
            "Stub"
        }

        fn kind(&self) -> ProbeKind {
            ProbeKind::Http
        }

        async fn run(&self) -> ProbeResult {
            ProbeResult::reachable(self.0, "Stub", "stub", ProbeKind::Http, "ok")
        }
    }

    struct PanickingProbe;

    #[async_trait]
    impl DependencyProbe for PanickingProbe {
        fn name(&self) -> &str {
            "broken"
        }

        fn label(&self) -> &str {
            "Broken"
        }

        fn kind(&self) -> ProbeKind {
            ProbeKind::Database
        }

        async fn run(&self) -> ProbeResult {
            panic!("probe blew up");
        }
    }

    struct SlowProbe;

    #[async_trait]
    impl DependencyProbe for SlowProbe {
        fn name(&self) -> &str {
            "slow"
        }

        fn label(&self) -> &str {
            "Slow"
        }

        fn kind(&self) -> ProbeKind {
            ProbeKind::Http
        }

        async fn run(&self) -> ProbeResult {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            ProbeResult::reachable("slow", "Slow", "stub", ProbeKind::Http, "ok")
        }
    }

    #[tokio::test]
    async fn results_come_back_in_registration_order() {
        let aggregator = StatusAggregator::new()
            .with_probe(SlowProbe)
            .with_probe(OkProbe("fast-one"))
            .with_probe(OkProbe("fast-two"));

        let results = aggregator.collect().await;
        let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["slow", "fast-one", "fast-two"]);
    }

    #[tokio::test]
    async fn panicking_probe_does_not_suppress_its_peers() {
        let aggregator = StatusAggregator::new()
            .with_probe(OkProbe("first"))
            .with_probe(PanickingProbe)
            .with_probe(OkProbe("last"));

        let results = aggregator.collect().await;
        assert_eq!(results.len(), 3);

        assert!(results[0].reachable);
        assert!(!results[1].reachable);
        assert_eq!(results[1].name, "broken");
        assert!(results[1].detail.starts_with("probe panicked"));
        assert!(results[2].reachable);
    }

    #[tokio::test]
    async fn empty_aggregator_collects_nothing() {
        let results = StatusAggregator::new().collect().await;
        assert!(results.is_empty());
    }
}
