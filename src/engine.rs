use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::aggregate;
use crate::config::MonitorConfig;
use crate::error::ConfigError;
use crate::models::{ProbeOutcome, StatusRecord, Target};
use crate::probe::Prober;
use crate::registry::TargetRegistry;

/// Fans probes out over every registry target with a bounded number in flight.
pub struct Monitor<P> {
    prober: Arc<P>,
    concurrency_limiter: Arc<Semaphore>,
    max_concurrency: usize,
    ping_timeout: Duration,
    http_timeout: Duration,
}

impl<P: Prober + 'static> Monitor<P> {
    pub fn new(prober: Arc<P>, config: &MonitorConfig) -> Result<Self, ConfigError> {
        check_concurrency(config.max_concurrency)?;

        Ok(Self {
            prober,
            concurrency_limiter: Arc::new(Semaphore::new(config.max_concurrency)),
            max_concurrency: config.max_concurrency,
            ping_timeout: Duration::from_millis(config.ping_timeout_ms),
            http_timeout: Duration::from_millis(config.http_timeout_ms),
        })
    }

    /// Probes every target once. Pairs come back in completion order; only
    /// returns after every probe has finished.
    pub async fn probe_all(&self, registry: &TargetRegistry) -> Vec<(Target, ProbeOutcome)> {
        let start_time = std::time::Instant::now();
        let targets = registry.targets();
        let total = registry.target_count();
        info!("Probing {} targets with up to {} in flight", total, self.max_concurrency);

        let mut tasks = FuturesUnordered::new();
        for target in targets {
            let prober = Arc::clone(&self.prober);
            let limiter = Arc::clone(&self.concurrency_limiter);
            let address = target.id.clone();
            let uses_http = target.kind.uses_http();
            let timeout = if uses_http { self.http_timeout } else { self.ping_timeout };

            let handle = tokio::spawn(async move {
                let _permit = limiter.acquire_owned().await.ok();
                if uses_http {
                    prober.http(&address, timeout).await
                } else {
                    prober.ping(&address, timeout).await
                }
            });

            // The target stays out here so a panicked task still yields its row.
            tasks.push(async move {
                match handle.await {
                    Ok(outcome) => (target, outcome),
                    Err(e) => {
                        error!("Probe task for {} aborted: {}", target.id, e);
                        let reason = format!("Probe task aborted: {}", e);
                        (target, ProbeOutcome::Errored { reason })
                    }
                }
            });
        }

        let mut results = Vec::with_capacity(total);
        while let Some(pair) = tasks.next().await {
            results.push(pair);
        }

        info!("Sweep completed {} probes in {:.2}s.", total, start_time.elapsed().as_secs_f64());
        results
    }
}

fn check_concurrency(max_concurrency: usize) -> Result<(), ConfigError> {
    if max_concurrency == 0 {
        return Err(ConfigError::ZeroConcurrency);
    }
    if max_concurrency > Semaphore::MAX_PERMITS {
        return Err(ConfigError::ConcurrencyTooHigh {
            requested: max_concurrency,
            max: Semaphore::MAX_PERMITS,
        });
    }
    Ok(())
}

/// Every configuration check a sweep needs, with no network resources
/// touched. Callers build their prober only after this succeeds.
pub fn prepare(config: &MonitorConfig) -> Result<TargetRegistry, ConfigError> {
    check_concurrency(config.max_concurrency)?;
    TargetRegistry::from_config(config)
}

/// Probes a prepared registry and returns the ordered report rows.
pub async fn sweep_registry<P: Prober + 'static>(
    config: &MonitorConfig,
    registry: &TargetRegistry,
    prober: Arc<P>,
) -> Result<Vec<StatusRecord>, ConfigError> {
    let monitor = Monitor::new(prober, config)?;
    let pairs = monitor.probe_all(registry).await;
    Ok(aggregate::aggregate(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Status, TargetKind};
    use crate::registry::tests::sample_config;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Same ordering as the binary: validate, then probe.
    async fn sweep<P: Prober + 'static>(
        config: &MonitorConfig,
        prober: Arc<P>,
    ) -> Result<Vec<StatusRecord>, ConfigError> {
        let registry = prepare(config)?;
        sweep_registry(config, &registry, prober).await
    }

    /// Scripted prober: later targets answer first, listed ids are offline.
    #[derive(Default)]
    struct ScriptedProber {
        offline: HashSet<String>,
        panic_on: Option<String>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
        seen: Mutex<Vec<(String, Duration)>>,
    }

    impl ScriptedProber {
        fn offline(ids: &[&str]) -> Self {
            Self { offline: ids.iter().map(|s| s.to_string()).collect(), ..Default::default() }
        }

        async fn answer(&self, address: &str, timeout: Duration) -> ProbeOutcome {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen.lock().unwrap().push((address.to_string(), timeout));
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            if self.panic_on.as_deref() == Some(address) {
                panic!("scripted failure for {}", address);
            }
            tokio::time::sleep(Duration::from_millis(40u64.saturating_sub(call as u64 * 3))).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.offline.contains(address) {
                ProbeOutcome::Errored { reason: "scripted".into() }
            } else {
                ProbeOutcome::Online
            }
        }
    }

    #[async_trait]
    impl Prober for ScriptedProber {
        async fn ping(&self, address: &str, timeout: Duration) -> ProbeOutcome {
            self.answer(address, timeout).await
        }

        async fn http(&self, url: &str, timeout: Duration) -> ProbeOutcome {
            self.answer(url, timeout).await
        }
    }

    #[tokio::test]
    async fn one_record_per_target_in_canonical_order() {
        let config = sample_config();
        let prober = Arc::new(ScriptedProber::offline(&["192.168.10.26", "https://example.org"]));

        let records = sweep(&config, Arc::clone(&prober)).await.unwrap();

        assert_eq!(records.len(), 9);
        assert_eq!(prober.calls.load(Ordering::SeqCst), 9);
        let order: Vec<_> = records.iter().map(|r| (r.kind, r.target.as_str())).collect();
        assert_eq!(
            order,
            [
                (TargetKind::InfrastructureIp, "10.0.0.1"),
                (TargetKind::InfrastructureIp, "10.0.0.2"),
                (TargetKind::Website, "https://example.com"),
                (TargetKind::Website, "https://example.org"),
                (TargetKind::Website, "https://example.com"),
                (TargetKind::CameraIp, "192.168.10.25"),
                (TargetKind::CameraIp, "192.168.10.26"),
                (TargetKind::CameraIp, "192.168.10.27"),
                (TargetKind::NvrIp, "192.168.20.5"),
            ]
        );
        let offline: Vec<_> = records
            .iter()
            .filter(|r| r.status == Status::Offline)
            .map(|r| r.target.as_str())
            .collect();
        assert_eq!(offline, ["https://example.org", "192.168.10.26"]);
    }

    #[tokio::test]
    async fn probes_use_the_timeout_for_their_protocol() {
        let mut config = sample_config();
        config.ping_timeout_ms = 750;
        config.http_timeout_ms = 4000;
        let prober = Arc::new(ScriptedProber::default());

        sweep(&config, Arc::clone(&prober)).await.unwrap();

        for (address, timeout) in prober.seen.lock().unwrap().iter() {
            let expected = if address.starts_with("https://") { 4000 } else { 750 };
            assert_eq!(timeout.as_millis(), expected, "{}", address);
        }
    }

    #[tokio::test]
    async fn in_flight_probes_never_exceed_the_limit() {
        let mut config = sample_config();
        config.cameras.start = 1;
        config.cameras.end = 40;
        config.max_concurrency = 5;
        let prober = Arc::new(ScriptedProber::default());

        let records = sweep(&config, Arc::clone(&prober)).await.unwrap();

        assert_eq!(records.len(), 2 + 3 + 40 + 1);
        let peak = prober.peak_in_flight.load(Ordering::SeqCst);
        assert!(peak <= 5, "peak in flight was {}", peak);
        assert!(peak > 1, "probes did not overlap");
    }

    #[tokio::test]
    async fn config_error_aborts_before_any_probe() {
        let mut config = sample_config();
        config.infrastructure.push("10.9.9.9".into());
        let prober = Arc::new(ScriptedProber::default());

        let err = sweep(&config, Arc::clone(&prober)).await.unwrap_err();

        assert!(matches!(err, ConfigError::MissingMetadata(_)));
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_concurrency_is_rejected() {
        let mut config = sample_config();
        config.max_concurrency = 0;
        let prober = Arc::new(ScriptedProber::default());

        let err = sweep(&config, Arc::clone(&prober)).await.unwrap_err();

        assert!(matches!(err, ConfigError::ZeroConcurrency));
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn oversized_concurrency_is_rejected_before_any_call() {
        let mut config = sample_config();
        config.max_concurrency = Semaphore::MAX_PERMITS + 1;
        let prober = Arc::new(ScriptedProber::default());

        let err = sweep(&config, Arc::clone(&prober)).await.unwrap_err();

        assert!(matches!(err, ConfigError::ConcurrencyTooHigh { .. }));
        assert_eq!(prober.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn prepare_validates_without_a_prober() {
        assert_eq!(prepare(&sample_config()).unwrap().target_count(), 9);

        let mut config = sample_config();
        config.max_concurrency = 0;
        assert!(matches!(prepare(&config), Err(ConfigError::ZeroConcurrency)));

        let mut config = sample_config();
        config.infrastructure.push("10.9.9.9".into());
        assert!(matches!(prepare(&config), Err(ConfigError::MissingMetadata(_))));

        let mut config = sample_config();
        config.max_concurrency = Semaphore::MAX_PERMITS;
        assert!(prepare(&config).is_ok());
    }

    #[tokio::test]
    async fn panicking_probe_still_yields_an_offline_row() {
        let config = sample_config();
        let prober = Arc::new(ScriptedProber {
            panic_on: Some("10.0.0.2".into()),
            ..Default::default()
        });

        let records = sweep(&config, prober).await.unwrap();

        assert_eq!(records.len(), 9);
        assert_eq!(records[1].target, "10.0.0.2");
        assert_eq!(records[1].status, Status::Offline);
    }
}
