//! The publisher: one guarded scrape-map-render cycle per pull.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use scrapewire_common::exposition;
use scrapewire_common::{MetricDescriptor, MetricKind, MetricSample, ScrapeError};

use crate::mapper::{FieldSpec, FieldTable};
use crate::source::Source;

/// Statistics about an exporter's scrape cycles.
#[derive(Debug, Clone, Default)]
pub struct ExporterStats {
    /// Cycles run since start.
    pub scrapes: u64,
    /// Cycles whose fetch failed.
    pub failures: u64,
    /// Message of the most recent failure.
    pub last_error: Option<String>,
    /// Time of the most recent successful cycle.
    pub last_success: Option<DateTime<Utc>>,
}

/// The outcome of one scrape cycle.
#[derive(Debug)]
pub struct Cycle {
    /// Mapped samples followed by the exporter's own metrics.
    pub samples: Vec<MetricSample>,
    /// The fetch failure, if any.
    pub error: Option<ScrapeError>,
    /// Time spent fetching and mapping.
    pub duration: Duration,
    pub timestamp: DateTime<Utc>,
}

impl Cycle {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Descriptors for the metrics an exporter reports about itself.
#[derive(Debug)]
struct InternalMetrics {
    failures: Arc<MetricDescriptor>,
    scrapes: Arc<MetricDescriptor>,
    up: Arc<MetricDescriptor>,
    duration: Arc<MetricDescriptor>,
    timestamp: Arc<MetricDescriptor>,
}

impl InternalMetrics {
    fn new(namespace: &str) -> Self {
        let d = |name: &str, help: &str, kind| {
            Arc::new(MetricDescriptor::new(namespace, name, help, kind, &[]))
        };

        Self {
            failures: d(
                "scrape_failures_total",
                "Number of failed scrapes of the monitored source",
                MetricKind::Counter,
            ),
            scrapes: d(
                "scrapes_total",
                "Number of scrapes of the monitored source",
                MetricKind::Counter,
            ),
            up: d(
                "up",
                "Whether the last scrape of the monitored source succeeded",
                MetricKind::Gauge,
            ),
            duration: d(
                "scrape_duration_seconds",
                "Duration of the last scrape in seconds",
                MetricKind::Gauge,
            ),
            timestamp: d(
                "scrape_timestamp_seconds",
                "Unix time of the last scrape",
                MetricKind::Gauge,
            ),
        }
    }

    fn samples(
        &self,
        stats: &ExporterStats,
        up: bool,
        duration: Duration,
        timestamp: DateTime<Utc>,
    ) -> [MetricSample; 5] {
        [
            MetricSample::new(self.failures.clone(), stats.failures as f64),
            MetricSample::new(self.scrapes.clone(), stats.scrapes as f64),
            MetricSample::new(self.up.clone(), if up { 1.0 } else { 0.0 }),
            MetricSample::new(self.duration.clone(), duration.as_secs_f64()),
            MetricSample::new(
                self.timestamp.clone(),
                timestamp.timestamp_millis() as f64 / 1000.0,
            ),
        ]
    }
}

/// A source, its field table and the guard serializing their use.
///
/// The guard is held for fetch, map and render, so every published sample of
/// a cycle derives from one snapshot and concurrent pulls run back to back
/// instead of sharing or racing on a fetch.
pub struct Exporter<S: Source> {
    source: Mutex<S>,
    table: FieldTable,
    internal: InternalMetrics,
    stats: RwLock<ExporterStats>,
}

impl<S: Source> Exporter<S> {
    pub fn new(namespace: &str, source: S, fields: &[FieldSpec]) -> Self {
        Self {
            source: Mutex::new(source),
            table: FieldTable::new(namespace, fields),
            internal: InternalMetrics::new(namespace),
            stats: RwLock::new(ExporterStats::default()),
        }
    }

    pub fn table(&self) -> &FieldTable {
        &self.table
    }

    /// Run one cycle and return its samples.
    pub async fn collect(&self) -> Cycle {
        let mut source = self.source.lock().await;
        self.run_cycle(&mut source).await
    }

    /// Run one cycle and render it in exposition format.
    pub async fn render(&self) -> String {
        let mut source = self.source.lock().await;
        let cycle = self.run_cycle(&mut source).await;
        exposition::render(&cycle.samples)
    }

    pub fn stats(&self) -> ExporterStats {
        self.stats.read().clone()
    }

    async fn run_cycle(&self, source: &mut S) -> Cycle {
        let timestamp = Utc::now();
        let started = Instant::now();

        let (mut samples, error) = match source.fetch().await {
            Ok(snapshot) => {
                debug!(source = %source.describe(), kind = snapshot.type_name(), "Fetched snapshot");
                (self.table.map(&snapshot), None)
            }
            Err(e) => {
                warn!(
                    source = %source.describe(),
                    kind = e.kind(),
                    error = %e,
                    "Scrape failed"
                );
                let samples = e
                    .failure_snapshot()
                    .map(|snapshot| self.table.map(&snapshot))
                    .unwrap_or_default();
                (samples, Some(e))
            }
        };

        let duration = started.elapsed();

        let stats = {
            let mut stats = self.stats.write();
            stats.scrapes += 1;
            match error {
                Some(ref e) => {
                    stats.failures += 1;
                    stats.last_error = Some(e.to_string());
                }
                None => stats.last_success = Some(timestamp),
            }
            stats.clone()
        };

        samples.extend(
            self.internal
                .samples(&stats, error.is_none(), duration, timestamp),
        );

        Cycle {
            samples,
            error,
            duration,
            timestamp,
        }
    }
}

/// Type-erased view of an exporter for the HTTP layer.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Run one guarded cycle and render it.
    async fn render(&self) -> String;

    fn stats(&self) -> ExporterStats;
}

#[async_trait]
impl<S: Source> Collector for Exporter<S> {
    async fn render(&self) -> String {
        Exporter::render(self).await
    }

    fn stats(&self) -> ExporterStats {
        Exporter::stats(self)
    }
}

/// Thread-safe shared collector.
pub type SharedCollector = Arc<dyn Collector>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapper::Extract;
    use scrapewire_common::{RawSnapshot, RawValue};

    static FIELDS: &[FieldSpec] = &[
        FieldSpec::counter("uptime", "uptime", "Current uptime in seconds"),
        FieldSpec::gauge("memory_percent", "memory_percent", "Virtual memory usage"),
        FieldSpec::gauge("cores_percent", "CPU", "").with(Extract::Elements {
            label: "cores",
            prefix: "core-",
        }),
    ];

    /// Replays a fixed sequence of results.
    struct ScriptedSource {
        results: Vec<Result<RawSnapshot, ScrapeError>>,
    }

    #[async_trait]
    impl Source for ScriptedSource {
        fn describe(&self) -> String {
            "scripted".to_string()
        }

        async fn fetch(&mut self) -> Result<RawSnapshot, ScrapeError> {
            self.results.remove(0)
        }
    }

    fn value(cycle: &Cycle, name: &str) -> Option<f64> {
        cycle
            .samples
            .iter()
            .find(|s| s.name() == name)
            .map(|s| s.value)
    }

    #[tokio::test]
    async fn test_successful_cycle() {
        let snapshot = RawValue::object([
            ("uptime", RawValue::from(10.0)),
            ("CPU", RawValue::from(vec![RawValue::from(5.0)])),
        ]);
        let exporter = Exporter::new(
            "das2go",
            ScriptedSource {
                results: vec![Ok(snapshot)],
            },
            FIELDS,
        );

        let cycle = exporter.collect().await;

        assert!(cycle.is_success());
        assert_eq!(value(&cycle, "das2go_uptime"), Some(10.0));
        assert_eq!(value(&cycle, "das2go_memory_percent"), Some(0.0));
        assert_eq!(value(&cycle, "das2go_cores_percent"), Some(5.0));
        assert_eq!(value(&cycle, "das2go_up"), Some(1.0));
        assert_eq!(value(&cycle, "das2go_scrapes_total"), Some(1.0));
        assert_eq!(value(&cycle, "das2go_scrape_failures_total"), Some(0.0));
        assert!(exporter.stats().last_success.is_some());
    }

    #[tokio::test]
    async fn test_failed_cycle_maps_zeros_and_counts() {
        let exporter = Exporter::new(
            "das2go",
            ScriptedSource {
                results: vec![
                    Err(ScrapeError::transport("http://localhost:8217", "refused")),
                    Err(ScrapeError::transport("http://localhost:8217", "refused")),
                ],
            },
            FIELDS,
        );

        exporter.collect().await;
        let cycle = exporter.collect().await;

        assert!(matches!(cycle.error, Some(ScrapeError::Transport { .. })));
        assert_eq!(value(&cycle, "das2go_uptime"), Some(0.0));
        assert_eq!(value(&cycle, "das2go_memory_percent"), Some(0.0));
        assert_eq!(value(&cycle, "das2go_cores_percent"), None);
        assert_eq!(value(&cycle, "das2go_up"), Some(0.0));
        assert_eq!(value(&cycle, "das2go_scrape_failures_total"), Some(2.0));

        let stats = exporter.stats();
        assert_eq!(stats.failures, 2);
        assert!(stats.last_error.unwrap().contains("refused"));
    }

    #[tokio::test]
    async fn test_spawn_failure_publishes_only_internal_metrics() {
        let exporter = Exporter::new(
            "openstack",
            ScriptedSource {
                results: vec![Err(ScrapeError::CommandSpawn {
                    command: "/bin/missing".to_string(),
                    message: "not found".to_string(),
                })],
            },
            FIELDS,
        );

        let cycle = exporter.collect().await;

        let names: Vec<&str> = cycle.samples.iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "openstack_scrape_failures_total",
                "openstack_scrapes_total",
                "openstack_up",
                "openstack_scrape_duration_seconds",
                "openstack_scrape_timestamp_seconds",
            ]
        );
    }

    #[tokio::test]
    async fn test_render_exposition() {
        let exporter = Exporter::new(
            "das2go",
            ScriptedSource {
                results: vec![Ok(RawValue::object([("uptime", RawValue::from(3.5))]))],
            },
            FIELDS,
        );

        let text = exporter.render().await;

        assert!(text.contains("# TYPE das2go_uptime counter\n"));
        assert!(text.contains("das2go_uptime 3.5\n"));
        assert!(text.contains("das2go_up 1\n"));
    }
}
