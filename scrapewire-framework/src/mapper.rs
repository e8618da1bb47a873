//! Declarative mapping from a raw snapshot to metric samples.
//!
//! An exporter declares its metrics once as an ordered table of
//! [`FieldSpec`] entries (field path, metric name, kind, extractor). One
//! generic routine, [`FieldTable::map`], evaluates every entry against a
//! snapshot. Missing or mistyped fields map to zero rather than failing the
//! whole mapping.
//!
//! # Example
//!
//! ```ignore
//! use scrapewire_framework::mapper::{Extract, FieldSpec, FieldTable};
//!
//! static FIELDS: &[FieldSpec] = &[
//!     FieldSpec::counter("uptime", "uptime", "Current uptime in seconds"),
//!     FieldSpec::gauge("cpu_percent", "CPU", "Average CPU usage").with(Extract::Mean),
//! ];
//!
//! let table = FieldTable::new("das2go", FIELDS);
//! let samples = table.map(&snapshot);
//! ```

use std::sync::Arc;

use scrapewire_common::{MetricDescriptor, MetricKind, MetricSample, RawSnapshot, RawValue};

/// How a field's value(s) are derived from the node at its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// The number at the path.
    Value,
    /// Number of elements of the list or object at the path.
    Count,
    /// Arithmetic mean of a numeric list.
    Mean,
    /// One sample per list element, labeled `{prefix}{index}`.
    Elements {
        label: &'static str,
        prefix: &'static str,
    },
    /// One sample per object entry, labeled by key, valued by `entry.field`.
    Entries {
        label: &'static str,
        field: &'static str,
    },
    /// Connection counts by state: established, listen, other and total.
    ConnectionStates { label: &'static str },
}

impl Extract {
    fn label_names(&self) -> &[&'static str] {
        match self {
            Extract::Value | Extract::Count | Extract::Mean => &[],
            Extract::Elements { label, .. }
            | Extract::Entries { label, .. }
            | Extract::ConnectionStates { label } => std::slice::from_ref(label),
        }
    }
}

/// One entry of a declarative field table.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Metric name, without namespace.
    pub name: &'static str,
    /// Dot-separated path into the snapshot (see [`RawValue::lookup`]).
    pub path: &'static str,
    pub help: &'static str,
    pub kind: MetricKind,
    pub extract: Extract,
}

impl FieldSpec {
    pub const fn gauge(name: &'static str, path: &'static str, help: &'static str) -> Self {
        Self {
            name,
            path,
            help,
            kind: MetricKind::Gauge,
            extract: Extract::Value,
        }
    }

    pub const fn counter(name: &'static str, path: &'static str, help: &'static str) -> Self {
        Self {
            name,
            path,
            help,
            kind: MetricKind::Counter,
            extract: Extract::Value,
        }
    }

    pub const fn with(self, extract: Extract) -> Self {
        Self { extract, ..self }
    }
}

/// A field table bound to a namespace, with descriptors built once.
#[derive(Debug, Clone)]
pub struct FieldTable {
    fields: Vec<(FieldSpec, Arc<MetricDescriptor>)>,
}

impl FieldTable {
    pub fn new(namespace: &str, specs: &[FieldSpec]) -> Self {
        let fields = specs
            .iter()
            .map(|spec| {
                let descriptor = MetricDescriptor::new(
                    namespace,
                    spec.name,
                    spec.help,
                    spec.kind,
                    spec.extract.label_names(),
                );
                (*spec, Arc::new(descriptor))
            })
            .collect();

        Self { fields }
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &MetricDescriptor> {
        self.fields.iter().map(|(_, d)| d.as_ref())
    }

    /// Evaluate every declared field against the snapshot.
    ///
    /// Pure: the result depends only on the snapshot and the table.
    pub fn map(&self, snapshot: &RawSnapshot) -> Vec<MetricSample> {
        let mut samples = Vec::with_capacity(self.fields.len());

        for (spec, descriptor) in &self.fields {
            let node = snapshot.lookup(spec.path);
            extract(spec.extract, node, descriptor, &mut samples);
        }

        samples
    }
}

fn extract(
    how: Extract,
    node: Option<&RawValue>,
    descriptor: &Arc<MetricDescriptor>,
    out: &mut Vec<MetricSample>,
) {
    let d = || descriptor.clone();

    match how {
        Extract::Value => {
            let value = node.and_then(RawValue::as_f64).unwrap_or(0.0);
            out.push(MetricSample::new(d(), value));
        }
        Extract::Count => {
            let count = node.and_then(RawValue::len).unwrap_or(0);
            out.push(MetricSample::new(d(), count as f64));
        }
        Extract::Mean => {
            let values = node.and_then(RawValue::as_list).unwrap_or_default();
            out.push(MetricSample::new(d(), mean(values)));
        }
        Extract::Elements { prefix, .. } => {
            let values = node.and_then(RawValue::as_list).unwrap_or_default();
            for (i, item) in values.iter().enumerate() {
                let value = item.as_f64().unwrap_or(0.0);
                out.push(MetricSample::labeled(d(), format!("{}{}", prefix, i), value));
            }
        }
        Extract::Entries { field, .. } => {
            if let Some(entries) = node.and_then(RawValue::as_object) {
                for (key, entry) in entries {
                    out.push(MetricSample::labeled(
                        d(),
                        key.clone(),
                        entry.number_or_zero(field),
                    ));
                }
            }
        }
        Extract::ConnectionStates { .. } => {
            let entries = node.and_then(RawValue::as_list).unwrap_or_default();
            let counts = classify_connections(entries);
            for (state, count) in counts.by_state() {
                out.push(MetricSample::labeled(d(), state.to_string(), count as f64));
            }
        }
    }
}

fn mean(values: &[RawValue]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum: f64 = values.iter().map(|v| v.as_f64().unwrap_or(0.0)).sum();
    sum / values.len() as f64
}

/// Connection counts by state category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionCounts {
    pub established: u64,
    pub listen: u64,
    pub other: u64,
}

impl ConnectionCounts {
    pub fn total(&self) -> u64 {
        self.established + self.listen + self.other
    }

    /// Category label and count, total last.
    pub fn by_state(&self) -> [(&'static str, u64); 4] {
        [
            ("established", self.established),
            ("listen", self.listen),
            ("other", self.other),
            ("total", self.total()),
        ]
    }
}

/// Classify connection entries by state.
///
/// An entry's state is an object's `status` field, a list's last element, or
/// the entry itself when it is a string. Entries without a recognizable state
/// count as `other`.
pub fn classify_connections(entries: &[RawValue]) -> ConnectionCounts {
    let mut counts = ConnectionCounts::default();

    for entry in entries {
        match connection_state(entry) {
            Some(s) if s.eq_ignore_ascii_case("ESTABLISHED") => counts.established += 1,
            Some(s) if s.eq_ignore_ascii_case("LISTEN") => counts.listen += 1,
            _ => counts.other += 1,
        }
    }

    counts
}

fn connection_state(entry: &RawValue) -> Option<&str> {
    match entry {
        RawValue::String(s) => Some(s),
        RawValue::Object(_) => entry.get("status").and_then(RawValue::as_str),
        RawValue::List(items) => items.last().and_then(RawValue::as_str),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static FIELDS: &[FieldSpec] = &[
        FieldSpec::counter("uptime", "uptime", "Current uptime in seconds"),
        FieldSpec::gauge("cpu_percent", "cpu_percent", "cpu percent of the server"),
        FieldSpec::gauge("memory_percent", "memory_percent", "Virtual memory usage"),
        FieldSpec::gauge("num_threads", "num_threads", "Number of threads"),
        FieldSpec::gauge("connections", "connections", "connection statuses")
            .with(Extract::ConnectionStates { label: "state" }),
    ];

    fn json(text: &str) -> RawValue {
        RawValue::from_json_slice(text.as_bytes()).unwrap()
    }

    fn value_of(samples: &[MetricSample], name: &str) -> Option<f64> {
        samples
            .iter()
            .find(|s| s.name() == name && s.label_values.is_empty())
            .map(|s| s.value)
    }

    fn labeled(samples: &[MetricSample], name: &str, label: &str) -> Option<f64> {
        samples
            .iter()
            .find(|s| s.name() == name && s.label_values.first().map(String::as_str) == Some(label))
            .map(|s| s.value)
    }

    #[test]
    fn test_missing_field_maps_to_zero() {
        let table = FieldTable::new("wmcore", FIELDS);
        let samples = table.map(&json("{}"));

        assert_eq!(value_of(&samples, "wmcore_memory_percent"), Some(0.0));
        assert_eq!(value_of(&samples, "wmcore_uptime"), Some(0.0));
        assert_eq!(labeled(&samples, "wmcore_connections", "total"), Some(0.0));
    }

    #[test]
    fn test_type_mismatch_maps_to_zero() {
        let table = FieldTable::new("wmcore", FIELDS);
        let samples = table.map(&json(
            r#"{"memory_percent": "high", "uptime": [1, 2], "connections": "many"}"#,
        ));

        assert_eq!(value_of(&samples, "wmcore_memory_percent"), Some(0.0));
        assert_eq!(value_of(&samples, "wmcore_uptime"), Some(0.0));
        assert_eq!(labeled(&samples, "wmcore_connections", "total"), Some(0.0));
    }

    #[test]
    fn test_literal_snapshot_round_trip() {
        let table = FieldTable::new("wmcore", FIELDS);
        let samples = table.map(&json(
            r#"{"uptime": 120.5, "cpu_percent": 42.0, "memory_percent": 17.3}"#,
        ));

        assert_eq!(value_of(&samples, "wmcore_uptime"), Some(120.5));
        assert_eq!(value_of(&samples, "wmcore_cpu_percent"), Some(42.0));
        assert_eq!(value_of(&samples, "wmcore_memory_percent"), Some(17.3));
        assert_eq!(value_of(&samples, "wmcore_num_threads"), Some(0.0));
        for state in ["established", "listen", "other", "total"] {
            assert_eq!(labeled(&samples, "wmcore_connections", state), Some(0.0));
        }
        assert_eq!(samples.len(), 8);
    }

    #[test]
    fn test_per_core_elements_and_mean() {
        static CPU: &[FieldSpec] = &[
            FieldSpec::gauge("cpu_percent", "CPU", "").with(Extract::Mean),
            FieldSpec::gauge("cores_percent", "CPU", "").with(Extract::Elements {
                label: "cores",
                prefix: "core-",
            }),
        ];
        let table = FieldTable::new("das2go", CPU);
        let samples = table.map(&json(r#"{"CPU": [10.0, 20.0, 30.0]}"#));

        assert_eq!(value_of(&samples, "das2go_cpu_percent"), Some(20.0));
        let cores: Vec<(String, f64)> = samples
            .iter()
            .filter(|s| s.name() == "das2go_cores_percent")
            .map(|s| (s.label_values[0].clone(), s.value))
            .collect();
        assert_eq!(
            cores,
            vec![
                ("core-0".to_string(), 10.0),
                ("core-1".to_string(), 20.0),
                ("core-2".to_string(), 30.0),
            ]
        );
    }

    #[test]
    fn test_mean_of_empty_list_is_zero() {
        static CPU: &[FieldSpec] = &[FieldSpec::gauge("cpu_percent", "CPU", "").with(Extract::Mean)];
        let table = FieldTable::new("das2go", CPU);
        let samples = table.map(&json(r#"{"CPU": []}"#));
        assert_eq!(value_of(&samples, "das2go_cpu_percent"), Some(0.0));
    }

    #[test]
    fn test_count_and_entries() {
        static SPECS: &[FieldSpec] = &[
            FieldSpec::gauge("open_files", "OpenFiles", "").with(Extract::Count),
            FieldSpec::counter("thrRequests", "*Server*.Worker Threads", "").with(Extract::Entries {
                label: "thread",
                field: "Requests",
            }),
        ];
        let table = FieldTable::new("cpy", SPECS);
        let samples = table.map(&json(
            r#"{
                "OpenFiles": [{"path": "/a"}, {"path": "/b"}, {"path": "/c"}],
                "CherryPy HTTPServer 1": {
                    "Worker Threads": {
                        "CP Server Thread-1": {"Requests": 5},
                        "CP Server Thread-2": {"Requests": "n/a"}
                    }
                }
            }"#,
        ));

        assert_eq!(value_of(&samples, "cpy_open_files"), Some(3.0));
        assert_eq!(
            labeled(&samples, "cpy_thrRequests", "CP Server Thread-1"),
            Some(5.0)
        );
        assert_eq!(
            labeled(&samples, "cpy_thrRequests", "CP Server Thread-2"),
            Some(0.0)
        );
    }

    #[test]
    fn test_connection_shapes() {
        let entries = json(
            r#"[
                {"status": "ESTABLISHED"},
                ["0.0.0.0", 8080, "LISTEN"],
                "established",
                {"status": "TIME_WAIT"},
                42
            ]"#,
        );
        let counts = classify_connections(entries.as_list().unwrap());

        assert_eq!(counts.established, 2);
        assert_eq!(counts.listen, 1);
        assert_eq!(counts.other, 2);
        assert_eq!(counts.total(), 5);
    }

    #[test]
    fn test_connection_classification_ignores_order() {
        let states = ["ESTABLISHED", "LISTEN", "CLOSE_WAIT", "ESTABLISHED", "LISTEN", "SYN_SENT"];
        let entries: Vec<RawValue> = states
            .iter()
            .map(|s| RawValue::object([("status", RawValue::from(*s))]))
            .collect();
        let expected = classify_connections(&entries);

        // Every rotation and the reversal of the list classify identically.
        for shift in 0..entries.len() {
            let mut rotated = entries.clone();
            rotated.rotate_left(shift);
            assert_eq!(classify_connections(&rotated), expected);
            rotated.reverse();
            assert_eq!(classify_connections(&rotated), expected);
        }
        assert_eq!(expected.total(), 6);
    }

    #[test]
    fn test_descriptors_follow_declaration_order() {
        let table = FieldTable::new("wmcore", FIELDS);
        let names: Vec<&str> = table.descriptors().map(|d| d.name.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "wmcore_uptime",
                "wmcore_cpu_percent",
                "wmcore_memory_percent",
                "wmcore_num_threads",
                "wmcore_connections",
            ]
        );
        assert_eq!(table.descriptors().count(), 5);
    }
}
