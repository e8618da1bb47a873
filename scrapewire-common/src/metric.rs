//! Metric descriptors, samples and Prometheus naming rules.

use std::sync::Arc;

/// Prometheus metric type of an exported metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl MetricKind {
    /// Keyword used on the `# TYPE` line.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
        }
    }
}

/// Immutable declaration of one exported metric.
///
/// Identity is the fully-qualified name (namespace + metric name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: String,
    pub help: String,
    pub kind: MetricKind,
    pub label_names: Vec<String>,
}

impl MetricDescriptor {
    pub fn new(
        namespace: &str,
        name: &str,
        help: impl Into<String>,
        kind: MetricKind,
        label_names: &[&str],
    ) -> Self {
        Self {
            name: build_metric_name(namespace, name),
            help: help.into(),
            kind,
            label_names: label_names.iter().map(|l| sanitize_label_name(l)).collect(),
        }
    }
}

/// One value of a metric for one combination of label values.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub descriptor: Arc<MetricDescriptor>,
    pub label_values: Vec<String>,
    pub value: f64,
}

impl MetricSample {
    pub fn new(descriptor: Arc<MetricDescriptor>, value: f64) -> Self {
        Self {
            descriptor,
            label_values: Vec::new(),
            value,
        }
    }

    pub fn labeled(descriptor: Arc<MetricDescriptor>, label_value: String, value: f64) -> Self {
        Self {
            descriptor,
            label_values: vec![label_value],
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Label name/value pairs in declaration order.
    pub fn labels(&self) -> impl Iterator<Item = (&str, &str)> {
        self.descriptor
            .label_names
            .iter()
            .map(String::as_str)
            .zip(self.label_values.iter().map(String::as_str))
    }

    /// Value of the named label, if this sample carries it.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels().find(|(k, _)| *k == name).map(|(_, v)| v)
    }
}

/// Replace every character rejected by `valid` with `_`, collapse underscore
/// runs and trim trailing underscores.
fn squash(name: &str, valid: impl Fn(char) -> bool) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    for c in name.chars() {
        let c = if valid(c) { c } else { '_' };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out.truncate(out.trim_end_matches('_').len());
    out
}

/// Make `name` a valid metric name (`[a-zA-Z_:][a-zA-Z0-9_:]*`).
///
/// Status pages use keys like `Bytes Read` or `Accepts/sec`; these become
/// `Bytes_Read` and `Accepts_sec`.
pub fn sanitize_metric_name(name: &str) -> String {
    let mut out = squash(name, |c| c.is_ascii_alphanumeric() || c == '_' || c == ':');
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.is_empty() {
        out.push_str("unnamed");
    }
    out
}

/// Make `name` a valid label name (`[a-zA-Z_][a-zA-Z0-9_]*`).
///
/// Underscore runs are collapsed, so the result never uses the reserved
/// `__` prefix.
pub fn sanitize_label_name(name: &str) -> String {
    let mut out = squash(name, |c| c.is_ascii_alphanumeric() || c == '_');
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if out.is_empty() {
        out.push_str("label");
    }
    out
}

/// Build a fully-qualified metric name.
///
/// Format: `{namespace}_{name}`, or just `{name}` with an empty namespace.
pub fn build_metric_name(namespace: &str, name: &str) -> String {
    let sanitized = sanitize_metric_name(name);

    if namespace.is_empty() {
        sanitized
    } else {
        format!("{}_{}", sanitize_metric_name(namespace), sanitized)
    }
}
