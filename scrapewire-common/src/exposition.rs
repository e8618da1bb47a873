//! Prometheus text exposition format.

use std::collections::HashMap;
use std::io::Write;

use crate::metric::MetricSample;

/// Content type of the rendered exposition.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Render samples in Prometheus exposition format.
///
/// Samples are grouped into families by metric name, in order of first
/// appearance; each family gets one `# HELP` (when non-empty) and one `# TYPE`
/// line followed by its sample lines.
pub fn render(samples: &[MetricSample]) -> String {
    let mut output = Vec::with_capacity(samples.len() * 64);

    let mut order: Vec<&str> = Vec::new();
    let mut families: HashMap<&str, Vec<&MetricSample>> = HashMap::new();
    for sample in samples {
        families
            .entry(sample.name())
            .or_insert_with(|| {
                order.push(sample.name());
                Vec::new()
            })
            .push(sample);
    }

    for name in order {
        let series = &families[name];
        let descriptor = &series[0].descriptor;

        if !descriptor.help.is_empty() {
            writeln!(output, "# HELP {} {}", name, escape_help(&descriptor.help)).ok();
        }
        writeln!(output, "# TYPE {} {}", name, descriptor.kind.as_str()).ok();

        for sample in series {
            writeln!(
                output,
                "{}{} {}",
                name,
                format_labels(sample),
                format_value(sample.value)
            )
            .ok();
        }
    }

    String::from_utf8(output).unwrap_or_default()
}

/// Format labels for Prometheus exposition format.
fn format_labels(sample: &MetricSample) -> String {
    let parts: Vec<String> = sample
        .labels()
        .map(|(k, v)| format!("{}=\"{}\"", k, escape_label_value(v)))
        .collect();

    if parts.is_empty() {
        return String::new();
    }

    format!("{{{}}}", parts.join(","))
}

/// Escape special characters in label values.
pub fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

fn escape_help(help: &str) -> String {
    help.replace('\\', "\\\\").replace('\n', "\\n")
}

/// Format a floating point value for Prometheus.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}
