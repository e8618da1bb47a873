//! Published fields of the process exporter.

use scrapewire_framework::{Extract, FieldSpec};

pub static FIELDS: &[FieldSpec] = &[
    FieldSpec::gauge("cpu_percent", "cpu_percent", "CPU usage of the process in percent"),
    FieldSpec::gauge("resident_memory_bytes", "memory_rss", "Resident memory size in bytes"),
    FieldSpec::gauge("virtual_memory_bytes", "memory_vms", "Virtual memory size in bytes"),
    FieldSpec::gauge("memory_percent", "memory_percent", "Resident memory as percent of total memory"),
    FieldSpec::gauge("num_threads", "num_threads", "Number of OS threads"),
    FieldSpec::gauge("open_fds", "num_fds", "Number of open file descriptors"),
    FieldSpec::gauge("max_fds", "max_fds", "Maximum number of open file descriptors"),
    FieldSpec::gauge("start_time_seconds", "start_time", "Start time of the process since unix epoch in seconds"),
    FieldSpec::counter("uptime_seconds", "uptime", "Time the process has been running in seconds"),
    FieldSpec::gauge("connections", "connections", "TCP connections of the process by state")
        .with(Extract::ConnectionStates { label: "state" }),
];
