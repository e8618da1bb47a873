//! Resource usage of one process.

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::debug;

use scrapewire_framework::{RawSnapshot, RawValue, ScrapeError, Source, async_trait};

/// Samples a single process id on every pull.
///
/// The [`System`] is kept across fetches so CPU usage is computed over the
/// interval between two pulls; the first sample reports zero.
pub struct ProcessSource {
    pid: u32,
    system: System,
}

impl ProcessSource {
    pub fn new(pid: u32) -> Self {
        Self {
            pid,
            system: System::new(),
        }
    }

    fn sample(&mut self) -> Result<RawSnapshot, ScrapeError> {
        let pid = Pid::from_u32(self.pid);

        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_cpu().with_memory(),
        );
        self.system.refresh_memory();

        let process = self
            .system
            .process(pid)
            .ok_or(ScrapeError::ProcessNotFound(self.pid))?;

        let rss = process.memory();
        let total = self.system.total_memory();
        let memory_percent = if total > 0 {
            rss as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        let mut entries = vec![
            ("cpu_percent", RawValue::from(f64::from(process.cpu_usage()))),
            ("memory_rss", RawValue::from(rss)),
            ("memory_vms", RawValue::from(process.virtual_memory())),
            ("memory_percent", RawValue::from(memory_percent)),
            ("start_time", RawValue::from(process.start_time())),
            ("uptime", RawValue::from(process.run_time())),
        ];

        #[cfg(target_os = "linux")]
        crate::linux::ProcDetails::collect(self.pid).extend(&mut entries);

        #[cfg(not(target_os = "linux"))]
        if let Some(tasks) = process.tasks() {
            entries.push(("num_threads", RawValue::from(tasks.len() as u64)));
        }

        debug!(pid = self.pid, rss, "Sampled process");

        Ok(RawValue::object(entries))
    }
}

#[async_trait]
impl Source for ProcessSource {
    fn describe(&self) -> String {
        format!("pid {}", self.pid)
    }

    async fn fetch(&mut self) -> Result<RawSnapshot, ScrapeError> {
        self.sample()
    }
}
