//! Linux-specific process details using procfs.
//!
//! Everything here is best effort: a value that cannot be read is left out of
//! the snapshot and maps to zero.

use std::collections::HashSet;

use procfs::net::TcpState;
use procfs::process::{FDTarget, LimitValue, Process};
use tracing::debug;

use scrapewire_framework::RawValue;

/// File descriptor and socket details of one process.
#[derive(Debug, Clone, Default)]
pub struct ProcDetails {
    pub num_fds: Option<usize>,
    pub max_fds: Option<u64>,
    pub num_threads: Option<u64>,
    /// TCP socket states, one entry per socket owned by the process.
    pub connections: Vec<&'static str>,
}

impl ProcDetails {
    pub fn collect(pid: u32) -> Self {
        let process = match Process::new(pid as i32) {
            Ok(process) => process,
            Err(e) => {
                debug!(pid, error = %e, "procfs unavailable for process");
                return Self::default();
            }
        };

        let num_fds = process.fd_count().ok();

        let max_fds = process
            .limits()
            .ok()
            .map(|limits| match limits.max_open_files.soft_limit {
                LimitValue::Value(v) => v,
                LimitValue::Unlimited => u64::MAX,
            });

        let num_threads = process
            .stat()
            .ok()
            .and_then(|stat| u64::try_from(stat.num_threads).ok());

        Self {
            num_fds,
            max_fds,
            num_threads,
            connections: socket_states(&process),
        }
    }

    /// Insert the collected values into a snapshot object.
    pub fn extend(self, entries: &mut Vec<(&'static str, RawValue)>) {
        if let Some(n) = self.num_fds {
            entries.push(("num_fds", RawValue::from(n as u64)));
        }
        if let Some(n) = self.max_fds {
            entries.push(("max_fds", RawValue::from(n)));
        }
        if let Some(n) = self.num_threads {
            entries.push(("num_threads", RawValue::from(n)));
        }

        let connections = self
            .connections
            .into_iter()
            .map(|state| RawValue::object([("status", RawValue::from(state))]))
            .collect::<Vec<_>>();
        entries.push(("connections", RawValue::from(connections)));
    }
}

/// States of the IPv4 and IPv6 TCP sockets whose inode the process holds.
fn socket_states(process: &Process) -> Vec<&'static str> {
    let inodes: HashSet<u64> = match process.fd() {
        Ok(fds) => fds
            .filter_map(Result::ok)
            .filter_map(|fd| match fd.target {
                FDTarget::Socket(inode) => Some(inode),
                _ => None,
            })
            .collect(),
        Err(e) => {
            debug!(pid = process.pid, error = %e, "Cannot list file descriptors");
            return Vec::new();
        }
    };

    if inodes.is_empty() {
        return Vec::new();
    }

    let tcp = procfs::net::tcp().unwrap_or_default();
    let tcp6 = procfs::net::tcp6().unwrap_or_default();

    tcp.iter()
        .chain(tcp6.iter())
        .filter(|entry| inodes.contains(&entry.inode))
        .map(|entry| state_name(&entry.state))
        .collect()
}

fn state_name(state: &TcpState) -> &'static str {
    match state {
        TcpState::Established => "ESTABLISHED",
        TcpState::SynSent => "SYN_SENT",
        TcpState::SynRecv | TcpState::NewSynRecv => "SYN_RECV",
        TcpState::FinWait1 => "FIN_WAIT1",
        TcpState::FinWait2 => "FIN_WAIT2",
        TcpState::TimeWait => "TIME_WAIT",
        TcpState::Close => "CLOSE",
        TcpState::CloseWait => "CLOSE_WAIT",
        TcpState::LastAck => "LAST_ACK",
        TcpState::Listen => "LISTEN",
        TcpState::Closing => "CLOSING",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_self() {
        let details = ProcDetails::collect(std::process::id());
        assert!(details.num_fds.unwrap() > 0);
        assert!(details.max_fds.unwrap() > 0);
        assert!(details.num_threads.unwrap() >= 1);
    }

    #[test]
    fn test_listening_socket_is_reported() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let details = ProcDetails::collect(std::process::id());
        assert!(details.connections.contains(&"LISTEN"));
        drop(listener);
    }

    #[test]
    fn test_missing_process_is_empty() {
        let details = ProcDetails::collect(u32::MAX >> 1);
        assert!(details.num_fds.is_none());
        assert!(details.connections.is_empty());
    }
}
