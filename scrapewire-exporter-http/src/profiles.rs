//! Built-in field tables for known status pages.

use serde::{Deserialize, Serialize};

use scrapewire_framework::{Extract, FieldSpec};

const JSON: &str = "application/json";

/// Which status page layout to publish.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Only the HTTP status code of the page.
    #[default]
    Status,
    /// das2go server status.
    Das2go,
    /// WMCore service status.
    Wmcore,
    /// ReqMgr2 server metrics.
    Reqmgr,
    /// CherryPy statistics page.
    Cpy,
}

impl Profile {
    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            Profile::Status => STATUS_FIELDS,
            Profile::Das2go => DAS2GO_FIELDS,
            Profile::Wmcore => WMCORE_FIELDS,
            Profile::Reqmgr => REQMGR_FIELDS,
            Profile::Cpy => CPY_FIELDS,
        }
    }

    pub fn default_namespace(&self) -> &'static str {
        match self {
            Profile::Status => "http",
            Profile::Das2go => "das2go",
            Profile::Wmcore => "wmcore",
            Profile::Reqmgr => "reqmgr",
            Profile::Cpy => "cpy",
        }
    }

    pub fn default_listen(&self) -> &'static str {
        match self {
            Profile::Status | Profile::Wmcore => ":18000",
            Profile::Das2go => ":18217",
            Profile::Reqmgr => ":18240",
            Profile::Cpy => ":19000",
        }
    }

    pub fn default_uri(&self) -> Option<&'static str> {
        match self {
            Profile::Das2go => Some("http://localhost:8217/das/status"),
            _ => None,
        }
    }

    /// `Accept` header the page is requested with; `None` leaves it to config.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Profile::Status => None,
            _ => Some(JSON),
        }
    }

    /// Whether the body must decode as JSON for the cycle to succeed.
    pub fn requires_json(&self) -> bool {
        !matches!(self, Profile::Status)
    }
}

static STATUS_FIELDS: &[FieldSpec] = &[FieldSpec::gauge(
    "status",
    "status_code",
    "HTTP status code of the monitored page",
)];

static DAS2GO_FIELDS: &[FieldSpec] = &[
    FieldSpec::counter("get_calls", "getCalls", "Current total number of GET HTTP calls server"),
    FieldSpec::counter("post_calls", "postCalls", "Current total number of POST HTTP calls to server"),
    FieldSpec::counter("get_requests", "getRequests", "Current total number of GET HTTP requests to server"),
    FieldSpec::counter("post_requests", "postRequests", "Current total number of POST HTTP requests to server"),
    FieldSpec::counter("uptime", "Uptime", "Current uptime in seconds"),
    FieldSpec::gauge("memory_percent", "Memory.Virtual.usedPercent", "Virtual memory usage of the server"),
    FieldSpec::gauge("memory_total", "Memory.Virtual.total", "Virtual total memory usage of the server"),
    FieldSpec::gauge("memory_free", "Memory.Virtual.free", "Virtual free memory usage of the server"),
    FieldSpec::gauge("memory_used", "Memory.Virtual.used", "Virtual used memory usage of the server"),
    FieldSpec::gauge("memstats_sys", "MemStats.Sys", "total bytes of memory obtained from the OS"),
    FieldSpec::gauge("memstats_alloc", "MemStats.Alloc", "bytes of allocated heap objects"),
    FieldSpec::gauge("memstats_tot_alloc", "MemStats.TotalAlloc", "cumulative bytes allocated for heap objects"),
    FieldSpec::gauge("memstats_heap_sys", "MemStats.HeapSys", "bytes of heap memory obtained from the OS"),
    FieldSpec::gauge("memstats_stack_sys", "MemStats.StackSys", "bytes of stack memory obtained from the OS"),
    FieldSpec::gauge("swap_percent", "Memory.Swap.usedPercent", "Swap memory usage of the server"),
    FieldSpec::gauge("cpu_percent", "CPU", "cpu percent of the server").with(Extract::Mean),
    FieldSpec::gauge("cores_percent", "CPU", "cpu cores percentage on the server").with(
        Extract::Elements {
            label: "cores",
            prefix: "core-",
        },
    ),
    FieldSpec::gauge("num_threads", "NThreads", "Number of threads"),
    FieldSpec::gauge("num_go_routines", "NGo", "Number of Go routines"),
    FieldSpec::gauge("load1", "Load.load1", "Load average in last 1m"),
    FieldSpec::gauge("load5", "Load.load5", "Load average in last 5m"),
    FieldSpec::gauge("load15", "Load.load15", "Load average in last 15m"),
    FieldSpec::gauge("open_files", "OpenFiles", "Number of open files").with(Extract::Count),
    FieldSpec::gauge("connections", "Connections", "Server connections by state")
        .with(Extract::ConnectionStates { label: "state" }),
];

static WMCORE_FIELDS: &[FieldSpec] = &[
    FieldSpec::counter("uptime", "uptime", "Current uptime in seconds"),
    FieldSpec::gauge("memory_percent", "memory_percent", "Virtual memory usage of the server"),
    FieldSpec::gauge("cpu_percent", "cpu_percent", "cpu percent of the server"),
    FieldSpec::gauge("num_threads", "num_threads", "Number of threads"),
    FieldSpec::gauge("num_fds", "num_fds", "Number of file descriptors"),
    FieldSpec::gauge("connections", "connections", "Server connections by state")
        .with(Extract::ConnectionStates { label: "state" }),
];

static REQMGR_FIELDS: &[FieldSpec] = &[
    FieldSpec::counter("uptime", "result.0.server.uptime", "Current uptime in seconds"),
    FieldSpec::gauge("memory_percent", "result.0.server.memory_percent", "Virtual memory usage of the server"),
    FieldSpec::gauge("cpu_percent", "result.0.server.cpu_percent", "cpu percent of the server"),
    FieldSpec::gauge("num_cpu", "result.0.server.cpu_num", "Number of CPUs"),
    FieldSpec::gauge("time", "result.0.server.time", "Timestamp of the metric"),
    FieldSpec::gauge("vms", "result.0.server.memory_full_info.vms", "Memory VMS metric"),
    FieldSpec::gauge("rss", "result.0.server.memory_full_info.rss", "Memory RSS metric"),
    FieldSpec::gauge("swap", "result.0.server.memory_full_info.swap", "Memory Swap metric"),
    FieldSpec::gauge("pss", "result.0.server.memory_full_info.pss", "Memory PSS metric"),
    FieldSpec::gauge("uss", "result.0.server.memory_full_info.uss", "Memory USS metric"),
    FieldSpec::counter("cpu_system", "result.0.server.cpu_times.system", "CPU system metric"),
    FieldSpec::counter("cpu_user", "result.0.server.cpu_times.user", "CPU user metric"),
    FieldSpec::counter("cpu_children_system", "result.0.server.cpu_times.children_system", "CPU children system metric"),
    FieldSpec::counter("cpu_children_user", "result.0.server.cpu_times.children_user", "CPU children user metric"),
];

const THREAD: &str = "thread";
const APP: &str = "app";

static CPY_FIELDS: &[FieldSpec] = &[
    FieldSpec::counter("accepts", "*Server*.Accepts", "total number of accepts"),
    FieldSpec::gauge("acceptInSec", "*Server*.Accepts/sec", "accepts per second"),
    FieldSpec::counter("bytesRead", "*Server*.Bytes Read", "total number of bytes read"),
    FieldSpec::gauge("readThroughput", "*Server*.Read Throughput", "read throughput"),
    FieldSpec::gauge("writeThroughput", "*Server*.Write Throughput", "write throughput"),
    FieldSpec::counter("socketErrors", "*Server*.Socket Errors", "total number of socket errors"),
    FieldSpec::gauge("threads", "*Server*.Threads", "number of threads"),
    FieldSpec::gauge("threadsIdle", "*Server*.Threads Idle", "number of idle threads"),
    FieldSpec::counter("requests", "*Server*.Requests", "total number of requests"),
    FieldSpec::gauge("queue", "*Server*.Queue", "Current queue value"),
    FieldSpec::counter("thrBytesRead", "*Server*.Worker Threads", "Bytes read per worker thread")
        .with(Extract::Entries { label: THREAD, field: "Bytes Read" }),
    FieldSpec::counter("thrBytesWrite", "*Server*.Worker Threads", "Bytes written per worker thread")
        .with(Extract::Entries { label: THREAD, field: "Bytes Written" }),
    FieldSpec::gauge("thrReadThroughput", "*Server*.Worker Threads", "Read throughput per worker thread")
        .with(Extract::Entries { label: THREAD, field: "Read Throughput" }),
    FieldSpec::counter("thrRequests", "*Server*.Worker Threads", "Requests per worker thread")
        .with(Extract::Entries { label: THREAD, field: "Requests" }),
    FieldSpec::counter("thrWorkTime", "*Server*.Worker Threads", "Work time per worker thread")
        .with(Extract::Entries { label: THREAD, field: "Work Time" }),
    FieldSpec::gauge("thrWriteThroughput", "*Server*.Worker Threads", "Write throughput per worker thread")
        .with(Extract::Entries { label: THREAD, field: "Write Throughput" }),
    FieldSpec::gauge("cpyBytesReadPerRequest", "*Application*.Bytes Read/Request", "Current cpyBytesReadPerRequest value"),
    FieldSpec::gauge("cpyBytesReadPerSecond", "*Application*.Bytes Read/Second", "Current cpyBytesReadPerSecond value"),
    FieldSpec::gauge("cpyBytesWritePerRequest", "*Application*.Bytes Written/Request", "Current cpyBytesWritePerRequest value"),
    FieldSpec::gauge("cpyBytesWritePerSecond", "*Application*.Bytes Written/Second", "Current cpyBytesWritePerSecond value"),
    FieldSpec::gauge("cpyCurrentRequest", "*Application*.Current Requests", "Current cpyCurrentRequest value"),
    FieldSpec::gauge("cpyCurrentTime", "*Application*.Current Time", "Current cpyCurrentTime value"),
    FieldSpec::gauge("cpyRequestsPerSecond", "*Application*.Requests/Second", "Current cpyRequestsPerSecond value"),
    FieldSpec::counter("cpyTotalBytesRead", "*Application*.Total Bytes Read", "Current cpyTotalBytesRead value"),
    FieldSpec::counter("cpyTotalBytesWrite", "*Application*.Total Bytes Written", "Current cpyTotalBytesWrite value"),
    FieldSpec::counter("cpyTotalRequests", "*Application*.Total Requests", "Current cpyTotalRequests value"),
    FieldSpec::counter("cpyTotalTime", "*Application*.Total Time", "Current cpyTotalTime value"),
    FieldSpec::counter("uptime", "*Application*.Uptime", "Current uptime in seconds"),
    FieldSpec::counter("cpyBytesRead", "*Application*.Requests", "Bytes read per request")
        .with(Extract::Entries { label: APP, field: "Bytes Read" }),
    FieldSpec::counter("cpyBytesWrite", "*Application*.Requests", "Bytes written per request")
        .with(Extract::Entries { label: APP, field: "Bytes Written" }),
    FieldSpec::gauge("cpyProcTime", "*Application*.Requests", "Processing time per request")
        .with(Extract::Entries { label: APP, field: "Processing Time" }),
];
