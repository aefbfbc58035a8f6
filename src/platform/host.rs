//! Best-effort management beans for the current (non-JVM) process.
//!
//! Lets the CLI demonstrate a full register-and-scrape cycle on any
//! machine: memory and CPU come from sysinfo, thread and file-descriptor
//! accounting from `/proc` and rlimits on unix. Anything the host cannot
//! provide stays absent, exactly like a runtime capability that does not
//! exist.

#[cfg(unix)]
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::debug;
use parking_lot::Mutex;
use sysinfo::{CpuRefreshKind, MemoryRefreshKind, ProcessRefreshKind, RefreshKind, System};

use crate::core::runtime::{ManagementBeans, MemorySource, MemoryUsage, OsSource, RuntimeSource};
#[cfg(unix)]
use crate::core::runtime::ThreadSource;

/// Process memory mapped onto the heap-region shape: resident set as
/// used, virtual size as committed, total system memory as max.
struct HostProcessMemory {
    system: Mutex<System>,
    pid: sysinfo::Pid,
    total_memory: i64,
}

impl MemorySource for HostProcessMemory {
    fn usage(&self) -> MemoryUsage {
        let mut system = self.system.lock();
        system.refresh_processes(sysinfo::ProcessesToUpdate::Some(&[self.pid]), true);
        let (used, committed) = system
            .process(self.pid)
            .map(|p| (p.memory() as i64, p.virtual_memory() as i64))
            .unwrap_or((0, 0));
        MemoryUsage {
            committed,
            max: self.total_memory,
            used,
        }
    }
}

#[cfg(unix)]
struct HostThreads {
    peak: AtomicI64,
}

#[cfg(unix)]
impl HostThreads {
    fn current() -> i64 {
        let status = match std::fs::read_to_string("/proc/self/status") {
            Ok(status) => status,
            Err(_) => return 0,
        };
        status
            .lines()
            .find_map(|line| line.strip_prefix("Threads:"))
            .and_then(|rest| rest.trim().parse().ok())
            .unwrap_or(0)
    }
}

#[cfg(unix)]
impl ThreadSource for HostThreads {
    fn count(&self) -> i64 {
        let count = Self::current();
        self.peak.fetch_max(count, Ordering::Relaxed);
        count
    }

    fn peak_count(&self) -> i64 {
        let current = Self::current();
        let previous = self.peak.fetch_max(current, Ordering::Relaxed);
        previous.max(current)
    }

    fn daemon_count(&self) -> i64 {
        0
    }
}

struct HostRuntime {
    started: Instant,
    start_time_millis: i64,
}

impl RuntimeSource for HostRuntime {
    fn uptime_millis(&self) -> i64 {
        self.started.elapsed().as_millis() as i64
    }

    fn start_time_millis(&self) -> i64 {
        self.start_time_millis
    }
}

struct HostOs {
    cpus: i64,
}

impl OsSource for HostOs {
    fn available_processors(&self) -> i64 {
        self.cpus
    }

    #[cfg(unix)]
    fn open_fd_count(&self) -> Option<i64> {
        let entries = std::fs::read_dir("/proc/self/fd").ok()?;
        // The read_dir handle itself holds one descriptor.
        Some((entries.count() as i64 - 1).max(0))
    }

    #[cfg(unix)]
    fn max_fd_count(&self) -> Option<i64> {
        let mut limit = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        // Safety: getrlimit only writes into the struct we hand it.
        let rc = unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) };
        if rc == 0 {
            Some(limit.rlim_cur as i64)
        } else {
            None
        }
    }
}

/// Build beans describing the current process.
pub fn host_beans() -> ManagementBeans {
    let refresh = RefreshKind::nothing()
        .with_cpu(CpuRefreshKind::everything())
        .with_memory(MemoryRefreshKind::everything())
        .with_processes(ProcessRefreshKind::nothing().with_cpu().with_memory());
    let system = System::new_with_specifics(refresh);

    let cpus = system.cpus().len() as i64;
    let total_memory = system.total_memory() as i64;

    let mut beans = ManagementBeans::empty();

    if let Ok(pid) = sysinfo::get_current_pid() {
        let start_time_millis = system
            .process(pid)
            .map(|p| p.start_time() as i64 * 1000)
            .unwrap_or(0);

        beans.heap = Some(Arc::new(HostProcessMemory {
            system: Mutex::new(system),
            pid,
            total_memory,
        }) as Arc<dyn MemorySource>);

        beans.runtime = Some(Arc::new(HostRuntime {
            started: Instant::now(),
            start_time_millis,
        }) as Arc<dyn RuntimeSource>);
    } else {
        debug!("could not resolve current pid, skipping process memory and uptime");
    }

    #[cfg(unix)]
    {
        beans.threads = Some(Arc::new(HostThreads {
            peak: AtomicI64::new(0),
        }) as Arc<dyn ThreadSource>);
    }

    beans.os = Some(Arc::new(HostOs { cpus }) as Arc<dyn OsSource>);

    beans
}
