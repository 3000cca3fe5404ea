//! Runtime metrics snapshot rendered as plain text for the inspector.
//!
//! Every field is optional: a counter the platform cannot provide is rendered as `unavailable`
//! instead of failing the whole snapshot.

use std::{fmt, time::Duration};

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

const UNAVAILABLE: &str = "unavailable";

/// Resource counters of the current process, read at capture time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricsSnapshot {
    /// Resident memory of the process, in bytes.
    pub heap_usage: Option<u64>,
    /// Virtual memory of the process not resident, in bytes.
    pub non_heap_usage: Option<u64>,
    /// Memory available on the system, in bytes.
    pub free_memory: Option<u64>,
    /// Memory installed on the system, in bytes.
    pub total_memory: Option<u64>,
    /// CPU time consumed by the capturing thread.
    pub execution_time: Option<Duration>,
    /// Threads alive in the process.
    pub live_threads: Option<usize>,
}

impl MetricsSnapshot {
    /// Reads the counters.
    pub fn capture() -> Self {
        let mut system = System::new();
        system.refresh_memory();

        let (free_memory, total_memory) = match system.total_memory() {
            // sysinfo reports 0 on unsupported platforms
            0 => (None, None),
            total => (Some(system.available_memory()), Some(total)),
        };

        let pid = sysinfo::get_current_pid().ok();
        if let Some(pid) = pid {
            system.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                false,
                ProcessRefreshKind::nothing().with_memory().with_tasks(),
            );
        }
        let process = pid.and_then(|pid| system.process(pid));

        let heap_usage = process.map(|process| process.memory());
        let non_heap_usage =
            process.map(|process| process.virtual_memory().saturating_sub(process.memory()));
        let live_threads = pid.zip(process).and_then(|(pid, process)| {
            process.tasks().map(|tasks| {
                // The main thread shares the process id and is not always listed
                tasks.len() + usize::from(!tasks.contains(&pid))
            })
        });

        Self {
            heap_usage,
            non_heap_usage,
            free_memory,
            total_memory,
            execution_time: thread_cpu_time(),
            live_threads,
        }
    }

    /// Percentage of the system memory in use.
    pub fn usage_percent(&self) -> Option<f64> {
        usage_percent(self.total_memory?, self.free_memory?)
    }
}

/// `(total - free) / total * 100`, `None` when `total` is 0.
pub fn usage_percent(total: u64, free: u64) -> Option<f64> {
    if total == 0 {
        return None;
    }
    Some(total.saturating_sub(free) as f64 / total as f64 * 100.0)
}

#[cfg(unix)]
fn thread_cpu_time() -> Option<Duration> {
    use nix::time::{clock_gettime, ClockId};

    let time = clock_gettime(ClockId::CLOCK_THREAD_CPUTIME_ID).ok()?;
    Some(Duration::new(
        u64::try_from(time.tv_sec()).ok()?,
        u32::try_from(time.tv_nsec()).ok()?,
    ))
}

#[cfg(not(unix))]
fn thread_cpu_time() -> Option<Duration> {
    None
}

struct Kib(Option<u64>);

impl fmt::Display for Kib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(bytes) => write!(f, "{} KiB", bytes >> 10),
            None => f.write_str(UNAVAILABLE),
        }
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Heap Usage: {}", Kib(self.heap_usage))?;
        writeln!(f, "Non-Heap Usage: {}", Kib(self.non_heap_usage))?;
        writeln!(f, "Free Memory: {}", Kib(self.free_memory))?;
        writeln!(f, "Total Memory: {}", Kib(self.total_memory))?;
        match self.usage_percent() {
            Some(percent) => writeln!(f, "Memory Usage: {percent:.2}%")?,
            None => writeln!(f, "Memory Usage: {UNAVAILABLE}")?,
        }
        match self.execution_time {
            Some(time) => writeln!(f, "Execution Time: {:.3} ms", time.as_secs_f64() * 1e3)?,
            None => writeln!(f, "Execution Time: {UNAVAILABLE}")?,
        }
        match self.live_threads {
            Some(count) => write!(f, "Live Thread Count: {count}"),
            None => write!(f, "Live Thread Count: {UNAVAILABLE}"),
        }
    }
}
