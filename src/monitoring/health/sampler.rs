//! Process and host sampling for the memory, task and disk probes

use crate::utils::error::{Result, WatchError};
use parking_lot::Mutex;
use serde::Serialize;
use sysinfo::{Disks, ProcessRefreshKind, ProcessesToUpdate, System};

/// Process-level runtime figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RuntimeSample {
    /// Resident set size in bytes
    pub resident_bytes: u64,
    /// Virtual memory size in bytes
    pub virtual_bytes: u64,
    /// Live tokio tasks
    pub tasks: usize,
    /// Runtime worker threads
    pub workers: usize,
}

impl RuntimeSample {
    pub fn resident_mb(&self) -> f64 {
        self.resident_bytes as f64 / (1024.0 * 1024.0)
    }

    pub fn virtual_mb(&self) -> f64 {
        self.virtual_bytes as f64 / (1024.0 * 1024.0)
    }
}

/// Usage of one mounted disk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskUsage {
    pub mount_point: String,
    pub total_bytes: u64,
    pub available_bytes: u64,
}

impl DiskUsage {
    /// Used space as a percentage of total, 0 for empty disks
    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        let used = self.total_bytes.saturating_sub(self.available_bytes);
        used as f64 / self.total_bytes as f64 * 100.0
    }
}

/// Source of runtime and disk figures
pub trait RuntimeSampler: Send + Sync + std::fmt::Debug {
    fn sample(&self) -> Result<RuntimeSample>;

    fn disks(&self) -> Result<Vec<DiskUsage>>;
}

/// Samples the current process with `sysinfo` and the tokio runtime metrics
///
/// Only this process's memory is refreshed on each sample.
#[derive(Debug)]
pub struct ProcessSampler {
    system: Mutex<System>,
    disks: Mutex<Disks>,
}

impl ProcessSampler {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
            disks: Mutex::new(Disks::new_with_refreshed_list()),
        }
    }
}

impl Default for ProcessSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeSampler for ProcessSampler {
    fn sample(&self) -> Result<RuntimeSample> {
        let pid = sysinfo::get_current_pid().map_err(WatchError::probe)?;

        let (resident_bytes, virtual_bytes) = {
            let mut sys = self.system.lock();
            sys.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                ProcessRefreshKind::new().with_memory(),
            );
            let process = sys
                .process(pid)
                .ok_or_else(|| WatchError::probe("current process not visible to sysinfo"))?;
            (process.memory(), process.virtual_memory())
        };

        let (tasks, workers) = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let metrics = handle.metrics();
                (metrics.num_alive_tasks(), metrics.num_workers())
            }
            Err(_) => (0, 0),
        };

        Ok(RuntimeSample {
            resident_bytes,
            virtual_bytes,
            tasks,
            workers,
        })
    }

    fn disks(&self) -> Result<Vec<DiskUsage>> {
        let mut disks = self.disks.lock();
        disks.refresh_list();
        Ok(disks
            .iter()
            .map(|d| DiskUsage {
                mount_point: d.mount_point().to_string_lossy().into_owned(),
                total_bytes: d.total_space(),
                available_bytes: d.available_space(),
            })
            .collect())
    }
}

/// Sampler returning fixed figures
#[derive(Debug, Default)]
pub struct FixedSampler {
    pub sample: Mutex<RuntimeSample>,
    pub disks: Mutex<Vec<DiskUsage>>,
}

impl FixedSampler {
    pub fn new(sample: RuntimeSample, disks: Vec<DiskUsage>) -> Self {
        Self {
            sample: Mutex::new(sample),
            disks: Mutex::new(disks),
        }
    }

    pub fn set_sample(&self, sample: RuntimeSample) {
        *self.sample.lock() = sample;
    }

    pub fn set_disks(&self, disks: Vec<DiskUsage>) {
        *self.disks.lock() = disks;
    }
}

impl RuntimeSampler for FixedSampler {
    fn sample(&self) -> Result<RuntimeSample> {
        Ok(*self.sample.lock())
    }

    fn disks(&self) -> Result<Vec<DiskUsage>> {
        Ok(self.disks.lock().clone())
    }
}
