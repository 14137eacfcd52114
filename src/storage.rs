//! Storage usage snapshots for the filesystem holding a directory.
//!
//! Reports ask a [`StorageStatsProvider`] rather than querying the system
//! directly, so callers can swap in [`FixedStorage`] where the real numbers
//! don't matter.

use serde::Serialize;
use std::io;
use std::path::Path;
use sysinfo::Disks;

/// Total, used and free bytes of one filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StorageStats {
    pub total: u64,
    pub used: u64,
    pub free: u64,
}

impl StorageStats {
    /// Builds a snapshot from total and available bytes.
    pub fn from_total_and_free(total: u64, free: u64) -> Self {
        Self {
            total,
            used: total.saturating_sub(free),
            free,
        }
    }

    /// Used space as a percentage of total, rounded to one decimal.
    pub fn percent_used(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let percent = self.used as f64 / self.total as f64 * 100.0;
        (percent * 10.0).round() / 10.0
    }
}

/// Source of storage usage for a path.
pub trait StorageStatsProvider {
    /// Returns usage of the filesystem containing `path`.
    fn stats_for(&self, path: &Path) -> io::Result<StorageStats>;
}

/// Reads storage usage from the operating system through `sysinfo`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemStorage;

impl StorageStatsProvider for SystemStorage {
    fn stats_for(&self, path: &Path) -> io::Result<StorageStats> {
        let path = path.canonicalize()?;
        let disks = Disks::new_with_refreshed_list();

        // The deepest mount point containing the path is the one it lives on.
        disks
            .iter()
            .filter(|disk| path.starts_with(disk.mount_point()))
            .max_by_key(|disk| disk.mount_point().components().count())
            .map(|disk| StorageStats::from_total_and_free(disk.total_space(), disk.available_space()))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no mounted filesystem found for {}", path.display()),
                )
            })
    }
}

/// Always answers with the same snapshot.
#[derive(Debug, Clone, Copy)]
pub struct FixedStorage(pub StorageStats);

impl StorageStatsProvider for FixedStorage {
    fn stats_for(&self, _path: &Path) -> io::Result<StorageStats> {
        Ok(self.0)
    }
}
