//! Configures the global rayon pool used for indexing and fragment building.

use anyhow::Result;
use tracing::info;

/// Worker count when none is configured: half the cores, minimum 1.
pub fn default_workers() -> usize {
    std::cmp::max(1, num_cpus::get() / 2)
}

/// Initialize the global rayon thread pool with `jobs` workers
/// (default: [`default_workers`]).
pub fn init_thread_pool(jobs: Option<usize>) -> Result<usize> {
    let cores = num_cpus::get();
    let workers = jobs.filter(|&j| j > 0).unwrap_or_else(default_workers);

    rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build_global()?;

    info!(workers, cores, "initialized thread pool");

    Ok(workers)
}
