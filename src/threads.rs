//! Thread tools

use crate::types::{Error, Result};
use rayon::ThreadPoolBuilder;

/// Create a pool
pub fn create_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    if num_threads == 0 {
        return Err(Error::ZeroThreads);
    }
    Ok(ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("skyline-{i}"))
        .build()?)
}
