//! Chunked parallel map over independent work items.
//!
//! The resampling engines are embarrassingly parallel across surrogate draws:
//! each draw depends only on its own derived seed. This module provides the
//! scatter-gather primitive they fan out with. Results are reassembled in
//! input order, so callers see the same output whether the map ran serially
//! or across workers.

use rayon::prelude::*;

/// Apply `f` to chunks of `items`, reassembling results in input order.
///
/// `f` receives one chunk and returns the mapped values for that chunk. With
/// `workers <= 1` the chunks are processed serially on the calling thread;
/// otherwise a dedicated pool of `workers` threads is used. A pool that fails
/// to build falls back to the serial path.
pub fn parallel_map<T, R, F>(items: &[T], chunk_size: usize, workers: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&[T]) -> Vec<R> + Sync,
{
    let chunk_size = chunk_size.max(1);
    if workers <= 1 {
        return items.chunks(chunk_size).flat_map(|chunk| f(chunk)).collect();
    }

    match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
        Ok(pool) => pool.install(|| {
            items
                .par_chunks(chunk_size)
                .flat_map_iter(|chunk| f(chunk))
                .collect()
        }),
        Err(_) => items.chunks(chunk_size).flat_map(|chunk| f(chunk)).collect(),
    }
}
