//! Bounded worker-pool helper shared by the status collector and the
//! switch/sync/push protocols.
//!
//! Per-repo git invocations are independent (each thread owns exactly one
//! repo's working directory) so they are dispatched in batches no larger
//! than the configured worker count, then reassembled in the caller's
//! original order for deterministic, manifest-ordered output.

use std::sync::{Arc, Mutex};
use std::thread;

/// Run `f` once per item in `items`, at most `max_workers` concurrently, and
/// return results in the same order as `items`.
///
/// `f` must be `Send` and borrow nothing that isn't `Send + Sync`, since it
/// runs on a worker thread; `T` and `R` must be `Send` to cross the thread
/// boundary.
pub fn map_bounded<T, R, F>(items: Vec<T>, max_workers: usize, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(&T) -> R + Send + Sync,
{
    let max_workers = max_workers.max(1);
    let results: Arc<Mutex<Vec<(usize, R)>>> = Arc::new(Mutex::new(Vec::with_capacity(items.len())));
    let f = Arc::new(f);

    let mut offset = 0;
    for batch in items.chunks(max_workers) {
        thread::scope(|scope| {
            for (i, item) in batch.iter().enumerate() {
                let idx = offset + i;
                let results = Arc::clone(&results);
                let f = Arc::clone(&f);
                scope.spawn(move || {
                    let r = f(item);
                    results.lock().unwrap().push((idx, r));
                });
            }
        });
        offset += batch.len();
    }

    let mut results = Arc::try_unwrap(results)
        .expect("all worker threads joined before unwrap")
        .into_inner()
        .expect("results mutex poisoned by a panicking worker");
    results.sort_by_key(|(idx, _)| *idx);
    results.into_iter().map(|(_, r)| r).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_order_with_bounded_concurrency() {
        let items: Vec<i32> = (0..20).collect();
        let results = map_bounded(items.clone(), 3, |n| n * 2);
        let expected: Vec<i32> = items.iter().map(|n| n * 2).collect();
        assert_eq!(results, expected);
    }

    #[test]
    fn single_worker_is_effectively_sequential() {
        let items = vec!["a", "b", "c"];
        let results = map_bounded(items, 1, |s| s.to_uppercase());
        assert_eq!(results, vec!["A", "B", "C"]);
    }
}
