//! A parallel-for facility with static scheduling over image rows,
//! mirroring the teacher's `render_par`/`render_seq` split
//! (`euc::pipeline`): a fork-join pool sized to the host's logical core
//! count claims rows via an atomic counter, with no required ordering
//! between rows. Used by search, propagate, blend, anchor-weight
//! construction and the distance-transform passes (§5).

#[cfg(feature = "par")]
use std::sync::atomic::{AtomicI32, Ordering};

/// Calls `f(y)` once for every row `0..height`. Under the default `par`
/// feature this fans out across `num_cpus::get()` worker threads, each
/// claiming rows from a shared atomic counter so no two workers ever
/// process the same row; without it, rows are processed sequentially.
/// Callers must not depend on any particular row processing order.
pub fn for_each_row<F>(height: i32, f: F)
where
    F: Fn(i32) + Sync,
{
    #[cfg(feature = "par")]
    {
        if height <= 0 {
            return;
        }
        let threads = num_cpus::get().max(1).min(height.max(1) as usize);
        let next_row = AtomicI32::new(0);
        let f = &f;
        let next_row = &next_row;
        std::thread::scope(|scope| {
            for _ in 0..threads {
                scope.spawn(move || loop {
                    let y = next_row.fetch_add(1, Ordering::Relaxed);
                    if y >= height {
                        break;
                    }
                    f(y);
                });
            }
        });
    }
    #[cfg(not(feature = "par"))]
    {
        for y in 0..height {
            f(y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn every_row_visited_exactly_once() {
        let seen = Mutex::new(vec![false; 37]);
        for_each_row(37, |y| {
            let mut seen = seen.lock().unwrap();
            assert!(!seen[y as usize], "row {} visited twice", y);
            seen[y as usize] = true;
        });
        assert!(seen.lock().unwrap().iter().all(|&b| b));
    }

    #[test]
    fn zero_height_is_a_no_op() {
        for_each_row(0, |_| panic!("should not be called"));
    }
}
