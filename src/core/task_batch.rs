//! TaskBatch
//!
//! A fork/join barrier over a mutex-guarded FIFO of independent closures.
//! Reinstantiated per render pass so each pass gets a hard barrier: nothing
//! from the next pass starts until every task of this one has drained.
//!
//! Tasks borrow the pass's tile of the framebuffer/reservoir buffers rather
//! than owning copies, so workers are spawned with `std::thread::scope`
//! instead of `std::thread::spawn`: the scope guarantees every borrow
//! outlives the threads that hold it, which is what lets `enqueue` take
//! closures that are `Send` but not `'static`.

#![allow(dead_code)]

use parking_lot::Mutex;
use std::collections::VecDeque;

type Task<'a> = Box<dyn FnOnce() + Send + 'a>;

/// A queue of independent tasks, executed by a fixed-size worker pool.
pub struct TaskBatch<'a> {
    thread_count: usize,
    tasks: Mutex<VecDeque<Task<'a>>>,
}

impl<'a> TaskBatch<'a> {
    /// Creates an empty batch that will run with `thread_count` workers
    /// (clamped to at least 1).
    pub fn new(thread_count: usize) -> Self {
        Self {
            thread_count: thread_count.max(1),
            tasks: Mutex::new(VecDeque::new()),
        }
    }

    /// Appends a task to the queue. Must be called before `execute`.
    pub fn enqueue(&self, task: impl FnOnce() + Send + 'a) {
        self.tasks.lock().push_back(Box::new(task));
    }

    pub fn pending(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Spawns the worker pool; each worker pops tasks off the shared queue
    /// until it is empty, then returns. Blocks until every worker joins,
    /// which is the barrier.
    pub fn execute(&self) {
        std::thread::scope(|scope| {
            for _ in 0..self.thread_count {
                scope.spawn(|| loop {
                    let task = self.tasks.lock().pop_front();
                    match task {
                        Some(task) => task(),
                        None => return,
                    }
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn every_enqueued_task_runs_exactly_once() {
        let batch = TaskBatch::new(4);
        let counter = AtomicUsize::new(0);
        for _ in 0..200 {
            batch.enqueue(|| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }
        batch.execute();
        assert_eq!(counter.load(Ordering::SeqCst), 200);
    }

    #[test]
    fn tasks_write_disjoint_indices_without_races() {
        let batch = TaskBatch::new(8);
        let mut results = vec![0usize; 256];
        let chunks: Vec<&mut [usize]> = results.chunks_mut(1).collect();
        for (i, chunk) in chunks.into_iter().enumerate() {
            batch.enqueue(move || {
                chunk[0] = i * 2;
            });
        }
        batch.execute();
        for (i, &v) in results.iter().enumerate() {
            assert_eq!(v, i * 2);
        }
    }

    #[test]
    fn empty_batch_executes_without_panicking() {
        let batch = TaskBatch::new(4);
        batch.execute();
    }

    #[test]
    fn single_thread_runs_tasks_in_fifo_order() {
        let batch = TaskBatch::new(1);
        let order = Mutex::new(Vec::new());
        for i in 0..10 {
            batch.enqueue(|| order.lock().push(i));
        }
        batch.execute();
        assert_eq!(*order.lock(), (0..10).collect::<Vec<_>>());
    }
}
