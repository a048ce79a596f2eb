use std::sync::atomic::{AtomicU8, AtomicU32, Ordering, fence};
use std::sync::{Mutex, TryLockError};

/// Aggregates per-worker progress into a single percentage.
///
/// Each worker counts `steps` equal slices of its own share; the run's
/// percentage is the mean over workers. The sink only sees strictly
/// increasing values in `1..=100`, one call at a time. A worker that finds
/// another worker inside the sink leaves the report to it and keeps
/// iterating.
pub struct ProgressReporter<'a> {
    steps: u32,
    completed: Vec<AtomicU32>,
    reported: AtomicU8,
    emitting: Mutex<()>,
    sink: &'a (dyn Fn(u8) + Sync),
}

impl<'a> ProgressReporter<'a> {
    pub fn new(workers: usize, steps: u32, sink: &'a (dyn Fn(u8) + Sync)) -> Self {
        Self {
            steps: steps.max(1),
            completed: (0..workers.max(1)).map(|_| AtomicU32::new(0)).collect(),
            reported: AtomicU8::new(0),
            emitting: Mutex::new(()),
            sink,
        }
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.completed.len()
    }

    /// Per-worker handle for a worker running `iterations` iterations.
    #[must_use]
    pub fn worker(&self, index: usize, iterations: u64) -> WorkerProgress<'_, 'a> {
        let mut progress = WorkerProgress {
            reporter: self,
            index,
            iterations,
            next_step: 1,
            next_threshold: 0,
        };
        progress.next_threshold = progress.threshold(1);
        progress
    }

    /// Current aggregated percentage.
    #[must_use]
    pub fn percent(&self) -> u8 {
        let done: u64 = self
            .completed
            .iter()
            .map(|c| u64::from(c.load(Ordering::SeqCst)))
            .sum();
        let total = u64::from(self.steps) * self.completed.len() as u64;

        (done * 100 / total).min(100) as u8
    }

    fn record(&self, index: usize, step: u32) {
        if let Some(counter) = self.completed.get(index) {
            counter.fetch_max(step, Ordering::SeqCst);
        }

        self.drain();
    }

    /// Reports the current percentage unless another thread is already
    /// emitting. That thread re-checks after releasing the sink, so no
    /// recorded step is left unreported.
    fn drain(&self) {
        loop {
            fence(Ordering::SeqCst);
            let guard = match self.emitting.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::WouldBlock) => return,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
            };

            loop {
                let percent = self.percent();
                if percent <= self.reported.load(Ordering::SeqCst) {
                    break;
                }
                self.reported.store(percent, Ordering::SeqCst);
                (self.sink)(percent);
            }

            drop(guard);
            fence(Ordering::SeqCst);
            if self.percent() <= self.reported.load(Ordering::SeqCst) {
                return;
            }
        }
    }
}

impl std::fmt::Debug for ProgressReporter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("steps", &self.steps)
            .field("workers", &self.completed.len())
            .field("percent", &self.percent())
            .finish()
    }
}

/// Progress of one worker; cheap to poll from the iteration loop.
#[derive(Debug)]
pub struct WorkerProgress<'r, 'a> {
    reporter: &'r ProgressReporter<'a>,
    index: usize,
    iterations: u64,
    next_step: u32,
    next_threshold: u64,
}

impl WorkerProgress<'_, '_> {
    /// Reports `done` of this worker's iterations as complete.
    #[inline]
    pub fn update(&mut self, done: u64) {
        if done >= self.next_threshold && self.next_step <= self.reporter.steps {
            self.advance(done);
        }
    }

    /// Marks this worker's share as fully done.
    pub fn finish(&mut self) {
        if self.next_step <= self.reporter.steps {
            self.next_step = self.reporter.steps + 1;
            self.reporter.record(self.index, self.reporter.steps);
        }
    }

    fn advance(&mut self, done: u64) {
        let mut reached = self.next_step;
        while reached < self.reporter.steps && done >= self.threshold(reached + 1) {
            reached += 1;
        }

        self.next_step = reached + 1;
        self.next_threshold = self.threshold(self.next_step);
        self.reporter.record(self.index, reached);
    }

    fn threshold(&self, step: u32) -> u64 {
        let steps = u128::from(self.reporter.steps);
        (u128::from(self.iterations) * u128::from(step)).div_ceil(steps) as u64
    }
}
