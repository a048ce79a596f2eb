use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::controllers::compute::events::compute_event::ComputeEvent;
use crate::controllers::compute::ports::listener::ComputeListener;
use crate::controllers::compute::status::ComputeStatus;
use crate::core::actions::cancellation::{CancelFlag, CancelToken};
use crate::core::data::viewport::Viewport;
use crate::core::flame::flame::Flame;
use crate::core::strategies::compute_config::ComputeConfig;
use crate::core::strategies::compute_job::ComputeJob;
use crate::core::strategies::compute_strategy::ComputeStrategy;
use crate::core::strategies::errors::{ComputeError, RunError};

/// Identifies one run of one computer: its shared state's address and the
/// run's generation.
type RunId = (usize, u64);

thread_local! {
    /// Run whose listener callback is executing on this thread.
    static LISTENER_RUN: Cell<Option<RunId>> = const { Cell::new(None) };
}

struct ListenerScope {
    previous: Option<RunId>,
}

impl ListenerScope {
    fn enter(run: RunId) -> Self {
        Self {
            previous: LISTENER_RUN.with(|current| current.replace(Some(run))),
        }
    }
}

impl Drop for ListenerScope {
    fn drop(&mut self) {
        LISTENER_RUN.with(|current| current.set(self.previous));
    }
}

struct SharedState {
    generation: AtomicU64,
    last_completed_generation: AtomicU64,
    status: Mutex<ComputeStatus>,
    listener: RwLock<Option<Arc<dyn ComputeListener>>>,
}

impl SharedState {
    fn status(&self) -> MutexGuard<'_, ComputeStatus> {
        self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run_id(&self, generation: u64) -> RunId {
        (std::ptr::from_ref(self) as usize, generation)
    }

    /// Whether this thread is inside a listener callback of run `generation`.
    fn is_listener_thread_of(&self, generation: u64) -> bool {
        LISTENER_RUN.with(Cell::get) == Some(self.run_id(generation))
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::Acquire) == generation
    }

    fn emit(&self, event: ComputeEvent) {
        let listener = self
            .listener
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        if let Some(listener) = listener {
            let _scope = ListenerScope::enter(self.run_id(event.generation()));
            listener.on_event(event);
        }
    }

    /// Moves a finished run to `outcome` unless it was aborted or superseded.
    fn settle(&self, generation: u64, cancel: &CancelFlag, outcome: ComputeStatus) -> bool {
        let mut status = self.status();
        if cancel.is_cancelled() || !self.is_current(generation) {
            return false;
        }

        *status = outcome;
        if outcome == ComputeStatus::Completed {
            self.last_completed_generation
                .store(generation, Ordering::Release);
        }
        true
    }
}

struct ActiveRun {
    generation: u64,
    cancel: CancelFlag,
    worker: JoinHandle<()>,
}

/// A flame bound to a compute strategy, with a cancellable run lifecycle.
///
/// Each [`compute`](Self::compute) starts a new run on a dedicated thread
/// and returns its generation. Starting a run aborts the previous one.
/// Events reach the listener only for the current generation, and a run
/// that was aborted or superseded never reports completion.
///
/// A listener may call back into the computer. An abort issued from a
/// listener callback cancels the run without waiting for it.
pub struct FlameComputer {
    shared: Arc<SharedState>,
    flame: Flame,
    strategy: ComputeStrategy,
    config: ComputeConfig,
    active: Mutex<Option<ActiveRun>>,
}

impl FlameComputer {
    #[must_use]
    pub fn new(flame: Flame, strategy: ComputeStrategy, config: ComputeConfig) -> Self {
        Self {
            shared: Arc::new(SharedState {
                generation: AtomicU64::new(0),
                last_completed_generation: AtomicU64::new(0),
                status: Mutex::new(ComputeStatus::Idle),
                listener: RwLock::new(None),
            }),
            flame,
            strategy,
            config,
            active: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn flame(&self) -> &Flame {
        &self.flame
    }

    /// Rebinds the computer to `flame`, aborting any run first.
    pub fn set_flame(&mut self, flame: Flame) {
        self.abort();
        self.flame = flame;
    }

    #[must_use]
    pub fn strategy(&self) -> &ComputeStrategy {
        &self.strategy
    }

    #[must_use]
    pub fn config(&self) -> &ComputeConfig {
        &self.config
    }

    pub fn set_listener(&self, listener: Option<Arc<dyn ComputeListener>>) {
        *self
            .shared
            .listener
            .write()
            .unwrap_or_else(PoisonError::into_inner) = listener;
    }

    #[must_use]
    pub fn status(&self) -> ComputeStatus {
        *self.shared.status()
    }

    /// Generation of the most recently started run, 0 before the first.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }

    /// Generation of the last run that completed, 0 if none has.
    #[must_use]
    pub fn last_completed_generation(&self) -> u64 {
        self.shared
            .last_completed_generation
            .load(Ordering::Acquire)
    }

    /// Starts rendering the bound flame and returns the new run's generation.
    ///
    /// Arguments are validated before anything else happens. A running
    /// computation is aborted before the new one starts. Runtime failures
    /// are reported to the listener as [`ComputeEvent::Failed`].
    pub fn compute(
        &self,
        viewport: Viewport,
        width: usize,
        height: usize,
        density: u32,
    ) -> Result<u64, ComputeError> {
        let job = ComputeJob::new(self.flame.clone(), viewport, width, height, density)?;

        self.abort();

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.shared.status() = ComputeStatus::Running;

        let cancel = CancelFlag::new();
        let spawned = {
            let shared = Arc::clone(&self.shared);
            let strategy = self.strategy.clone();
            let config = self.config;
            let cancel = cancel.clone();

            thread::Builder::new()
                .name(format!("flame-compute-{generation}"))
                .spawn(move || Self::run(&shared, generation, &strategy, &job, &config, &cancel))
        };

        let worker = match spawned {
            Ok(worker) => worker,
            Err(e) => {
                *self.shared.status() = ComputeStatus::Failed;
                return Err(ComputeError::WorkerSpawn(e.to_string()));
            }
        };

        info!(
            generation,
            strategy = self.strategy.name(),
            width,
            height,
            density,
            "compute started"
        );

        let previous = self.lock_active().replace(ActiveRun {
            generation,
            cancel,
            worker,
        });
        if let Some(previous) = previous {
            self.stop(previous);
        }

        Ok(generation)
    }

    /// Cancels the current run and waits until its workers have stopped.
    pub fn abort(&self) {
        let run = self.lock_active().take();
        if let Some(run) = run {
            self.stop(run);
        }
    }

    /// Detaches the listener, then aborts.
    pub fn destroy(&self) {
        self.set_listener(None);
        self.abort();
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveRun>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop(&self, run: ActiveRun) {
        run.cancel.cancel();

        {
            let mut status = self.shared.status();
            if !status.is_terminal() && self.shared.is_current(run.generation) {
                *status = ComputeStatus::Aborted;
                info!(generation = run.generation, "compute aborted");
            }
        }

        if self.shared.is_listener_thread_of(run.generation) {
            debug!(
                generation = run.generation,
                "abort from listener callback, not joining"
            );
            return;
        }

        if run.worker.join().is_err() {
            warn!(generation = run.generation, "compute worker panicked");
        }
    }

    fn run(
        shared: &SharedState,
        generation: u64,
        strategy: &ComputeStrategy,
        job: &ComputeJob,
        config: &ComputeConfig,
        cancel: &CancelFlag,
    ) {
        let start = Instant::now();
        let progress = |percent: u8| {
            if !cancel.is_cancelled() && shared.is_current(generation) {
                shared.emit(ComputeEvent::Progress {
                    generation,
                    percent,
                });
            }
        };

        match strategy.execute(job, config, cancel, &progress) {
            Ok(accumulator) => {
                let elapsed = start.elapsed();
                if shared.settle(generation, cancel, ComputeStatus::Completed) {
                    info!(
                        generation,
                        ?elapsed,
                        max_hit = accumulator.max_hit(),
                        "compute completed"
                    );
                    shared.emit(ComputeEvent::Completed {
                        generation,
                        accumulator: Arc::new(accumulator),
                        elapsed,
                    });
                }
            }
            Err(RunError::Cancelled(_)) => {
                debug!(generation, "compute cancelled");
            }
            Err(RunError::Failed(error)) => {
                if shared.settle(generation, cancel, ComputeStatus::Failed) {
                    warn!(generation, %error, "compute failed");
                    shared.emit(ComputeEvent::Failed {
                        generation,
                        message: error.to_string(),
                    });
                }
            }
        }
    }
}

impl fmt::Debug for FlameComputer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlameComputer")
            .field("strategy", &self.strategy.name())
            .field("status", &self.status())
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

impl Drop for FlameComputer {
    fn drop(&mut self) {
        self.destroy();
    }
}
