use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, trace};

use crate::dataset::Dataset;
use crate::engine::{self, FilterOutcome};
use crate::filter::FilterState;

struct Job {
    generation: u64,
    dataset: Arc<Dataset>,
    state: FilterState,
}

/// A finished engine run, tagged with the generation it was computed for.
pub struct Completion {
    pub generation: u64,
    pub outcome: FilterOutcome,
}

/// Runs the filtering engine on a worker thread, debounced and
/// latest-wins.
///
/// Every state change calls [`Scheduler::request`], which only records a
/// pending snapshot and arms a deadline; the event loop calls
/// [`Scheduler::tick`], which dispatches at most one job once the quiet
/// window has passed and hands back at most one completion. Each dispatched
/// job carries a monotonically increasing generation; a completion whose
/// generation is not the latest dispatched one is dropped on arrival, so a
/// slow superseded run can never overwrite a newer result.
pub struct Scheduler {
    jobs: Option<Sender<Job>>,
    results: Receiver<Completion>,
    worker: Option<JoinHandle<()>>,
    debounce: Duration,
    generation: u64,
    pending: Option<Pending>,
    last_dispatched: Option<(u64, FilterState)>,
}

struct Pending {
    dataset: Arc<Dataset>,
    version: u64,
    state: FilterState,
    deadline: Instant,
}

impl Scheduler {
    pub fn new(debounce: Duration) -> Self {
        let (job_tx, job_rx) = channel::<Job>();
        let (result_tx, result_rx) = channel::<Completion>();
        let worker = thread::Builder::new()
            .name("fv-filter".to_string())
            .spawn(move || Self::worker_loop(job_rx, result_tx))
            .ok();
        if worker.is_none() {
            error!("Could not spawn the filter worker thread!");
        }
        Scheduler {
            jobs: Some(job_tx),
            results: result_rx,
            worker,
            debounce,
            generation: 0,
            pending: None,
            last_dispatched: None,
        }
    }

    /// Record the latest state to compute from and (re)arm the quiet
    /// window. Successive calls within the window collapse into one run.
    pub fn request(&mut self, dataset: Arc<Dataset>, version: u64, state: FilterState) {
        self.pending = Some(Pending {
            dataset,
            version,
            state,
            deadline: Instant::now() + self.debounce,
        });
    }

    /// Let the pending request dispatch on the next tick instead of waiting
    /// out the quiet window. Used right after a dataset load.
    pub fn flush(&mut self) {
        if let Some(pending) = self.pending.as_mut() {
            pending.deadline = Instant::now();
        }
    }

    /// Latest dispatched generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a request is still waiting out its quiet window.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drive the scheduler: dispatch the pending snapshot if its deadline
    /// has passed, then collect results, dropping any stale completion.
    pub fn tick(&mut self) -> Option<Completion> {
        if self
            .pending
            .as_ref()
            .is_some_and(|p| Instant::now() >= p.deadline)
        {
            let pending = self.pending.take();
            if let Some(pending) = pending {
                self.dispatch(pending);
            }
        }

        let mut fresh = None;
        while let Ok(completion) = self.results.try_recv() {
            if completion.generation == self.generation {
                fresh = Some(completion);
            } else {
                debug!(
                    "Dropping stale result of generation {} (current {})",
                    completion.generation, self.generation
                );
            }
        }
        fresh
    }

    fn dispatch(&mut self, pending: Pending) {
        // Identical logical state, dispatched before: the published result
        // is already current, no need to recompute.
        let key = (pending.version, pending.state.clone());
        if self.last_dispatched.as_ref() == Some(&key) {
            trace!("Skipping dispatch, state unchanged since generation {}", self.generation);
            return;
        }

        self.generation += 1;
        trace!("Dispatching filter run, generation {}", self.generation);
        let job = Job {
            generation: self.generation,
            dataset: pending.dataset,
            state: pending.state,
        };
        match &self.jobs {
            Some(jobs) if jobs.send(job).is_ok() => {
                self.last_dispatched = Some(key);
            }
            _ => error!("Filter worker is gone, dropping generation {}", self.generation),
        }
    }

    fn worker_loop(jobs: Receiver<Job>, results: Sender<Completion>) {
        while let Ok(mut job) = jobs.recv() {
            // Drain to the newest queued job; superseded work is never
            // even started.
            while let Ok(newer) = jobs.try_recv() {
                trace!("Skipping superseded generation {}", job.generation);
                job = newer;
            }

            let start_time = Instant::now();
            let generation = job.generation;
            let computed = panic::catch_unwind(AssertUnwindSafe(|| {
                engine::compute(&job.dataset, &job.state)
            }));
            match computed {
                Ok(outcome) => {
                    debug!(
                        "Generation {} computed in {}ms",
                        generation,
                        start_time.elapsed().as_millis()
                    );
                    if results.send(Completion { generation, outcome }).is_err() {
                        break;
                    }
                }
                // The generation simply never delivers; the previously
                // published result stays valid.
                Err(_) => error!("Filter computation of generation {} panicked!", generation),
            }
        }
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        drop(self.jobs.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::dataset_from;

    fn immediate() -> Scheduler {
        Scheduler::new(Duration::ZERO)
    }

    fn small_dataset() -> Arc<Dataset> {
        Arc::new(dataset_from(&["a"], &[&["x"], &["y"], &["x"]]))
    }

    fn wait_for(scheduler: &mut Scheduler) -> Completion {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(completion) = scheduler.tick() {
                return completion;
            }
            thread::sleep(Duration::from_millis(2));
        }
        panic!("No completion within 5s");
    }

    fn assert_quiet(scheduler: &mut Scheduler, window: Duration) {
        let deadline = Instant::now() + window;
        while Instant::now() < deadline {
            assert!(scheduler.tick().is_none());
            thread::sleep(Duration::from_millis(2));
        }
    }

    #[test]
    fn dispatches_and_delivers_a_result() {
        let mut scheduler = immediate();
        scheduler.request(small_dataset(), 1, FilterState::default());

        let completion = wait_for(&mut scheduler);
        assert_eq!(completion.generation, 1);
        assert_eq!(completion.outcome.rows.len(), 3);
    }

    #[test]
    fn burst_of_changes_collapses_into_one_run_with_the_latest_state() {
        let mut scheduler = Scheduler::new(Duration::from_millis(40));
        let dataset = small_dataset();

        let mut first = FilterState::default();
        first.toggle_value("a", "y");
        scheduler.request(Arc::clone(&dataset), 1, first);

        let mut latest = FilterState::default();
        latest.toggle_value("a", "x");
        scheduler.request(Arc::clone(&dataset), 1, latest);

        let completion = wait_for(&mut scheduler);
        assert_eq!(completion.generation, 1);
        assert_eq!(completion.outcome.rows.len(), 2);
        // Nothing else was dispatched.
        assert_quiet(&mut scheduler, Duration::from_millis(100));
        assert_eq!(scheduler.generation(), 1);
    }

    #[test]
    fn superseded_generation_is_never_applied() {
        let mut scheduler = immediate();
        let dataset = small_dataset();

        let mut first = FilterState::default();
        first.toggle_value("a", "y");
        scheduler.request(Arc::clone(&dataset), 1, first);
        scheduler.tick(); // dispatch generation 1

        let mut latest = FilterState::default();
        latest.toggle_value("a", "x");
        scheduler.request(Arc::clone(&dataset), 1, latest);

        // Whatever the worker interleaving, only generation 2 may surface.
        let completion = wait_for(&mut scheduler);
        assert_eq!(completion.generation, 2);
        assert_eq!(completion.outcome.rows.len(), 2);
        assert_quiet(&mut scheduler, Duration::from_millis(100));
    }

    #[test]
    fn identical_snapshot_is_not_redispatched() {
        let mut scheduler = immediate();
        let dataset = small_dataset();

        scheduler.request(Arc::clone(&dataset), 1, FilterState::default());
        let completion = wait_for(&mut scheduler);
        assert_eq!(completion.generation, 1);

        scheduler.request(Arc::clone(&dataset), 1, FilterState::default());
        assert_quiet(&mut scheduler, Duration::from_millis(100));
        assert_eq!(scheduler.generation(), 1);
    }

    #[test]
    fn new_dataset_version_forces_a_fresh_run() {
        let mut scheduler = immediate();
        let dataset = small_dataset();

        scheduler.request(Arc::clone(&dataset), 1, FilterState::default());
        assert_eq!(wait_for(&mut scheduler).generation, 1);

        // Same filter state, new dataset version: must recompute.
        scheduler.request(Arc::clone(&dataset), 2, FilterState::default());
        assert_eq!(wait_for(&mut scheduler).generation, 2);
    }

    #[test]
    fn debounce_delays_the_dispatch() {
        let mut scheduler = Scheduler::new(Duration::from_millis(60));
        scheduler.request(small_dataset(), 1, FilterState::default());
        assert!(scheduler.tick().is_none());
        assert_eq!(scheduler.generation(), 0);

        let completion = wait_for(&mut scheduler);
        assert_eq!(completion.generation, 1);
    }

    #[test]
    fn flush_skips_the_quiet_window() {
        let mut scheduler = Scheduler::new(Duration::from_secs(60));
        scheduler.request(small_dataset(), 1, FilterState::default());
        scheduler.flush();
        let completion = wait_for(&mut scheduler);
        assert_eq!(completion.generation, 1);
    }
}
