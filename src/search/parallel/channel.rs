//! Job queue, report channel and shared flags for parallel search workers.

use crate::ir::{Program, Slot};
use crate::search::result::{SearchStatistics, SlotCounters};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// One subtree of the search: every program of `length` whose slot 0 is
/// `root`. Jobs of a length are numbered in enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub length: usize,
    pub index: usize,
    pub root: Slot,
}

/// A solution as seen from inside its job.
#[derive(Debug, Clone)]
pub struct FoundProgram {
    pub program: Program,
    /// The job's own counters when the program was found.
    pub counters: SlotCounters,
}

/// Everything a worker learned from one job.
#[derive(Debug, Clone)]
pub struct JobReport {
    pub worker_id: usize,
    pub index: usize,
    /// Counts for this job only. `slot_counters` covers the attempted part of
    /// the subtree.
    pub statistics: SearchStatistics,
    /// Solutions in enumeration order.
    pub found: Vec<FoundProgram>,
    /// The job stopped before its subtree was exhausted.
    pub abandoned: bool,
}

/// Message sent from workers to the coordinator.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    /// Worker finished (or gave up on) a job.
    JobDone(JobReport),
    /// Worker saw the job queue close and is exiting.
    Finished { worker_id: usize, jobs: usize },
    /// Worker panicked while running job `index`; no report will follow.
    Failed { worker_id: usize, index: usize },
}

/// Flags every worker polls while enumerating.
#[derive(Debug)]
pub struct SharedState {
    /// Lowest job index of the current length known to hold a solution
    /// (`usize::MAX` when none).
    cutoff: AtomicUsize,
    /// Flag to signal all workers to stop.
    stop: AtomicBool,
}

impl Default for SharedState {
    fn default() -> Self {
        Self {
            cutoff: AtomicUsize::new(usize::MAX),
            stop: AtomicBool::new(false),
        }
    }
}

impl SharedState {
    /// Forget the cutoff before a new length is dispatched.
    pub fn reset_cutoff(&self) {
        self.cutoff.store(usize::MAX, Ordering::SeqCst);
    }

    /// Record a solution in job `index`.
    pub fn lower_cutoff(&self, index: usize) {
        self.cutoff.fetch_min(index, Ordering::SeqCst);
    }

    pub fn cutoff(&self) -> usize {
        self.cutoff.load(Ordering::Relaxed)
    }

    /// True if a lower-numbered job already has a solution.
    pub fn superseded(&self, index: usize) -> bool {
        self.cutoff() < index
    }

    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn signal_stop(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Channel endpoints for a worker.
pub struct WorkerChannels {
    pub jobs: Receiver<Job>,
    pub to_coordinator: Sender<WorkerMessage>,
    pub shared: Arc<SharedState>,
}

/// Channel endpoints for the coordinator.
pub struct CoordinatorChannels {
    /// Closing this ends the workers.
    pub jobs: Sender<Job>,
    pub from_workers: Receiver<WorkerMessage>,
    pub shared: Arc<SharedState>,
}

/// Create channels for parallel search with the given number of workers.
pub fn create_channels(num_workers: usize) -> (CoordinatorChannels, Vec<WorkerChannels>) {
    let shared = Arc::new(SharedState::default());
    let (job_tx, job_rx) = unbounded();
    let (report_tx, report_rx) = unbounded();

    let workers = (0..num_workers)
        .map(|_| WorkerChannels {
            jobs: job_rx.clone(),
            to_coordinator: report_tx.clone(),
            shared: Arc::clone(&shared),
        })
        .collect();

    let coordinator = CoordinatorChannels {
        jobs: job_tx,
        from_workers: report_rx,
        shared,
    };

    (coordinator, workers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cutoff_keeps_minimum() {
        let shared = SharedState::default();
        assert!(!shared.superseded(1000));
        shared.lower_cutoff(7);
        shared.lower_cutoff(12);
        assert_eq!(shared.cutoff(), 7);
        assert!(shared.superseded(8));
        assert!(!shared.superseded(7));
        assert!(!shared.superseded(3));
        shared.reset_cutoff();
        assert_eq!(shared.cutoff(), usize::MAX);
    }

    #[test]
    fn test_stop_flag() {
        let shared = SharedState::default();
        assert!(!shared.should_stop());
        shared.signal_stop();
        assert!(shared.should_stop());
    }

    #[test]
    fn test_jobs_are_shared_between_workers() {
        let (coordinator, workers) = create_channels(3);
        assert_eq!(workers.len(), 3);

        for index in 0..6 {
            coordinator
                .jobs
                .send(Job {
                    length: 1,
                    index,
                    root: Slot::new(0, &[11]),
                })
                .unwrap();
        }
        drop(coordinator.jobs);

        let mut seen: Vec<usize> = Vec::new();
        for worker in &workers {
            while let Ok(job) = worker.jobs.try_recv() {
                seen.push(job.index);
            }
        }
        seen.sort();
        assert_eq!(seen, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_reports_reach_coordinator() {
        let (coordinator, workers) = create_channels(2);
        workers[1]
            .to_coordinator
            .send(WorkerMessage::Finished {
                worker_id: 1,
                jobs: 4,
            })
            .unwrap();
        drop(workers);
        let messages: Vec<WorkerMessage> = coordinator.from_workers.iter().collect();
        assert!(matches!(
            messages.as_slice(),
            [WorkerMessage::Finished { worker_id: 1, jobs: 4 }]
        ));
    }
}
