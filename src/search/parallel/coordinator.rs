//! Parallel search coordinator that manages worker threads.

use crate::error::SearchError;
use crate::report::{Reporter, SolutionView};
use crate::search::candidate::{slot_assignments, ProgramEnumerator};
use crate::search::config::{Algorithm, SearchConfig, SearchMode};
use crate::search::parallel::channel::{
    create_channels, CoordinatorChannels, FoundProgram, Job, JobReport, SharedState,
    WorkerChannels, WorkerMessage,
};
use crate::search::parallel::config::ParallelConfig;
use crate::search::problem::Problem;
use crate::search::result::{SearchResult, SearchStatistics, SlotCounters, Solution};
use crate::search::SearchAlgorithm;
use crate::semantics::{check_against_oracle, RegisterFile, Verdict};
use std::sync::Arc;
use std::time::Instant;
use crossbeam_channel::Sender;
use tracing::{debug, error, info, warn};

/// Candidates between checks of the shared flags and the deadline.
const POLL_INTERVAL: u64 = 1024;

/// Multi-threaded exhaustive search
pub struct ParallelSearch {
    config: ParallelConfig,
    statistics: SearchStatistics,
}

impl ParallelSearch {
    pub fn new(config: ParallelConfig) -> Self {
        Self {
            config,
            statistics: SearchStatistics::new(Algorithm::Parallel),
        }
    }
}

impl Default for ParallelSearch {
    fn default() -> Self {
        Self::new(ParallelConfig::default())
    }
}

impl SearchAlgorithm for ParallelSearch {
    fn search(
        &mut self,
        problem: &Problem,
        config: &SearchConfig,
        reporter: &mut dyn Reporter,
    ) -> Result<SearchResult, SearchError> {
        config.validate()?;
        self.reset();
        let start_time = Instant::now();
        let deadline = config.timeout.map(|t| start_time + t);
        let num_workers = self.config.num_workers;

        let (coordinator, worker_channels) = create_channels(num_workers);
        let shared_problem = Arc::new(problem.clone());

        let worker_handles: Vec<_> = worker_channels
            .into_iter()
            .enumerate()
            .map(|(worker_id, channels)| {
                let problem = Arc::clone(&shared_problem);
                let mode = config.mode;
                std::thread::spawn(move || run_worker(worker_id, &problem, mode, deadline, channels))
            })
            .collect();

        let outcome = run_coordinator(
            problem,
            config,
            deadline,
            &coordinator,
            reporter,
            &mut self.statistics,
        );

        // Closing the queue ends the workers
        let CoordinatorChannels {
            jobs, from_workers, ..
        } = coordinator;
        drop(jobs);
        for message in from_workers.iter() {
            if let WorkerMessage::Finished { worker_id, jobs } = message {
                debug!(worker_id, jobs, "worker finished");
            }
        }
        for handle in worker_handles {
            if handle.join().is_err() {
                warn!("worker thread panicked");
            }
        }
        let solutions = outcome?;

        self.statistics.solutions_found = solutions.len() as u64;
        self.statistics.elapsed_time = start_time.elapsed();
        info!(
            solutions = solutions.len(),
            candidates = self.statistics.candidates_evaluated,
            workers = num_workers,
            elapsed = ?self.statistics.elapsed_time,
            "search finished"
        );

        Ok(SearchResult {
            solutions,
            statistics: self.statistics.clone(),
        })
    }

    fn statistics(&self) -> SearchStatistics {
        self.statistics.clone()
    }

    fn reset(&mut self) {
        self.statistics = SearchStatistics::new(Algorithm::Parallel);
    }
}

/// Dispatch each length, collect its reports and hand solutions to the
/// reporter in enumeration order.
fn run_coordinator(
    problem: &Problem,
    config: &SearchConfig,
    deadline: Option<Instant>,
    channels: &CoordinatorChannels,
    reporter: &mut dyn Reporter,
    totals: &mut SearchStatistics,
) -> Result<Vec<Solution>, SearchError> {
    let roots = slot_assignments(problem.layout(), problem.catalogue(), 0);
    let mut solutions = Vec::new();
    totals.slot_counters = SlotCounters::new(config.max_length);

    for length in 1..=config.max_length {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            channels.shared.signal_stop();
            totals.timed_out = true;
            break;
        }

        info!(length, jobs = roots.len(), "searching programs");
        totals.max_length_reached = length;
        channels.shared.reset_cutoff();

        for (index, root) in roots.iter().enumerate() {
            let job = Job {
                length,
                index,
                root: *root,
            };
            if channels.jobs.send(job).is_err() {
                warn!(length, "job queue closed");
                return Ok(solutions);
            }
        }

        let mut reports: Vec<Option<JobReport>> = (0..roots.len()).map(|_| None).collect();
        let mut outstanding = roots.len();
        while outstanding > 0 {
            match channels.from_workers.recv() {
                Ok(WorkerMessage::JobDone(report)) => {
                    outstanding -= 1;
                    let index = report.index;
                    reports[index] = Some(report);
                }
                Ok(WorkerMessage::Finished { worker_id, .. }) => {
                    debug!(worker_id, "worker left early");
                }
                Ok(WorkerMessage::Failed { worker_id, index }) => {
                    error!(worker_id, job = index, length, "worker panicked");
                    channels.shared.signal_stop();
                    return Err(SearchError::WorkerPanicked {
                        worker_id,
                        job: index,
                    });
                }
                Err(_) => {
                    warn!(length, outstanding, "all workers exited");
                    break;
                }
            }
        }

        // Job order is enumeration order. A solution's counters are those of
        // every earlier job plus its own job's counters at discovery.
        let mut found = Vec::new();
        for report in reports.into_iter().flatten() {
            for FoundProgram { program, counters } in report.found {
                let mut snapshot = totals.slot_counters.clone();
                snapshot.merge(&counters);
                found.push(Solution {
                    program,
                    counters: snapshot,
                });
            }
            totals.merge(&report.statistics);
        }
        if config.mode == SearchMode::ShortestOnly {
            found.truncate(1);
        }

        debug!(length, solutions = found.len(), "length exhausted");
        for solution in found {
            let view = SolutionView::new(&solution.program, problem.layout(), problem.catalogue());
            reporter.report(&solution, &view);
            solutions.push(solution);
        }

        if totals.timed_out || (!solutions.is_empty() && config.mode.stops_after_first_length()) {
            break;
        }
    }

    Ok(solutions)
}

/// Tells the coordinator when a worker unwinds out of a job, so it does not
/// wait for a report that will never come.
struct PanicNotice<'a> {
    worker_id: usize,
    index: usize,
    to_coordinator: &'a Sender<WorkerMessage>,
}

impl Drop for PanicNotice<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            let _ = self.to_coordinator.send(WorkerMessage::Failed {
                worker_id: self.worker_id,
                index: self.index,
            });
        }
    }
}

/// Worker loop: take jobs until the queue closes.
fn run_worker(
    worker_id: usize,
    problem: &Problem,
    mode: SearchMode,
    deadline: Option<Instant>,
    channels: WorkerChannels,
) {
    let mut file = RegisterFile::new(problem.layout(), 1);
    let mut jobs = 0;

    while let Ok(job) = channels.jobs.recv() {
        let report = {
            let _notice = PanicNotice {
                worker_id,
                index: job.index,
                to_coordinator: &channels.to_coordinator,
            };
            run_job(worker_id, problem, mode, deadline, &job, &mut file, &channels.shared)
        };
        jobs += 1;
        if channels
            .to_coordinator
            .send(WorkerMessage::JobDone(report))
            .is_err()
        {
            break;
        }
    }

    let _ = channels
        .to_coordinator
        .send(WorkerMessage::Finished { worker_id, jobs });
}

/// Enumerate one subtree.
fn run_job(
    worker_id: usize,
    problem: &Problem,
    mode: SearchMode,
    deadline: Option<Instant>,
    job: &Job,
    file: &mut RegisterFile,
    shared: &SharedState,
) -> JobReport {
    let cancellable = mode == SearchMode::ShortestOnly;
    let mut statistics = SearchStatistics {
        slot_counters: SlotCounters::new(job.length),
        ..SearchStatistics::new(Algorithm::Parallel)
    };
    let mut found = Vec::new();
    let mut abandoned = false;

    if shared.should_stop() || (cancellable && shared.superseded(job.index)) {
        return JobReport {
            worker_id,
            index: job.index,
            statistics,
            found,
            abandoned: true,
        };
    }

    file.ensure_capacity(job.length);
    let mut enumerator =
        ProgramEnumerator::rooted(problem.layout(), problem.catalogue(), job.length, job.root);

    while enumerator.advance(&mut statistics.slot_counters) {
        statistics.candidates_evaluated += 1;
        if statistics.candidates_evaluated % POLL_INTERVAL == 0 {
            if shared.should_stop() || (cancellable && shared.superseded(job.index)) {
                abandoned = true;
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                shared.signal_stop();
                statistics.timed_out = true;
                abandoned = true;
                break;
            }
        }

        let program = enumerator.program();
        match check_against_oracle(file, problem.catalogue(), program, problem.oracle()) {
            Verdict::Invalid { .. } => statistics.rejected_invalid += 1,
            Verdict::Mismatch { .. } => statistics.rejected_mismatch += 1,
            Verdict::Match => {
                statistics.solutions_found += 1;
                debug!(worker_id, job = job.index, program = %program, "solution found");
                found.push(FoundProgram {
                    program: program.clone(),
                    counters: statistics.slot_counters.clone(),
                });
                if cancellable {
                    shared.lower_cutoff(job.index);
                    break;
                }
            }
        }
    }

    JobReport {
        worker_id,
        index: job.index,
        statistics,
        found,
        abandoned,
    }
}
