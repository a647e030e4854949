//! Latest known snapshot of every run started by this process, so callers
//! can poll a run after the form-fill tool has already returned.
//!
//! Active runs are always kept. Finished runs are kept up to a retention
//! limit, after which the oldest finished run is dropped.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError, RwLock};

use crate::state_machine::{OrchestrationRun, RunRecord};

pub const DEFAULT_FINISHED_RETENTION: usize = 100;

#[derive(Default)]
struct Runs {
    records: HashMap<String, RunRecord>,
    /// Ids of finished runs, oldest first.
    finished: VecDeque<String>,
}

#[derive(Clone)]
pub struct RunRegistry {
    runs: Arc<RwLock<Runs>>,
    retention: usize,
}

impl Default for RunRegistry {
    fn default() -> Self {
        Self::with_retention(DEFAULT_FINISHED_RETENTION)
    }
}

impl RunRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `retention` finished runs.
    pub fn with_retention(retention: usize) -> Self {
        Self {
            runs: Arc::new(RwLock::new(Runs::default())),
            retention,
        }
    }

    /// Replace the stored snapshot of `run`.
    pub fn publish(&self, run: &OrchestrationRun) {
        let record = RunRecord::from_run(run);
        let mut runs = self.runs.write().unwrap_or_else(PoisonError::into_inner);

        let newly_finished = record.is_finished()
            && !runs
                .records
                .get(&record.run_id)
                .is_some_and(RunRecord::is_finished);
        if newly_finished {
            runs.finished.push_back(record.run_id.clone());
        }
        runs.records.insert(record.run_id.clone(), record);

        while runs.finished.len() > self.retention {
            if let Some(evicted) = runs.finished.pop_front() {
                runs.records.remove(&evicted);
            }
        }
    }

    pub fn get(&self, run_id: &str) -> Option<RunRecord> {
        self.runs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .get(run_id)
            .cloned()
    }

    /// All retained runs, oldest first.
    pub fn list(&self) -> Vec<RunRecord> {
        let mut records: Vec<RunRecord> = self
            .runs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .records
            .values()
            .cloned()
            .collect();
        records.sort_by_key(|r| r.started_at);
        records
    }

    /// Runs that have not reached a terminal state.
    pub fn active_count(&self) -> usize {
        let runs = self.runs.read().unwrap_or_else(PoisonError::into_inner);
        runs.records.len() - runs.finished.len()
    }
}
