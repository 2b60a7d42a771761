//! Concurrent escrow stress helpers.
//!
//! Each worker runs on its own thread with its own session and cursor, the
//! only sharing model the engine supports.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use esent_native::grbit::{
    CommitTransactionGrbit, EndSessionGrbit, OpenTableGrbit, RollbackTransactionGrbit,
};

use crate::fixtures::{scenarios, TestDatabase, TestTable};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations attempted.
    pub total_ops: usize,
    /// Operations that committed.
    pub successful_ops: usize,
    /// Operations that failed.
    pub failed_ops: usize,
    /// Rollbacks and session ends that failed after the operations ran.
    pub cleanup_errors: usize,
    /// Total duration.
    pub duration: Duration,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        Self {
            total_ops: successful + failed,
            successful_ops: successful,
            failed_ops: failed,
            cleanup_errors: 0,
            duration,
        }
    }

    /// Operations per second.
    pub fn ops_per_second(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.total_ops as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Configuration for the escrow stress run.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of concurrent sessions, one thread each.
    pub sessions: usize,
    /// Increments per session, each in its own transaction.
    pub increments: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            sessions: 4,
            increments: 100,
        }
    }
}

/// Increments the counter of a [`scenarios::counter_table`] from
/// `config.sessions` threads at once.
pub fn stress_concurrent_escrow(
    db: &TestDatabase,
    table: &TestTable,
    config: &StressConfig,
) -> StressTestResult {
    let successful = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let cleanup_errors = AtomicUsize::new(0);
    let count = table.column("count");
    let start = Instant::now();

    thread::scope(|scope| {
        for _ in 0..config.sessions {
            let api = db.api.clone();
            let (successful, failed) = (&successful, &failed);
            let cleanup_errors = &cleanup_errors;
            let (sesid, dbid) = db.second_session();
            scope.spawn(move || {
                let tableid = api
                    .open_table(sesid, dbid, "counters", None, OpenTableGrbit::NONE)
                    .expect("Failed to open counters");
                scenarios::seek_record(db, sesid, tableid, 0);
                for _ in 0..config.increments {
                    let result = api
                        .begin_transaction(sesid)
                        .and_then(|_| api.escrow_add(sesid, tableid, count, 1))
                        .and_then(|_| {
                            api.commit_transaction(sesid, CommitTransactionGrbit::LAZY_FLUSH)
                        });
                    match result {
                        Ok(_) => successful.fetch_add(1, Ordering::Relaxed),
                        Err(_) => {
                            if api.rollback(sesid, RollbackTransactionGrbit::NONE).is_err() {
                                cleanup_errors.fetch_add(1, Ordering::Relaxed);
                            }
                            failed.fetch_add(1, Ordering::Relaxed)
                        }
                    };
                }
                if api.end_session(sesid, EndSessionGrbit::NONE).is_err() {
                    cleanup_errors.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });

    let mut result = StressTestResult::new(
        successful.into_inner(),
        failed.into_inner(),
        start.elapsed(),
    );
    result.cleanup_errors = cleanup_errors.into_inner();
    result
}

/// Reads the counter of a [`scenarios::counter_table`].
pub fn read_counter(db: &TestDatabase, table: &TestTable) -> i32 {
    scenarios::seek_record(db, db.sesid, table.tableid, 0);
    db.api
        .retrieve_column_as::<i32>(
            db.sesid,
            table.tableid,
            table.column("count"),
            Default::default(),
        )
        .expect("Failed to read counter")
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_escrow_run_counts_every_increment() {
        let db = TestDatabase::memory();
        let table = scenarios::counter_table(&db);
        let config = StressConfig {
            sessions: 2,
            increments: 10,
        };
        let result = stress_concurrent_escrow(&db, &table, &config);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.successful_ops, 20);
        assert_eq!(result.cleanup_errors, 0);
        assert_eq!(read_counter(&db, &table), 20);
    }
}
