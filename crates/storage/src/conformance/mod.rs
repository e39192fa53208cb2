//! Conformance test suite for `ScriptStore` implementations.
//!
//! This module provides a backend-agnostic test suite that any `ScriptStore`
//! implementation can run to verify correctness. The suite covers:
//!
//! - **Read**: lookup by id, not-found errors
//! - **Update**: sparse writes, untouched fields, `updated_at` refresh
//! - **List**: status filter, ordering, pagination, limit clamping
//! - **Counts**: per-status tallies
//!
//! # Usage
//!
//! Backend crates call [`run_conformance_suite`] with a factory function that
//! creates a fresh storage instance seeded with the given records:
//!
//! ```ignore
//! use reelops_storage::conformance::run_conformance_suite;
//!
//! #[tokio::test]
//! async fn memory_conformance() {
//!     let report = run_conformance_suite(|records| async move {
//!         InMemoryScriptStore::with_records(records)
//!     }).await;
//!     assert!(report.failed == 0, "{report}");
//! }
//! ```

mod list;
mod read;
mod update;

use std::fmt;
use std::future::Future;

use crate::record::{ScriptRecord, ScriptStatus};
use crate::ScriptStore;

/// Result of a single conformance test.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// Test category (e.g. "read", "update", "list").
    pub category: String,
    /// Test name (e.g. "get_returns_seeded_record").
    pub name: String,
    /// Whether the test passed.
    pub passed: bool,
    /// Error message if the test failed.
    pub message: Option<String>,
}

impl TestResult {
    fn from_result(category: &str, name: &str, result: Result<(), String>) -> Self {
        let (passed, message) = match result {
            Ok(()) => (true, None),
            Err(msg) => (false, Some(msg)),
        };
        Self {
            category: category.to_string(),
            name: name.to_string(),
            passed,
            message,
        }
    }
}

/// Aggregated report from a full conformance suite run.
#[derive(Debug, Clone)]
pub struct ConformanceReport {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub failed: usize,
    pub total: usize,
}

impl fmt::Display for ConformanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Conformance: {}/{} passed ({} failed)",
            self.passed, self.total, self.failed
        )?;
        for r in &self.results {
            if !r.passed {
                writeln!(
                    f,
                    "  FAIL [{}/{}]: {}",
                    r.category,
                    r.name,
                    r.message.as_deref().unwrap_or("(no message)")
                )?;
            }
        }
        Ok(())
    }
}

/// Run the full conformance suite against a storage backend.
///
/// The `factory` function is called once per test with the records that
/// test needs, and must return a fresh store holding exactly those records.
pub async fn run_conformance_suite<S, F, Fut>(factory: F) -> ConformanceReport
where
    S: ScriptStore,
    F: Fn(Vec<ScriptRecord>) -> Fut,
    Fut: Future<Output = S>,
{
    let mut results = Vec::new();

    results.extend(read::run_read_tests(&factory).await);
    results.extend(update::run_update_tests(&factory).await);
    results.extend(list::run_list_tests(&factory).await);

    let passed = results.iter().filter(|r| r.passed).count();
    let total = results.len();

    ConformanceReport {
        results,
        passed,
        failed: total - passed,
        total,
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// A record with a fixed, sortable `created_at` so ordering is deterministic.
fn make_record(id: &str, status: ScriptStatus, minute: u32) -> ScriptRecord {
    ScriptRecord::new(id, status).with_created_at(format!("2025-01-01T00:{minute:02}:00Z"))
}

/// One record per status, created a minute apart in lifecycle order.
fn one_of_each() -> Vec<ScriptRecord> {
    vec![
        make_record("pending", ScriptStatus::PendingScript, 1),
        make_record("approved", ScriptStatus::ScriptApproved, 2),
        make_record("ready", ScriptStatus::VideoReadyPreview, 3),
        make_record("posted", ScriptStatus::Posted, 4).with_processed(true),
        make_record("failed", ScriptStatus::Failed, 5),
    ]
}

fn ids(records: &[ScriptRecord]) -> Vec<&str> {
    records.iter().map(|r| r.id.as_str()).collect()
}
