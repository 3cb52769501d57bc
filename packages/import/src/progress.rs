//! Progress reporting for imports.
//!
//! The importer reports row progress through [`ProgressCallback`] so that
//! the CLI can render a progress bar while tests and library callers stay
//! silent.

/// Receives progress updates from a running import.
pub trait ProgressCallback: Send + Sync {
    /// Sets the number of rows to process.
    fn set_total(&self, total: u64);

    /// Advances by `delta` rows.
    fn inc(&self, delta: u64);

    fn set_message(&self, msg: String);

    /// Marks the import as done.
    fn finish(&self, msg: String);
}

/// Ignores all progress updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}
