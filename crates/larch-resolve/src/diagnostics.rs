//! Accumulated resolution failures.

use crate::error::ResolveError;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// A failure attributed to the module whose resolution raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reported {
    pub module: PathBuf,
    pub error: ResolveError,
}

/// Thread-safe collector shared by every module load of a session.
#[derive(Debug, Default)]
pub struct Diagnostics {
    entries: Mutex<Vec<Reported>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&self, module: &Path, error: ResolveError) {
        log::debug!("Reporting error in {}: {error}", module.display());
        self.entries.lock().push(Reported { module: module.to_path_buf(), error });
    }

    pub fn entries(&self) -> Vec<Reported> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drains the collected failures as renderable reports.
    pub fn into_reports(self) -> Vec<miette::Report> {
        self.entries
            .into_inner()
            .into_iter()
            .map(|reported| {
                let module = reported.module.display().to_string();
                miette::Report::new(reported.error).wrap_err(format!("while resolving {module}"))
            })
            .collect()
    }
}
