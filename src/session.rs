use crate::batch::{run_batch, BatchLimits, BatchObserver, BatchResult};
use crate::compressor::{CompressionOptions, Compressor};
use crate::error::{CompressionError, Result};
use crate::presenter::{present, DownloadArtifact, SavedArtifact};
use crate::selection::Selection;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing selected; the trigger is disabled.
    Empty,
    /// Files selected; the trigger is enabled.
    Ready,
    /// A run is in flight; selection and trigger are both locked.
    Running,
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub result: BatchResult,
    pub artifact: DownloadArtifact,
}

/// Owns the current selection and the last published artifact.
///
/// Selecting again replaces both; the old artifact is revoked.
#[derive(Debug)]
pub struct Session {
    selection: Selection,
    artifact: Option<SavedArtifact>,
    state: SessionState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            selection: Selection::default(),
            artifact: None,
            state: SessionState::Empty,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn trigger_enabled(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn label(&self) -> String {
        self.selection.label()
    }

    pub fn artifact(&self) -> Option<&SavedArtifact> {
        self.artifact.as_ref()
    }

    pub fn select(&mut self, selection: Selection) -> Result<()> {
        if self.state == SessionState::Running {
            return Err(CompressionError::SelectionLocked);
        }

        self.revoke_artifact();
        self.state = if selection.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Ready
        };
        self.selection = selection;
        Ok(())
    }

    /// Compresses the current selection and presents the outcome.
    ///
    /// The session is back in `Ready` when this returns, whatever happened.
    pub fn run<C: Compressor + ?Sized>(
        &mut self,
        compressor: &C,
        options: &CompressionOptions,
        limits: &BatchLimits,
        observer: Option<BatchObserver>,
    ) -> Result<RunReport> {
        match self.state {
            SessionState::Empty => return Err(CompressionError::NoFilesSelected),
            SessionState::Running => return Err(CompressionError::SelectionLocked),
            SessionState::Ready => {}
        }

        let snapshot = self.selection.clone();
        self.state = SessionState::Running;
        let report = execute(compressor, &snapshot, options, limits, observer);
        self.state = SessionState::Ready;

        report
    }

    /// Saves `artifact` under `dir`, replacing the previously saved one.
    pub fn publish(&mut self, artifact: &DownloadArtifact, dir: &Path) -> Result<&SavedArtifact> {
        self.revoke_artifact();
        let saved = artifact.persist(dir)?;
        Ok(self.artifact.insert(saved))
    }

    fn revoke_artifact(&mut self) {
        if let Some(previous) = self.artifact.take() {
            let path = previous.path().to_path_buf();
            if let Err(e) = previous.revoke() {
                crate::warn!("Could not remove {}: {}", path.display(), e);
            }
        }
    }
}

fn execute<C: Compressor + ?Sized>(
    compressor: &C,
    selection: &Selection,
    options: &CompressionOptions,
    limits: &BatchLimits,
    observer: Option<BatchObserver>,
) -> Result<RunReport> {
    let result = run_batch(compressor, selection.files(), options, limits, observer)?;
    let artifact = present(selection, &result)?;
    Ok(RunReport { result, artifact })
}
