use crate::archive::{build_archive, compressed_file_name};
use crate::batch::{BatchResult, CompressionOutcome};
use crate::constants::{
    COMPRESSED_SIZE_PREFIX, ORIGINAL_SIZE_PREFIX, SAVE_RATE_PREFIX, SINGLE_DOWNLOAD_LABEL,
};
use crate::error::{CompressionError, Result};
use crate::selection::Selection;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactKind {
    /// The compressed counterpart of a single input.
    Single,
    /// A ZIP of every successful output.
    Archive {
        entries: Vec<String>,
        /// Number of files originally selected.
        file_count: usize,
    },
}

/// What the user downloads, with the statistics shown beside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadArtifact {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub kind: ArtifactKind,
    /// Sum over every selected input, failed ones included.
    pub original_size: u64,
    /// Sum over the compressed outputs.
    pub compressed_size: u64,
    pub link_text: String,
}

impl DownloadArtifact {
    pub fn save_rate(&self) -> f64 {
        save_rate(self.original_size, self.compressed_size)
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Writes the artifact into `dir`, creating it if needed.
    pub fn persist(&self, dir: &Path) -> Result<SavedArtifact> {
        fs::create_dir_all(dir)
            .map_err(|_| CompressionError::DirectoryCreationFailed(dir.to_path_buf()))?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        crate::verbose!("Saved {} bytes to {}", self.bytes.len(), path.display());
        Ok(SavedArtifact { path })
    }

    /// Prints the size statistics and batch summary.
    pub fn render(&self, result: &BatchResult) {
        crate::info!("{} {}", ORIGINAL_SIZE_PREFIX, format_kb(self.original_size));
        crate::info!("{} {}", COMPRESSED_SIZE_PREFIX, format_kb(self.compressed_size));
        if let ArtifactKind::Archive { entries, .. } = &self.kind {
            crate::info!(
                "🗜️  Archive: {} ({} entries)",
                format_kb(self.size()),
                entries.len()
            );
        }
        crate::info!("{} {}%", SAVE_RATE_PREFIX, format_save_rate(self.save_rate()));

        if result.failed() == 0 {
            crate::info!("✅ {}", result.summary());
        } else {
            crate::warn!("{}", result.summary());
            for (name, error) in result.failures() {
                crate::verbose!("  {}: {}", name, error);
            }
        }
    }
}

/// A persisted artifact. Stays on disk until revoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifact {
    path: PathBuf,
}

impl SavedArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the file. Already-removed files are not an error.
    pub fn revoke(self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Turns a finished batch into the artifact offered for download.
///
/// One selected file yields its compressed image, or the failure message
/// when it could not be compressed since there is nothing to offer. Several
/// files yield an archive of the successes, possibly empty.
pub fn present(selection: &Selection, result: &BatchResult) -> Result<DownloadArtifact> {
    if selection.len() != result.len() {
        return Err(CompressionError::OutcomeCountMismatch(
            selection.len(),
            result.len(),
        ));
    }

    match (selection.files(), result.outcomes()) {
        ([], _) => Err(CompressionError::NoFilesSelected),
        ([original], [outcome]) => match outcome {
            CompressionOutcome::Success { output, .. } => Ok(DownloadArtifact {
                file_name: compressed_file_name(original.name(), &output.name),
                mime_type: output.mime_type.clone(),
                bytes: output.bytes.clone(),
                kind: ArtifactKind::Single,
                original_size: original.size(),
                compressed_size: output.size(),
                link_text: SINGLE_DOWNLOAD_LABEL.to_string(),
            }),
            CompressionOutcome::Failure { error, .. } => {
                Err(CompressionError::Compression(error.clone()))
            }
        },
        (files, _) => {
            let archive = build_archive(result)?;
            if archive.is_empty() {
                crate::warn!("No file could be compressed; the archive is empty");
            }

            Ok(DownloadArtifact {
                file_name: archive.file_name,
                mime_type: "application/zip".to_string(),
                bytes: archive.bytes,
                kind: ArtifactKind::Archive {
                    entries: archive.entries,
                    file_count: files.len(),
                },
                original_size: selection.total_size(),
                compressed_size: result.successes().map(|(_, output)| output.size()).sum(),
                link_text: format!("Download Compressed ZIP ({} files)", files.len()),
            })
        }
    }
}

/// Percentage saved, `100 × (1 − compressed/original)`, never below zero.
pub fn save_rate(original_size: u64, compressed_size: u64) -> f64 {
    if original_size == 0 {
        return 0.0;
    }
    let rate = 100.0 - (compressed_size as f64 / original_size as f64) * 100.0;
    rate.max(0.0)
}

pub fn format_kb(bytes: u64) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

/// One decimal place; a floored rate shows as a bare `0`.
pub fn format_save_rate(rate: f64) -> String {
    if rate <= 0.0 {
        "0".to_string()
    } else {
        format!("{:.1}", rate)
    }
}
