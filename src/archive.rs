use crate::batch::{BatchResult, CompressionOutcome};
use crate::constants::{
    ARCHIVE_COMPRESSION_LEVEL, ARCHIVE_FILE_NAME, COMPRESSED_SUFFIX, DEFAULT_OUTPUT_EXTENSION,
};
use crate::error::Result;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// A ZIP archive of compressed images, ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Entry names in insertion order.
    pub entries: Vec<String>,
}

impl ArchiveArtifact {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Download name for a compressed file.
///
/// The original's last extension is dropped, `_compressed` appended, and the
/// extension of the compressed output added back (`jpg` when it has none):
/// `photo.png` + `photo.png` gives `photo_compressed.png`.
pub fn compressed_file_name(original_name: &str, output_name: &str) -> String {
    let stem = match original_name.rfind('.') {
        Some(idx) if idx > 0 => &original_name[..idx],
        _ => original_name,
    };
    let extension = output_name
        .rfind('.')
        .map(|idx| &output_name[idx + 1..])
        .filter(|ext| !ext.is_empty())
        .unwrap_or(DEFAULT_OUTPUT_EXTENSION);

    format!("{}{}.{}", stem, COMPRESSED_SUFFIX, extension)
}

/// Packs every successful outcome into a ZIP at maximum deflate level.
///
/// Failures are skipped. With no successes the result is a valid, empty
/// archive; callers decide how to report that.
pub fn build_archive(result: &BatchResult) -> Result<ArchiveArtifact> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(ARCHIVE_COMPRESSION_LEVEL));

    let mut used = HashSet::new();
    let mut entries = Vec::new();

    for outcome in result.outcomes() {
        match outcome {
            CompressionOutcome::Success {
                original_name,
                output,
                ..
            } => {
                let name = unique_entry_name(
                    compressed_file_name(original_name, &output.name),
                    &mut used,
                );
                writer.start_file(name.as_str(), options)?;
                writer.write_all(&output.bytes)?;
                entries.push(name);
            }
            CompressionOutcome::Failure {
                original_name,
                error,
            } => {
                crate::verbose!("Leaving {} out of the archive: {}", original_name, error);
            }
        }
    }

    let bytes = writer.finish()?.into_inner();
    crate::verbose!("Archive built: {} entries, {} bytes", entries.len(), bytes.len());

    Ok(ArchiveArtifact {
        file_name: ARCHIVE_FILE_NAME.to_string(),
        bytes,
        entries,
    })
}

/// Two selected files can share a name when they come from different
/// folders; later ones get `_2`, `_3`, ... before the extension.
fn unique_entry_name(name: String, used: &mut HashSet<String>) -> String {
    if used.insert(name.clone()) {
        return name;
    }

    let (stem, extension) = match name.rfind('.') {
        Some(idx) => (&name[..idx], &name[idx..]),
        None => (name.as_str(), ""),
    };
    let mut counter = 2;
    loop {
        let candidate = format!("{}_{}{}", stem, counter, extension);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}
