use crate::compressor::{CompressedImage, CompressionOptions, Compressor};
use crate::constants::{MAX_BATCH_FILES, MIN_AVAILABLE_MEMORY_MIB};
use crate::error::{CompressionError, Result};
use crate::formats::detect_input_format;
use crate::selection::InputFile;
use image::ImageFormat;
use rayon::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Instant;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};

/// What happened to one input file. Never changes once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressionOutcome {
    Success {
        original_name: String,
        original_size: u64,
        output: CompressedImage,
    },
    Failure {
        original_name: String,
        error: String,
    },
}

impl CompressionOutcome {
    pub fn original_name(&self) -> &str {
        match self {
            CompressionOutcome::Success { original_name, .. }
            | CompressionOutcome::Failure { original_name, .. } => original_name,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CompressionOutcome::Success { .. })
    }
}

/// One outcome per input file, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    outcomes: Vec<CompressionOutcome>,
}

impl BatchResult {
    pub fn new(outcomes: Vec<CompressionOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[CompressionOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// `(original name, compressed output)` for every success.
    pub fn successes(&self) -> impl Iterator<Item = (&str, &CompressedImage)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            CompressionOutcome::Success {
                original_name,
                output,
                ..
            } => Some((original_name.as_str(), output)),
            CompressionOutcome::Failure { .. } => None,
        })
    }

    /// `(original name, error message)` for every failure.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            CompressionOutcome::Failure {
                original_name,
                error,
            } => Some((original_name.as_str(), error.as_str())),
            CompressionOutcome::Success { .. } => None,
        })
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.succeeded()
    }

    /// Success flags in selection order.
    pub fn success_pattern(&self) -> Vec<bool> {
        self.outcomes.iter().map(CompressionOutcome::is_success).collect()
    }

    pub fn summary(&self) -> String {
        format!("{} succeeded, {} failed", self.succeeded(), self.failed())
    }
}

/// Progress notifications emitted while a batch runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// A file resolved, successfully or not.
    FileCompleted {
        name: String,
        succeeded: bool,
        completed: usize,
        total: usize,
    },
}

pub type BatchObserver = Arc<dyn Fn(BatchEvent) + Send + Sync>;

/// Admission limits for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    /// Upper bound on simultaneous compressions.
    pub max_workers: usize,
    pub max_files: usize,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self::new(num_cpus::get())
    }
}

impl BatchLimits {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
            max_files: MAX_BATCH_FILES,
        }
    }
}

/// Compresses every file and collects one outcome per file.
///
/// Per-file failures are recorded as [`CompressionOutcome::Failure`] and never
/// stop the other files. The call returns once every file has resolved.
///
/// With a single file, `options.on_progress` is handed to the compressor so
/// fractional progress is visible. With several, it instead receives
/// `completed / total * 100` each time a file resolves, and `observer` gets a
/// [`BatchEvent::FileCompleted`].
///
/// # Errors
/// Only before any work starts: an empty input, too many files, or a worker
/// pool that cannot be built.
pub fn run_batch<C: Compressor + ?Sized>(
    compressor: &C,
    files: &[InputFile],
    options: &CompressionOptions,
    limits: &BatchLimits,
    observer: Option<BatchObserver>,
) -> Result<BatchResult> {
    if files.is_empty() {
        return Err(CompressionError::NoFilesSelected);
    }
    if files.len() > limits.max_files {
        return Err(CompressionError::BatchFileLimitExceeded(
            files.len(),
            limits.max_files,
        ));
    }

    let start_time = Instant::now();
    let total = files.len();
    let per_file_options = if total == 1 {
        options.clone()
    } else {
        options.without_progress()
    };

    // Held while reporting so observers see counts in order.
    let completed = Mutex::new(0usize);

    let process = |file: &InputFile| -> CompressionOutcome {
        let outcome = compress_one(compressor, file, &per_file_options);

        let mut done = completed.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *done += 1;
        if total > 1 {
            options.report_progress(*done as f32 / total as f32 * 100.0);
        }
        if let Some(observer) = &observer {
            observer(BatchEvent::FileCompleted {
                name: file.name().to_string(),
                succeeded: outcome.is_success(),
                completed: *done,
                total,
            });
        }

        outcome
    };

    let outcomes: Vec<CompressionOutcome> = if options.use_background_worker {
        let workers = plan_parallelism(files, limits);
        crate::verbose!("Using {} worker thread(s) for {} file(s)", workers, total);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()?;
        // Indexed collect keeps selection order whatever order files finish in.
        pool.install(|| files.par_iter().map(&process).collect())
    } else {
        files.iter().map(&process).collect()
    };

    let result = BatchResult::new(outcomes);
    crate::verbose!("Batch finished in {:?}: {}", start_time.elapsed(), result.summary());
    Ok(result)
}

fn compress_one<C: Compressor + ?Sized>(
    compressor: &C,
    file: &InputFile,
    options: &CompressionOptions,
) -> CompressionOutcome {
    match compressor.compress(file, options) {
        Ok(output) => CompressionOutcome::Success {
            original_name: file.name().to_string(),
            original_size: file.size(),
            output,
        },
        Err(e) => {
            crate::warn!("Failed to compress {}: {}", file.name(), e);
            CompressionOutcome::Failure {
                original_name: file.name().to_string(),
                error: e.to_string(),
            }
        }
    }
}

/// Estimates decoded memory for an input without decoding it.
///
/// Decoded bitmaps are typically several times the size of the compressed
/// file; the multiplier depends on how well the source format compresses.
pub fn estimate_decode_memory_mib(file: &InputFile) -> f64 {
    let size_mib = file.bytes().len() as f64 / (1024.0 * 1024.0);

    let multiplier = match detect_input_format(file.bytes(), file.name()) {
        Some(ImageFormat::Jpeg) => 4.0,
        Some(ImageFormat::Png) => 3.0,
        Some(ImageFormat::WebP) => 3.5,
        Some(ImageFormat::Bmp) | Some(ImageFormat::Tiff) => 1.2,
        Some(ImageFormat::Gif) => 2.0,
        Some(ImageFormat::Avif) => 4.0,
        _ => 3.0,
    };

    size_mib * multiplier
}

/// Worker count for a batch: the configured limit, never more than there are
/// files, and no more than available memory can hold at once.
fn plan_parallelism(files: &[InputFile], limits: &BatchLimits) -> usize {
    let baseline = limits.max_workers.min(files.len()).max(1);

    let estimated_total: f64 = files.iter().map(estimate_decode_memory_mib).sum();
    let avg_per_file_mib = ((estimated_total / files.len() as f64).ceil() as u64).max(1);

    let mut sys =
        System::new_with_specifics(RefreshKind::new().with_memory(MemoryRefreshKind::new()));
    sys.refresh_memory();
    let available_mib = sys.available_memory() / (1024 * 1024);

    memory_capped_workers(baseline, available_mib, avg_per_file_mib)
}

fn memory_capped_workers(baseline: usize, available_mib: u64, avg_per_file_mib: u64) -> usize {
    let usable = available_mib.saturating_sub(MIN_AVAILABLE_MEMORY_MIB);
    let mem_cap = (usable / avg_per_file_mib.max(1)).clamp(1, baseline.max(1) as u64);
    mem_cap as usize
}
