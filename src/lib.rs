pub mod logger;

pub mod archive;
pub mod batch;
pub mod cli;
pub mod compressor;
pub mod config;
pub mod constants;
pub mod error;
pub mod formats;
pub mod presenter;
pub mod redirect;
pub mod selection;
pub mod session;

pub use archive::{build_archive, compressed_file_name, ArchiveArtifact};
pub use batch::{
    run_batch, BatchEvent, BatchLimits, BatchObserver, BatchResult, CompressionOutcome,
};
pub use compressor::{
    CompressedImage, CompressionOptions, Compressor, ImageCompressor, ProgressCallback,
    QualityPreset,
};
pub use config::AppConfig;
pub use error::{CompressionError, Result};
pub use formats::OutputFormat;
pub use presenter::{
    format_kb, format_save_rate, present, save_rate, ArtifactKind, DownloadArtifact,
    SavedArtifact,
};
pub use redirect::{localized_path, route};
pub use selection::{collect_image_files, InputFile, Selection};
pub use session::{RunReport, Session, SessionState};
