pub const DEFAULT_QUALITY: f32 = BEST_PRESET_QUALITY;
pub const BEST_PRESET_QUALITY: f32 = 0.9;
pub const HIGH_PRESET_QUALITY: f32 = 0.7;
pub const MEDIUM_PRESET_QUALITY: f32 = 0.5;
pub const LOW_PRESET_QUALITY: f32 = 0.3;

/// Quality at or above which PNG output is squeezed with Zopfli.
pub const ZOPFLI_QUALITY_THRESHOLD: f32 = 0.9;
/// Quality at or above which PNG output uses the high libdeflater level.
pub const HIGH_DEFLATE_QUALITY_THRESHOLD: f32 = 0.7;

pub const OXIPNG_PRESET: u8 = 4;
pub const ZOPFLI_ITERATIONS: u8 = 15;
pub const LIBDEFLATER_HIGH_LEVEL: u8 = 12;
pub const LIBDEFLATER_LOW_LEVEL: u8 = 8;

pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 16_384;

pub const MAX_BATCH_FILES: usize = 1_000;
pub const MIN_AVAILABLE_MEMORY_MIB: u64 = 256;

pub const COMPRESSED_SUFFIX: &str = "_compressed";
pub const DEFAULT_OUTPUT_EXTENSION: &str = "jpg";
pub const ARCHIVE_FILE_NAME: &str = "compressed_images.zip";
pub const ARCHIVE_COMPRESSION_LEVEL: i64 = 9;

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "bmp", "tiff", "tif", "gif", "avif",
];

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
pub const PROGRESS_BAR_TEMPLATE: &str = "{bar:40.cyan/blue} {pos}/{len} {msg}";

// Common output message prefixes
pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original size:";
pub const COMPRESSED_SIZE_PREFIX: &str = "📈 Compressed size:";
pub const SAVE_RATE_PREFIX: &str = "🎯 Save rate:";

pub const EMPTY_SELECTION_LABEL: &str = "Click here or drag files to upload";
pub const SINGLE_DOWNLOAD_LABEL: &str = "Download Compressed Image";

pub const COUNTRY_HEADER: &str = "x-vercel-ip-country";
pub const FALLBACK_LOCALE_PATH: &str = "/en";

pub const ENV_QUALITY: &str = "IMGPRESS_QUALITY";
pub const ENV_JOBS: &str = "IMGPRESS_JOBS";
pub const ENV_OUTPUT_DIR: &str = "IMGPRESS_OUTPUT_DIR";
