use crate::constants::{
    BEST_PRESET_QUALITY, DEFAULT_QUALITY, HIGH_DEFLATE_QUALITY_THRESHOLD, HIGH_PRESET_QUALITY,
    LIBDEFLATER_HIGH_LEVEL, LIBDEFLATER_LOW_LEVEL, LOW_PRESET_QUALITY, MAX_FILE_SIZE,
    MAX_IMAGE_DIMENSION, MEDIUM_PRESET_QUALITY, OXIPNG_PRESET, ZOPFLI_ITERATIONS,
    ZOPFLI_QUALITY_THRESHOLD,
};
use crate::error::{CompressionError, Result};
use crate::formats::{detect_input_format, OutputFormat};
use crate::selection::InputFile;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat};
use oxipng::{Deflaters, Options};
use std::fmt;
use std::io::Cursor;
use std::num::NonZeroU8;
use std::path::Path;
use std::sync::Arc;

/// Receives a completion percentage in `[0, 100]`.
pub type ProgressCallback = Arc<dyn Fn(f32) + Send + Sync>;

/// Named quality presets offered by the front-end. Each also answers to its
/// percentage, so `-p 70` and `-p high` are the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum QualityPreset {
    /// 90%, the default
    #[default]
    #[value(alias = "90")]
    Best,
    /// 70%
    #[value(alias = "70")]
    High,
    /// 50%
    #[value(alias = "50")]
    Medium,
    /// 30%, smallest files
    #[value(alias = "30")]
    Low,
}

impl QualityPreset {
    pub fn quality(&self) -> f32 {
        match self {
            QualityPreset::Best => BEST_PRESET_QUALITY,
            QualityPreset::High => HIGH_PRESET_QUALITY,
            QualityPreset::Medium => MEDIUM_PRESET_QUALITY,
            QualityPreset::Low => LOW_PRESET_QUALITY,
        }
    }
}

#[derive(Clone)]
pub struct CompressionOptions {
    /// Lossy aggressiveness, in `(0, 1]`.
    pub quality: f32,
    /// Run codec work on the batch worker pool instead of the calling thread.
    pub use_background_worker: bool,
    pub on_progress: Option<ProgressCallback>,
}

impl fmt::Debug for CompressionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompressionOptions")
            .field("quality", &self.quality)
            .field("use_background_worker", &self.use_background_worker)
            .field("on_progress", &self.on_progress.is_some())
            .finish()
    }
}

impl CompressionOptions {
    pub fn new(quality: Option<f32>) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        // Written this way round so NaN is rejected too.
        if !(quality > 0.0 && quality <= 1.0) {
            return Err(CompressionError::InvalidQuality(quality));
        }

        Ok(Self {
            quality,
            use_background_worker: true,
            on_progress: None,
        })
    }

    pub fn with_background_worker(mut self, enabled: bool) -> Self {
        self.use_background_worker = enabled;
        self
    }

    pub fn with_progress(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// Copy of these options with the progress callback removed.
    pub fn without_progress(&self) -> Self {
        Self {
            on_progress: None,
            ..self.clone()
        }
    }

    /// Quality mapped onto the 1-100 scale JPEG encoders expect.
    pub fn quality_percent(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }

    pub fn report_progress(&self, percent: f32) {
        if let Some(callback) = &self.on_progress {
            callback(percent.clamp(0.0, 100.0));
        }
    }
}

/// Result of compressing one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl CompressedImage {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Compresses one image. The batch orchestrator only talks to this trait.
pub trait Compressor: Send + Sync {
    fn compress(&self, file: &InputFile, options: &CompressionOptions) -> Result<CompressedImage>;
}

/// Compressor backed by the `image` codecs and `oxipng`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCompressor;

impl Compressor for ImageCompressor {
    /// Decodes `file`, re-encodes it at `options.quality` and returns the new bytes.
    ///
    /// # Security
    /// - Rejects inputs over `MAX_FILE_SIZE` before decoding
    /// - Rejects decoded images wider or taller than `MAX_IMAGE_DIMENSION`
    fn compress(&self, file: &InputFile, options: &CompressionOptions) -> Result<CompressedImage> {
        if file.size() > MAX_FILE_SIZE {
            return Err(CompressionError::FileTooLarge(file.size(), MAX_FILE_SIZE));
        }

        let input_format = detect_input_format(file.bytes(), file.name()).ok_or_else(|| {
            CompressionError::UnsupportedFormat(format!("{} ({})", file.name(), file.mime_type()))
        })?;

        let img = image::load_from_memory_with_format(file.bytes(), input_format)?;
        let (width, height) = img.dimensions();
        if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
            return Err(CompressionError::InvalidDimensions(
                width,
                height,
                MAX_IMAGE_DIMENSION,
            ));
        }
        options.report_progress(30.0);

        let output_format = OutputFormat::for_input(input_format);
        let bytes = encode_image(&img, output_format, options)?;
        options.report_progress(100.0);

        crate::verbose!(
            "{}: {} -> {} bytes as {}",
            file.name(),
            file.size(),
            bytes.len(),
            output_format
        );

        Ok(CompressedImage {
            name: output_file_name(file.name(), output_format),
            mime_type: output_format.mime_type().to_string(),
            bytes,
        })
    }
}

fn encode_image(
    img: &DynamicImage,
    format: OutputFormat,
    options: &CompressionOptions,
) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    match format {
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
            rgb.write_with_encoder(JpegEncoder::new_with_quality(
                &mut buffer,
                options.quality_percent(),
            ))?;
        }
        OutputFormat::Png => {
            img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
            options.report_progress(70.0);
            buffer = oxipng::optimize_from_memory(&buffer, &png_options(options.quality))
                .map_err(|e| CompressionError::PngOptimization(e.to_string()))?;
        }
        OutputFormat::WebP => {
            // The WebP encoder only accepts 8-bit RGB(A)
            let eight_bit = if img.color().has_alpha() {
                DynamicImage::ImageRgba8(img.to_rgba8())
            } else {
                DynamicImage::ImageRgb8(img.to_rgb8())
            };
            eight_bit.write_with_encoder(WebPEncoder::new_lossless(&mut buffer))?;
        }
    }

    Ok(buffer)
}

/// oxipng settings for a quality fraction: higher quality buys a slower,
/// stronger deflater.
pub fn png_options(quality: f32) -> Options {
    let mut options = Options::from_preset(OXIPNG_PRESET);

    options.deflate = if quality >= ZOPFLI_QUALITY_THRESHOLD {
        match NonZeroU8::new(ZOPFLI_ITERATIONS) {
            Some(iterations) => Deflaters::Zopfli { iterations },
            None => Deflaters::Libdeflater {
                compression: LIBDEFLATER_HIGH_LEVEL,
            },
        }
    } else if quality >= HIGH_DEFLATE_QUALITY_THRESHOLD {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_HIGH_LEVEL,
        }
    } else {
        Deflaters::Libdeflater {
            compression: LIBDEFLATER_LOW_LEVEL,
        }
    };

    options
}

/// `photo.bmp` compressed as JPEG becomes `photo.jpg`.
pub fn output_file_name(original_name: &str, format: OutputFormat) -> String {
    let stem = Path::new(original_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| original_name.to_string());
    format!("{}.{}", stem, format.extension())
}
