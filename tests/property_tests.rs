use image::ImageFormat;
use imgpress::archive::compressed_file_name;
use imgpress::compressor::CompressionOptions;
use imgpress::formats::{is_image_file, OutputFormat};
use imgpress::presenter::{format_save_rate, save_rate};
use imgpress::redirect::localized_path;
use proptest::prelude::*;
use std::path::Path;

proptest! {
    #[test]
    fn compression_options_quality_in_range(quality in 0.001f32..=1.0f32) {
        let options = CompressionOptions::new(Some(quality)).unwrap();
        assert_eq!(options.quality, quality);
        assert!(options.quality_percent() >= 1 && options.quality_percent() <= 100);
    }

    #[test]
    fn compression_options_invalid_quality(quality in -10.0f32..10.0f32) {
        let result = CompressionOptions::new(Some(quality));
        if quality <= 0.0 || quality > 1.0 {
            assert!(result.is_err());
        } else {
            assert!(result.is_ok());
        }
    }

    #[test]
    fn compressed_name_keeps_stem_and_output_extension(
        stem in "[a-zA-Z0-9_-]{1,12}",
        original_ext in prop::sample::select(&["png", "jpg", "jpeg", "bmp", "webp"]),
        output_ext in prop::sample::select(&["png", "jpg", "webp"])
    ) {
        let original = format!("{}.{}", stem, original_ext);
        let output = format!("{}.{}", stem, output_ext);

        let name = compressed_file_name(&original, &output);

        assert_eq!(name, format!("{}_compressed.{}", stem, output_ext));
    }

    #[test]
    fn compressed_name_defaults_to_jpg(stem in "[a-zA-Z0-9_-]{1,12}") {
        let name = compressed_file_name(&format!("{}.png", stem), &stem);
        assert!(name.ends_with("_compressed.jpg"));
    }

    #[test]
    fn save_rate_stays_in_bounds(original in 0u64..10_000_000, compressed in 0u64..20_000_000) {
        let rate = save_rate(original, compressed);
        assert!((0.0..=100.0).contains(&rate));
        if compressed >= original {
            assert_eq!(format_save_rate(rate), "0");
        }
    }

    #[test]
    fn output_format_only_keeps_png_and_webp(
        format in prop::sample::select(vec![
            ImageFormat::Png,
            ImageFormat::Jpeg,
            ImageFormat::WebP,
            ImageFormat::Bmp,
            ImageFormat::Gif,
            ImageFormat::Tiff,
        ])
    ) {
        let expected = match format {
            ImageFormat::Png => OutputFormat::Png,
            ImageFormat::WebP => OutputFormat::WebP,
            _ => OutputFormat::Jpeg,
        };
        assert_eq!(OutputFormat::for_input(format), expected);
    }

    #[test]
    fn is_image_file_recognizes_extensions(
        extension in prop::sample::select(&["jpg", "jpeg", "png", "webp", "bmp", "tiff", "gif", "txt", "doc", "pdf"])
    ) {
        let filename = format!("test.{}", extension);
        let expected = !matches!(extension, "txt" | "doc" | "pdf");
        assert_eq!(is_image_file(Path::new(&filename)), expected);
    }

    #[test]
    fn redirect_is_korean_or_english(country in "[a-zA-Z]{0,3}") {
        let path = localized_path(Some(&country));
        if country.eq_ignore_ascii_case("kr") {
            assert_eq!(path, "/ko");
        } else {
            assert_eq!(path, "/en");
        }
    }
}
