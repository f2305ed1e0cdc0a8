use crate::compressor::QualityPreset;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "imgpress",
    about = "Compress images in batches and package the results",
    long_about = "imgpress compresses one or more images at a chosen quality. A single image is \
                  written next to its statistics as <name>_compressed.<ext>; several images are \
                  compressed in parallel and packed into compressed_images.zip.",
    version,
    after_help = "EXAMPLES:\n  \
    imgpress compress photo.jpg -p 70\n  \
    imgpress compress ./holiday -r -o ./out\n  \
    imgpress compress \"./shots/*.png\" -q 0.5 -j 4\n  \
    imgpress redirect --country kr"
)]
pub struct Args {
    #[arg(long, global = true, help = "Only print errors")]
    pub quiet: bool,

    #[arg(short = 'v', long, global = true, help = "Print per-file details")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(
        about = "Compress the selected images",
        long_about = "Compress one or more images. Inputs may be files, directories or glob \
                      patterns. One image produces a compressed image; several produce a ZIP \
                      archive of every image that compressed successfully."
    )]
    Compress(CompressArgs),

    #[command(
        about = "Show where the site root redirects a visitor",
        long_about = "Resolve the locale redirect for a request path and country code, \
                      as the edge would for a visitor."
    )]
    Redirect {
        #[arg(short = 'c', long, help = "Two-letter country code from the geo header")]
        country: Option<String>,

        #[arg(long, default_value = "/", help = "Request path and query")]
        path: String,
    },
}

#[derive(ClapArgs)]
pub struct CompressArgs {
    #[arg(
        required = true,
        help = "Image files, directories or glob patterns",
        long_help = "Files are always included. Directories and glob patterns only \
                     contribute files with an image extension."
    )]
    pub inputs: Vec<String>,

    #[arg(
        short = 'p',
        long,
        value_enum,
        conflicts_with = "quality",
        help = "Quality preset: best (90), high (70), medium (50), low (30)"
    )]
    pub preset: Option<QualityPreset>,

    #[arg(
        short = 'q',
        long,
        help = "Compression quality in (0, 1] (default: 0.9)",
        long_help = "Lossy quality fraction. Lower values give smaller files. \
                     For PNG: >=0.9 uses Zopfli, >=0.7 uses high compression, \
                     below that standard compression. Overrides IMGPRESS_QUALITY."
    )]
    pub quality: Option<f32>,

    #[arg(
        short = 'o',
        long,
        help = "Directory to write the result to (default: current directory)",
        long_help = "Directory the compressed image or archive is saved in. \
                     Overrides IMGPRESS_OUTPUT_DIR."
    )]
    pub output: Option<PathBuf>,

    #[arg(
        short = 'j',
        long,
        help = "Maximum parallel compressions (default: CPU count)",
        long_help = "Upper bound on images compressed at once. The actual number may be \
                     lower when available memory is short. Overrides IMGPRESS_JOBS."
    )]
    pub jobs: Option<usize>,

    #[arg(long, help = "Compress on the main thread instead of the worker pool")]
    pub foreground: bool,

    #[arg(short = 'r', long, help = "Walk directories recursively")]
    pub recursive: bool,
}
