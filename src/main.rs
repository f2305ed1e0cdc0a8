use anyhow::{Context, Result};
use clap::Parser;
use imgpress::cli::{Args, Commands, CompressArgs};
use imgpress::compressor::{CompressionOptions, ImageCompressor};
use imgpress::config::AppConfig;
use imgpress::constants::{PROGRESS_BAR_TEMPLATE, PROGRESS_SPINNER_TEMPLATE};
use imgpress::redirect;
use imgpress::{logger, BatchEvent, BatchLimits, BatchObserver, Selection, Session};
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    let outcome = match args.command {
        Commands::Compress(compress_args) => {
            compress(compress_args).context("Image compression failed")
        }
        Commands::Redirect { country, path } => show_redirect(country, &path),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            imgpress::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn compress(args: CompressArgs) -> Result<()> {
    let config = AppConfig::from_env();
    let quality = args
        .quality
        .or(args.preset.map(|p| p.quality()))
        .unwrap_or(config.quality);
    let limits = BatchLimits::new(args.jobs.unwrap_or(config.jobs));
    let output_dir = args.output.unwrap_or(config.output_dir);
    let mut options =
        CompressionOptions::new(Some(quality))?.with_background_worker(!args.foreground);

    let mut session = Session::new();
    session.select(Selection::from_paths(&args.inputs, args.recursive)?)?;
    imgpress::info!("🗜️  {} (quality {:.2})", session.label(), options.quality);

    let total = session.selection().len();
    let progress = new_progress(total);
    let mut observer: Option<BatchObserver> = None;

    if total == 1 {
        let pb = progress.clone();
        options = options.with_progress(Arc::new(move |percent| {
            pb.set_message(format!("Compressing: {:.0}%", percent));
            pb.tick();
        }));
    } else {
        let pb = progress.clone();
        pb.set_message(format!("0 / {} files compressed...", total));
        observer = Some(Arc::new(move |event| match event {
            BatchEvent::FileCompleted {
                completed, total, ..
            } => {
                pb.set_position(completed as u64);
                pb.set_message(format!("{} / {} files compressed...", completed, total));
            }
        }));
    }

    let report = session.run(&ImageCompressor, &options, &limits, observer);
    progress.finish_and_clear();
    let report = report?;

    report.artifact.render(&report.result);
    let saved = session.publish(&report.artifact, &output_dir)?;
    imgpress::info!("💾 {}: {}", report.artifact.link_text, saved.path().display());

    Ok(())
}

fn new_progress(total: usize) -> ProgressBar {
    if !logger::progress_enabled() || total == 0 {
        return ProgressBar::hidden();
    }

    if total == 1 {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
            pb.set_style(style);
        }
        pb.set_message("Compressing: 0%");
        pb
    } else {
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar().template(PROGRESS_BAR_TEMPLATE) {
            pb.set_style(style);
        }
        pb
    }
}

fn show_redirect(country: Option<String>, path: &str) -> Result<()> {
    let mut builder = http::Request::builder().uri(path);
    if let Some(country) = &country {
        builder = builder.header(imgpress::constants::COUNTRY_HEADER, country.as_str());
    }
    let request = builder.body(()).context("Invalid request path or country")?;

    match redirect::route(&request) {
        Some(response) => {
            let location = response
                .headers()
                .get(http::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default();
            println!("{} {}", response.status(), location);
        }
        None => println!("No redirect for {}", path),
    }

    Ok(())
}
