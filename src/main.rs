mod already_processed;
mod batch;
mod cli;
mod delay;
mod filename;
mod io;
mod logging;
mod outside;
mod result;
mod ripper;
mod settings;
#[cfg(test)]
mod testing;
mod types;

use clap::Parser;
use miette::Context;
use tracing::{info, Level};

use crate::{
    batch::Batch,
    cli::Args,
    delay::{DelayWindow, ThreadSleeper},
    filename::FilenameCodec,
    outside::{HttpFetcher, VideoLister, Ytdl},
    ripper::VideoRipper,
    settings::Settings,
    types::Zone,
};

fn main() -> miette::Result<()> {
    // Initialize the CLI, settings & logging
    let args = Args::parse();
    let codec = FilenameCodec::new(Zone::from_code(&args.timezone)?);
    let settings = Settings::load(&args.config)?;

    let log_file = settings
        .log_dir
        .join(format!("RipTok_log_{}.log", codec.format_now()?));
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    logging::init_logging(level, &log_file, codec.zone())?;

    info!("Ripper starting!");
    let delay = DelayWindow::from_secs(args.min_delay, args.max_delay)?;
    let out_dir = args.download_dir.join(&args.user);

    // Load the external components
    let ytdl = Ytdl::new(&settings)?;
    info!("Using {} as fallback downloader", ytdl.program());
    let http = HttpFetcher::new(&settings)?;

    let videos = ytdl
        .list_videos(&args.user, args.count)
        .wrap_err_with(|| format!("Could not list the videos of {}", args.user))?;
    info!("Username: {}", args.user);
    info!("Videos found: {}", videos.len());

    let sleeper = ThreadSleeper;
    let ripper = VideoRipper::new(&http, &ytdl, delay, &sleeper);
    let report = Batch::new(ripper, &codec, &out_dir, args.skip_existing).run(&videos)?;

    report.log_summary();
    Ok(())
}
