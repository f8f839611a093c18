use std::path::PathBuf;

use clap::{ArgAction, Parser};

macro_rules! arg_env {
    ($v:literal) => {
        concat!("RIPTOK_", $v)
    };
}

/// Rip every video posted by a user into a directory of sortable, timestamped files.
/// Videos are fetched directly first, falling back to yt-dlp/youtube-dl.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// The user whose videos to download, with or without the leading '@'
    #[arg(env=arg_env!("USER"), value_parser = parse_user)]
    pub user: String,

    /// The directory in which a sub-directory per user is created
    #[arg(long, default_value = "_rips", env=arg_env!("DOWNLOAD_DIR"))]
    pub download_dir: PathBuf,

    /// Do not download again the videos already present in the user directory
    #[arg(long, default_value_t = true, action = ArgAction::Set, env=arg_env!("SKIP_EXISTING"))]
    pub skip_existing: bool,

    /// The timezone of the dates in the file names: UTC or an IANA name like Europe/Berlin
    #[arg(long, default_value = "UTC", env=arg_env!("TIMEZONE"))]
    pub timezone: String,

    /// The minimum number of seconds to wait before falling back to the generic downloader
    #[arg(long, default_value_t = 1.0, env=arg_env!("MIN_DELAY"))]
    pub min_delay: f64,

    /// The maximum number of seconds to wait before falling back to the generic downloader
    #[arg(long, default_value_t = 3.0, env=arg_env!("MAX_DELAY"))]
    pub max_delay: f64,

    /// Only list this many of the user's videos
    #[arg(long, env=arg_env!("COUNT"))]
    pub count: Option<usize>,

    /// The path to the settings file. Defaults are used if it does not exist
    #[arg(long, default_value = "riptok.toml", env=arg_env!("CONFIG"))]
    pub config: PathBuf,

    /// Also log debug messages
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_user(s: &str) -> Result<String, String> {
    let user = s.trim();
    let user = user.strip_prefix('@').unwrap_or(user);
    if user.is_empty() {
        Err("the user name is empty".to_string())
    } else {
        Ok(user.to_string())
    }
}
