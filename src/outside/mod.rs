mod command;
mod error;
mod http;
mod ytdl;

pub use error::BackendError;
pub use http::{DirectFetcher, HttpFetcher};
pub use ytdl::{GenericDownloader, VideoLister, Ytdl};
