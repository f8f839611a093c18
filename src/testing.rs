//! Scripted backends for the ripper and batch tests

use std::{cell::RefCell, collections::HashMap, path::Path, time::Duration};

use crate::{
    delay::Sleeper,
    outside::{BackendError, DirectFetcher, GenericDownloader},
    types::{DownloadTarget, VideoRecord},
};

/// Answers each URL with a payload of the given size or an error.
/// Unknown URLs fail.
#[derive(Debug, Default)]
pub struct FakeDirect {
    replies: HashMap<String, Result<usize, BackendError>>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeDirect {
    pub fn reply(mut self, url: &str, reply: Result<usize, BackendError>) -> Self {
        self.replies.insert(url.to_owned(), reply);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl DirectFetcher for FakeDirect {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, BackendError> {
        self.calls.borrow_mut().push(url.to_owned());
        match self.replies.get(url) {
            Some(Ok(size)) => Ok(vec![0u8; *size]),
            Some(Err(err)) => Err(err.clone()),
            None => Err(BackendError::Api(format!("no reply scripted for {url}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub enum FallbackReply {
    Writes(usize),
    WritesNothing,
    Fails(BackendError),
}

/// Writes a file of the given size at the destination, or fails.
/// Unknown URLs fail with [`BackendError::Other`].
#[derive(Debug, Default)]
pub struct FakeFallback {
    replies: HashMap<String, FallbackReply>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeFallback {
    pub fn reply(mut self, url: &str, reply: FallbackReply) -> Self {
        self.replies.insert(url.to_owned(), reply);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl GenericDownloader for FakeFallback {
    fn download(&self, url: &str, destination: &Path) -> Result<(), BackendError> {
        self.calls.borrow_mut().push(url.to_owned());
        match self.replies.get(url) {
            Some(FallbackReply::Writes(size)) => std::fs::write(destination, vec![1u8; *size])
                .map_err(|err| BackendError::Other(err.to_string())),
            Some(FallbackReply::WritesNothing) => Ok(()),
            Some(FallbackReply::Fails(err)) => Err(err.clone()),
            None => Err(BackendError::Other(format!("no reply scripted for {url}"))),
        }
    }
}

/// Records the pauses instead of sleeping
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    pub pauses: RefCell<Vec<Duration>>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, duration: Duration) {
        self.pauses.borrow_mut().push(duration);
    }
}

pub fn video(id: &str, creation_timestamp: i64) -> VideoRecord {
    VideoRecord {
        id: id.to_owned(),
        creation_timestamp,
        author_handle: "someone".to_owned(),
    }
}

pub fn target(dir: &Path, id: &str, creation_timestamp: i64) -> DownloadTarget {
    let video = video(id, creation_timestamp);
    DownloadTarget {
        file_path: dir.join(format!("{id}.mp4")),
        source_url: video.url(),
        creation_timestamp,
    }
}
