use std::time::Duration;

use miette::{Context, IntoDiagnostic};
use reqwest::{
    blocking::Client,
    header::{CONTENT_TYPE, REFERER},
};
use tracing::debug;

use super::BackendError;
use crate::{settings::Settings, types::SITE_URL};

/// Interface for fetching the raw bytes of a video in one request
pub trait DirectFetcher {
    /// Fetch the whole video behind the URL.
    ///
    /// The returned payload may be too small to be a real video:
    /// checking it is up to the caller.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, BackendError>;
}

/// Direct fetcher over HTTP
#[derive(Debug)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> miette::Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .build()
            .into_diagnostic()
            .wrap_err("Could not build the HTTP client")?;

        Ok(Self { client })
    }
}

impl DirectFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, BackendError> {
        debug!("GET {url}");
        let response = self
            .client
            .get(url)
            .header(REFERER, format!("{SITE_URL}/"))
            .send()
            .map_err(|err| BackendError::Api(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Api(format!("{url} answered {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        if !is_video_content(&content_type) {
            return Err(BackendError::Api(format!(
                "Expected a video but got '{content_type}'"
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|err| BackendError::Api(err.to_string()))?;
        debug!("{} bytes received", bytes.len());

        Ok(bytes.to_vec())
    }
}

/// An HTML page is not a video, even if it is large enough
fn is_video_content(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime.starts_with("video/") || mime == "application/octet-stream"
}
