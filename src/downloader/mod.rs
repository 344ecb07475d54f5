use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::{Client, StatusCode};
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_util::io::StreamReader;

use crate::data::Settings;

pub mod reconcile;


/// Body bytes are copied to disk at most this many at a time.
pub const CHUNK_SIZE: usize = 8192;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(StatusCode),
    #[error("no data received for {0:?}")]
    Timeout(Duration),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
}

/// Retrieves one URL into one file. A single attempt; no retries.
#[async_trait]
pub trait ImageFetcher {
    /// Returns the number of bytes written to `dest`.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError>;
}

/// Final `/`-separated segment of `url`, taken verbatim.
///
/// No percent-decoding and no query stripping: `http://a/x.jpg?s=1` names the
/// file `x.jpg?s=1`, and URLs sharing a last segment map to the same file.
pub fn filename_from_url(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// HTTP fetcher. The timeout bounds connecting and every wait for the next
/// piece of the response, not the transfer as a whole, so a slow but steady
/// body still completes.
#[derive(Clone)]
pub struct Downloader {
    client: Client,
    timeout: Duration,
}

impl Downloader {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let timeout = settings.timeout();
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(settings.user_agent.clone())
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl ImageFetcher for Downloader {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let resp = tokio::time::timeout(self.timeout, self.client.get(url).send())
            .await
            .map_err(|_| FetchError::Timeout(self.timeout))??;
        if !resp.status().is_success() {
            return Err(FetchError::Status(resp.status()));
        }

        let stream = resp
            .bytes_stream()
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
        let mut body = StreamReader::new(Box::pin(stream));

        let mut file = tokio::fs::File::create(dest).await?;
        let copied = async {
            let mut buf = vec![0u8; CHUNK_SIZE];
            let mut written: u64 = 0;
            loop {
                let n = tokio::time::timeout(self.timeout, body.read(&mut buf))
                    .await
                    .map_err(|_| FetchError::Timeout(self.timeout))??;
                if n == 0 {
                    break;
                }
                file.write_all(&buf[..n]).await?;
                written += n as u64;
            }
            Ok::<_, FetchError>(written)
        }
        .await;

        // Settle any in-flight write before the handle is dropped, failed copy or not.
        let flushed = file.flush().await;
        drop(file);
        let written = copied?;
        flushed?;
        Ok(written)
    }
}
