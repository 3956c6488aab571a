// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::download::client::{AttohttpcClient, HttpClient, HttpResponse};
use crate::download::options::DownloadOptions;
use crate::error::{Result, UpkeepError};
use std::fs;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

const DOWNLOAD_CHUNK_SIZE: usize = 8192;

/// Receives byte counts while an artifact downloads.
pub trait ProgressReporter: Send {
    /// `total_bytes` is zero when the server did not announce a length.
    fn on_start(&mut self, total_bytes: u64);

    fn on_progress(&mut self, bytes_downloaded: u64);

    fn on_complete(&mut self);
}

pub struct NoopProgressReporter;

impl ProgressReporter for NoopProgressReporter {
    fn on_start(&mut self, _total_bytes: u64) {}

    fn on_progress(&mut self, _bytes_downloaded: u64) {}

    fn on_complete(&mut self) {}
}

/// Fetches a URL to a local path.
///
/// Implementations are shared between worker threads, one transfer per call.
/// On failure nothing is left at `destination`.
pub trait Downloader: Send + Sync {
    fn download(
        &self,
        url: &str,
        destination: &Path,
        progress: &mut dyn ProgressReporter,
    ) -> Result<()>;
}

pub struct HttpFileDownloader {
    http_client: Box<dyn HttpClient>,
    options: DownloadOptions,
}

impl Default for HttpFileDownloader {
    fn default() -> Self {
        Self::new(DownloadOptions::default())
    }
}

impl HttpFileDownloader {
    pub fn new(options: DownloadOptions) -> Self {
        Self::with_client(Box::new(AttohttpcClient::new()), options)
    }

    pub fn with_client(mut http_client: Box<dyn HttpClient>, options: DownloadOptions) -> Self {
        http_client.set_timeout(options.timeout);
        Self {
            http_client,
            options,
        }
    }

    fn validate_response(&self, response: &dyn HttpResponse) -> Result<()> {
        let status = response.status();

        if !(200..300).contains(&status) {
            return Err(UpkeepError::Download(format!(
                "Download failed with status: {status}"
            )));
        }

        if let Some(length) = content_length(response) {
            if length > self.options.max_size {
                return Err(UpkeepError::Download(format!(
                    "Download size {length} exceeds maximum allowed size {}",
                    self.options.max_size
                )));
            }
        }

        Ok(())
    }

    fn download_to_file(
        &self,
        mut response: Box<dyn HttpResponse>,
        file: &fs::File,
        progress: &mut dyn ProgressReporter,
    ) -> Result<u64> {
        let mut writer = BufWriter::new(file);
        let mut downloaded = 0u64;
        let mut buffer = vec![0; DOWNLOAD_CHUNK_SIZE];

        loop {
            match response.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    downloaded += n as u64;
                    if downloaded > self.options.max_size {
                        return Err(UpkeepError::Download(format!(
                            "Download exceeded maximum allowed size {}",
                            self.options.max_size
                        )));
                    }
                    writer.write_all(&buffer[..n])?;
                    progress.on_progress(downloaded);
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(UpkeepError::Download(format!(
                        "Connection failed after {downloaded} bytes: {e}"
                    )));
                }
            }
        }

        writer.flush()?;
        Ok(downloaded)
    }
}

impl Downloader for HttpFileDownloader {
    fn download(
        &self,
        url: &str,
        destination: &Path,
        progress: &mut dyn ProgressReporter,
    ) -> Result<()> {
        let parent = destination
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        // Removed on drop unless persisted, so failures leave nothing behind.
        let temp_file = NamedTempFile::new_in(parent)?;

        log::debug!("Downloading {url} to {}", destination.display());
        let response = self.http_client.get(url, Vec::new())?;
        self.validate_response(response.as_ref())?;

        progress.on_start(content_length(response.as_ref()).unwrap_or(0));

        let downloaded = self.download_to_file(response, temp_file.as_file(), progress)?;

        temp_file
            .persist(destination)
            .map_err(|error| UpkeepError::Io(error.error))?;

        progress.on_complete();
        log::info!("Downloaded {downloaded} bytes from {url}");
        Ok(())
    }
}

fn content_length(response: &dyn HttpResponse) -> Option<u64> {
    response
        .header("Content-Length")
        .and_then(|value| value.trim().parse::<u64>().ok())
}

#[cfg(test)]
#[path = "http_file_downloader_tests.rs"]
mod http_file_downloader_tests;
