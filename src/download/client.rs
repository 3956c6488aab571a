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

use crate::error::{Result, UpkeepError};
use crate::user_agent;
use attohttpc::{Response, Session};
use std::io::{self, Read};
use std::time::Duration;

pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str, headers: Vec<(String, String)>) -> Result<Box<dyn HttpResponse>>;

    /// POST an `application/x-www-form-urlencoded` body.
    fn post_form(&self, url: &str, body: &str) -> Result<Box<dyn HttpResponse>>;

    fn set_timeout(&mut self, timeout: Duration);
}

pub trait HttpResponse: Read + Send {
    fn status(&self) -> u16;

    fn header(&self, name: &str) -> Option<&str>;
}

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

pub struct AttohttpcClient {
    timeout: Duration,
    user_agent: String,
}

impl AttohttpcClient {
    pub fn new() -> Self {
        Self::with_user_agent(user_agent::download_client())
    }

    pub fn with_user_agent(user_agent: String) -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent,
        }
    }

    fn session() -> Session {
        let mut session = Session::new();
        session.proxy_settings(attohttpc::ProxySettings::from_env());
        session
    }
}

impl Default for AttohttpcClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for AttohttpcClient {
    fn get(&self, url: &str, headers: Vec<(String, String)>) -> Result<Box<dyn HttpResponse>> {
        let session = Self::session();

        let mut request_builder = session
            .get(url)
            .timeout(self.timeout)
            .header("User-Agent", &self.user_agent)
            .follow_redirects(true);

        for (key, value) in headers {
            match key.as_str() {
                "Accept" => request_builder = request_builder.header("Accept", value),
                other => log::trace!("Dropping unsupported request header {other}"),
            }
        }

        let response = request_builder.send()?;
        Ok(Box::new(AttohttpcResponse { response }))
    }

    fn post_form(&self, url: &str, body: &str) -> Result<Box<dyn HttpResponse>> {
        let session = Self::session();

        let response = session
            .post(url)
            .timeout(self.timeout)
            .header("User-Agent", &self.user_agent)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .bytes(body.as_bytes().to_vec())
            .send()?;
        Ok(Box::new(AttohttpcResponse { response }))
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }
}

struct AttohttpcResponse {
    response: Response,
}

impl Read for AttohttpcResponse {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.response.read(buf)
    }
}

impl HttpResponse for AttohttpcResponse {
    fn status(&self) -> u16 {
        self.response.status().as_u16()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.response.headers().get(name)?.to_str().ok()
    }
}

/// Read a whole response body as text, failing on a non-2xx status.
pub fn read_text(mut response: Box<dyn HttpResponse>, url: &str) -> Result<String> {
    let status = response.status();
    if !(200..300).contains(&status) {
        return Err(UpkeepError::NetworkError(format!(
            "{url} answered with status {status}"
        )));
    }

    let mut body = String::new();
    response.read_to_string(&mut body)?;
    Ok(body)
}
