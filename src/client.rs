use crate::error::ApiError;
use log::warn;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::{multipart::Form, Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Characters that must not appear raw inside a single path segment.
/// Model names routinely contain spaces.
const SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`');

pub fn encode_path_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT_ENCODE_SET).to_string()
}

/// Shared HTTP surface for the generation server's REST API. One reqwest
/// client, one base URL; the catalog and preset endpoints layer on top.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, request_timeout: Duration) -> Self {
        let http = make_http_client(request_timeout);
        let mut base_url = base_url.trim_end_matches('/').to_string();
        base_url.push('/');
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self.http.get(self.url(path)).query(query).send().await?;
        decode_json(check_status(response).await?).await
    }

    pub(crate) async fn patch_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.http.patch(self.url(path)).json(body).send().await?;
        decode_json(check_status(response).await?).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.http.delete(self.url(path)).send().await?;
        check_status(response).await?;
        Ok(())
    }

    pub(crate) async fn send_multipart<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        let response = self
            .http
            .request(method, self.url(path))
            .multipart(form)
            .send()
            .await?;
        decode_json(check_status(response).await?).await
    }
}

fn make_http_client(request_timeout: Duration) -> Client {
    Client::builder()
        .user_agent(format!(
            "LatentConsole/{} ({})",
            env!("CARGO_PKG_VERSION"),
            env!("CARGO_PKG_NAME")
        ))
        .timeout(request_timeout)
        .tcp_nodelay(true)
        .http2_adaptive_window(true)
        .pool_max_idle_per_host(4)
        .build()
        .expect("failed to construct reqwest client")
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.text().await {
        Ok(body) if !body.trim().is_empty() => truncate_message(body.trim()),
        Ok(_) => status
            .canonical_reason()
            .unwrap_or("no response body")
            .to_string(),
        Err(err) => {
            warn!("Failed to read error body for {status} response: {err}");
            status
                .canonical_reason()
                .unwrap_or("no response body")
                .to_string()
        }
    };

    Err(ApiError::Status { status, message })
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::Decode(err.to_string()))
}

fn truncate_message(message: &str) -> String {
    const MAX_MESSAGE_LEN: usize = 512;
    if message.len() <= MAX_MESSAGE_LEN {
        return message.to_string();
    }
    let mut end = MAX_MESSAGE_LEN;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &message[..end])
}
