//! Fetching batch inputs and writing encoded outputs back over HTTP.
//!
//! Every error names the target index and the URL involved. A non-success response keeps
//! the remote status (`AppError::Upstream`); failures without a response are
//! `AppError::Transport`. Input bodies are capped at the configured upload size.

use std::collections::BTreeMap;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use bytes::{Bytes, BytesMut};
use imaginary_core::models::{OutputTarget, UploadMethod};
use imaginary_core::AppError;

/// Thin wrapper over the shared, pooled `reqwest::Client`.
#[derive(Clone)]
pub struct TransferClient {
    client: reqwest::Client,
    max_input_bytes: usize,
}

impl TransferClient {
    pub fn new(client: reqwest::Client, max_input_bytes: usize) -> Self {
        Self {
            client,
            max_input_bytes,
        }
    }

    /// GET the input image of target `index`.
    ///
    /// Fails with `PayloadTooLarge` as soon as the declared or received length passes
    /// `max_input_bytes`; the rest of the body is never buffered.
    pub async fn fetch(&self, index: usize, url: &str) -> Result<Bytes, AppError> {
        let mut response = self.client.get(url).send().await.map_err(|e| {
            tracing::warn!(error = %e, index, url = %url, "Failed to fetch input");
            transport_error(index, "fetch input", url, &e)
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: format!(
                    "Target #{}: failed to fetch input {}: upstream responded with {}",
                    index, url, status
                ),
            });
        }

        let declared = response.content_length();
        if declared.is_some_and(|len| len > self.max_input_bytes as u64) {
            return Err(self.input_too_large(index, url));
        }

        let mut body = BytesMut::with_capacity(
            declared.map_or(0, |len| len as usize).min(self.max_input_bytes),
        );
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| transport_error(index, "read input", url, &e))?
        {
            if body.len() + chunk.len() > self.max_input_bytes {
                return Err(self.input_too_large(index, url));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body.freeze())
    }

    fn input_too_large(&self, index: usize, url: &str) -> AppError {
        tracing::warn!(index, url = %url, max_bytes = self.max_input_bytes, "Input too large");
        AppError::PayloadTooLarge(format!(
            "Target #{}: input {} exceeds the maximum size of {} bytes",
            index, url, self.max_input_bytes
        ))
    }

    /// Write `body` to the output destination of target `index`.
    ///
    /// `Content-Type` defaults to the output format's MIME type; headers configured on the
    /// target (already rendered) take precedence. Returns the upload response status.
    pub async fn upload(
        &self,
        index: usize,
        output: &OutputTarget,
        headers: &BTreeMap<String, String>,
        content_type: &str,
        body: Bytes,
    ) -> Result<u16, AppError> {
        let headers = build_headers(index, content_type, headers)?;

        let response = self
            .client
            .request(method_of(output.method), &output.url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, index, url = %output.url, "Failed to upload output");
                transport_error(index, "upload output", &output.url, &e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: format!(
                    "Target #{}: failed to upload output {}: upstream responded with {}",
                    index, output.url, status
                ),
            });
        }

        Ok(status.as_u16())
    }
}

fn method_of(method: UploadMethod) -> Method {
    match method {
        UploadMethod::Put => Method::PUT,
        UploadMethod::Post => Method::POST,
    }
}

fn build_headers(
    index: usize,
    content_type: &str,
    headers: &BTreeMap<String, String>,
) -> Result<HeaderMap, AppError> {
    let mut map = HeaderMap::with_capacity(headers.len() + 1);
    let default_type = HeaderValue::from_str(content_type)
        .map_err(|_| AppError::Internal(format!("invalid content type '{}'", content_type)))?;
    map.insert(header::CONTENT_TYPE, default_type);

    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            AppError::BadRequest(format!(
                "Target #{}: invalid output header name '{}'",
                index, name
            ))
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            AppError::BadRequest(format!(
                "Target #{}: invalid value for output header '{}'",
                index, name
            ))
        })?;
        map.insert(header_name, header_value);
    }

    Ok(map)
}

fn transport_error(index: usize, action: &str, url: &str, err: &reqwest::Error) -> AppError {
    let reason = if err.is_timeout() {
        "request timed out".to_string()
    } else {
        err.to_string()
    };
    AppError::Transport(format!(
        "Target #{}: failed to {} {}: {}",
        index, action, url, reason
    ))
}
