//! Transport that forwards requests to an external worker over HTTP.
//!
//! The worker receives `POST {worker_url}/bridge` with the request plus a
//! `callbackUrl`, answers with an acknowledgement, and later posts the
//! completion envelope to the callback.

use async_trait::async_trait;
use serde::Serialize;

use crate::adapter::CompletionSink;
use crate::messages::{parse_ack, Ack, BridgeRequest};
use crate::transport::{Transport, TransportError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WorkerCall<'a> {
    #[serde(flatten)]
    request: &'a BridgeRequest,
    callback_url: &'a str,
}

pub struct HttpTransport {
    client: reqwest::Client,
    worker_url: String,
    callback_url: String,
}

impl HttpTransport {
    /// * `worker_url` - Base URL of the worker, e.g. `http://127.0.0.1:8765`.
    /// * `callback_url` - Absolute URL completions are posted back to.
    pub fn new(worker_url: impl Into<String>, callback_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), worker_url, callback_url)
    }

    pub fn with_client(
        client: reqwest::Client,
        worker_url: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            worker_url: worker_url.into().trim_end_matches('/').to_string(),
            callback_url: callback_url.into(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: BridgeRequest, _sink: CompletionSink) -> Result<Ack, TransportError> {
        let call = WorkerCall {
            request: &request,
            callback_url: &self.callback_url,
        };

        let response = self
            .client
            .post(format!("{}/bridge", self.worker_url))
            .json(&call)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        if status.is_success() {
            return Ok(parse_ack(&body)?);
        }

        // A refusal may come with an error status; keep its message.
        match parse_ack(&body) {
            Ok(Ack::Rejected(reason)) => Ok(Ack::Rejected(reason)),
            _ => Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            }),
        }
    }
}
