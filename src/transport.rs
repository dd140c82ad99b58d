use log::{debug, info};
use reqwest::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use std::future::Future;
use tokio::runtime::Handle;

use crate::error::TransportError;
use crate::form::Payload;
use crate::response::ReportResponse;

/// Issues the single `POST` of a submission.
pub trait ReportTransport {
    fn post_json(
        &self,
        endpoint: &str,
        payload: &Payload,
    ) -> impl Future<Output = Result<ReportResponse, TransportError>>;
}

/// `reqwest` transport. Requests run on the given tokio runtime so the
/// caller may await them from any executor, the GLib main context included.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    runtime: Handle,
}

impl HttpTransport {
    pub fn new(base_url: &str, runtime: Handle) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            runtime,
        }
    }

    pub fn url_for(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}/{}", self.base_url, endpoint)
        }
    }
}

impl ReportTransport for HttpTransport {
    async fn post_json(
        &self,
        endpoint: &str,
        payload: &Payload,
    ) -> Result<ReportResponse, TransportError> {
        let url = self.url_for(endpoint);
        let request = self.client.post(&url).json(payload);
        debug!("POST {} with fields {:?}", url, payload.keys().collect::<Vec<_>>());

        let task = self.runtime.spawn(async move {
            let response = request.send().await.map_err(|e| TransportError::Unreachable {
                url: url.clone(),
                reason: e.to_string(),
            })?;

            let status = response.status().as_u16();
            let header = |name: HeaderName| {
                response
                    .headers()
                    .get(name)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            };
            let content_type = header(CONTENT_TYPE);
            let content_disposition = header(CONTENT_DISPOSITION);
            info!("{} answered {} ({})", url, status, content_type.as_deref().unwrap_or("no content type"));

            let body = response.bytes().await.map_err(|e| TransportError::Body {
                url: url.clone(),
                reason: e.to_string(),
            })?;

            Ok::<_, TransportError>(ReportResponse {
                status,
                content_type,
                content_disposition,
                body: body.to_vec(),
            })
        });

        task.await
            .map_err(|e| TransportError::Aborted(e.to_string()))?
    }
}
