//! HTTP transport on reqwest

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use super::request::{Method, RequestBody, ResponseBody, ResponseKind, TransportRequest, TransportResponse};
use super::{Transport, TransportFuture};
use crate::errors::{ErrorKind, StandardError, TransportFailure, NETWORK_ERROR_MESSAGE};

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport sending requests to one backend over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

/// Builder for configuring an [`HttpTransport`].
#[derive(Debug)]
pub struct HttpTransportBuilder {
    base_url: String,
    timeout: Duration,
    client: Option<Client>,
}

impl HttpTransportBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
            client: None,
        }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a custom reqwest Client.
    #[must_use]
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> Result<HttpTransport, StandardError> {
        let client = match self.client {
            Some(c) => c,
            None => Client::builder()
                .timeout(self.timeout)
                .build()
                .map_err(|e| StandardError::new(ErrorKind::Unknown, format!("invalid HTTP client: {}", e)))?,
        };

        Ok(HttpTransport {
            client,
            base_url: self.base_url,
        })
    }
}

impl HttpTransport {
    pub fn builder(base_url: impl Into<String>) -> HttpTransportBuilder {
        HttpTransportBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn execute(&self, request: TransportRequest) -> Result<TransportResponse, TransportFailure> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .client
            .request(to_reqwest(request.method), &url)
            .query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.expect == ResponseKind::Bytes {
            builder = builder.header("accept", "application/octet-stream, application/json");
        }
        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(&body),
            RequestBody::Multipart {
                field,
                file_name,
                bytes,
            } => {
                let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
                builder.multipart(reqwest::multipart::Form::new().part(field, part))
            }
        };

        let response = builder.send().await.map_err(send_failure)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.json::<Value>().await.ok();
            return Err(TransportFailure::status(status.as_u16(), body));
        }

        let json_reply = is_json(&response);
        let bytes = response.bytes().await.map_err(send_failure)?;
        let body = match request.expect {
            // A binary request may still be answered with a JSON envelope
            ResponseKind::Bytes if json_reply => match serde_json::from_slice(&bytes) {
                Ok(value) => ResponseBody::Json(value),
                Err(_) => ResponseBody::Bytes(bytes.to_vec()),
            },
            ResponseKind::Bytes => ResponseBody::Bytes(bytes.to_vec()),
            ResponseKind::Json if bytes.is_empty() => ResponseBody::Json(Value::Null),
            // Unparseable bodies are handed on as text and rejected by the envelope guard
            ResponseKind::Json => ResponseBody::Json(
                serde_json::from_slice(&bytes)
                    .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())),
            ),
        };
        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn send<'a>(&'a self, request: TransportRequest) -> TransportFuture<'a> {
        Box::pin(self.execute(request))
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn is_json(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map_or(false, |mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
}

fn send_failure(err: reqwest::Error) -> TransportFailure {
    if err.is_timeout() {
        TransportFailure::timed_out()
    } else if err.is_connect() {
        TransportFailure::network(Some("ERR_NETWORK"), NETWORK_ERROR_MESSAGE)
    } else {
        TransportFailure::network(None, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_trims_base_url() {
        let transport = HttpTransport::builder("http://localhost:8080/api/")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        assert_eq!(transport.base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn test_method_mapping() {
        assert_eq!(to_reqwest(Method::Patch), reqwest::Method::PATCH);
        assert_eq!(to_reqwest(Method::Delete), reqwest::Method::DELETE);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_failure() {
        let transport = HttpTransport::builder("http://127.0.0.1:9")
            .timeout(Duration::from_secs(2))
            .build()
            .unwrap();

        let failure = transport
            .send(TransportRequest::get("/rules"))
            .await
            .unwrap_err();
        assert_eq!(failure.http_status(), None);
    }
}
