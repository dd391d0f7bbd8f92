//! HTTP transport used by [`StorageClient`](crate::StorageClient)

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use http::header::AUTHORIZATION;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HttpClient;
use hyper_util::rt::TokioExecutor;
use percent_encoding::percent_decode_str;
use tracing::{debug, error};
use url::Url;

use crate::error::{Error, Result};

/// Sends one POST and hands back the raw response body.
///
/// Implementations return the body whatever the HTTP status is; only an
/// exchange that could not complete is an error, and it must be
/// [`Error::Communication`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` to `url` and return the response body as text
    async fn post(&self, url: &str, body: String) -> Result<String>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn post(&self, url: &str, body: String) -> Result<String> {
        (**self).post(url, body).await
    }
}

type HttpsConnector = hyper_rustls::HttpsConnector<HttpConnector>;

/// Build a rustls ClientConfig trusting the webpki root store.
fn build_tls_config() -> Result<rustls::ClientConfig> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());

    let mut roots = rustls::RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    Ok(rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Communication(format!("TLS setup failed: {}", e)))?
        .with_root_certificates(roots)
        .with_no_client_auth())
}

/// HTTP/1.1 transport over hyper, with TLS for `https` URLs.
///
/// Idle connections are not kept: every request opens its own connection.
pub struct HyperTransport {
    http_client: std::result::Result<HttpClient<HttpsConnector, Full<Bytes>>, String>,
    timeout_ms: u64,
}

impl HyperTransport {
    /// Create a transport that gives up on a request after `timeout_ms`
    pub fn new(timeout_ms: u64) -> Self {
        let http_client = build_tls_config()
            .map(|tls_config| {
                let https_connector = hyper_rustls::HttpsConnectorBuilder::new()
                    .with_tls_config(tls_config)
                    .https_or_http()
                    .enable_http1()
                    .build();

                HttpClient::builder(TokioExecutor::new())
                    .pool_max_idle_per_host(0)
                    .build(https_connector)
            })
            .map_err(|e| {
                error!("HTTP transport unavailable: {}", e);
                e.to_string()
            });

        Self {
            http_client,
            timeout_ms,
        }
    }

    /// Request timeout in milliseconds
    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn post(&self, url: &str, body: String) -> Result<String> {
        let http_client = self
            .http_client
            .as_ref()
            .map_err(|e| Error::Communication(e.clone()))?;

        let (uri, authorization) = split_userinfo(url)?;

        let mut builder = Request::builder().method(Method::POST).uri(uri.clone());
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        let req = builder
            .body(Full::new(Bytes::from(body)))
            .map_err(|e| Error::Communication(format!("Failed to build request: {}", e)))?;

        debug!("Sending request: POST {}", uri);

        let exchange = async {
            let response = http_client
                .request(req)
                .await
                .map_err(|e| Error::Communication(format!("Request failed: {}", e)))?;

            let status = response.status();
            let collected = response
                .into_body()
                .collect()
                .await
                .map_err(|e| Error::Communication(format!("Failed to read body: {}", e)))?;

            debug!("Response: {} from {}", status, uri);
            Ok::<_, Error>(String::from_utf8_lossy(&collected.to_bytes()).into_owned())
        };

        tokio::time::timeout(Duration::from_millis(self.timeout_ms), exchange)
            .await
            .map_err(|_| {
                Error::Communication(format!("Request timeout after {}ms", self.timeout_ms))
            })?
    }
}

/// Move URL userinfo into a Basic `Authorization` value and return the URI
/// without it, the way curl treats `user:pass@host` URLs.
fn split_userinfo(url: &str) -> Result<(Uri, Option<String>)> {
    let mut parsed = Url::parse(url)
        .map_err(|e| Error::Communication(format!("Invalid request URL: {}", e)))?;

    let authorization = if parsed.username().is_empty() && parsed.password().is_none() {
        None
    } else {
        let user = percent_decode_str(parsed.username()).decode_utf8_lossy().into_owned();
        let pass = parsed
            .password()
            .map(|p| percent_decode_str(p).decode_utf8_lossy().into_owned())
            .unwrap_or_default();
        Some(format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass))))
    };

    // Both setters only fail for URLs that cannot carry credentials at all.
    let _ = parsed.set_username("");
    let _ = parsed.set_password(None);

    let uri: Uri = parsed
        .as_str()
        .parse()
        .map_err(|e| Error::Communication(format!("Invalid request URL: {}", e)))?;

    Ok((uri, authorization))
}
