use std::future::Future;

use bytes::Bytes;
use http_body_util::Full;
use http_test_util::drain::DiscardBodyFuture;
use http_test_util::empty_body;
use hyper::{Request, StatusCode, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    #[error("request failed: {0}")]
    Request(#[from] hyper_util::client::legacy::Error),
}

/// Issues one GET against the target and reports the status the server answered with.
///
/// Workers only ever talk to the network through this, so a run can be pointed at something
/// other than a real socket.
pub trait Transport: Clone + Send + Sync + 'static {
    fn get(&self, target: &Uri) -> impl Future<Output = Result<StatusCode, TransportError>> + Send;
}

/// Pooled HTTP/1.1 client, plain or TLS depending on the target's scheme.
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
}

impl HttpClient {
    #[must_use]
    pub fn new() -> Self {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        let connector = HttpsConnectorBuilder::new()
            .with_webpki_roots()
            .https_or_http()
            .enable_http1()
            .wrap_connector(http);
        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self { client }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpClient {
    async fn get(&self, target: &Uri) -> Result<StatusCode, TransportError> {
        let request = Request::get(target.clone()).body(empty_body())?;
        let resp = self.client.request(request).await?;
        let status = resp.status();
        // The status is already in, a broken body does not change the outcome.
        if let Err(e) = DiscardBodyFuture::new(resp.into_body()).await {
            tracing::debug!(error = %e, %status, "failed to drain response body");
        }
        Ok(status)
    }
}
