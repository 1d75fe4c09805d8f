use std::{future::Future, time::Duration};
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::{
    error::TransportError,
    handler::RequestHandler,
    types::{PredictRequest, PredictResponse},
};

/// Request/response channel between the page side and the background side.
///
/// `Err` means the channel itself failed. Error replies from the handler come
/// back as `Ok(PredictResponse::Error { .. })`.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: PredictRequest,
    ) -> impl Future<Output = Result<PredictResponse, TransportError>> + Send;
}

pub type Envelope = (PredictRequest, oneshot::Sender<PredictResponse>);

/// In-process message passing, one reply per request.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::Sender<Envelope>,
}

impl ChannelTransport {
    pub fn new(tx: mpsc::Sender<Envelope>) -> Self {
        Self { tx }
    }

    /// Starts a background listener answering with `handler` and returns the
    /// page-side end. The listener stops once every transport clone is gone.
    pub fn spawn_background(handler: RequestHandler, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<Envelope>(capacity.max(1));

        tokio::spawn(async move {
            while let Some((request, reply)) = rx.recv().await {
                if reply.send(handler.handle(request)).is_err() {
                    debug!("Requester went away before the reply was sent");
                }
            }
        });

        Self::new(tx)
    }
}

impl Transport for ChannelTransport {
    async fn send(&self, request: PredictRequest) -> Result<PredictResponse, TransportError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send((request, reply_tx))
            .await
            .map_err(|_| TransportError::Closed)?;
        reply_rx.await.map_err(|_| TransportError::Closed)
    }
}

/// Talks to a running `phishblock-engine` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(engine_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/predict", engine_url.trim_end_matches('/')),
        })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, request: PredictRequest) -> Result<PredictResponse, TransportError> {
        // Rejections carry a protocol body too, so the status is not checked.
        let body = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .bytes()
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{model::ModelStore, routes::router, types::ErrorCode};
    use std::sync::Arc;

    fn request() -> PredictRequest {
        PredictRequest::predict_urls(vec!["https://example.com/".to_string()])
    }

    #[tokio::test]
    async fn test_channel_round_trip() {
        let handler = RequestHandler::new(Arc::new(ModelStore::new()));
        let transport = ChannelTransport::spawn_background(handler, 8);

        let reply = transport.send(request()).await.unwrap();
        assert_eq!(reply.error_code(), Some(ErrorCode::ModelNotLoaded));
    }

    #[tokio::test]
    async fn test_closed_channel_is_transport_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let transport = ChannelTransport::new(tx);

        assert!(matches!(transport.send(request()).await, Err(TransportError::Closed)));
    }

    #[tokio::test]
    async fn test_dropped_reply_is_transport_error() {
        let (tx, mut rx) = mpsc::channel::<Envelope>(1);
        tokio::spawn(async move {
            while let Some((_request, reply)) = rx.recv().await {
                drop(reply);
            }
        });
        let transport = ChannelTransport::new(tx);

        assert!(matches!(transport.send(request()).await, Err(TransportError::Closed)));
    }

    #[tokio::test]
    async fn test_http_round_trip() {
        let handler = RequestHandler::new(Arc::new(ModelStore::new()));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(handler)).await.unwrap();
        });

        let transport = HttpTransport::new(&format!("http://{}/", addr), Duration::from_secs(5)).unwrap();
        let reply = transport.send(request()).await.unwrap();
        assert_eq!(reply, PredictResponse::not_loaded());
    }

    #[tokio::test]
    async fn test_stalled_engine_times_out() {
        // Accepts connections and never writes a byte back.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let transport = HttpTransport::new(&format!("http://{}", addr), Duration::from_millis(200)).unwrap();
        match transport.send(request()).await {
            Err(TransportError::Http(e)) => assert!(e.is_timeout()),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_engine_is_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        assert!(matches!(transport.send(request()).await, Err(TransportError::Http(_))));
    }
}
