//! Rate sources.

use std::time::Duration;

use async_trait::async_trait;
use ratewatch_common::{RatesPayload, RawRate};
use tracing::debug;

use crate::config::TrackerConfig;
use crate::error::{SourceError, SourceResult};

/// A read-only supplier of raw rate observations.
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Source name, for logging.
    fn name(&self) -> &str;

    /// Fetch the full current batch of observations.
    async fn fetch(&self) -> SourceResult<Vec<RawRate>>;
}

/// Pulls `{ "rates": [...] }` from an HTTP endpoint with GET.
pub struct HttpRateSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRateSource {
    /// Create a source for the given endpoint.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> SourceResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Create a source from tracker configuration.
    pub fn from_config(config: &TrackerConfig) -> SourceResult<Self> {
        Self::new(config.endpoint.clone(), config.request_timeout)
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    fn name(&self) -> &str {
        &self.endpoint
    }

    async fn fetch(&self) -> SourceResult<Vec<RawRate>> {
        let response = self.client.get(&self.endpoint).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                endpoint: self.endpoint.clone(),
            });
        }

        let body = response.bytes().await?;
        let rates = RatesPayload::from_slice(&body)?.into_raw_rates();

        debug!(endpoint = %self.endpoint, count = rates.len(), "Fetched rates");
        Ok(rates)
    }
}

/// Scripted in-memory source for tests.
///
/// Each fetch pops the next scripted response; an empty script yields
/// [`SourceError::Unavailable`].
#[cfg(any(test, feature = "test-utils"))]
pub struct StaticRateSource {
    name: String,
    script: parking_lot::Mutex<std::collections::VecDeque<Scripted>>,
}

#[cfg(any(test, feature = "test-utils"))]
struct Scripted {
    delay: Option<Duration>,
    response: Result<Vec<RawRate>, String>,
}

#[cfg(any(test, feature = "test-utils"))]
impl StaticRateSource {
    /// Create a source with an empty script.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            script: parking_lot::Mutex::new(std::collections::VecDeque::new()),
        }
    }

    /// Queue a successful response.
    pub fn push_rates(&self, rates: Vec<RawRate>) {
        self.push(None, Ok(rates));
    }

    /// Queue a successful response that resolves after `delay`.
    pub fn push_delayed_rates(&self, rates: Vec<RawRate>, delay: Duration) {
        self.push(Some(delay), Ok(rates));
    }

    /// Queue a failure.
    pub fn push_failure(&self, message: impl Into<String>) {
        self.push(None, Err(message.into()));
    }

    /// Number of responses still queued.
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }

    fn push(&self, delay: Option<Duration>, response: Result<Vec<RawRate>, String>) {
        self.script.lock().push_back(Scripted { delay, response });
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RateSource for StaticRateSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> SourceResult<Vec<RawRate>> {
        let next = self.script.lock().pop_front();
        let Some(scripted) = next else {
            return Err(SourceError::Unavailable("no scripted response".to_string()));
        };

        if let Some(delay) = scripted.delay {
            tokio::time::sleep(delay).await;
        }

        scripted.response.map_err(SourceError::Unavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio_test::{assert_err, assert_ok};

    /// Serve one canned HTTP response on a local port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}/rates/latest", addr)
    }

    #[tokio::test]
    async fn test_http_fetch() {
        let url = serve_once(
            "200 OK",
            r#"{"rates": [{"bank": "PrivatBank", "currency": "usd", "buy": 41.1, "sell": 41.6, "date": "2024-05-01 08:00:00"}, 7]}"#,
        )
        .await;

        let source = HttpRateSource::new(url, Duration::from_secs(5)).unwrap();
        let rates = assert_ok!(source.fetch().await);

        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].bank, Some(json!("PrivatBank")));
        assert_eq!(rates[1], RawRate::default());
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let url = serve_once("503 Service Unavailable", "{}").await;
        let source = HttpRateSource::new(url, Duration::from_secs(5)).unwrap();

        let err = assert_err!(source.fetch().await);
        assert!(matches!(err, SourceError::Status { status: 503, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_http_malformed_body() {
        let url = serve_once("200 OK", "<html>maintenance</html>").await;
        let source = HttpRateSource::new(url, Duration::from_secs(5)).unwrap();

        let err = assert_err!(source.fetch().await);
        assert!(matches!(err, SourceError::MalformedPayload(_)));
    }

    #[tokio::test]
    async fn test_static_source_script() {
        let source = StaticRateSource::new("static");
        source.push_rates(vec![RawRate::default()]);
        source.push_failure("boom");

        assert_eq!(source.fetch().await.unwrap().len(), 1);
        assert!(matches!(source.fetch().await, Err(SourceError::Unavailable(m)) if m == "boom"));
        assert!(matches!(source.fetch().await, Err(SourceError::Unavailable(_))));
        assert_eq!(source.remaining(), 0);
    }
}
