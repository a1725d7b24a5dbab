// src/client/fetcher.rs
// DOCUMENTATION: Transport abstraction and bounded retry with linear backoff
// PURPOSE: Perform API calls, retrying failed attempts before giving up

use super::error::{ClientError, TransportError};
use reqwest::{Client, Method};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

/// Method, headers and body of a logical request
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    /// Header names are stored lowercased, so iteration order is canonical
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post(body: Value) -> Self {
        Self::new(Method::POST).with_body(body)
    }

    pub fn put(body: Value) -> Self {
        Self::new(Method::PUT).with_body(body)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn is_read(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }
}

/// Cache key: full URL plus a canonical serialization of method, headers and body
/// Headers are sorted, so two requests differing only in header order share a key
pub fn cache_key(url: &str, options: &RequestOptions) -> String {
    let headers = options
        .headers
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(";");
    let body = options
        .body
        .as_ref()
        .map(Value::to_string)
        .unwrap_or_default();
    format!("{}|{}|{}|{}", url, options.method, headers, body)
}

/// Raw answer from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    /// Lowercased header names; repeated headers appear once per value
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Best readable error text: the envelope's `message`, else the raw body
    pub fn error_message(&self) -> String {
        serde_json::from_str::<Value>(&self.body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| {
                if self.body.trim().is_empty() {
                    "empty response body".to_string()
                } else {
                    self.body.chars().take(200).collect()
                }
            })
    }
}

/// Something that can perform one HTTP exchange
pub trait Transport: Send + Sync {
    fn send(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("portfolio-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn send(&self, url: &str, options: &RequestOptions) -> Result<TransportResponse, TransportError> {
        let mut request = self.client.request(options.method.clone(), url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| TransportError(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.text().await.map_err(|e| TransportError(e.to_string()))?;

        Ok(TransportResponse { status, headers, body })
    }
}

/// How many attempts to make and how long to wait between them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Linear backoff: base_delay * attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

enum Failure {
    Status { status: u16, message: String },
    Transport(String),
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Status { status, message } => write!(f, "HTTP {}: {}", status, message),
            Failure::Transport(message) => write!(f, "{}", message),
        }
    }
}

/// Runs requests through a transport with bounded retries
pub struct RetryingFetcher<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingFetcher<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetch using the configured policy
    pub async fn fetch_with_retry(
        &self,
        url: &str,
        options: &RequestOptions,
    ) -> Result<TransportResponse, ClientError> {
        self.fetch_with_policy(url, options, self.policy).await
    }

    /// Attempt up to `policy.max_attempts` times
    /// DOCUMENTATION: Any 2xx response (including an empty body) ends the loop.
    /// Transport failures and non-2xx statuses are retried after base_delay * attempt.
    /// A single-attempt policy reports the failure itself, otherwise RetriesExhausted
    pub async fn fetch_with_policy(
        &self,
        url: &str,
        options: &RequestOptions,
        policy: RetryPolicy,
    ) -> Result<TransportResponse, ClientError> {
        let max_attempts = policy.max_attempts.max(1);
        let mut last_failure = Failure::Transport("no attempt made".to_string());

        for attempt in 1..=max_attempts {
            match self.transport.send(url, options).await {
                Ok(response) if response.is_success() => {
                    if attempt > 1 {
                        log::info!("{} {} succeeded on attempt {}", options.method, url, attempt);
                    }
                    return Ok(response);
                }
                Ok(response) => {
                    last_failure = Failure::Status {
                        status: response.status,
                        message: response.error_message(),
                    };
                }
                Err(e) => {
                    last_failure = Failure::Transport(e.0);
                }
            }

            if attempt < max_attempts {
                let delay = policy.delay_for(attempt);
                log::warn!(
                    "{} {} failed (attempt {}/{}): {}; retrying in {}ms",
                    options.method,
                    url,
                    attempt,
                    max_attempts,
                    last_failure,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
        }

        if max_attempts == 1 {
            return Err(match last_failure {
                Failure::Status { status, message } => ClientError::Status {
                    endpoint: url.to_string(),
                    status,
                    message,
                },
                Failure::Transport(message) => ClientError::Transport {
                    endpoint: url.to_string(),
                    message,
                },
            });
        }

        log::error!("{} {} failed after {} attempts: {}", options.method, url, max_attempts, last_failure);
        Err(ClientError::RetriesExhausted {
            endpoint: url.to_string(),
            attempts: max_attempts,
            last_error: last_failure.to_string(),
        })
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Instant;

    /// Scripted transport recording every call
    #[derive(Default)]
    pub struct MockTransport {
        script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
        fallback: Mutex<Option<TransportResponse>>,
        calls: Mutex<Vec<(String, RequestOptions, Instant)>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue one outcome
        pub fn push(&self, outcome: Result<TransportResponse, TransportError>) -> &Self {
            self.script.lock().unwrap().push_back(outcome);
            self
        }

        /// Response returned once the script is empty
        pub fn always(&self, response: TransportResponse) -> &Self {
            *self.fallback.lock().unwrap() = Some(response);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub fn calls(&self) -> Vec<(String, RequestOptions, Instant)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Transport for MockTransport {
        async fn send(&self, url: &str, options: &RequestOptions) -> Result<TransportResponse, TransportError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), options.clone(), Instant::now()));
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(outcome) => outcome,
                None => self
                    .fallback
                    .lock()
                    .unwrap()
                    .clone()
                    .ok_or_else(|| TransportError("mock script exhausted".to_string())),
            }
        }
    }

    pub fn json_response(status: u16, body: Value) -> TransportResponse {
        TransportResponse {
            status,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: body.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::{json_response, MockTransport};
    use super::*;
    use serde_json::json;

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(20),
        }
    }

    #[test]
    fn test_linear_backoff() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(3000));
    }

    #[test]
    fn test_cache_key_ignores_header_order() {
        let a = RequestOptions::get()
            .with_header("Accept", "application/json")
            .with_header("Cookie", "portfolio_session=abc");
        let b = RequestOptions::get()
            .with_header("cookie", "portfolio_session=abc")
            .with_header("accept", "application/json");
        assert_eq!(cache_key("http://x/api/projects", &a), cache_key("http://x/api/projects", &b));

        let post = RequestOptions::post(json!({"a": 1}));
        assert_ne!(cache_key("http://x/api/projects", &a), cache_key("http://x/api/projects", &post));
    }

    #[tokio::test]
    async fn test_fails_twice_then_succeeds() {
        let transport = MockTransport::new();
        transport
            .push(Err(TransportError("connection reset".into())))
            .push(Ok(json_response(503, json!({"success": false, "message": "busy"}))))
            .push(Ok(json_response(200, json!({"success": true, "data": [1, 2]}))));

        let fetcher = RetryingFetcher::new(transport, fast_policy());
        let response = fetcher
            .fetch_with_retry("http://x/api/projects", &RequestOptions::get())
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        let calls = fetcher.transport().calls();
        assert_eq!(calls.len(), 3);

        // Waits of 20ms then 40ms between attempts
        let first_gap = calls[1].2 - calls[0].2;
        let second_gap = calls[2].2 - calls[1].2;
        assert!(first_gap >= Duration::from_millis(20));
        assert!(second_gap >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_exhaustion_reports_endpoint_and_last_error() {
        let transport = MockTransport::new();
        transport.always(json_response(500, json!({"success": false, "message": "Internal server error"})));

        let fetcher = RetryingFetcher::new(transport, fast_policy());
        let err = fetcher
            .fetch_with_retry("http://x/api/blog", &RequestOptions::get())
            .await
            .unwrap_err();

        assert_eq!(fetcher.transport().call_count(), 3);
        match err {
            ClientError::RetriesExhausted {
                endpoint,
                attempts,
                last_error,
            } => {
                assert_eq!(endpoint, "http://x/api/blog");
                assert_eq!(attempts, 3);
                assert!(last_error.contains("HTTP 500"));
                assert!(last_error.contains("Internal server error"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_empty_success_is_not_retried() {
        let transport = MockTransport::new();
        transport.push(Ok(TransportResponse {
            status: 204,
            headers: Vec::new(),
            body: String::new(),
        }));

        let fetcher = RetryingFetcher::new(transport, fast_policy());
        let response = fetcher
            .fetch_with_retry("http://x/api/projects/1", &RequestOptions::delete())
            .await
            .unwrap();

        assert_eq!(response.status, 204);
        assert_eq!(fetcher.transport().call_count(), 1);
    }

    #[tokio::test]
    async fn test_single_attempt_reports_status() {
        let transport = MockTransport::new();
        transport.push(Ok(json_response(401, json!({"success": false, "message": "Invalid username or password"}))));

        let fetcher = RetryingFetcher::new(transport, fast_policy());
        let err = fetcher
            .fetch_with_policy("http://x/api/login", &RequestOptions::post(json!({})), RetryPolicy::once())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().contains("Invalid username or password"));
        assert_eq!(fetcher.transport().call_count(), 1);
    }
}
