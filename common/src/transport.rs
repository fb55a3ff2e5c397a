use crate::error::TransportError;

/// Status and body of a completed HTTP exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal HTTP client used by the LLM and intake clients.
///
/// The browser build implements this with `fetch`; tests use recording
/// mocks. A non-2xx status is still `Ok`: callers decide what it means.
#[allow(async_fn_in_trait)]
pub trait HttpTransport {
    /// POST `body` as `application/json` to `url`.
    async fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse, TransportError>;
}

impl<T: HttpTransport> HttpTransport for &T {
    async fn post_json(&self, url: &str, body: &str) -> Result<HttpResponse, TransportError> {
        (**self).post_json(url, body).await
    }
}
