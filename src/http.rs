use std::future::Future;

use url::Url;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A single request to the authorization server.
///
/// `form` is sent as an `application/x-www-form-urlencoded` body on POST
/// and ignored on GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub form: Vec<(String, String)>,
}

impl HttpRequest {
    #[must_use]
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            form: Vec::new(),
        }
    }

    #[must_use]
    pub fn post_form(url: Url, form: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            url,
            form,
        }
    }

    /// Value of a form parameter.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.form
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One request/response round-trip.
///
/// Implementations report connectivity problems as [`Error::Transport`] and
/// return every HTTP status (including 4xx/5xx) as a normal response.
pub trait HttpExchange: Send + Sync {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, Error>> + Send;
}

/// [`HttpExchange`] backed by a `reqwest::Client`.
#[cfg(feature = "reqwest")]
#[derive(Debug, Clone, Default)]
pub struct ReqwestExchange {
    http: reqwest::Client,
}

#[cfg(feature = "reqwest")]
impl ReqwestExchange {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { http: client }
    }
}

#[cfg(feature = "reqwest")]
impl HttpExchange for ReqwestExchange {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let builder = match request.method {
            Method::Get => self.http.get(request.url),
            Method::Post => self.http.post(request.url).form(&request.form),
        };
        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}
