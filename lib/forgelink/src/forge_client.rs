//! Forge API entry point.
//!
//! [`ForgeClient`] resolves endpoint paths against the API base URL, sends
//! requests through an [`HttpTransport`], and interprets the responses with
//! the [`Decoding`] strategy each endpoint declares.
//!
//! ```ignore
//! use forgelink::{ForgeClient, QueryBuilder, path_segment};
//!
//! let client = ForgeClient::builder("https://forge.example/api/v1")
//!     .token(std::env::var("FORGE_TOKEN")?)
//!     .with_logging()
//!     .build()?;
//!
//! let path = QueryBuilder::new(format!("repos/{}/{}/issues", path_segment(owner), path_segment(repo)))
//!     .param("state", Some("open"))
//!     .param("page", page)
//!     .build();
//! let issues: Vec<Issue> = client.json(client.get(&path)?.build()).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tower::Layer;
use tower_service::Service;
use url::Url;

use crate::{
    AsBinary, AsJson, AsStatusOnly, AsStreamHandle, AsText, BoxedService, CallerOwned,
    CancellationToken, ClientConfig, Decoding, Download, Empty, Error, HttpTransport, HyperClient,
    HyperClientBuilder, Method, Request, RequestBuilder, Result, StatusOutcome, StreamingResponse,
    interpret,
};

/// Client for one forge API.
///
/// Generic over the transport so tests and embedders can supply their own
/// [`HttpTransport`]; the default is [`HyperClient`].
#[derive(Debug, Clone)]
pub struct ForgeClient<C = HyperClient> {
    transport: C,
    base_url: Url,
}

impl ForgeClient<HyperClient> {
    /// Create a client with the default transport and no credentials.
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_transport(HyperClient::new(), base_url)
    }

    /// Create a client builder.
    #[must_use]
    pub fn builder(base_url: impl Into<String>) -> ForgeClientBuilder {
        ForgeClientBuilder::new(base_url)
    }
}

impl<C> ForgeClient<C> {
    /// Create a client over an existing transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL cannot be parsed or cannot serve as a base.
    pub fn with_transport(transport: C, base_url: impl AsRef<str>) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())?;
        if base_url.cannot_be_a_base() {
            return Err(Error::invalid_request(format!(
                "'{base_url}' cannot be used as a base URL"
            )));
        }
        // Without a trailing slash, joining would replace the last segment.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            transport,
            base_url,
        })
    }

    /// The API base URL, always ending with `/`.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &C {
        &self.transport
    }

    /// Resolve an endpoint path (query string included) against the base URL.
    ///
    /// A leading `/` is ignored so paths never escape the API prefix.
    pub fn url(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Start a request to `path`.
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(Request::builder(method, self.url(path)?))
    }

    /// Start a `GET` request.
    pub fn get(&self, path: &str) -> Result<RequestBuilder> {
        self.request(Method::Get, path)
    }

    /// Start a `POST` request.
    pub fn post(&self, path: &str) -> Result<RequestBuilder> {
        self.request(Method::Post, path)
    }

    /// Start a `PUT` request.
    pub fn put(&self, path: &str) -> Result<RequestBuilder> {
        self.request(Method::Put, path)
    }

    /// Start a `PATCH` request.
    pub fn patch(&self, path: &str) -> Result<RequestBuilder> {
        self.request(Method::Patch, path)
    }

    /// Start a `DELETE` request.
    pub fn delete(&self, path: &str) -> Result<RequestBuilder> {
        self.request(Method::Delete, path)
    }
}

impl<C: HttpTransport> ForgeClient<C> {
    /// Send a request and return the pending exchange, uninterpreted.
    pub fn exchange(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<StreamingResponse>> + Send + '_ {
        self.transport.send(request)
    }

    /// Send a request and decode the response with strategy `S`.
    pub async fn send<S: Decoding>(&self, request: Request<Bytes>) -> Result<S::Output> {
        self.send_with::<S>(request, &CancellationToken::new()).await
    }

    /// Send a request and decode the response with strategy `S`, giving up
    /// with [`Error::Cancelled`] once `cancel` fires.
    pub async fn send_with<S: Decoding>(
        &self,
        request: Request<Bytes>,
        cancel: &CancellationToken,
    ) -> Result<S::Output> {
        interpret::<S, _>(self.transport.send(request), cancel).await
    }

    /// Decode a JSON response.
    pub async fn json<T>(&self, request: Request<Bytes>) -> Result<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.send::<AsJson<T>>(request).await
    }

    /// Check the status and discard the body.
    pub async fn empty(&self, request: Request<Bytes>) -> Result<()> {
        self.send::<AsJson<Empty>>(request).await.map(|Empty| ())
    }

    /// Read a text response.
    pub async fn text(&self, request: Request<Bytes>) -> Result<String> {
        self.send::<AsText>(request).await
    }

    /// Read a binary response.
    pub async fn bytes(&self, request: Request<Bytes>) -> Result<Bytes> {
        self.send::<AsBinary>(request).await
    }

    /// Report the status code without failing on it.
    pub async fn status(&self, request: Request<Bytes>) -> Result<StatusOutcome> {
        self.send::<AsStatusOnly>(request).await
    }

    /// Ask a yes/no question answered by the status code: 2xx is `true`,
    /// 404 is `false`, anything else is an error.
    pub async fn exists(&self, request: Request<Bytes>) -> Result<bool> {
        self.status(request).await?.evaluate()
    }

    /// Start a download whose body the caller reads and releases.
    pub async fn download(&self, request: Request<Bytes>) -> Result<CallerOwned<Download>> {
        self.send::<AsStreamHandle>(request).await
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for a [`ForgeClient`] over a [`HyperClient`].
pub struct ForgeClientBuilder {
    base_url: String,
    token: Option<String>,
    logging: bool,
    http: HyperClientBuilder,
}

impl std::fmt::Debug for ForgeClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForgeClientBuilder")
            .field("base_url", &self.base_url)
            .field("has_token", &self.token.is_some())
            .field("logging", &self.logging)
            .field("http", &self.http)
            .finish()
    }
}

impl ForgeClientBuilder {
    /// Create a builder for the API at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            logging: false,
            http: HyperClient::builder(),
        }
    }

    /// Authenticate calls with this access token unless they carry their own
    /// `Authorization` header.
    #[must_use]
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Use this transport configuration.
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.http = self.http.config(config);
        self
    }

    /// Set the timeout for receiving the response head.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.http = self.http.timeout(timeout);
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http = self.http.user_agent(user_agent);
        self
    }

    /// Log every request and response head.
    #[must_use]
    pub fn with_logging(mut self) -> Self {
        self.logging = true;
        self
    }

    /// Add a Tower layer to the transport.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request<Bytes>, Response = StreamingResponse, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send,
    {
        self.http = self.http.layer(layer);
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid.
    pub fn build(self) -> Result<ForgeClient<HyperClient>> {
        let mut http = self.http;
        if let Some(token) = self.token {
            http = http.with_bearer_auth(token);
        }
        if self.logging {
            http = http.with_logging();
        }

        ForgeClient::with_transport(http.build(), self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::*;

    fn client(base: &str) -> ForgeClient<()> {
        ForgeClient::with_transport((), base).expect("valid base url")
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        let client = client("https://forge.example/api/v1");
        check!(client.base_url().as_str() == "https://forge.example/api/v1/");
    }

    #[test]
    fn paths_stay_under_the_api_prefix() {
        let client = client("https://forge.example/api/v1");

        let_assert!(Ok(url) = client.url("repos/alice/forgelink"));
        check!(url.as_str() == "https://forge.example/api/v1/repos/alice/forgelink");

        let_assert!(Ok(url) = client.url("/user"));
        check!(url.as_str() == "https://forge.example/api/v1/user");
    }

    #[test]
    fn query_strings_survive_joining() {
        let client = client("https://forge.example/api/v1/");

        let_assert!(Ok(url) = client.url("repos/search?q=forge&limit=50"));
        check!(url.path() == "/api/v1/repos/search");
        check!(url.query() == Some("q=forge&limit=50"));
    }

    #[test]
    fn request_starters_set_method() {
        let client = client("https://forge.example/api/v1");

        let_assert!(Ok(builder) = client.delete("repos/alice/old"));
        let request = builder.build();
        check!(request.method() == Method::Delete);
        check!(request.url().path() == "/api/v1/repos/alice/old");
        check!(request.body().is_none());
    }

    #[test]
    fn builder_debug_hides_token() {
        let builder = ForgeClient::builder("https://forge.example/api/v1").token("s3cr3t");
        let debug = format!("{builder:?}");
        check!(debug.contains("has_token: true"));
        check!(!debug.contains("s3cr3t"));
    }

    #[test]
    fn invalid_base_urls() {
        let_assert!(Err(err) = ForgeClient::with_transport((), "not a url"));
        check!(matches!(err, Error::InvalidUrl(_)));

        let_assert!(Err(err) = ForgeClient::with_transport((), "mailto:dev@forge.example"));
        check!(matches!(err, Error::InvalidRequest(_)));
    }
}
