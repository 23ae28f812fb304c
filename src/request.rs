use {
    crate::{SigningConfig, SigningError},
    bytes::Bytes,
    derive_builder::Builder,
    http::{
        header::{HeaderMap, HeaderName, HeaderValue},
        method::Method,
        request::Request,
        uri::Uri,
    },
    std::fmt::{Debug, Formatter, Result as FmtResult},
};

/// An outbound HTTP request to be signed.
///
/// SigningRequest structs are immutable; signing never modifies the caller's headers and instead
/// returns a fresh header map. Use [`SigningRequestBuilder`] to programmatically construct a request.
///
/// The body is held as [`Bytes`]: the exact bytes hashed into the signature must be the bytes that
/// go on the wire, so the body is never re-serialized after it is handed to the signer.
#[derive(Builder, Clone)]
pub struct SigningRequest {
    /// The HTTP method, e.g. `POST`.
    method: Method,

    /// The URI path, e.g. `/`. Used verbatim in the canonical request.
    #[builder(setter(into), default = "\"/\".to_string()")]
    path: String,

    /// Query parameters in the order the caller supplied them. Values are not URL-encoded by the
    /// signer; callers must pre-encode values that need escaping.
    #[builder(setter(into), default)]
    query: Vec<(String, String)>,

    /// Headers supplied by the caller (e.g. `content-type`).
    #[builder(default)]
    headers: HeaderMap,

    /// The request body, exactly as it will be transmitted.
    #[builder(setter(into), default)]
    body: Bytes,

    /// The access key, embedded in the `Authorization` credential.
    #[builder(setter(into))]
    access_key: String,

    /// The secret key, used to seed the signing key chain.
    #[builder(setter(into))]
    secret_key: String,
}

impl SigningRequest {
    /// Create a [SigningRequestBuilder] to construct a [SigningRequest].
    #[inline]
    pub fn builder() -> SigningRequestBuilder {
        SigningRequestBuilder::default()
    }

    /// Retrieve the HTTP method.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Retrieve the URI path.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Retrieve the query parameters in their original order.
    #[inline]
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Retrieve the caller-supplied headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Retrieve the request body.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Retrieve the access key.
    #[inline]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Retrieve the secret key.
    #[inline]
    pub(crate) fn secret_key(&self) -> &str {
        &self.secret_key
    }

    /// A copy of this request carrying a different header set.
    pub(crate) fn with_headers(&self, headers: HeaderMap) -> Self {
        Self {
            headers,
            ..self.clone()
        }
    }

    /// The URI the request must be sent to: `{scheme}://{host}{path}?{query}`, with the query
    /// parameters in their original order and unencoded, matching what was signed.
    pub fn dispatch_uri(&self, config: &SigningConfig) -> Result<Uri, SigningError> {
        let mut uri = format!("{}://{}{}", config.scheme(), config.host(), self.path);
        if !self.query.is_empty() {
            uri.push('?');
            let pairs: Vec<String> = self.query.iter().map(|(key, value)| format!("{}={}", key, value)).collect();
            uri.push_str(&pairs.join("&"));
        }

        uri.parse::<Uri>().map_err(|e| SigningError::InvalidURIPath(format!("Invalid request URI '{}': {}", uri, e)))
    }

    /// Assemble the outbound [`Request`] from the headers returned by signing.
    ///
    /// The body is the same [`Bytes`] buffer that was hashed, so the dispatcher transmits exactly the
    /// signed bytes.
    pub fn to_http_request(
        &self,
        signed_headers: HeaderMap,
        config: &SigningConfig,
    ) -> Result<Request<Bytes>, SigningError> {
        let uri = self.dispatch_uri(config)?;
        let mut request = Request::builder()
            .method(self.method.clone())
            .uri(uri)
            .body(self.body.clone())
            .map_err(|e| SigningError::InvalidURIPath(format!("Unable to build request: {}", e)))?;
        *request.headers_mut() = signed_headers;
        Ok(request)
    }
}

impl Debug for SigningRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SigningRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl SigningRequestBuilder {
    /// Append a query parameter, preserving insertion order.
    pub fn query_param<K, V>(&mut self, key: K, value: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.query.get_or_insert_with(Vec::new).push((key.into(), value.into()));
        self
    }

    /// Append a header. Header names are case-insensitive and stored lower-cased.
    pub fn header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.get_or_insert_with(HeaderMap::new).append(name, value);
        self
    }
}
