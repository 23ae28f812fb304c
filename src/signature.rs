use {
    crate::{
        canonical::{
            canonical_query_string, canonical_request, canonicalize_headers, inject_signing_headers, payload_hash,
        },
        chronoutil::{Clock, SystemClock, TimeContext},
        constants::*,
        crypto::{hmac_sha256, sha256_hex},
        signing_key::{CredentialScope, KSecretKey, KSigningKey, SigningKeyChain},
        SigningConfig, SigningError, SigningRequest,
    },
    chrono::{DateTime, Utc},
    http::header::{HeaderMap, HeaderValue},
    log::{debug, trace},
    qualifier_attr::qualifiers,
    std::str::FromStr,
};

/// Step 7: the string to sign.
///
/// ```text
/// HMAC-SHA256\n{iso_date}\n{credential scope}\n{hex(SHA-256(canonical request))}
/// ```
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn string_to_sign(algorithm: &str, time: &TimeContext, scope: &CredentialScope, canonical_request: &[u8]) -> String {
    let scope = scope.to_string();
    let mut result =
        String::with_capacity(algorithm.len() + 1 + ISO8601_UTC_LENGTH + 1 + scope.len() + 1 + SHA256_HEX_LENGTH);

    result.push_str(algorithm);
    result.push('\n');
    result.push_str(time.iso_date());
    result.push('\n');
    result.push_str(&scope);
    result.push('\n');
    result.push_str(&sha256_hex(canonical_request));
    result
}

/// Step 9: the hex-encoded HMAC-SHA256 of the string to sign, keyed by `kSigning`.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn compute_signature(signing_key: &KSigningKey, string_to_sign: &str) -> String {
    hex::encode(hmac_sha256(signing_key.as_ref(), string_to_sign.as_bytes()))
}

/// Step 10: the `Authorization` header value.
///
/// The format is fixed by the remote verifier: field names, their order, and the `", "`
/// separators are all significant.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn authorization_header(
    algorithm: &str,
    access_key: &str,
    scope: &CredentialScope,
    signed_headers: &str,
    signature: &str,
) -> String {
    format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        algorithm, access_key, scope, signed_headers, signature
    )
}

/// Intermediate values from signing a request, exposed for debugging signature mismatches.
///
/// A rejected signature gives no hint about which step diverged; comparing these values against
/// the remote service's documentation or another implementation usually does.
#[derive(Clone, Debug)]
pub struct SignatureDetails {
    time: TimeContext,
    credential_scope: CredentialScope,
    canonical_request: Vec<u8>,
    string_to_sign: String,
    signed_headers: String,
    signature: String,
    headers: HeaderMap,
}

impl SignatureDetails {
    /// The captured signing time.
    #[inline]
    pub fn time(&self) -> &TimeContext {
        &self.time
    }

    /// The credential scope.
    #[inline]
    pub fn credential_scope(&self) -> &CredentialScope {
        &self.credential_scope
    }

    /// The canonical request bytes.
    #[inline]
    pub fn canonical_request(&self) -> &[u8] {
        &self.canonical_request
    }

    /// The string to sign.
    #[inline]
    pub fn string_to_sign(&self) -> &str {
        &self.string_to_sign
    }

    /// The signed-headers list, as used in both the canonical request and `Authorization`.
    #[inline]
    pub fn signed_headers(&self) -> &str {
        &self.signed_headers
    }

    /// The hex signature.
    #[inline]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// The completed header set.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Consume the details, returning the completed header set.
    #[inline]
    pub fn into_headers(self) -> HeaderMap {
        self.headers
    }
}

/// Sign a request at the given instant, returning every intermediate value.
///
/// # Errors
/// Returns [`SigningError::InvalidCredential`] if the access key or secret key is empty (checked
/// before anything is hashed), or [`SigningError::MalformedHeader`] if the host or access key cannot
/// be carried in an HTTP header.
pub fn sign_request_details_at(
    request: &SigningRequest,
    config: &SigningConfig,
    timestamp: DateTime<Utc>,
) -> Result<SignatureDetails, SigningError> {
    if request.access_key().is_empty() {
        return Err(SigningError::InvalidCredential(MSG_EMPTY_ACCESS_KEY.to_string()));
    }
    let secret = KSecretKey::from_str(request.secret_key())?;

    // Step 1: both renderings of the timestamp come from this one instant.
    let time = TimeContext::new(timestamp);
    let credential_scope = CredentialScope::for_request(&time, config);

    let mut headers = inject_signing_headers(request.headers(), &time, config.host())?;
    let canonical_query = canonical_query_string(request.query());
    let canonical_headers = canonicalize_headers(&headers);
    let payload_hash = payload_hash(request.body());
    let canonical_request =
        canonical_request(request.method(), request.path(), &canonical_query, &canonical_headers, &payload_hash);

    let string_to_sign = string_to_sign(config.algorithm(), &time, &credential_scope, &canonical_request);
    trace!("String to sign:\n{}", string_to_sign);

    let chain = SigningKeyChain::derive(&secret, &credential_scope);
    let signature = compute_signature(chain.k_signing(), &string_to_sign);

    let signed_headers = canonical_headers.signed_headers().to_string();
    let authorization =
        authorization_header(config.algorithm(), request.access_key(), &credential_scope, &signed_headers, &signature);
    let authorization = HeaderValue::from_str(&authorization)
        .map_err(|e| SigningError::MalformedHeader(format!("Invalid authorization value: {}", e)))?;
    headers.insert(HDR_AUTHORIZATION, authorization);

    debug!(
        "Signed {} {} access_key={} scope={} signed_headers={}",
        request.method(),
        request.path(),
        request.access_key(),
        credential_scope,
        signed_headers
    );

    Ok(SignatureDetails {
        time,
        credential_scope,
        canonical_request,
        string_to_sign,
        signed_headers,
        signature,
        headers,
    })
}

/// Sign a request at the given instant.
///
/// This is a pure function of its arguments: the same request, configuration, and instant always
/// produce byte-identical headers. The returned map holds the caller's headers plus `x-date`,
/// `host`, and `authorization`; the request itself is not modified.
///
/// # Errors
/// See [`sign_request_details_at`].
pub fn sign_request_at(
    request: &SigningRequest,
    config: &SigningConfig,
    timestamp: DateTime<Utc>,
) -> Result<HeaderMap, SigningError> {
    sign_request_details_at(request, config, timestamp).map(SignatureDetails::into_headers)
}

/// Sign a request at the current system time.
///
/// # Errors
/// In addition to the errors from [`sign_request_at`], returns [`SigningError::ClockUnavailable`]
/// if the system clock cannot be read.
pub fn sign_request(request: &SigningRequest, config: &SigningConfig) -> Result<HeaderMap, SigningError> {
    sign_request_at(request, config, SystemClock.now()?)
}

/// A signer bound to a configuration and a clock.
///
/// The signer holds no per-request state and may be shared across threads when its clock can be.
#[derive(Clone, Debug, Default)]
pub struct RequestSigner<C = SystemClock> {
    config: SigningConfig,
    clock: C,
}

impl RequestSigner<SystemClock> {
    /// Create a signer that reads the system clock.
    pub fn new(config: SigningConfig) -> Self {
        Self {
            config,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> RequestSigner<C> {
    /// Create a signer with an explicit clock.
    pub fn with_clock(config: SigningConfig, clock: C) -> Self {
        Self {
            config,
            clock,
        }
    }

    /// Retrieve the signing configuration.
    #[inline]
    pub fn config(&self) -> &SigningConfig {
        &self.config
    }

    /// Sign a request, reading the clock exactly once.
    pub fn sign(&self, request: &SigningRequest) -> Result<HeaderMap, SigningError> {
        sign_request_at(request, &self.config, self.clock.now()?)
    }

    /// Sign a request, returning every intermediate value.
    pub fn sign_with_details(&self, request: &SigningRequest) -> Result<SignatureDetails, SigningError> {
        sign_request_details_at(request, &self.config, self.clock.now()?)
    }
}
