//! Local verification of signed header sets.
//!
//! The remote service is the authority on whether a signature is valid, but its rejections carry
//! no detail. Verifying locally against the `x-date` that was actually sent catches scope and
//! timestamp mistakes before a request leaves the process.

use {
    crate::{
        chronoutil::parse_x_date, constants::*, signature::sign_request_details_at, CredentialScope, SigningConfig,
        SigningError, SigningRequest,
    },
    http::header::HeaderMap,
    lazy_static::lazy_static,
    log::{debug, trace},
    regex::Regex,
    std::str::{from_utf8, FromStr},
    subtle::ConstantTimeEq,
};

lazy_static! {
    /// Grammar of the `Authorization` parameters following the algorithm name.
    static ref AUTHORIZATION_PARAMS: Regex = Regex::new(
        r"(?x)^
        Credential=(?P<access_key>.+)/
        (?P<date>[0-9]{8})/
        (?P<region>[^/,\s]+)/
        (?P<service>[^/,\s]+)/
        request,\x20
        SignedHeaders=(?P<signed_headers>[^,\s]+),\x20
        Signature=(?P<signature>[0-9a-f]{64})$"
    )
    .unwrap();
}

/// The parsed components of an `Authorization` header value.
///
/// Access keys are opaque and may contain `/`, `,` or spaces, so the credential scope is matched
/// from the right. Region and service never contain these (see [`SigningConfig`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthorizationHeader {
    access_key: String,
    credential_scope: CredentialScope,
    signed_headers: String,
    signature: String,
}

impl AuthorizationHeader {
    /// Retrieve the access key from the credential.
    #[inline]
    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    /// Retrieve the credential scope.
    #[inline]
    pub fn credential_scope(&self) -> &CredentialScope {
        &self.credential_scope
    }

    /// Retrieve the signed-headers list.
    #[inline]
    pub fn signed_headers(&self) -> &str {
        &self.signed_headers
    }

    /// Retrieve the hex signature.
    #[inline]
    pub fn signature(&self) -> &str {
        &self.signature
    }
}

impl FromStr for AuthorizationHeader {
    type Err = SigningError;

    fn from_str(value: &str) -> Result<Self, SigningError> {
        let (algorithm, params) = value.split_once(' ').unwrap_or((value, ""));
        if algorithm != HMAC_SHA256 {
            return Err(SigningError::IncompleteSignature(format!("{}'{}'", MSG_UNSUPPORTED_ALGORITHM, algorithm)));
        }

        let cap = AUTHORIZATION_PARAMS.captures(params).ok_or_else(|| {
            SigningError::IncompleteSignature(format!("Malformed Authorization header: '{}'", value))
        })?;

        Ok(Self {
            access_key: cap["access_key"].to_string(),
            credential_scope: CredentialScope::new(&cap["date"], &cap["region"], &cap["service"]),
            signed_headers: cap["signed_headers"].to_string(),
            signature: cap["signature"].to_string(),
        })
    }
}

/// Verify that `signed_headers` (the output of signing `request`) carries a valid signature for its
/// own `x-date`.
///
/// The signature is recomputed from the request and the transmitted headers at the instant named by
/// `x-date`, so a signature made at any time verifies as long as the headers still match it.
///
/// # Errors
/// * [`SigningError::MissingRequiredHeader`] if `authorization`, `x-date` or `host` is absent.
/// * [`SigningError::MalformedHeader`] if one of them is repeated or cannot be parsed.
/// * [`SigningError::IncompleteSignature`] if the algorithm is unsupported or the credential scope
///   does not match the `x-date` date or the configured region and service.
/// * [`SigningError::SignatureDoesNotMatch`] if `host` differs from the configured host, or the
///   access key, signed-headers list, or signature differs from the recomputed value.
pub fn verify_signed_request(
    request: &SigningRequest,
    signed_headers: &HeaderMap,
    config: &SigningConfig,
) -> Result<(), SigningError> {
    let authorization = single_header(signed_headers, HDR_AUTHORIZATION, MSG_MISSING_AUTHORIZATION)?;
    let authorization = AuthorizationHeader::from_str(authorization)?;

    let x_date = single_header(signed_headers, HDR_X_DATE, MSG_MISSING_X_DATE)?;
    let time = parse_x_date(x_date)?;

    let scope = authorization.credential_scope();
    if scope.date_short() != time.date_short() {
        return Err(SigningError::IncompleteSignature(format!(
            "Credential date {} does not match x-date {}",
            scope.date_short(),
            time.iso_date()
        )));
    }

    if scope.region() != config.region() || scope.service() != config.service() {
        return Err(SigningError::IncompleteSignature(format!(
            "Credential should be scoped to {}/{}, not {}/{}",
            config.region(),
            config.service(),
            scope.region(),
            scope.service()
        )));
    }

    // Re-signing overwrites host and x-date, so the transmitted values are checked here.
    if time.iso_date() != x_date {
        return Err(SigningError::SignatureDoesNotMatch(Some(format!(
            "X-Date {} is not in canonical form {}",
            x_date,
            time.iso_date()
        ))));
    }

    let host = single_header(signed_headers, HDR_HOST, MSG_MISSING_HOST)?;
    if host != config.host() {
        return Err(SigningError::SignatureDoesNotMatch(Some(format!(
            "Host {} does not match the configured host {}",
            host,
            config.host()
        ))));
    }

    if authorization.access_key() != request.access_key() {
        return Err(SigningError::SignatureDoesNotMatch(Some(format!(
            "Credential access key {} does not match the request",
            authorization.access_key()
        ))));
    }

    let mut transmitted = signed_headers.clone();
    transmitted.remove(HDR_AUTHORIZATION);
    let expected = sign_request_details_at(&request.with_headers(transmitted), config, time.instant())?;

    if expected.signed_headers() != authorization.signed_headers() {
        trace!(
            "SignedHeaders mismatch: expected '{}', got '{}'",
            expected.signed_headers(),
            authorization.signed_headers()
        );
        return Err(SigningError::SignatureDoesNotMatch(Some(MSG_REQUEST_SIGNATURE_MISMATCH.to_string())));
    }

    let is_equal: bool = authorization.signature().as_bytes().ct_eq(expected.signature().as_bytes()).into();
    if !is_equal {
        trace!("Signature mismatch: expected '{}', got '{}'", expected.signature(), authorization.signature());
        return Err(SigningError::SignatureDoesNotMatch(Some(MSG_REQUEST_SIGNATURE_MISMATCH.to_string())));
    }

    debug!("Verified signature access_key={} scope={}", authorization.access_key(), scope);
    Ok(())
}

/// The single value of a required header. A repeated header is malformed since re-signing would
/// collapse it to one value.
fn single_header<'a>(headers: &'a HeaderMap, name: &str, missing: &str) -> Result<&'a str, SigningError> {
    let mut values = headers.get_all(name).iter();
    let value = values.next().ok_or_else(|| SigningError::MissingRequiredHeader(missing.to_string()))?;
    if values.next().is_some() {
        return Err(SigningError::MalformedHeader(format!("Multiple {} headers", name)));
    }

    from_utf8(value.as_bytes()).map_err(|e| SigningError::MalformedHeader(format!("Invalid {} header: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use {
        super::{verify_signed_request, AuthorizationHeader},
        crate::{sign_request_at, CredentialScope, SigningConfig, SigningError, SigningRequest},
        chrono::{DateTime, NaiveDate, Utc},
        http::{
            header::{HeaderValue, CONTENT_TYPE},
            method::Method,
        },
        std::str::FromStr,
    };

    macro_rules! expect_err {
        ($test:expr, $expected:ident) => {
            match $test {
                Ok(ref v) => panic!("Expected Err({}); got Ok({:?})", stringify!($expected), v),
                Err(ref e) => match e {
                    SigningError::$expected(..) => e.to_string(),
                    _ => panic!("Expected {}; got {:#?}: {}", stringify!($expected), &e, &e),
                },
            }
        };
    }

    fn instant() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc()
    }

    fn request() -> SigningRequest {
        request_with_access_key("AK")
    }

    fn request_with_access_key(access_key: &str) -> SigningRequest {
        SigningRequest::builder()
            .method(Method::POST)
            .query_param("Action", "CVProcess")
            .query_param("Version", "2022-08-31")
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(r#"{"req_key":"video_generation","task_id":"123"}"#)
            .access_key(access_key)
            .secret_key("SK")
            .build()
            .unwrap()
    }

    #[test_log::test]
    fn test_parse_authorization() {
        let auth = AuthorizationHeader::from_str(
            "HMAC-SHA256 Credential=AK/20240101/cn-north-1/cv/request, SignedHeaders=content-type;host;x-date, \
             Signature=d862b505a2f11f2b420189315d6649b38cb28d1fddb1f922551b2fd6f11f4d07",
        )
        .unwrap();
        assert_eq!(auth.access_key(), "AK");
        assert_eq!(auth.credential_scope(), &CredentialScope::new("20240101", "cn-north-1", "cv"));
        assert_eq!(auth.signed_headers(), "content-type;host;x-date");
        assert_eq!(auth.signature(), "d862b505a2f11f2b420189315d6649b38cb28d1fddb1f922551b2fd6f11f4d07");
    }

    #[test_log::test]
    fn test_parse_authorization_errors() {
        let e = expect_err!(
            AuthorizationHeader::from_str("AWS4-HMAC-SHA256 Credential=AK/20240101/us-east-1/s3/aws4_request"),
            IncompleteSignature
        );
        assert_eq!(e, "Unsupported 'algorithm': 'AWS4-HMAC-SHA256'");

        let e = expect_err!(AuthorizationHeader::from_str("HMAC-SHA256"), IncompleteSignature);
        assert_eq!(e, "Malformed Authorization header: 'HMAC-SHA256'");

        // Separators are significant: a missing space after the comma is rejected.
        expect_err!(
            AuthorizationHeader::from_str(
                "HMAC-SHA256 Credential=AK/20240101/cn-north-1/cv/request,SignedHeaders=host;x-date, \
                 Signature=d862b505a2f11f2b420189315d6649b38cb28d1fddb1f922551b2fd6f11f4d07"
            ),
            IncompleteSignature
        );

        // Signatures are lower-case hex.
        expect_err!(
            AuthorizationHeader::from_str(
                "HMAC-SHA256 Credential=AK/20240101/cn-north-1/cv/request, SignedHeaders=host;x-date, \
                 Signature=D862B505A2F11F2B420189315D6649B38CB28D1FDDB1F922551B2FD6F11F4D07"
            ),
            IncompleteSignature
        );
    }

    #[test_log::test]
    fn test_verify_round_trip() {
        let config = SigningConfig::default();
        let headers = sign_request_at(&request(), &config, instant()).unwrap();
        verify_signed_request(&request(), &headers, &config).unwrap();
    }

    #[test_log::test]
    fn test_verify_missing_headers() {
        let config = SigningConfig::default();
        let headers = sign_request_at(&request(), &config, instant()).unwrap();

        let mut no_auth = headers.clone();
        no_auth.remove("authorization");
        let e = expect_err!(verify_signed_request(&request(), &no_auth, &config), MissingRequiredHeader);
        assert_eq!(e, "Request is missing the Authorization header.");

        let mut no_date = headers.clone();
        no_date.remove("x-date");
        let e = expect_err!(verify_signed_request(&request(), &no_date, &config), MissingRequiredHeader);
        assert_eq!(e, "Request is missing the X-Date header.");

        let mut bad_date = headers;
        bad_date.insert("x-date", HeaderValue::from_static("2024-01-01"));
        expect_err!(verify_signed_request(&request(), &bad_date, &config), MalformedHeader);
    }

    #[test_log::test]
    fn test_verify_tampered() {
        let config = SigningConfig::default();
        let headers = sign_request_at(&request(), &config, instant()).unwrap();

        // x-date moved within the same day: scope still matches, signature does not.
        let mut moved = headers.clone();
        moved.insert("x-date", HeaderValue::from_static("20240101T000001Z"));
        let e = expect_err!(verify_signed_request(&request(), &moved, &config), SignatureDoesNotMatch);
        assert!(e.starts_with("The request signature we calculated does not match"));

        // x-date moved to another day: the credential scope no longer matches.
        let mut next_day = headers.clone();
        next_day.insert("x-date", HeaderValue::from_static("20240102T000000Z"));
        let e = expect_err!(verify_signed_request(&request(), &next_day, &config), IncompleteSignature);
        assert_eq!(e, "Credential date 20240101 does not match x-date 20240102T000000Z");

        // A header added after signing changes the signed-headers list.
        let mut extra = headers.clone();
        extra.insert("x-extra", HeaderValue::from_static("1"));
        expect_err!(verify_signed_request(&request(), &extra, &config), SignatureDoesNotMatch);

        // A different body.
        let other = SigningRequest::builder()
            .method(Method::POST)
            .query_param("Action", "CVProcess")
            .query_param("Version", "2022-08-31")
            .body(r#"{"req_key":"video_generation", "task_id":"123"}"#)
            .access_key("AK")
            .secret_key("SK")
            .build()
            .unwrap();
        expect_err!(verify_signed_request(&other, &headers, &config), SignatureDoesNotMatch);

        // The wrong secret.
        let wrong_secret = SigningRequest::builder()
            .method(Method::POST)
            .query_param("Action", "CVProcess")
            .query_param("Version", "2022-08-31")
            .body(r#"{"req_key":"video_generation","task_id":"123"}"#)
            .access_key("AK")
            .secret_key("SL")
            .build()
            .unwrap();
        expect_err!(verify_signed_request(&wrong_secret, &headers, &config), SignatureDoesNotMatch);

        // A different scope.
        let other_config = SigningConfig::builder().region("cn-beijing").build().unwrap();
        let e = expect_err!(verify_signed_request(&request(), &headers, &other_config), IncompleteSignature);
        assert_eq!(e, "Credential should be scoped to cn-beijing/cv, not cn-north-1/cv");
    }

    #[test_log::test]
    fn test_parse_authorization_opaque_access_key() {
        let auth = AuthorizationHeader::from_str(
            "HMAC-SHA256 Credential=AK/1, x/20240101/cn-north-1/cv/request, SignedHeaders=host;x-date, \
             Signature=d862b505a2f11f2b420189315d6649b38cb28d1fddb1f922551b2fd6f11f4d07",
        )
        .unwrap();
        assert_eq!(auth.access_key(), "AK/1, x");
        assert_eq!(auth.credential_scope(), &CredentialScope::new("20240101", "cn-north-1", "cv"));
        assert_eq!(auth.signed_headers(), "host;x-date");
    }

    #[test_log::test]
    fn test_verify_opaque_access_keys() {
        let config = SigningConfig::default();
        for access_key in ["AK/1", "A K", "AK,1", "AK/20240101/cn-north-1/cv/request", "密钥"] {
            let request = request_with_access_key(access_key);
            let headers = sign_request_at(&request, &config, instant()).unwrap();
            verify_signed_request(&request, &headers, &config).unwrap();

            let wrong = request_with_access_key("AK");
            expect_err!(verify_signed_request(&wrong, &headers, &config), SignatureDoesNotMatch);
        }
    }

    #[test_log::test]
    fn test_verify_transmitted_host() {
        let config = SigningConfig::default();
        let headers = sign_request_at(&request(), &config, instant()).unwrap();

        let mut moved = headers.clone();
        moved.insert("host", HeaderValue::from_static("evil.example.com"));
        let e = expect_err!(verify_signed_request(&request(), &moved, &config), SignatureDoesNotMatch);
        assert_eq!(e, "Host evil.example.com does not match the configured host visual.volcengineapi.com");

        let mut repeated = headers.clone();
        repeated.append("host", HeaderValue::from_static("visual.volcengineapi.com"));
        let e = expect_err!(verify_signed_request(&request(), &repeated, &config), MalformedHeader);
        assert_eq!(e, "Multiple host headers");

        let mut missing = headers;
        missing.remove("host");
        let e = expect_err!(verify_signed_request(&request(), &missing, &config), MissingRequiredHeader);
        assert_eq!(e, "Request is missing the Host header.");
    }
}
