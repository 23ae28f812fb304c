//! Common constants used throughout the crate.
//!
//! This was consolidated here so the entire crate is on the same page about these constant values.
//! If a value is spelled incorrectly, at least it can be fixed in one spot.
//!
//! Tests that are testing the content of an error code, header, or golden signature should not use
//! these constants; they should use hard-coded strings so the tests are also testing for
//! misspellings.
//!
//! Please keep this file organized alphabetically.

/// Default host of the Volcengine visual API.
pub const DEFAULT_HOST: &str = "visual.volcengineapi.com";

/// Default region for the visual API.
pub const DEFAULT_REGION: &str = "cn-north-1";

/// Default URI scheme used when building the dispatch URI.
pub const DEFAULT_SCHEME: &str = "https";

/// Default service name for the visual API.
pub const DEFAULT_SERVICE: &str = "cv";

/// Error code: InternalFailure
pub(crate) const ERR_CODE_INTERNAL_FAILURE: &str = "InternalFailure";

/// Error code: IncompleteSignature
pub(crate) const ERR_CODE_INCOMPLETE_SIGNATURE: &str = "IncompleteSignature";

/// Error code: InvalidCredential
pub(crate) const ERR_CODE_INVALID_CREDENTIAL: &str = "InvalidCredential";

/// Error code: InvalidURIPath
pub(crate) const ERR_CODE_INVALID_URI_PATH: &str = "InvalidURIPath";

/// Error code: MalformedHeader
pub(crate) const ERR_CODE_MALFORMED_HEADER: &str = "MalformedHeader";

/// Error code: MissingRequiredHeader
pub(crate) const ERR_CODE_MISSING_REQUIRED_HEADER: &str = "MissingRequiredHeader";

/// Error code: SignatureDoesNotMatch
pub(crate) const ERR_CODE_SIGNATURE_DOES_NOT_MATCH: &str = "SignatureDoesNotMatch";

/// Header for `authorization`
pub(crate) const HDR_AUTHORIZATION: &str = "authorization";

/// Header for `host`
pub(crate) const HDR_HOST: &str = "host";

/// Header for delivering the request timestamp
pub(crate) const HDR_X_DATE: &str = "x-date";

/// Signing algorithm name, used as the string-to-sign prefix and the `Authorization` scheme.
pub const HMAC_SHA256: &str = "HMAC-SHA256";

/// Compact ISO8601 format used for the `x-date` header and the string to sign.
pub(crate) const ISO8601_COMPACT_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Short date format used in the credential scope.
pub(crate) const ISO8601_DATE_FORMAT: &str = "%Y%m%d";

/// Length of an ISO8601 date string in the UTC time zone.
pub(crate) const ISO8601_UTC_LENGTH: usize = 16;

/// Error message: `"Access key must not be empty."`
pub(crate) const MSG_EMPTY_ACCESS_KEY: &str = "Access key must not be empty.";

/// Error message: `"Secret key must not be empty."`
pub(crate) const MSG_EMPTY_SECRET_KEY: &str = "Secret key must not be empty.";

/// Error message: `"Request is missing the Authorization header."`
pub(crate) const MSG_MISSING_AUTHORIZATION: &str = "Request is missing the Authorization header.";

/// Error message: `"Request is missing the Host header."`
pub(crate) const MSG_MISSING_HOST: &str = "Request is missing the Host header.";

/// Error message: `"Request is missing the X-Date header."`
pub(crate) const MSG_MISSING_X_DATE: &str = "Request is missing the X-Date header.";

/// Error message: `"The request signature we calculated does not match the signature you provided."`
pub(crate) const MSG_REQUEST_SIGNATURE_MISMATCH: &str = "The request signature we calculated does not match the \
    signature you provided. Check your Secret Access Key and signing method.";

/// Error message: `"Unsupported 'algorithm': "`
pub(crate) const MSG_UNSUPPORTED_ALGORITHM: &str = "Unsupported 'algorithm': ";

/// String included at the end of the credential scope and used to derive `kSigning`.
pub const REQUEST_TERMINATOR: &str = "request";

/// SHA-256 of an empty string.
pub(crate) const SHA256_EMPTY: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Length of a SHA-256 hex string.
pub(crate) const SHA256_HEX_LENGTH: usize = SHA256_EMPTY.len();

/// The length of a SHA-256 digest in bytes.
pub(crate) const SHA256_OUTPUT_LEN: usize = 32;
