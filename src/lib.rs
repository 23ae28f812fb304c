//! The `volcengine_signature` crate signs outbound HTTP requests for the Volcengine OpenAPI family
//! (the visual/CV API by default) using its HMAC-SHA256 scheme.
//!
//! The scheme is shaped like AWS SigV4 but is not compatible with it: the algorithm name is
//! `HMAC-SHA256`, the timestamp travels in `X-Date`, the credential scope ends in `request`, the
//! secret key is used without a prefix, and query parameters are not URL-encoded before signing.
//! Libraries that implement SigV4 will produce signatures the service rejects.
//!
//! # Workflow
//! 1. Build a [`SigningConfig`] (or use the default, which targets `cn-north-1`/`cv` at
//!    `visual.volcengineapi.com`).
//! 2. Build a [`SigningRequest`] holding the method, path, query parameters, headers, body bytes, and
//!    credentials.
//! 3. Call [`sign_request`] (or [`RequestSigner::sign`]) to obtain the complete header set, including
//!    `X-Date`, `Host`, and `Authorization`.
//! 4. Send the body bytes that were signed, e.g. via [`SigningRequest::to_http_request`].
//!
//! ## Example
//! ```rust
//! use chrono::{DateTime, NaiveDate, Utc};
//! use http::{header::{HeaderValue, CONTENT_TYPE}, Method};
//! use volcengine_signature::{sign_request_at, verify_signed_request, SigningConfig, SigningRequest};
//!
//! // Signing is pinned to a fixed instant here; normally you would call `sign_request`.
//! let timestamp: DateTime<Utc> =
//!     NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap().and_utc();
//!
//! let request = SigningRequest::builder()
//!     .method(Method::POST)
//!     .query_param("Action", "CVProcess")
//!     .query_param("Version", "2022-08-31")
//!     .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
//!     .body(r#"{"req_key":"video_generation","task_id":"123"}"#)
//!     .access_key("AK")
//!     .secret_key("SK")
//!     .build()
//!     .unwrap();
//! let config = SigningConfig::default();
//!
//! let headers = sign_request_at(&request, &config, timestamp).unwrap();
//! assert_eq!(headers.get("x-date").unwrap(), "20240101T000000Z");
//! assert_eq!(
//!     headers.get("authorization").unwrap(),
//!     "HMAC-SHA256 Credential=AK/20240101/cn-north-1/cv/request, \
//!      SignedHeaders=content-type;host;x-date, \
//!      Signature=d862b505a2f11f2b420189315d6649b38cb28d1fddb1f922551b2fd6f11f4d07"
//! );
//!
//! verify_signed_request(&request, &headers, &config).unwrap();
//!
//! let http_request = request.to_http_request(headers, &config).unwrap();
//! assert_eq!(
//!     http_request.uri().to_string(),
//!     "https://visual.volcengineapi.com/?Action=CVProcess&Version=2022-08-31"
//! );
//! ```
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod canonical;
mod chronoutil;
mod config;
mod constants;
mod crypto;
mod error;
mod request;
mod signature;
mod signing_key;
mod verify;

pub use crate::{
    chronoutil::{parse_x_date, Clock, FixedClock, SystemClock, TimeContext},
    config::{SigningConfig, SigningConfigBuilder, SigningConfigBuilderError},
    constants::{DEFAULT_HOST, DEFAULT_REGION, DEFAULT_SCHEME, DEFAULT_SERVICE, HMAC_SHA256, REQUEST_TERMINATOR},
    error::SigningError,
    request::{SigningRequest, SigningRequestBuilder, SigningRequestBuilderError},
    signature::{sign_request, sign_request_at, sign_request_details_at, RequestSigner, SignatureDetails},
    signing_key::{CredentialScope, KDateKey, KRegionKey, KSecretKey, KServiceKey, KSigningKey, SigningKeyChain},
    verify::{verify_signed_request, AuthorizationHeader},
};

#[cfg(feature = "unstable")]
pub use crate::signature::{authorization_header, compute_signature, string_to_sign};
