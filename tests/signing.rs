use {
    chrono::{DateTime, NaiveDate, Utc},
    http::{
        header::{HeaderMap, HeaderName, HeaderValue},
        method::Method,
    },
    scratchstack_errors::ServiceError,
    volcengine_signature::{
        sign_request_at, sign_request_details_at, verify_signed_request, FixedClock, RequestSigner, SigningConfig,
        SigningError, SigningRequest,
    },
};

const BODY: &str = r#"{"req_key":"video_generation","task_id":"123"}"#;

fn instant(ss: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, ss).unwrap().and_utc()
}

fn build(query: &[(&str, &str)], headers: &[(&str, &str)], body: &str) -> SigningRequest {
    let mut builder = SigningRequest::builder();
    builder.method(Method::POST).body(body.to_string()).access_key("AK").secret_key("SK");
    for (key, value) in query {
        builder.query_param(*key, *value);
    }
    for (name, value) in headers {
        builder.header(HeaderName::from_bytes(name.as_bytes()).unwrap(), HeaderValue::from_str(value).unwrap());
    }
    builder.build().unwrap()
}

fn golden_request() -> SigningRequest {
    build(&[("Action", "CVProcess"), ("Version", "2022-08-31")], &[("Content-Type", "application/json")], BODY)
}

fn authorization(headers: &HeaderMap) -> &str {
    headers.get("authorization").unwrap().to_str().unwrap()
}

fn signature(headers: &HeaderMap) -> &str {
    authorization(headers).rsplit_once("Signature=").unwrap().1
}

#[test_log::test]
fn golden_authorization() {
    let headers = sign_request_at(&golden_request(), &SigningConfig::default(), instant(0)).unwrap();
    assert_eq!(
        authorization(&headers),
        "HMAC-SHA256 Credential=AK/20240101/cn-north-1/cv/request, SignedHeaders=content-type;host;x-date, \
         Signature=d862b505a2f11f2b420189315d6649b38cb28d1fddb1f922551b2fd6f11f4d07"
    );
    assert_eq!(headers.get("x-date").unwrap(), "20240101T000000Z");
    assert_eq!(headers.get("host").unwrap(), "visual.volcengineapi.com");
}

#[test_log::test]
fn golden_one_second_later() {
    let details = sign_request_details_at(&golden_request(), &SigningConfig::default(), instant(1)).unwrap();
    assert_eq!(
        details.string_to_sign(),
        "HMAC-SHA256\n20240101T000001Z\n20240101/cn-north-1/cv/request\n\
         4d346dbb0e7e59fca46a7e9e94f8d6bdeaaab343657474df77da8890964892d8"
    );
    assert_eq!(details.signature(), "bc45bc86b74e77685abae7a181fb1bc79b301bc0afcba65e027b76f98d490e53");
}

#[test_log::test]
fn insertion_order_does_not_matter() {
    let config = SigningConfig::default();
    let expected = sign_request_at(&golden_request(), &config, instant(0)).unwrap();

    let permuted =
        build(&[("Version", "2022-08-31"), ("Action", "CVProcess")], &[("content-type", "application/json")], BODY);
    let headers = sign_request_at(&permuted, &config, instant(0)).unwrap();
    assert_eq!(authorization(&headers), authorization(&expected));

    // The dispatch URI keeps the caller's order even though the signature does not depend on it.
    assert_eq!(
        permuted.dispatch_uri(&config).unwrap().to_string(),
        "https://visual.volcengineapi.com/?Version=2022-08-31&Action=CVProcess"
    );
}

#[test_log::test]
fn signing_is_deterministic() {
    let config = SigningConfig::default();
    let first = sign_request_at(&golden_request(), &config, instant(0)).unwrap();
    for _ in 0..4 {
        assert_eq!(sign_request_at(&golden_request(), &config, instant(0)).unwrap(), first);
    }
}

#[test_log::test]
fn different_instants_verify_independently() {
    let config = SigningConfig::default();
    let at_zero = sign_request_at(&golden_request(), &config, instant(0)).unwrap();
    let at_one = sign_request_at(&golden_request(), &config, instant(1)).unwrap();

    assert_ne!(signature(&at_zero), signature(&at_one));
    assert_eq!(signature(&at_one), "bc45bc86b74e77685abae7a181fb1bc79b301bc0afcba65e027b76f98d490e53");

    verify_signed_request(&golden_request(), &at_zero, &config).unwrap();
    verify_signed_request(&golden_request(), &at_one, &config).unwrap();
}

#[test_log::test]
fn sub_second_precision_is_discarded() {
    let config = SigningConfig::default();
    let whole = sign_request_at(&golden_request(), &config, instant(0)).unwrap();
    let fractional = sign_request_at(
        &golden_request(),
        &config,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_milli_opt(0, 0, 0, 999).unwrap().and_utc(),
    )
    .unwrap();
    assert_eq!(whole, fractional);
}

#[test_log::test]
fn tampered_body_fails_verification() {
    let config = SigningConfig::default();
    let headers = sign_request_at(&golden_request(), &config, instant(0)).unwrap();

    let tampered = build(
        &[("Action", "CVProcess"), ("Version", "2022-08-31")],
        &[("Content-Type", "application/json")],
        r#"{"req_key":"video_generation","task_id":"124"}"#,
    );
    let e = verify_signed_request(&tampered, &headers, &config).unwrap_err();
    assert!(matches!(e, SigningError::SignatureDoesNotMatch(_)));
    assert_eq!(e.error_code(), "SignatureDoesNotMatch");
    assert_eq!(e.http_status(), 403);
}

#[test_log::test]
fn caller_headers_are_not_mutated() {
    let request = build(
        &[("Action", "CVProcess")],
        &[("content-type", "application/json"), ("host", "example.com"), ("authorization", "stale")],
        BODY,
    );
    let before = request.headers().clone();

    let headers = sign_request_at(&request, &SigningConfig::default(), instant(0)).unwrap();
    assert_eq!(request.headers(), &before);
    assert_eq!(headers.get("host").unwrap(), "visual.volcengineapi.com");
    assert!(authorization(&headers).starts_with("HMAC-SHA256 Credential=AK/20240101/cn-north-1/cv/request, "));
}

#[test_log::test]
fn body_bytes_are_hashed_verbatim() {
    let config = SigningConfig::default();
    let compact = sign_request_at(&golden_request(), &config, instant(0)).unwrap();

    // Semantically equal JSON with different whitespace is a different payload.
    let spaced = build(
        &[("Action", "CVProcess"), ("Version", "2022-08-31")],
        &[("Content-Type", "application/json")],
        r#"{"req_key": "video_generation", "task_id": "123"}"#,
    );
    let spaced = sign_request_at(&spaced, &config, instant(0)).unwrap();
    assert_ne!(signature(&compact), signature(&spaced));
}

#[test_log::test]
fn empty_body_and_query() {
    let request = build(&[], &[], "");
    let details = sign_request_details_at(&request, &SigningConfig::default(), instant(0)).unwrap();
    let canonical = String::from_utf8(details.canonical_request().to_vec()).unwrap();
    assert_eq!(
        canonical,
        "POST\n/\n\nhost:visual.volcengineapi.com\nx-date:20240101T000000Z\n\nhost;x-date\n\
         e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
    assert_eq!(details.signed_headers(), "host;x-date");
}

#[test_log::test]
fn request_signer_with_fixed_clock() {
    let signer = RequestSigner::with_clock(SigningConfig::default(), FixedClock(instant(1)));
    let headers = signer.sign(&golden_request()).unwrap();
    assert_eq!(headers.get("x-date").unwrap(), "20240101T000001Z");
    assert_eq!(signature(&headers), "bc45bc86b74e77685abae7a181fb1bc79b301bc0afcba65e027b76f98d490e53");
}

#[test_log::test]
fn system_clock_signature_verifies() {
    let config = SigningConfig::default();
    let signer = RequestSigner::new(config.clone());
    let headers = signer.sign(&golden_request()).unwrap();
    assert_eq!(headers.get("x-date").unwrap().len(), 16);
    verify_signed_request(&golden_request(), &headers, &config).unwrap();
}

#[test_log::test]
fn to_http_request_shares_body() {
    let config = SigningConfig::default();
    let request = golden_request();
    let headers = sign_request_at(&request, &config, instant(0)).unwrap();

    let http_request = request.to_http_request(headers.clone(), &config).unwrap();
    assert_eq!(http_request.method(), &Method::POST);
    assert_eq!(http_request.uri().to_string(), "https://visual.volcengineapi.com/?Action=CVProcess&Version=2022-08-31");
    assert_eq!(http_request.headers(), &headers);
    assert_eq!(http_request.body().as_ptr(), request.body().as_ptr());
    assert_eq!(http_request.body().as_ref(), BODY.as_bytes());
}

#[test_log::test]
fn rewritten_host_fails_verification() {
    let config = SigningConfig::default();
    let mut headers = sign_request_at(&golden_request(), &config, instant(0)).unwrap();
    headers.insert("host", HeaderValue::from_static("evil.example.com"));

    let e = verify_signed_request(&golden_request(), &headers, &config).unwrap_err();
    assert!(matches!(e, SigningError::SignatureDoesNotMatch(_)));
}

#[test_log::test]
fn opaque_access_keys_verify() {
    let config = SigningConfig::default();
    for access_key in ["AK/1", "A K", "AK,1"] {
        let mut builder = SigningRequest::builder();
        builder.method(Method::POST).body(BODY).access_key(access_key).secret_key("SK");
        let request = builder.build().unwrap();

        let headers = sign_request_at(&request, &config, instant(0)).unwrap();
        assert!(authorization(&headers).starts_with(&format!("HMAC-SHA256 Credential={}/20240101/", access_key)));
        verify_signed_request(&request, &headers, &config).unwrap();
    }
}
