#![no_main]
use {
    arbitrary::Arbitrary,
    chrono::{DateTime, Utc},
    http::{
        header::{HeaderName, HeaderValue},
        Method,
    },
    libfuzzer_sys::{fuzz_target, Corpus},
    volcengine_signature::{
        sign_request_at, verify_signed_request, AuthorizationHeader, SigningConfig, SigningError, SigningRequest,
    },
};

#[derive(Arbitrary, Debug)]
enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Patch => Method::PATCH,
        }
    }
}

#[derive(Arbitrary, Debug)]
struct SignInput {
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, Vec<u8>)>,
    body: Vec<u8>,
    access_key: String,
    secret_key: String,
    region: String,
    service: String,
    timestamp: u32,
    authorization: String,
}

fuzz_target!(|data: SignInput| -> Corpus {
    // The parser must never panic on arbitrary input.
    let _ = data.authorization.parse::<AuthorizationHeader>();

    match run_target(data) {
        Ok(()) => Corpus::Keep,
        Err(_) => Corpus::Reject,
    }
});

fn run_target(data: SignInput) -> Result<(), SigningError> {
    let config = match SigningConfig::builder().region(data.region).service(data.service).build() {
        Ok(config) => config,
        Err(e) => return Err(SigningError::InvalidCredential(e.to_string())),
    };

    let mut builder = SigningRequest::builder();
    builder
        .method(Method::from(data.method))
        .path(data.path)
        .query(data.query)
        .body(data.body)
        .access_key(data.access_key)
        .secret_key(data.secret_key);
    for (name, value) in data.headers {
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_bytes(&value)) {
            builder.header(name, value);
        }
    }
    let request = builder.build().map_err(|e| SigningError::InvalidCredential(e.to_string()))?;

    let timestamp = DateTime::<Utc>::from_timestamp(i64::from(data.timestamp), 0)
        .ok_or_else(|| SigningError::ClockUnavailable("out of range".to_string()))?;

    // Anything that signs successfully must verify against its own headers.
    let headers = sign_request_at(&request, &config, timestamp)?;
    if let Err(e) = verify_signed_request(&request, &headers, &config) {
        panic!("Signed request failed verification: {:?}: {}", request, e);
    }
    Ok(())
}
