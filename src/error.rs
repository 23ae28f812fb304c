use {
    crate::constants::*,
    http::status::StatusCode,
    scratchstack_errors::ServiceError,
    std::{
        error::Error,
        fmt::{Display, Formatter, Result as FmtResult},
    },
};

/// Error returned when an attempt at signing or locally verifying a request fails.
#[derive(Debug)]
#[non_exhaustive]
pub enum SigningError {
    /// The system clock could not provide the signing instant (e.g. it reports a time before the
    /// Unix epoch). There is no fallback.
    ClockUnavailable(/* message */ String),

    /// The signature header does not conform to the expected format. Sample messages:
    /// `Unsupported 'algorithm': 'AWS4-HMAC-SHA256'`
    /// `Credential date 20240102 does not match x-date 20240101T000000Z`
    IncompleteSignature(/* message */ String),

    /// The access key or secret key is empty. Checked before any hashing is performed so that an
    /// empty key never produces a well-formed but meaningless signature.
    InvalidCredential(/* message */ String),

    /// The dispatch URI could not be built from the host, path, and query parameters.
    InvalidURIPath(/* message */ String),

    /// A header was malformed -- the value cannot be represented as an HTTP header value (e.g. the
    /// configured host contains a newline), or the value could not be parsed (e.g., the `x-date`
    /// header is not a valid timestamp).
    MalformedHeader(/* message */ String),

    /// The signed request is missing a header required for verification.
    MissingRequiredHeader(/* message */ String),

    /// Signature did not match the calculated signature value.
    SignatureDoesNotMatch(Option</* message */ String>),
}

impl SigningError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ClockUnavailable(_) => ERR_CODE_INTERNAL_FAILURE,
            Self::IncompleteSignature(_) => ERR_CODE_INCOMPLETE_SIGNATURE,
            Self::InvalidCredential(_) => ERR_CODE_INVALID_CREDENTIAL,
            Self::InvalidURIPath(_) => ERR_CODE_INVALID_URI_PATH,
            Self::MalformedHeader(_) => ERR_CODE_MALFORMED_HEADER,
            Self::MissingRequiredHeader(_) => ERR_CODE_MISSING_REQUIRED_HEADER,
            Self::SignatureDoesNotMatch(_) => ERR_CODE_SIGNATURE_DOES_NOT_MATCH,
        }
    }

    fn http_status(&self) -> StatusCode {
        match self {
            Self::IncompleteSignature(_)
            | Self::InvalidCredential(_)
            | Self::InvalidURIPath(_)
            | Self::MalformedHeader(_)
            | Self::MissingRequiredHeader(_) => StatusCode::BAD_REQUEST,
            Self::ClockUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SignatureDoesNotMatch(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl ServiceError for SigningError {
    fn error_code(&self) -> &'static str {
        SigningError::error_code(self)
    }

    fn http_status(&self) -> StatusCode {
        SigningError::http_status(self)
    }
}

impl Display for SigningError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Self::ClockUnavailable(msg) => f.write_str(msg),
            Self::IncompleteSignature(msg) => f.write_str(msg),
            Self::InvalidCredential(msg) => f.write_str(msg),
            Self::InvalidURIPath(msg) => f.write_str(msg),
            Self::MalformedHeader(msg) => f.write_str(msg),
            Self::MissingRequiredHeader(msg) => f.write_str(msg),
            Self::SignatureDoesNotMatch(msg) => {
                if let Some(msg) = msg {
                    f.write_str(msg)
                } else {
                    Ok(())
                }
            }
        }
    }
}

impl Error for SigningError {}
