//! Canonicalization functionality for request signing.
//!
//! Each step of building the canonical request is a separate function so it can be tested against
//! known vectors on its own; a mismatch anywhere only shows up as a rejection from the remote
//! service, which says nothing about which step diverged.
//!
//! **Stability of this module is not guaranteed except for items exposed at the crate root**.
//! The functions and types are subject to change in minor/patch versions. This is exposed for
//! testing purposes only.

use {
    crate::{chronoutil::TimeContext, constants::*, crypto::sha256_hex, SigningError},
    http::{
        header::{HeaderMap, HeaderValue},
        method::Method,
    },
    log::trace,
    qualifier_attr::qualifiers,
    std::{
        collections::BTreeMap,
        fmt::{Debug, Formatter, Result as FmtResult},
    },
};

/// The canonical header block and the matching signed-headers list.
///
/// Both are produced by a single pass over the same sorted header names, so the list embedded in
/// the canonical request and the one sent in `Authorization` cannot diverge.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[derive(Clone, PartialEq, Eq)]
struct CanonicalHeaders {
    /// `"{name}:{trimmed-value}\n"` for each header, sorted by lower-cased name.
    block: Vec<u8>,

    /// The lower-cased header names joined by `;`, in the same order.
    signed_headers: String,
}

impl CanonicalHeaders {
    /// Retrieve the canonical header block. Header values are raw bytes and may not be UTF-8.
    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    #[inline(always)]
    fn block(&self) -> &[u8] {
        &self.block
    }

    /// Retrieve the signed-headers list.
    #[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
    #[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
    #[inline(always)]
    fn signed_headers(&self) -> &str {
        &self.signed_headers
    }
}

impl Debug for CanonicalHeaders {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CanonicalHeaders")
            .field("block", &String::from_utf8_lossy(&self.block))
            .field("signed_headers", &self.signed_headers)
            .finish()
    }
}

/// Step 2: build the working header set.
///
/// Returns a copy of `headers` with `x-date` and `host` inserted (overwriting any caller values).
/// A caller-supplied `authorization` header is dropped since it is replaced after signing. The
/// caller's map is not modified.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn inject_signing_headers(headers: &HeaderMap, time: &TimeContext, host: &str) -> Result<HeaderMap, SigningError> {
    let x_date = HeaderValue::from_str(time.iso_date())
        .map_err(|e| SigningError::MalformedHeader(format!("Invalid x-date value '{}': {}", time.iso_date(), e)))?;
    let host = HeaderValue::from_str(host)
        .map_err(|e| SigningError::MalformedHeader(format!("Invalid host value '{}': {}", host.escape_debug(), e)))?;

    let mut result = headers.clone();
    if result.remove(HDR_AUTHORIZATION).is_some() {
        trace!("Dropping caller-supplied authorization header");
    }
    result.insert(HDR_X_DATE, x_date);
    result.insert(HDR_HOST, host);
    Ok(result)
}

/// Step 3: build the canonical query string.
///
/// Parameters are sorted by key in byte order (ties broken by value) and joined as `key=value`
/// pairs separated by `&`. No URL-encoding is applied; keys and values are used exactly as given.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn canonical_query_string(query: &[(String, String)]) -> String {
    let mut pairs: Vec<(&str, &str)> = query.iter().map(|(key, value)| (key.as_str(), value.as_str())).collect();
    pairs.sort_unstable();

    let results: Vec<String> = pairs.iter().map(|(key, value)| format!("{}={}", key, value)).collect();
    results.join("&")
}

/// Step 4: build the canonical header block and signed-headers list.
///
/// Header names from an [`HeaderMap`] are already lower-case. A name with several values emits them
/// joined by `,` in insertion order.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn canonicalize_headers(headers: &HeaderMap) -> CanonicalHeaders {
    let mut sorted = BTreeMap::<&str, Vec<&[u8]>>::new();
    for (name, value) in headers.iter() {
        sorted.entry(name.as_str()).or_default().push(trim_ascii(value.as_bytes()));
    }

    let mut block = Vec::with_capacity(256);
    let mut names = Vec::with_capacity(sorted.len());

    for (name, values) in sorted.iter() {
        block.extend(name.as_bytes());
        block.push(b':');
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                block.push(b',');
            }
            block.extend(*value);
        }
        block.push(b'\n');
        names.push(*name);
    }

    CanonicalHeaders {
        block,
        signed_headers: names.join(";"),
    }
}

/// Step 5: the hex SHA-256 digest of the body bytes, with no normalization.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
#[inline(always)]
fn payload_hash(body: &[u8]) -> String {
    sha256_hex(body)
}

/// Step 6: assemble the canonical request.
///
/// ```text
/// {method}\n{path}\n{canonical query}\n{header block}\n{signed headers}\n{payload hash}
/// ```
///
/// The header block ends with a newline, so the block and the signed-headers list are separated
/// by an empty line.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
fn canonical_request(
    method: &Method,
    path: &str,
    canonical_query: &str,
    headers: &CanonicalHeaders,
    payload_hash: &str,
) -> Vec<u8> {
    let mut result = Vec::with_capacity(1024);
    result.extend(method.as_str().as_bytes());
    result.push(b'\n');
    result.extend(path.as_bytes());
    result.push(b'\n');
    result.extend(canonical_query.as_bytes());
    result.push(b'\n');
    result.extend(headers.block());
    result.push(b'\n');
    result.extend(headers.signed_headers().as_bytes());
    result.push(b'\n');
    result.extend(payload_hash.as_bytes());

    trace!("Canonical request:\n{}", String::from_utf8_lossy(&result));

    result
}

/// Returns a byte slice with leading and trailing ASCII whitespace bytes removed.
///
/// 'Whitespace' refers to the definition used by u8::is_ascii_whitespace. Non-ASCII whitespace such
/// as U+00A0 is part of the value and is kept.
#[cfg_attr(any(doc, feature = "unstable"), qualifiers(pub))]
#[cfg_attr(not(any(doc, feature = "unstable")), qualifiers(pub(crate)))]
const fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let mut bytes = bytes;
    while let [first, rest @ ..] = bytes {
        if first.is_ascii_whitespace() {
            bytes = rest;
        } else {
            break;
        }
    }
    while let [rest @ .., last] = bytes {
        if last.is_ascii_whitespace() {
            bytes = rest;
        } else {
            break;
        }
    }
    bytes
}
