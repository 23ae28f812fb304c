use {
    crate::{chronoutil::TimeContext, constants::*, crypto::hmac_sha256, SigningConfig, SigningError},
    std::{
        fmt::{Debug, Display, Formatter, Result as FmtResult},
        str::FromStr,
    },
};

/// A raw secret key (`kSecret`). Unlike AWS SigV4, the key is used without a prefix.
#[derive(Clone, PartialEq, Eq)]
pub struct KSecretKey {
    /// The secret key bytes.
    key: Vec<u8>,
}

/// The `kDate` key: `HMAC_SHA256(KSecretKey, "YYYYMMDD")`
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KDateKey {
    /// The raw key.
    key: [u8; SHA256_OUTPUT_LEN],
}

/// The `kRegion` key: a `kDate` key, HMAC-SHA256 hashed with the region.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KRegionKey {
    /// The raw key.
    key: [u8; SHA256_OUTPUT_LEN],
}

/// The `kService` key: a `kRegion` key, HMAC-SHA256 hashed with the service.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KServiceKey {
    /// The raw key.
    key: [u8; SHA256_OUTPUT_LEN],
}

/// The `kSigning` key: a `kService` key, HMAC-SHA256 hashed with the "request" string.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KSigningKey {
    /// The resulting raw signing key.
    key: [u8; SHA256_OUTPUT_LEN],
}

impl AsRef<[u8]> for KSecretKey {
    fn as_ref(&self) -> &[u8] {
        &self.key
    }
}

impl AsRef<[u8; SHA256_OUTPUT_LEN]> for KDateKey {
    fn as_ref(&self) -> &[u8; SHA256_OUTPUT_LEN] {
        &self.key
    }
}

impl AsRef<[u8; SHA256_OUTPUT_LEN]> for KRegionKey {
    fn as_ref(&self) -> &[u8; SHA256_OUTPUT_LEN] {
        &self.key
    }
}

impl AsRef<[u8; SHA256_OUTPUT_LEN]> for KServiceKey {
    fn as_ref(&self) -> &[u8; SHA256_OUTPUT_LEN] {
        &self.key
    }
}

impl AsRef<[u8; SHA256_OUTPUT_LEN]> for KSigningKey {
    fn as_ref(&self) -> &[u8; SHA256_OUTPUT_LEN] {
        &self.key
    }
}

// Key material never appears in logs; formatting prints only the kind of key.
macro_rules! redacted_fmt {
    ($($ty:ident),+) => {
        $(
            impl Debug for $ty {
                fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                    f.write_str(stringify!($ty))
                }
            }

            impl Display for $ty {
                fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
                    f.write_str(stringify!($ty))
                }
            }
        )+
    };
}

redacted_fmt!(KSecretKey, KDateKey, KRegionKey, KServiceKey, KSigningKey);

impl FromStr for KSecretKey {
    type Err = SigningError;

    /// Create a new `KSecretKey` from a raw secret key. The key is opaque; only emptiness is rejected.
    fn from_str(raw: &str) -> Result<Self, SigningError> {
        if raw.is_empty() {
            return Err(SigningError::InvalidCredential(MSG_EMPTY_SECRET_KEY.to_string()));
        }

        Ok(Self {
            key: raw.as_bytes().to_vec(),
        })
    }
}

impl KSecretKey {
    /// Create a new `KDateKey` from this `KSecretKey` and a `YYYYMMDD` date.
    pub fn to_kdate(&self, date_short: &str) -> KDateKey {
        KDateKey {
            key: hmac_sha256(&self.key, date_short.as_bytes()),
        }
    }

    /// Create a new `KSigningKey` from this `KSecretKey`, a date, a region, and a service.
    pub fn to_ksigning(&self, date_short: &str, region: &str, service: &str) -> KSigningKey {
        self.to_kdate(date_short).to_kregion(region).to_kservice(service).to_ksigning()
    }
}

impl KDateKey {
    /// Create a new `KRegionKey` from this `KDateKey` and a region.
    pub fn to_kregion(&self, region: &str) -> KRegionKey {
        KRegionKey {
            key: hmac_sha256(&self.key, region.as_bytes()),
        }
    }
}

impl KRegionKey {
    /// Create a new `KServiceKey` from this `KRegionKey` and a service.
    pub fn to_kservice(&self, service: &str) -> KServiceKey {
        KServiceKey {
            key: hmac_sha256(&self.key, service.as_bytes()),
        }
    }
}

impl KServiceKey {
    /// Create a new `KSigningKey` from this `KServiceKey`.
    pub fn to_ksigning(&self) -> KSigningKey {
        KSigningKey {
            key: hmac_sha256(&self.key, REQUEST_TERMINATOR.as_bytes()),
        }
    }
}

/// Every intermediate key derived for one signing call.
///
/// The secret key only ever signs the date; variable request content is signed by `kSigning`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SigningKeyChain {
    k_date: KDateKey,
    k_region: KRegionKey,
    k_service: KServiceKey,
    k_signing: KSigningKey,
}

impl SigningKeyChain {
    /// Derive `kDate -> kRegion -> kService -> kSigning` for the given scope.
    pub fn derive(secret: &KSecretKey, scope: &CredentialScope) -> Self {
        let k_date = secret.to_kdate(scope.date_short());
        let k_region = k_date.to_kregion(scope.region());
        let k_service = k_region.to_kservice(scope.service());
        let k_signing = k_service.to_ksigning();

        Self {
            k_date,
            k_region,
            k_service,
            k_signing,
        }
    }

    /// Retrieve `kDate`.
    #[inline]
    pub fn k_date(&self) -> &KDateKey {
        &self.k_date
    }

    /// Retrieve `kRegion`.
    #[inline]
    pub fn k_region(&self) -> &KRegionKey {
        &self.k_region
    }

    /// Retrieve `kService`.
    #[inline]
    pub fn k_service(&self) -> &KServiceKey {
        &self.k_service
    }

    /// Retrieve `kSigning`.
    #[inline]
    pub fn k_signing(&self) -> &KSigningKey {
        &self.k_signing
    }
}

/// The credential scope: `{date_short}/{region}/{service}/request`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CredentialScope {
    date_short: String,
    region: String,
    service: String,
}

impl CredentialScope {
    /// Create a credential scope from explicit components.
    pub fn new<D, R, S>(date_short: D, region: R, service: S) -> Self
    where
        D: Into<String>,
        R: Into<String>,
        S: Into<String>,
    {
        Self {
            date_short: date_short.into(),
            region: region.into(),
            service: service.into(),
        }
    }

    /// Create the credential scope for a signing time and configuration.
    pub fn for_request(time: &TimeContext, config: &SigningConfig) -> Self {
        Self::new(time.date_short(), config.region(), config.service())
    }

    /// Retrieve the `YYYYMMDD` date.
    #[inline]
    pub fn date_short(&self) -> &str {
        &self.date_short
    }

    /// Retrieve the region.
    #[inline]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Retrieve the service.
    #[inline]
    pub fn service(&self) -> &str {
        &self.service
    }
}

impl Display for CredentialScope {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}/{}/{}", self.date_short, self.region, self.service, REQUEST_TERMINATOR)
    }
}
