use {crate::constants::*, derive_builder::Builder};

/// Deployment parameters for request signing: where requests go and how the key is scoped.
///
/// The defaults target the Volcengine visual API (`cn-north-1` / `cv` at
/// `visual.volcengineapi.com`). Use [`SigningConfigBuilder`] to override individual values.
#[derive(Builder, Clone, Debug, PartialEq, Eq)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct SigningConfig {
    /// The region used in the credential scope and `kRegion` derivation.
    #[builder(setter(into), default = "DEFAULT_REGION.to_string()")]
    region: String,

    /// The service used in the credential scope and `kService` derivation.
    #[builder(setter(into), default = "DEFAULT_SERVICE.to_string()")]
    service: String,

    /// The API host, injected as the `host` header and used to build the dispatch URI.
    #[builder(setter(into), default = "DEFAULT_HOST.to_string()")]
    host: String,

    /// The signing algorithm name. Only `HMAC-SHA256` is supported.
    #[builder(setter(into), default = "HMAC_SHA256.to_string()")]
    algorithm: String,

    /// The URI scheme used to build the dispatch URI.
    #[builder(setter(into), default = "DEFAULT_SCHEME.to_string()")]
    scheme: String,
}

impl SigningConfig {
    /// Create a [SigningConfigBuilder] to construct a [SigningConfig].
    #[inline]
    pub fn builder() -> SigningConfigBuilder {
        SigningConfigBuilder::default()
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

    /// Retrieve the API host.
    #[inline]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Retrieve the signing algorithm name.
    #[inline]
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Retrieve the URI scheme.
    #[inline]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            service: DEFAULT_SERVICE.to_string(),
            host: DEFAULT_HOST.to_string(),
            algorithm: HMAC_SHA256.to_string(),
            scheme: DEFAULT_SCHEME.to_string(),
        }
    }
}

impl SigningConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        // Scope components are joined with '/', so an embedded slash would shift the scope.
        for (name, value) in [("region", &self.region), ("service", &self.service), ("host", &self.host)] {
            if let Some(value) = value {
                if value.is_empty() {
                    return Err(format!("{} must not be empty", name));
                }
                if value.contains('/') {
                    return Err(format!("{} must not contain '/': {}", name, value));
                }
            }
        }

        // The Authorization header separates its fields with ", ".
        for (name, value) in [("region", &self.region), ("service", &self.service)] {
            if let Some(value) = value {
                if value.contains(|c: char| c == ',' || c.is_whitespace()) {
                    return Err(format!("{} must not contain ',' or whitespace: '{}'", name, value));
                }
            }
        }

        if let Some(algorithm) = &self.algorithm {
            if algorithm != HMAC_SHA256 {
                return Err(format!("{}'{}'", MSG_UNSUPPORTED_ALGORITHM, algorithm));
            }
        }

        Ok(())
    }
}
