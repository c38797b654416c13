use std::fmt;

use tracing::instrument;

/// TLS protocol versions the transport can negotiate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TlsVersion {
    Tls12,
    Tls13,
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tls12 => write!(f, "TLSv1.2"),
            Self::Tls13 => write!(f, "TLSv1.3"),
        }
    }
}

/// Raised when no security context exists for a provider name.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{provider} SecurityContext not available")]
pub struct UnsupportedProviderError {
    pub provider: String,
}

/// A resolved transport security configuration.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SecurityContext {
    provider: String,
    protocol_versions: Vec<TlsVersion>,
}

impl SecurityContext {
    /**
    Resolves the security context for a provider name.

    Names are matched case-insensitively. `TLS`, `SSL` and `Default` allow every supported
    TLS version, `TLSv1.2` and `TLSv1.3` pin a single version. Anything else, including an
    empty name, is unsupported.
    */
    #[instrument(level = "debug", name = "Resolve SecurityContext")]
    pub fn get_instance(provider: &str) -> Result<SecurityContext, UnsupportedProviderError> {
        let protocol_versions = match provider.trim().to_lowercase().as_str() {
            "tls" | "ssl" | "default" => vec![TlsVersion::Tls12, TlsVersion::Tls13],
            "tlsv1.2" => vec![TlsVersion::Tls12],
            "tlsv1.3" => vec![TlsVersion::Tls13],
            _ => {
                return Err(UnsupportedProviderError {
                    provider: provider.to_string(),
                })
            }
        };

        tracing::trace!(
            "Provider `{}` resolved to {:?}",
            provider,
            &protocol_versions
        );
        Ok(SecurityContext {
            provider: provider.to_string(),
            protocol_versions,
        })
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn protocol_versions(&self) -> &[TlsVersion] {
        &self.protocol_versions
    }
}
