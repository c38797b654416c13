use crate::{error_chain_fmt, InvalidSettingsError, UnsupportedProviderError};

#[derive(thiserror::Error)]
pub enum ConfigurationError {
    /// No security context could be resolved for the configured provider.
    #[error("{message}")]
    SecurityContext {
        message: String,
        #[source]
        cause: UnsupportedProviderError,
    },
    #[error(transparent)]
    InvalidSettings(#[from] InvalidSettingsError),
}
impl std::fmt::Debug for ConfigurationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
