use crate::{error_chain_fmt, ConfigurationError, ParseError};

#[derive(thiserror::Error)]
pub enum ClientNamespaceError {
    #[error("The client namespace document is malformed")]
    InvalidDocument(#[source] serde_json::Error),
    #[error("The id `{0}` is defined more than once")]
    DuplicateId(String),
    #[error("Client `{client}` refers to unknown client settings `{settings_ref}`")]
    UnknownSettingsRef {
        client: String,
        settings_ref: String,
    },
    #[error("Client settings `{id}` could not be assembled")]
    InvalidClientSettings {
        id: String,
        #[source]
        cause: ConfigurationError,
    },
    #[error("Client `{id}` has an invalid credential")]
    InvalidCredential {
        id: String,
        #[source]
        cause: ParseError,
    },
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}
impl std::fmt::Debug for ClientNamespaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
