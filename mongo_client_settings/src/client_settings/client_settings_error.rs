/// Raised when a configuration value can't be parsed into its settings type.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("`{value}` is not a valid {kind}")]
    InvalidValue { kind: &'static str, value: String },
    #[error("Invalid server address `{address}`: {reason}")]
    InvalidServerAddress { address: String, reason: String },
    #[error("Invalid credential `{credential}`: {reason}")]
    InvalidCredential { credential: String, reason: String },
    #[error("Invalid connection string: {0}")]
    InvalidConnectionString(String),
}

impl ParseError {
    pub(crate) fn invalid_value(kind: &'static str, value: &str) -> Self {
        Self::InvalidValue {
            kind,
            value: value.to_string(),
        }
    }
}

/// Raised by [`ClientSettingsBuilder::build`](crate::ClientSettingsBuilder::build) when
/// settings are inconsistent with each other.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidSettingsError {
    #[error("Connection pool min size {min_size} is larger than max size {max_size}")]
    PoolMinSizeExceedsMaxSize { min_size: u32, max_size: u32 },
    #[error("`{0}` must be greater than zero")]
    ZeroDuration(&'static str),
    #[error("Multiple hosts cannot be specified when using the SINGLE connection mode")]
    MultipleHostsInSingleMode,
    #[error("The SRV host `{0}` can not specify a port")]
    SrvHostWithPort(String),
    #[error("An SRV host name was provided but the connection mode is not MULTIPLE")]
    SrvHostInSingleMode,
    #[error(
        "When specifying a replica set name, only UNKNOWN and REPLICA_SET cluster types are valid, not {0}"
    )]
    ReplicaSetNameWithClusterType(crate::ClusterType),
}
