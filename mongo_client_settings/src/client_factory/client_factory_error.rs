use crate::{driver::DriverError, error_chain_fmt, InvalidSettingsError, ParseError};

#[derive(thiserror::Error)]
pub enum ClientFactoryError {
    #[error("A connection string can't be combined with a host or port")]
    ConflictingConnectionConfiguration,
    #[error("The configured host and port don't form a valid address")]
    InvalidAddress(#[source] ParseError),
    #[error(transparent)]
    InvalidSettings(#[from] InvalidSettingsError),
    #[error("Failed to create a MongoDB client")]
    Driver(#[from] DriverError),
}
impl std::fmt::Debug for ClientFactoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}
