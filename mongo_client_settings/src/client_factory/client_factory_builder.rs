use tracing::{instrument, Span};
use uuid::Uuid;

use crate::{
    driver, ClientFactoryError, ClientSettings, ConnectionString, MongoCredential, DEFAULT_HOST,
    DEFAULT_PORT,
};

/**
Describes how to reach a MongoDB deployment and produces the settings a client is created
with.

The deployment is given either as a [`ConnectionString`] or as a host and port, never both.
Credentials, a replica set name and pre-assembled [`ClientSettings`] are layered on top.
*/
#[derive(Clone, Debug, Default)]
pub struct MongoClientFactory {
    host: Option<String>,
    port: Option<u16>,
    connection_string: Option<ConnectionString>,
    credentials: Vec<MongoCredential>,
    replica_set: Option<String>,
    client_settings: Option<ClientSettings>,
}

impl MongoClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_host(mut self, host: &str) -> Self {
        self.host = Some(host.to_string());
        self
    }

    pub fn set_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn set_connection_string(mut self, connection_string: ConnectionString) -> Self {
        tracing::trace!("Using connection string {}", &connection_string);
        self.connection_string = Some(connection_string);
        self
    }

    /// Only the first credential is used to authenticate.
    pub fn set_credentials(mut self, credentials: Vec<MongoCredential>) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn set_replica_set(mut self, replica_set: &str) -> Self {
        self.replica_set = Some(replica_set.to_string());
        self
    }

    pub fn set_client_settings(mut self, client_settings: ClientSettings) -> Self {
        self.client_settings = Some(client_settings);
        self
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn connection_string(&self) -> Option<&ConnectionString> {
        self.connection_string.as_ref()
    }

    pub fn credentials(&self) -> &[MongoCredential] {
        &self.credentials
    }

    pub fn replica_set(&self) -> Option<&str> {
        self.replica_set.as_deref()
    }

    pub fn client_settings(&self) -> Option<&ClientSettings> {
        self.client_settings.as_ref()
    }

    /**
    Merges everything configured on this factory into the settings a client is created with.

    The connection string, or `mongodb://host:port` built from the host and port, provides
    the base settings. Every value of the configured client settings that differs from the
    driver defaults overrides the base, then the first credential and a non-blank replica
    set name are applied.
    */
    #[instrument(
        level = "debug",
        name = "Compute client settings",
        skip(self),
        fields(correlation_id)
    )]
    pub fn compute_client_settings(&self) -> Result<ClientSettings, ClientFactoryError> {
        Span::current().record("correlation_id", Uuid::new_v4().to_string());

        let connection_string = self.base_connection_string()?;
        let mut builder = ClientSettings::builder().apply_connection_string(&connection_string);

        if let Some(client_settings) = &self.client_settings {
            builder = builder.apply_changed(client_settings, &ClientSettings::default());
        }

        if let Some(credential) = self.credentials.first() {
            if self.credentials.len() > 1 {
                tracing::debug!(
                    "{} credentials configured, only the first one is used",
                    self.credentials.len()
                );
            }
            builder = builder.set_credential(credential.clone());
        }

        match self.replica_set.as_deref() {
            Some(replica_set) if !replica_set.trim().is_empty() => {
                builder = builder.set_required_replica_set_name(replica_set);
            }
            _ => tracing::trace!("No replica set configured"),
        }

        Ok(builder.build()?)
    }

    /// Computes the client settings and creates a driver client from them.
    ///
    /// ```rust
    /// # use mongo_client_settings::MongoClientFactory;
    /// # tokio_test::block_on(async {
    /// let client = MongoClientFactory::new()
    ///     .set_host("127.0.0.1")
    ///     .set_port(27017)
    ///     .create_client()
    ///     .await
    ///     .unwrap();
    /// # drop(client);
    /// # })
    /// ```
    #[instrument(level = "debug", name = "Create MongoDB client", skip(self))]
    pub async fn create_client(&self) -> Result<mongodb::Client, ClientFactoryError> {
        let settings = self.compute_client_settings()?;
        Ok(driver::create_client(&settings).await?)
    }

    fn base_connection_string(&self) -> Result<ConnectionString, ClientFactoryError> {
        if let Some(connection_string) = &self.connection_string {
            if self.host.is_some() || self.port.is_some() {
                let err = ClientFactoryError::ConflictingConnectionConfiguration;
                tracing::error!("{}", &err);
                return Err(err);
            }
            return Ok(connection_string.clone());
        }

        let host = self.host.as_deref().unwrap_or(DEFAULT_HOST);
        let port = self.port.unwrap_or(DEFAULT_PORT);
        ConnectionString::for_host_and_port(host, port).map_err(|e| {
            let err = ClientFactoryError::InvalidAddress(e);
            tracing::error!("{}", &err);
            err
        })
    }
}
