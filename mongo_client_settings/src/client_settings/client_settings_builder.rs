use std::time::Duration;

use tracing::instrument;

use crate::{
    AutoEncryptionSettings, ClusterConnectionMode, ClusterSettings, ClusterType, CodecRegistry,
    ConnectionPoolSettings, ConnectionString, InvalidSettingsError, MongoCredential, ReadConcern,
    ReadPreference, ServerSettings, SocketSettings, SslSettings, StreamFactory, WriteConcern,
};

/**
Immutable settings a MongoDB client is created from.

[`ClientSettings::default`] holds the driver defaults every unset configuration value falls
back to. Instances are created through a [`ClientSettingsBuilder`], which validates that the
grouped settings are consistent with each other.
*/
#[derive(Clone, Debug, PartialEq)]
pub struct ClientSettings {
    application_name: Option<String>,
    auto_encryption_settings: Option<AutoEncryptionSettings>,
    codec_registry: CodecRegistry,
    credential: Option<MongoCredential>,
    read_concern: ReadConcern,
    read_preference: ReadPreference,
    retry_reads: bool,
    retry_writes: bool,
    stream_factory: Option<Box<dyn StreamFactory>>,
    write_concern: WriteConcern,
    cluster_settings: ClusterSettings,
    connection_pool_settings: ConnectionPoolSettings,
    server_settings: ServerSettings,
    socket_settings: SocketSettings,
    ssl_settings: SslSettings,
}

impl ClientSettings {
    pub fn builder() -> ClientSettingsBuilder {
        ClientSettingsBuilder::default()
    }

    /// Returns a builder seeded with every value of `settings`.
    pub fn builder_from(settings: &ClientSettings) -> ClientSettingsBuilder {
        ClientSettingsBuilder {
            settings: settings.clone(),
        }
    }

    pub fn application_name(&self) -> Option<&str> {
        self.application_name.as_deref()
    }

    pub fn auto_encryption_settings(&self) -> Option<&AutoEncryptionSettings> {
        self.auto_encryption_settings.as_ref()
    }

    pub fn codec_registry(&self) -> &CodecRegistry {
        &self.codec_registry
    }

    pub fn credential(&self) -> Option<&MongoCredential> {
        self.credential.as_ref()
    }

    pub fn read_concern(&self) -> ReadConcern {
        self.read_concern
    }

    pub fn read_preference(&self) -> ReadPreference {
        self.read_preference
    }

    pub fn retry_reads(&self) -> bool {
        self.retry_reads
    }

    pub fn retry_writes(&self) -> bool {
        self.retry_writes
    }

    pub fn stream_factory(&self) -> Option<&dyn StreamFactory> {
        self.stream_factory.as_deref()
    }

    pub fn write_concern(&self) -> &WriteConcern {
        &self.write_concern
    }

    pub fn cluster_settings(&self) -> &ClusterSettings {
        &self.cluster_settings
    }

    pub fn connection_pool_settings(&self) -> &ConnectionPoolSettings {
        &self.connection_pool_settings
    }

    pub fn server_settings(&self) -> &ServerSettings {
        &self.server_settings
    }

    pub fn socket_settings(&self) -> &SocketSettings {
        &self.socket_settings
    }

    pub fn ssl_settings(&self) -> &SslSettings {
        &self.ssl_settings
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            application_name: None,
            auto_encryption_settings: None,
            codec_registry: CodecRegistry::default(),
            credential: None,
            read_concern: ReadConcern::default(),
            read_preference: ReadPreference::default(),
            retry_reads: true,
            retry_writes: true,
            stream_factory: None,
            write_concern: WriteConcern::ACKNOWLEDGED,
            cluster_settings: ClusterSettings::default(),
            connection_pool_settings: ConnectionPoolSettings::default(),
            server_settings: ServerSettings::default(),
            socket_settings: SocketSettings::default(),
            ssl_settings: SslSettings::default(),
        }
    }
}

/// Copies `$field` from `$source` into `$target` for every field that differs from `$defaults`.
macro_rules! overlay_changed {
    ($target:expr, $source:expr, $defaults:expr, [$($field:ident),+ $(,)?]) => {
        $(
            if $source.$field != $defaults.$field {
                tracing::trace!("Overriding `{}` with {:?}", stringify!($field), &$source.$field);
                $target.$field = $source.$field.clone();
            }
        )+
    };
}

/// Builds a validated [`ClientSettings`]. Starts from the driver defaults.
#[derive(Clone, Debug, Default)]
pub struct ClientSettingsBuilder {
    settings: ClientSettings,
}

impl ClientSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_application_name(mut self, application_name: Option<String>) -> Self {
        self.settings.application_name = application_name;
        self
    }

    pub fn set_auto_encryption_settings(
        mut self,
        auto_encryption_settings: Option<AutoEncryptionSettings>,
    ) -> Self {
        self.settings.auto_encryption_settings = auto_encryption_settings;
        self
    }

    pub fn set_codec_registry(mut self, codec_registry: CodecRegistry) -> Self {
        self.settings.codec_registry = codec_registry;
        self
    }

    pub fn set_credential(mut self, credential: MongoCredential) -> Self {
        self.settings.credential = Some(credential);
        self
    }

    pub fn set_read_concern(mut self, read_concern: ReadConcern) -> Self {
        self.settings.read_concern = read_concern;
        self
    }

    pub fn set_read_preference(mut self, read_preference: ReadPreference) -> Self {
        self.settings.read_preference = read_preference;
        self
    }

    pub fn set_retry_reads(mut self, retry_reads: bool) -> Self {
        self.settings.retry_reads = retry_reads;
        self
    }

    pub fn set_retry_writes(mut self, retry_writes: bool) -> Self {
        self.settings.retry_writes = retry_writes;
        self
    }

    pub fn set_stream_factory(mut self, stream_factory: Box<dyn StreamFactory>) -> Self {
        self.settings.stream_factory = Some(stream_factory);
        self
    }

    pub fn set_write_concern(mut self, write_concern: WriteConcern) -> Self {
        self.settings.write_concern = write_concern;
        self
    }

    pub fn set_cluster_settings(mut self, cluster_settings: ClusterSettings) -> Self {
        self.settings.cluster_settings = cluster_settings;
        self
    }

    pub fn set_connection_pool_settings(
        mut self,
        connection_pool_settings: ConnectionPoolSettings,
    ) -> Self {
        self.settings.connection_pool_settings = connection_pool_settings;
        self
    }

    pub fn set_server_settings(mut self, server_settings: ServerSettings) -> Self {
        self.settings.server_settings = server_settings;
        self
    }

    pub fn set_socket_settings(mut self, socket_settings: SocketSettings) -> Self {
        self.settings.socket_settings = socket_settings;
        self
    }

    pub fn set_ssl_settings(mut self, ssl_settings: SslSettings) -> Self {
        self.settings.ssl_settings = ssl_settings;
        self
    }

    /// Sets the required replica set name without touching the rest of the cluster settings.
    pub fn set_required_replica_set_name(mut self, replica_set: &str) -> Self {
        self.settings.cluster_settings.required_replica_set_name = Some(replica_set.to_string());
        self
    }

    /// Applies the hosts and every option present in `connection_string`.
    #[instrument(level = "debug", name = "Apply ConnectionString", skip(self))]
    pub fn apply_connection_string(mut self, connection_string: &ConnectionString) -> Self {
        let settings = &mut self.settings;
        let cluster = &mut settings.cluster_settings;

        if connection_string.is_srv() {
            cluster.srv_host = connection_string
                .hosts()
                .first()
                .map(|address| address.host().to_string());
            cluster.mode = ClusterConnectionMode::Multiple;
        } else {
            cluster.hosts = connection_string.hosts().to_vec();
            cluster.mode = match connection_string.direct_connection {
                Some(true) => ClusterConnectionMode::Single,
                Some(false) => ClusterConnectionMode::Multiple,
                None if connection_string.hosts().len() == 1
                    && connection_string.replica_set.is_none() =>
                {
                    ClusterConnectionMode::Single
                }
                None => ClusterConnectionMode::Multiple,
            };
        }

        if let Some(replica_set) = &connection_string.replica_set {
            cluster.required_replica_set_name = Some(replica_set.clone());
        }
        if let Some(timeout) = connection_string.server_selection_timeout {
            cluster.server_selection_timeout = timeout;
        }
        if let Some(threshold) = connection_string.local_threshold {
            cluster.local_threshold = threshold;
        }

        let pool = &mut settings.connection_pool_settings;
        if let Some(max_size) = connection_string.max_pool_size {
            pool.max_size = max_size;
        }
        if let Some(min_size) = connection_string.min_pool_size {
            pool.min_size = min_size;
        }
        if let Some(idle_time) = connection_string.max_idle_time {
            pool.max_connection_idle_time = idle_time;
        }
        if let Some(life_time) = connection_string.max_life_time {
            pool.max_connection_lifetime = life_time;
        }
        if let Some(wait_time) = connection_string.wait_queue_timeout {
            pool.max_wait_time = wait_time;
        }

        if let Some(connect_timeout) = connection_string.connect_timeout {
            settings.socket_settings.connect_timeout = connect_timeout;
        }
        if let Some(read_timeout) = connection_string.socket_timeout {
            settings.socket_settings.read_timeout = read_timeout;
        }
        if let Some(heartbeat_frequency) = connection_string.heartbeat_frequency {
            settings.server_settings.heartbeat_frequency = heartbeat_frequency;
        }

        if let Some(enabled) = connection_string.tls_enabled {
            settings.ssl_settings.enabled = enabled;
        }
        if let Some(allowed) = connection_string.tls_allow_invalid_hostnames {
            settings.ssl_settings.invalid_hostname_allowed = allowed;
        }

        if let Some(application_name) = connection_string.application_name() {
            settings.application_name = Some(application_name.to_string());
        }
        if let Some(credential) = connection_string.credential() {
            settings.credential = Some(credential.clone());
        }
        if let Some(read_preference) = connection_string.read_preference {
            settings.read_preference = read_preference;
        }
        if let Some(read_concern) = connection_string.read_concern {
            settings.read_concern = read_concern;
        }
        if let Some(write_concern) = &connection_string.write_concern {
            settings.write_concern = write_concern.clone();
        }
        if let Some(retry_reads) = connection_string.retry_reads {
            settings.retry_reads = retry_reads;
        }
        if let Some(retry_writes) = connection_string.retry_writes {
            settings.retry_writes = retry_writes;
        }

        tracing::trace!("Settings after connection string: {:?}", &self.settings);
        self
    }

    /// Overrides every value of `settings` that differs from `defaults`. Values equal to the
    /// default leave whatever the builder already holds in place.
    #[instrument(level = "debug", name = "Apply changed settings", skip_all)]
    pub fn apply_changed(mut self, settings: &ClientSettings, defaults: &ClientSettings) -> Self {
        let target = &mut self.settings;

        overlay_changed!(
            target,
            settings,
            defaults,
            [
                application_name,
                auto_encryption_settings,
                codec_registry,
                credential,
                read_concern,
                read_preference,
                retry_reads,
                retry_writes,
                stream_factory,
                write_concern,
            ]
        );
        overlay_changed!(
            target.cluster_settings,
            settings.cluster_settings,
            defaults.cluster_settings,
            [
                srv_host,
                hosts,
                mode,
                required_cluster_type,
                required_replica_set_name,
                local_threshold,
                server_selection_timeout,
                max_wait_queue_size,
            ]
        );
        overlay_changed!(
            target.connection_pool_settings,
            settings.connection_pool_settings,
            defaults.connection_pool_settings,
            [
                max_size,
                min_size,
                max_wait_queue_size,
                max_wait_time,
                max_connection_lifetime,
                max_connection_idle_time,
                maintenance_initial_delay,
                maintenance_frequency,
            ]
        );
        overlay_changed!(
            target.server_settings,
            settings.server_settings,
            defaults.server_settings,
            [heartbeat_frequency, min_heartbeat_frequency]
        );
        overlay_changed!(
            target.socket_settings,
            settings.socket_settings,
            defaults.socket_settings,
            [
                connect_timeout,
                read_timeout,
                receive_buffer_size,
                send_buffer_size
            ]
        );
        overlay_changed!(
            target.ssl_settings,
            settings.ssl_settings,
            defaults.ssl_settings,
            [enabled, invalid_hostname_allowed, context]
        );

        self
    }

    /// Validates the settings and returns them.
    ///
    /// A required replica set name promotes an `UNKNOWN` required cluster type to
    /// `REPLICA_SET`.
    #[instrument(level = "debug", name = "Build ClientSettings", skip(self))]
    pub fn build(mut self) -> Result<ClientSettings, InvalidSettingsError> {
        let cluster = &mut self.settings.cluster_settings;
        if cluster.required_replica_set_name.is_some() {
            match cluster.required_cluster_type {
                ClusterType::Unknown => cluster.required_cluster_type = ClusterType::ReplicaSet,
                ClusterType::ReplicaSet => {}
                other => {
                    return Err(log_invalid(
                        InvalidSettingsError::ReplicaSetNameWithClusterType(other),
                    ))
                }
            }
        }

        match &cluster.srv_host {
            Some(srv_host) if srv_host.contains(':') => {
                return Err(log_invalid(InvalidSettingsError::SrvHostWithPort(
                    srv_host.clone(),
                )));
            }
            Some(_) if cluster.mode == ClusterConnectionMode::Single => {
                return Err(log_invalid(InvalidSettingsError::SrvHostInSingleMode));
            }
            None if cluster.mode == ClusterConnectionMode::Single && cluster.hosts.len() > 1 => {
                return Err(log_invalid(InvalidSettingsError::MultipleHostsInSingleMode));
            }
            _ => {}
        }

        let pool = &self.settings.connection_pool_settings;
        if pool.max_size > 0 && pool.min_size > pool.max_size {
            return Err(log_invalid(
                InvalidSettingsError::PoolMinSizeExceedsMaxSize {
                    min_size: pool.min_size,
                    max_size: pool.max_size,
                },
            ));
        }
        require_non_zero(pool.maintenance_frequency, "maintenance_frequency")?;

        let server = &self.settings.server_settings;
        require_non_zero(server.heartbeat_frequency, "heartbeat_frequency")?;
        require_non_zero(server.min_heartbeat_frequency, "min_heartbeat_frequency")?;

        Ok(self.settings)
    }
}

fn require_non_zero(value: Duration, name: &'static str) -> Result<(), InvalidSettingsError> {
    if value.is_zero() {
        return Err(log_invalid(InvalidSettingsError::ZeroDuration(name)));
    }
    Ok(())
}

fn log_invalid(error: InvalidSettingsError) -> InvalidSettingsError {
    tracing::error!("{}", &error);
    error
}
