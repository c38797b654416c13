use std::time::Duration;

use tracing::instrument;

use crate::{
    AutoEncryptionSettings, ClientSettings, ClusterConnectionMode, ClusterSettings, ClusterType,
    CodecRegistry, ConfigurationError, ConnectionPoolSettings, ReadConcern, ReadPreference,
    SecurityContext, ServerAddress, ServerSettings, SocketSettings, SslSettings, StreamFactory,
    WriteConcern,
};

/**
Collects flat configuration values and assembles them into a [`ClientSettings`].

Every value starts out as the matching value of the defaults passed to
[`ClientSettingsFactory::new`], so only the values that are explicitly set differ from the
driver defaults. The application name, retry flags, auto encryption settings, stream factory
and SRV host are optional and only applied when present.

The factory can be built any number of times; it is never modified by [`build`](Self::build).
*/
#[derive(Clone, Debug)]
pub struct ClientSettingsFactory {
    defaults: ClientSettings,

    application_name: Option<String>,
    auto_encryption_settings: Option<AutoEncryptionSettings>,
    codec_registry: CodecRegistry,
    read_concern: ReadConcern,
    read_preference: ReadPreference,
    retry_reads: Option<bool>,
    retry_writes: Option<bool>,
    stream_factory: Option<Box<dyn StreamFactory>>,
    write_concern: WriteConcern,

    // Socket
    socket_connect_timeout_ms: u64,
    socket_read_timeout_ms: u64,
    socket_receive_buffer_size: u32,
    socket_send_buffer_size: u32,

    // Server
    server_heartbeat_frequency_ms: u64,
    server_min_heartbeat_frequency_ms: u64,

    // Cluster
    cluster_srv_host: Option<String>,
    cluster_hosts: Vec<ServerAddress>,
    cluster_connection_mode: ClusterConnectionMode,
    cluster_required_cluster_type: ClusterType,
    cluster_required_replica_set_name: Option<String>,
    cluster_local_threshold_ms: u64,
    cluster_server_selection_timeout_ms: u64,
    cluster_max_wait_queue_size: u32,

    // Connection pool
    pool_max_size: u32,
    pool_min_size: u32,
    pool_max_wait_queue_size: u32,
    pool_max_wait_time_ms: u64,
    pool_max_connection_lifetime_ms: u64,
    pool_max_connection_idle_time_ms: u64,
    pool_maintenance_initial_delay_ms: u64,
    pool_maintenance_frequency_ms: u64,

    // SSL
    ssl_enabled: bool,
    ssl_invalid_hostname_allowed: bool,
    ssl_provider: String,
}

impl ClientSettingsFactory {
    /// Creates a factory whose values are copied from `defaults`.
    pub fn new(defaults: &ClientSettings) -> Self {
        let socket = defaults.socket_settings();
        let server = defaults.server_settings();
        let cluster = defaults.cluster_settings();
        let pool = defaults.connection_pool_settings();
        let ssl = defaults.ssl_settings();

        Self {
            defaults: defaults.clone(),

            application_name: None,
            auto_encryption_settings: None,
            codec_registry: defaults.codec_registry().clone(),
            read_concern: defaults.read_concern(),
            read_preference: defaults.read_preference(),
            retry_reads: None,
            retry_writes: None,
            stream_factory: None,
            write_concern: defaults.write_concern().clone(),

            socket_connect_timeout_ms: millis(socket.connect_timeout),
            socket_read_timeout_ms: millis(socket.read_timeout),
            socket_receive_buffer_size: socket.receive_buffer_size,
            socket_send_buffer_size: socket.send_buffer_size,

            server_heartbeat_frequency_ms: millis(server.heartbeat_frequency),
            server_min_heartbeat_frequency_ms: millis(server.min_heartbeat_frequency),

            cluster_srv_host: cluster.srv_host.clone(),
            cluster_hosts: cluster.hosts.clone(),
            cluster_connection_mode: cluster.mode,
            cluster_required_cluster_type: cluster.required_cluster_type,
            cluster_required_replica_set_name: cluster.required_replica_set_name.clone(),
            cluster_local_threshold_ms: millis(cluster.local_threshold),
            cluster_server_selection_timeout_ms: millis(cluster.server_selection_timeout),
            cluster_max_wait_queue_size: cluster.max_wait_queue_size,

            pool_max_size: pool.max_size,
            pool_min_size: pool.min_size,
            pool_max_wait_queue_size: pool.max_wait_queue_size,
            pool_max_wait_time_ms: millis(pool.max_wait_time),
            pool_max_connection_lifetime_ms: millis(pool.max_connection_lifetime),
            pool_max_connection_idle_time_ms: millis(pool.max_connection_idle_time),
            pool_maintenance_initial_delay_ms: millis(pool.maintenance_initial_delay),
            pool_maintenance_frequency_ms: millis(pool.maintenance_frequency),

            ssl_enabled: ssl.enabled,
            ssl_invalid_hostname_allowed: ssl.invalid_hostname_allowed,
            ssl_provider: ssl
                .context
                .as_ref()
                .filter(|_| ssl.enabled)
                .map(|context| context.provider().to_string())
                .unwrap_or_default(),
        }
    }

    pub fn set_application_name(mut self, application_name: &str) -> Self {
        self.application_name = Some(application_name.to_string());
        self
    }

    pub fn set_auto_encryption_settings(
        mut self,
        auto_encryption_settings: AutoEncryptionSettings,
    ) -> Self {
        self.auto_encryption_settings = Some(auto_encryption_settings);
        self
    }

    pub fn set_codec_registry(mut self, codec_registry: CodecRegistry) -> Self {
        self.codec_registry = codec_registry;
        self
    }

    pub fn set_read_concern(mut self, read_concern: ReadConcern) -> Self {
        self.read_concern = read_concern;
        self
    }

    pub fn set_read_preference(mut self, read_preference: ReadPreference) -> Self {
        self.read_preference = read_preference;
        self
    }

    /// `None` leaves the driver's own retry behavior in place.
    pub fn set_retry_reads(mut self, retry_reads: Option<bool>) -> Self {
        self.retry_reads = retry_reads;
        self
    }

    /// `None` leaves the driver's own retry behavior in place.
    pub fn set_retry_writes(mut self, retry_writes: Option<bool>) -> Self {
        self.retry_writes = retry_writes;
        self
    }

    pub fn set_stream_factory(mut self, stream_factory: Box<dyn StreamFactory>) -> Self {
        self.stream_factory = Some(stream_factory);
        self
    }

    pub fn set_write_concern(mut self, write_concern: WriteConcern) -> Self {
        self.write_concern = write_concern;
        self
    }

    pub fn set_socket_connect_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.socket_connect_timeout_ms = timeout_ms;
        self
    }

    pub fn set_socket_read_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.socket_read_timeout_ms = timeout_ms;
        self
    }

    pub fn set_socket_receive_buffer_size(mut self, size: u32) -> Self {
        self.socket_receive_buffer_size = size;
        self
    }

    pub fn set_socket_send_buffer_size(mut self, size: u32) -> Self {
        self.socket_send_buffer_size = size;
        self
    }

    pub fn set_server_heartbeat_frequency_ms(mut self, frequency_ms: u64) -> Self {
        self.server_heartbeat_frequency_ms = frequency_ms;
        self
    }

    pub fn set_server_min_heartbeat_frequency_ms(mut self, frequency_ms: u64) -> Self {
        self.server_min_heartbeat_frequency_ms = frequency_ms;
        self
    }

    /// A blank SRV host counts as not configured.
    pub fn set_cluster_srv_host(mut self, srv_host: &str) -> Self {
        self.cluster_srv_host = Some(srv_host.to_string());
        self
    }

    /// An empty list keeps the default hosts.
    pub fn set_cluster_hosts(mut self, hosts: Vec<ServerAddress>) -> Self {
        self.cluster_hosts = hosts;
        self
    }

    pub fn set_cluster_connection_mode(mut self, mode: ClusterConnectionMode) -> Self {
        self.cluster_connection_mode = mode;
        self
    }

    pub fn set_cluster_required_cluster_type(mut self, cluster_type: ClusterType) -> Self {
        self.cluster_required_cluster_type = cluster_type;
        self
    }

    pub fn set_cluster_required_replica_set_name(mut self, replica_set: &str) -> Self {
        self.cluster_required_replica_set_name = Some(replica_set.to_string());
        self
    }

    pub fn set_cluster_local_threshold_ms(mut self, threshold_ms: u64) -> Self {
        self.cluster_local_threshold_ms = threshold_ms;
        self
    }

    pub fn set_cluster_server_selection_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.cluster_server_selection_timeout_ms = timeout_ms;
        self
    }

    pub fn set_cluster_max_wait_queue_size(mut self, size: u32) -> Self {
        self.cluster_max_wait_queue_size = size;
        self
    }

    pub fn set_pool_max_size(mut self, size: u32) -> Self {
        self.pool_max_size = size;
        self
    }

    pub fn set_pool_min_size(mut self, size: u32) -> Self {
        self.pool_min_size = size;
        self
    }

    pub fn set_pool_max_wait_queue_size(mut self, size: u32) -> Self {
        self.pool_max_wait_queue_size = size;
        self
    }

    pub fn set_pool_max_wait_time_ms(mut self, wait_time_ms: u64) -> Self {
        self.pool_max_wait_time_ms = wait_time_ms;
        self
    }

    pub fn set_pool_max_connection_lifetime_ms(mut self, lifetime_ms: u64) -> Self {
        self.pool_max_connection_lifetime_ms = lifetime_ms;
        self
    }

    pub fn set_pool_max_connection_idle_time_ms(mut self, idle_time_ms: u64) -> Self {
        self.pool_max_connection_idle_time_ms = idle_time_ms;
        self
    }

    pub fn set_pool_maintenance_initial_delay_ms(mut self, delay_ms: u64) -> Self {
        self.pool_maintenance_initial_delay_ms = delay_ms;
        self
    }

    pub fn set_pool_maintenance_frequency_ms(mut self, frequency_ms: u64) -> Self {
        self.pool_maintenance_frequency_ms = frequency_ms;
        self
    }

    pub fn set_ssl_enabled(mut self, enabled: bool) -> Self {
        self.ssl_enabled = enabled;
        self
    }

    /// Only takes effect when SSL is enabled.
    pub fn set_ssl_invalid_hostname_allowed(mut self, allowed: bool) -> Self {
        self.ssl_invalid_hostname_allowed = allowed;
        self
    }

    /// The name the security context is resolved from. Only used when SSL is enabled.
    pub fn set_ssl_provider(mut self, provider: &str) -> Self {
        self.ssl_provider = provider.to_string();
        self
    }

    /// Assembles the configured values into [`ClientSettings`].
    ///
    /// Fails when SSL is enabled and no security context exists for the configured provider,
    /// or when the settings builder rejects the combination of values.
    #[instrument(level = "debug", name = "Build ClientSettingsFactory", skip(self))]
    pub fn build(&self) -> Result<ClientSettings, ConfigurationError> {
        let mut builder = ClientSettings::builder_from(&self.defaults)
            .set_read_preference(self.read_preference)
            .set_read_concern(self.read_concern)
            .set_write_concern(self.write_concern.clone())
            .set_application_name(self.application_name.clone())
            .set_auto_encryption_settings(self.auto_encryption_settings.clone())
            .set_codec_registry(self.codec_registry.clone())
            .set_cluster_settings(self.cluster_settings())
            .set_connection_pool_settings(self.connection_pool_settings())
            .set_server_settings(self.server_settings())
            .set_socket_settings(self.socket_settings())
            .set_ssl_settings(self.ssl_settings()?);

        if let Some(stream_factory) = &self.stream_factory {
            tracing::trace!("Using stream factory `{}`", stream_factory.name());
            builder = builder.set_stream_factory(stream_factory.clone());
        }
        if let Some(retry_reads) = self.retry_reads {
            builder = builder.set_retry_reads(retry_reads);
        }
        if let Some(retry_writes) = self.retry_writes {
            builder = builder.set_retry_writes(retry_writes);
        }

        Ok(builder.build()?)
    }

    fn cluster_settings(&self) -> ClusterSettings {
        let mut cluster = ClusterSettings {
            server_selection_timeout: Duration::from_millis(
                self.cluster_server_selection_timeout_ms,
            ),
            mode: self.cluster_connection_mode,
            required_replica_set_name: self.cluster_required_replica_set_name.clone(),
            local_threshold: Duration::from_millis(self.cluster_local_threshold_ms),
            max_wait_queue_size: self.cluster_max_wait_queue_size,
            required_cluster_type: self.cluster_required_cluster_type,
            ..self.defaults.cluster_settings().clone()
        };

        if self.cluster_hosts.is_empty() {
            tracing::debug!("No cluster hosts configured, keeping {:?}", &cluster.hosts);
        } else {
            cluster.hosts = self.cluster_hosts.clone();
        }

        match self.cluster_srv_host.as_deref() {
            Some(srv_host) if !srv_host.trim().is_empty() => {
                cluster.srv_host = Some(srv_host.to_string());
            }
            _ => tracing::debug!("No SRV host configured"),
        }

        cluster
    }

    fn connection_pool_settings(&self) -> ConnectionPoolSettings {
        ConnectionPoolSettings {
            max_size: self.pool_max_size,
            min_size: self.pool_min_size,
            max_wait_queue_size: self.pool_max_wait_queue_size,
            max_wait_time: Duration::from_millis(self.pool_max_wait_time_ms),
            max_connection_lifetime: Duration::from_millis(self.pool_max_connection_lifetime_ms),
            max_connection_idle_time: Duration::from_millis(
                self.pool_max_connection_idle_time_ms,
            ),
            maintenance_initial_delay: Duration::from_millis(
                self.pool_maintenance_initial_delay_ms,
            ),
            maintenance_frequency: Duration::from_millis(self.pool_maintenance_frequency_ms),
        }
    }

    fn server_settings(&self) -> ServerSettings {
        ServerSettings {
            heartbeat_frequency: Duration::from_millis(self.server_heartbeat_frequency_ms),
            min_heartbeat_frequency: Duration::from_millis(
                self.server_min_heartbeat_frequency_ms,
            ),
        }
    }

    fn socket_settings(&self) -> SocketSettings {
        SocketSettings {
            connect_timeout: Duration::from_millis(self.socket_connect_timeout_ms),
            read_timeout: Duration::from_millis(self.socket_read_timeout_ms),
            receive_buffer_size: self.socket_receive_buffer_size,
            send_buffer_size: self.socket_send_buffer_size,
        }
    }

    fn ssl_settings(&self) -> Result<SslSettings, ConfigurationError> {
        let mut ssl = SslSettings {
            enabled: self.ssl_enabled,
            ..self.defaults.ssl_settings().clone()
        };

        if self.ssl_enabled {
            ssl.invalid_hostname_allowed = self.ssl_invalid_hostname_allowed;
            let context = SecurityContext::get_instance(&self.ssl_provider).map_err(|cause| {
                let err = ConfigurationError::SecurityContext {
                    message: cause.to_string(),
                    cause,
                };
                tracing::error!("{}", &err);
                err
            })?;
            ssl.context = Some(context);
        }

        Ok(ssl)
    }
}

impl Default for ClientSettingsFactory {
    fn default() -> Self {
        Self::new(&ClientSettings::default())
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use std::time::Duration;

    use crate::{
        AutoEncryptionSettings, ClientSettings, ClientSettingsFactory, ClusterConnectionMode,
        ClusterType, CodecRegistry, ConfigurationError, InvalidSettingsError, ReadConcern,
        ReadPreference, ServerAddress, StreamFactory, TlsVersion, TypeListCodecProvider,
        WriteConcern,
    };

    #[derive(Clone, Debug)]
    struct NamedStreamFactory(&'static str);

    impl StreamFactory for NamedStreamFactory {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn build_returns_driver_defaults_when_nothing_is_set() {
        // Act
        let settings = ClientSettingsFactory::default().build().unwrap();

        // Assert
        let defaults = ClientSettings::default();
        assert_eq!(settings, defaults);
        assert_eq!(settings.socket_settings(), defaults.socket_settings());
        assert_eq!(settings.cluster_settings(), defaults.cluster_settings());
        assert_eq!(
            settings.connection_pool_settings(),
            defaults.connection_pool_settings()
        );
        assert_eq!(settings.ssl_settings(), defaults.ssl_settings());
    }

    #[test]
    fn build_captures_the_defaults_it_was_created_with() {
        // Arrange
        let defaults = ClientSettings::builder()
            .set_read_preference(ReadPreference::Nearest)
            .set_retry_writes(false)
            .build()
            .unwrap();

        // Act
        let settings = ClientSettingsFactory::new(&defaults).build().unwrap();

        // Assert
        assert_eq!(settings, defaults);
        assert!(!settings.retry_writes());
    }

    #[test]
    fn build_applies_every_configured_value() {
        let settings = ClientSettingsFactory::default()
            .set_application_name("inventory")
            .set_read_preference(ReadPreference::SecondaryPreferred)
            .set_read_concern(ReadConcern::Majority)
            .set_write_concern(WriteConcern::W2)
            .set_socket_connect_timeout_ms(1_000)
            .set_socket_read_timeout_ms(2_000)
            .set_socket_receive_buffer_size(64)
            .set_socket_send_buffer_size(128)
            .set_server_heartbeat_frequency_ms(5_000)
            .set_server_min_heartbeat_frequency_ms(250)
            .set_cluster_connection_mode(ClusterConnectionMode::Multiple)
            .set_cluster_hosts(vec![
                ServerAddress::new("db0", 27017),
                ServerAddress::new("db1", 27017),
            ])
            .set_cluster_local_threshold_ms(20)
            .set_cluster_server_selection_timeout_ms(3_000)
            .set_cluster_max_wait_queue_size(42)
            .set_pool_max_size(50)
            .set_pool_min_size(5)
            .set_pool_max_wait_queue_size(10)
            .set_pool_max_wait_time_ms(4_000)
            .set_pool_max_connection_lifetime_ms(600_000)
            .set_pool_max_connection_idle_time_ms(300_000)
            .set_pool_maintenance_initial_delay_ms(100)
            .set_pool_maintenance_frequency_ms(30_000)
            .build()
            .unwrap();

        assert_eq!(settings.application_name(), Some("inventory"));
        assert_eq!(settings.read_preference(), ReadPreference::SecondaryPreferred);
        assert_eq!(settings.read_concern(), ReadConcern::Majority);
        assert_eq!(settings.write_concern(), &WriteConcern::W2);

        let socket = settings.socket_settings();
        assert_eq!(socket.connect_timeout, Duration::from_secs(1));
        assert_eq!(socket.read_timeout, Duration::from_secs(2));
        assert_eq!((socket.receive_buffer_size, socket.send_buffer_size), (64, 128));

        let server = settings.server_settings();
        assert_eq!(server.heartbeat_frequency, Duration::from_secs(5));
        assert_eq!(server.min_heartbeat_frequency, Duration::from_millis(250));

        let cluster = settings.cluster_settings();
        assert_eq!(cluster.hosts.len(), 2);
        assert_eq!(cluster.mode, ClusterConnectionMode::Multiple);
        assert_eq!(cluster.local_threshold, Duration::from_millis(20));
        assert_eq!(cluster.server_selection_timeout, Duration::from_secs(3));
        assert_eq!(cluster.max_wait_queue_size, 42);

        let pool = settings.connection_pool_settings();
        assert_eq!((pool.max_size, pool.min_size, pool.max_wait_queue_size), (50, 5, 10));
        assert_eq!(pool.max_wait_time, Duration::from_secs(4));
        assert_eq!(pool.max_connection_lifetime, Duration::from_secs(600));
        assert_eq!(pool.max_connection_idle_time, Duration::from_secs(300));
        assert_eq!(pool.maintenance_initial_delay, Duration::from_millis(100));
        assert_eq!(pool.maintenance_frequency, Duration::from_secs(30));
    }

    #[test]
    fn build_applies_auto_encryption_and_codec_registry() {
        // Arrange
        let auto_encryption = AutoEncryptionSettings {
            key_vault_namespace: "encryption.__keyVault".to_string(),
            bypass_auto_encryption: true,
            ..Default::default()
        };
        let codec_registry = CodecRegistry::default().with_provider(Box::new(
            TypeListCodecProvider::new("money", &["Money"]),
        ));

        // Act
        let settings = ClientSettingsFactory::default()
            .set_auto_encryption_settings(auto_encryption.clone())
            .set_codec_registry(codec_registry.clone())
            .build()
            .unwrap();

        // Assert
        assert_eq!(settings.auto_encryption_settings(), Some(&auto_encryption));
        assert_eq!(settings.codec_registry(), &codec_registry);
        assert_eq!(
            settings.codec_registry().provider_for("Money").unwrap().name(),
            "money"
        );
    }

    #[test]
    fn build_keeps_default_hosts_for_empty_host_list() {
        let settings = ClientSettingsFactory::default()
            .set_cluster_hosts(Vec::new())
            .build()
            .unwrap();

        assert_eq!(
            settings.cluster_settings().hosts,
            ClientSettings::default().cluster_settings().hosts
        );
    }

    #[test]
    fn build_skips_blank_srv_host() {
        let settings = ClientSettingsFactory::default()
            .set_cluster_srv_host("   ")
            .build()
            .unwrap();

        assert_eq!(settings.cluster_settings().srv_host, None);
    }

    #[test]
    fn build_applies_srv_host_in_multiple_mode() {
        let settings = ClientSettingsFactory::default()
            .set_cluster_srv_host("cluster0.example.com")
            .set_cluster_connection_mode(ClusterConnectionMode::Multiple)
            .build()
            .unwrap();

        assert_eq!(
            settings.cluster_settings().srv_host.as_deref(),
            Some("cluster0.example.com")
        );
    }

    #[test]
    fn build_uses_single_host_and_port() {
        let settings = ClientSettingsFactory::default()
            .set_cluster_hosts(vec!["127.0.0.1:27017".parse().unwrap()])
            .build()
            .unwrap();

        assert_eq!(
            settings.cluster_settings().hosts,
            vec![ServerAddress::new("127.0.0.1", 27017)]
        );
        assert!(settings.credential().is_none());
        assert!(settings.cluster_settings().required_replica_set_name.is_none());
        assert_eq!(
            settings.connection_pool_settings(),
            ClientSettings::default().connection_pool_settings()
        );
        assert_eq!(
            settings.socket_settings(),
            ClientSettings::default().socket_settings()
        );
        assert_eq!(settings.ssl_settings(), ClientSettings::default().ssl_settings());
    }

    #[test]
    fn build_applies_replica_set_without_hosts() {
        let settings = ClientSettingsFactory::default()
            .set_cluster_required_replica_set_name("rs0")
            .build()
            .unwrap();

        let cluster = settings.cluster_settings();
        assert_eq!(cluster.required_replica_set_name.as_deref(), Some("rs0"));
        assert_eq!(cluster.required_cluster_type, ClusterType::ReplicaSet);
        assert_eq!(cluster.hosts, ClientSettings::default().cluster_settings().hosts);
    }

    #[test]
    fn build_ignores_ssl_details_when_ssl_is_disabled() {
        // Arrange
        let factory = ClientSettingsFactory::default()
            .set_ssl_enabled(false)
            .set_ssl_invalid_hostname_allowed(true)
            .set_ssl_provider("NoSuchProvider");

        // Act
        let settings = factory.build().unwrap();

        // Assert
        assert_eq!(settings.ssl_settings(), ClientSettings::default().ssl_settings());
    }

    #[test]
    fn build_resolves_security_context_when_ssl_is_enabled() {
        let settings = ClientSettingsFactory::default()
            .set_ssl_enabled(true)
            .set_ssl_invalid_hostname_allowed(true)
            .set_ssl_provider("TLSv1.2")
            .build()
            .unwrap();

        let ssl = settings.ssl_settings();
        assert!(ssl.enabled && ssl.invalid_hostname_allowed);
        let context = ssl.context.as_ref().unwrap();
        assert_eq!(context.provider(), "TLSv1.2");
        assert_eq!(context.protocol_versions(), &[TlsVersion::Tls12]);
    }

    #[test]
    fn build_fails_for_unsupported_ssl_provider() {
        let result = ClientSettingsFactory::default()
            .set_ssl_enabled(true)
            .set_ssl_provider("NoSuchProvider")
            .build();

        match result {
            Err(ConfigurationError::SecurityContext { message, cause }) => {
                assert_eq!(message, "NoSuchProvider SecurityContext not available");
                assert_eq!(cause.provider, "NoSuchProvider");
            }
            other => panic!("expected a security context error, got {:?}", other),
        }
    }

    #[test]
    fn build_fails_for_ssl_without_provider() {
        let result = ClientSettingsFactory::default().set_ssl_enabled(true).build();

        assert!(matches!(
            result,
            Err(ConfigurationError::SecurityContext { .. })
        ));
    }

    #[test]
    fn build_propagates_settings_builder_rejections() {
        let result = ClientSettingsFactory::default()
            .set_pool_max_size(1)
            .set_pool_min_size(2)
            .build();

        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidSettings(
                InvalidSettingsError::PoolMinSizeExceedsMaxSize { .. }
            ))
        ));
    }

    #[test]
    fn build_only_applies_retry_flags_that_are_set() {
        let unset = ClientSettingsFactory::default().build().unwrap();
        let disabled = ClientSettingsFactory::default()
            .set_retry_reads(Some(false))
            .set_retry_writes(Some(false))
            .build()
            .unwrap();

        assert!(unset.retry_reads() && unset.retry_writes());
        assert!(!disabled.retry_reads() && !disabled.retry_writes());
    }

    #[test]
    fn build_applies_stream_factory_when_present() {
        let without = ClientSettingsFactory::default().build().unwrap();
        let with = ClientSettingsFactory::default()
            .set_stream_factory(Box::new(NamedStreamFactory("netty")))
            .build()
            .unwrap();

        assert!(without.stream_factory().is_none());
        assert_eq!(with.stream_factory().unwrap().name(), "netty");
    }

    #[test]
    fn build_is_deterministic() {
        let factory = ClientSettingsFactory::default()
            .set_application_name("inventory")
            .set_ssl_enabled(true)
            .set_ssl_provider("TLS")
            .set_stream_factory(Box::new(NamedStreamFactory("netty")));

        assert_eq!(factory.build().unwrap(), factory.build().unwrap());
    }
}
