use serde::Deserialize;

use crate::{
    AutoEncryptionSettings, ClientSettingsFactory, ClusterConnectionMode, ClusterType,
    ReadConcern, ReadPreference, ServerAddress, WriteConcern,
};

/**
A declarative set of client settings, as found in a configuration document.

Every key is optional. [`apply_to`](Self::apply_to) only touches the factory values whose
key is present, so everything else keeps the defaults the factory was created with.

```rust
use mongo_client_settings::{ClientSettingsConfig, ClientSettingsFactory};

let config: ClientSettingsConfig = serde_json::from_str(
    r#"{ "application-name": "inventory", "pool-max-size": 20 }"#,
)
.unwrap();
let settings = config.apply_to(ClientSettingsFactory::default()).build().unwrap();

assert_eq!(settings.connection_pool_settings().max_size, 20);
```
*/
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClientSettingsConfig {
    pub application_name: Option<String>,
    pub read_preference: Option<ReadPreference>,
    pub read_concern: Option<ReadConcern>,
    pub write_concern: Option<WriteConcern>,
    pub retry_reads: Option<bool>,
    pub retry_writes: Option<bool>,

    pub socket_connect_timeout_ms: Option<u64>,
    pub socket_read_timeout_ms: Option<u64>,
    pub socket_receive_buffer_size: Option<u32>,
    pub socket_send_buffer_size: Option<u32>,

    pub server_heartbeat_frequency_ms: Option<u64>,
    pub server_min_heartbeat_frequency_ms: Option<u64>,

    pub cluster_srv_host: Option<String>,
    pub cluster_hosts: Option<Vec<ServerAddress>>,
    pub cluster_connection_mode: Option<ClusterConnectionMode>,
    pub cluster_type: Option<ClusterType>,
    pub cluster_replica_set_name: Option<String>,
    pub cluster_local_threshold_ms: Option<u64>,
    pub cluster_server_selection_timeout_ms: Option<u64>,
    pub cluster_max_wait_queue_size: Option<u32>,

    pub pool_max_size: Option<u32>,
    pub pool_min_size: Option<u32>,
    pub pool_max_wait_queue_size: Option<u32>,
    pub pool_max_wait_time_ms: Option<u64>,
    pub pool_max_connection_lifetime_ms: Option<u64>,
    pub pool_max_connection_idle_time_ms: Option<u64>,
    pub pool_maintenance_initial_delay_ms: Option<u64>,
    pub pool_maintenance_frequency_ms: Option<u64>,

    pub ssl_enabled: Option<bool>,
    pub ssl_invalid_hostname_allowed: Option<bool>,
    pub ssl_provider: Option<String>,

    pub auto_encryption: Option<AutoEncryptionSettings>,
}

impl ClientSettingsConfig {
    /// Calls the matching factory setter for every key present in this config.
    pub fn apply_to(self, mut factory: ClientSettingsFactory) -> ClientSettingsFactory {
        if let Some(application_name) = &self.application_name {
            factory = factory.set_application_name(application_name);
        }
        if let Some(read_preference) = self.read_preference {
            factory = factory.set_read_preference(read_preference);
        }
        if let Some(read_concern) = self.read_concern {
            factory = factory.set_read_concern(read_concern);
        }
        if let Some(write_concern) = self.write_concern {
            factory = factory.set_write_concern(write_concern);
        }
        if self.retry_reads.is_some() {
            factory = factory.set_retry_reads(self.retry_reads);
        }
        if self.retry_writes.is_some() {
            factory = factory.set_retry_writes(self.retry_writes);
        }

        if let Some(timeout) = self.socket_connect_timeout_ms {
            factory = factory.set_socket_connect_timeout_ms(timeout);
        }
        if let Some(timeout) = self.socket_read_timeout_ms {
            factory = factory.set_socket_read_timeout_ms(timeout);
        }
        if let Some(size) = self.socket_receive_buffer_size {
            factory = factory.set_socket_receive_buffer_size(size);
        }
        if let Some(size) = self.socket_send_buffer_size {
            factory = factory.set_socket_send_buffer_size(size);
        }

        if let Some(frequency) = self.server_heartbeat_frequency_ms {
            factory = factory.set_server_heartbeat_frequency_ms(frequency);
        }
        if let Some(frequency) = self.server_min_heartbeat_frequency_ms {
            factory = factory.set_server_min_heartbeat_frequency_ms(frequency);
        }

        if let Some(srv_host) = &self.cluster_srv_host {
            factory = factory.set_cluster_srv_host(srv_host);
        }
        if let Some(hosts) = self.cluster_hosts {
            factory = factory.set_cluster_hosts(hosts);
        }
        if let Some(mode) = self.cluster_connection_mode {
            factory = factory.set_cluster_connection_mode(mode);
        }
        if let Some(cluster_type) = self.cluster_type {
            factory = factory.set_cluster_required_cluster_type(cluster_type);
        }
        if let Some(replica_set) = &self.cluster_replica_set_name {
            factory = factory.set_cluster_required_replica_set_name(replica_set);
        }
        if let Some(threshold) = self.cluster_local_threshold_ms {
            factory = factory.set_cluster_local_threshold_ms(threshold);
        }
        if let Some(timeout) = self.cluster_server_selection_timeout_ms {
            factory = factory.set_cluster_server_selection_timeout_ms(timeout);
        }
        if let Some(size) = self.cluster_max_wait_queue_size {
            factory = factory.set_cluster_max_wait_queue_size(size);
        }

        if let Some(size) = self.pool_max_size {
            factory = factory.set_pool_max_size(size);
        }
        if let Some(size) = self.pool_min_size {
            factory = factory.set_pool_min_size(size);
        }
        if let Some(size) = self.pool_max_wait_queue_size {
            factory = factory.set_pool_max_wait_queue_size(size);
        }
        if let Some(wait_time) = self.pool_max_wait_time_ms {
            factory = factory.set_pool_max_wait_time_ms(wait_time);
        }
        if let Some(lifetime) = self.pool_max_connection_lifetime_ms {
            factory = factory.set_pool_max_connection_lifetime_ms(lifetime);
        }
        if let Some(idle_time) = self.pool_max_connection_idle_time_ms {
            factory = factory.set_pool_max_connection_idle_time_ms(idle_time);
        }
        if let Some(delay) = self.pool_maintenance_initial_delay_ms {
            factory = factory.set_pool_maintenance_initial_delay_ms(delay);
        }
        if let Some(frequency) = self.pool_maintenance_frequency_ms {
            factory = factory.set_pool_maintenance_frequency_ms(frequency);
        }

        if let Some(enabled) = self.ssl_enabled {
            factory = factory.set_ssl_enabled(enabled);
        }
        if let Some(allowed) = self.ssl_invalid_hostname_allowed {
            factory = factory.set_ssl_invalid_hostname_allowed(allowed);
        }
        if let Some(provider) = &self.ssl_provider {
            factory = factory.set_ssl_provider(provider);
        }

        if let Some(auto_encryption) = self.auto_encryption {
            factory = factory.set_auto_encryption_settings(auto_encryption);
        }

        factory
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use std::time::Duration;

    use crate::{
        ClientSettings, ClientSettingsConfig, ClientSettingsFactory, ClusterConnectionMode,
        ClusterType, ConfigurationError, ReadPreference, ServerAddress, WriteConcern,
    };

    fn assemble(json: &str) -> Result<ClientSettings, ConfigurationError> {
        let config: ClientSettingsConfig = serde_json::from_str(json).unwrap();
        config.apply_to(ClientSettingsFactory::default()).build()
    }

    #[test]
    fn apply_to_keeps_defaults_for_empty_document() {
        let settings = assemble("{}").unwrap();

        assert_eq!(settings, ClientSettings::default());
    }

    #[test]
    fn apply_to_only_touches_present_keys() {
        // Arrange
        let json = r#"{
            "read-preference": "secondaryPreferred",
            "write-concern": "MAJORITY",
            "retry-writes": false,
            "socket-connect-timeout-ms": 2500,
            "pool-max-size": 20,
            "pool-min-size": 2
        }"#;

        // Act
        let settings = assemble(json).unwrap();

        // Assert
        let defaults = ClientSettings::default();
        assert_eq!(settings.read_preference(), ReadPreference::SecondaryPreferred);
        assert_eq!(settings.write_concern(), &WriteConcern::MAJORITY);
        assert!(!settings.retry_writes());
        assert!(settings.retry_reads());
        assert_eq!(
            settings.socket_settings().connect_timeout,
            Duration::from_millis(2500)
        );
        assert_eq!(
            settings.socket_settings().read_timeout,
            defaults.socket_settings().read_timeout
        );
        assert_eq!(settings.connection_pool_settings().max_size, 20);
        assert_eq!(settings.connection_pool_settings().min_size, 2);
        assert_eq!(
            settings.connection_pool_settings().max_wait_time,
            defaults.connection_pool_settings().max_wait_time
        );
        assert_eq!(settings.cluster_settings(), defaults.cluster_settings());
    }

    #[test]
    fn apply_to_reads_cluster_keys() {
        let settings = assemble(
            r#"{
                "cluster-hosts": ["db0.example.com:27018", "db1.example.com"],
                "cluster-connection-mode": "MULTIPLE",
                "cluster-type": "REPLICA_SET",
                "cluster-replica-set-name": "rs0"
            }"#,
        )
        .unwrap();

        let cluster = settings.cluster_settings();
        assert_eq!(
            cluster.hosts,
            vec![
                ServerAddress::new("db0.example.com", 27018),
                ServerAddress::new("db1.example.com", 27017),
            ]
        );
        assert_eq!(cluster.mode, ClusterConnectionMode::Multiple);
        assert_eq!(cluster.required_cluster_type, ClusterType::ReplicaSet);
        assert_eq!(cluster.required_replica_set_name.as_deref(), Some("rs0"));
    }

    #[test]
    fn apply_to_reads_ssl_keys() {
        let settings = assemble(
            r#"{ "ssl-enabled": true, "ssl-provider": "TLS", "ssl-invalid-hostname-allowed": true }"#,
        )
        .unwrap();

        let ssl = settings.ssl_settings();
        assert!(ssl.enabled && ssl.invalid_hostname_allowed);
        assert_eq!(ssl.context.as_ref().unwrap().provider(), "TLS");
    }

    #[test]
    fn apply_to_surfaces_unsupported_provider_on_build() {
        let result = assemble(r#"{ "ssl-enabled": true, "ssl-provider": "SSLv2" }"#);

        assert!(matches!(
            result,
            Err(ConfigurationError::SecurityContext { .. })
        ));
    }

    #[test]
    fn apply_to_reads_auto_encryption_key() {
        let settings = assemble(
            r#"{
                "auto-encryption": {
                    "key-vault-namespace": "encryption.__keyVault",
                    "kms-providers": { "local": { "key": "c2VjcmV0" } }
                }
            }"#,
        )
        .unwrap();

        let auto_encryption = settings.auto_encryption_settings().unwrap();
        assert_eq!(auto_encryption.key_vault_namespace, "encryption.__keyVault");
        assert_eq!(auto_encryption.kms_providers["local"]["key"], "c2VjcmV0");
        assert!(!auto_encryption.bypass_auto_encryption);
    }

    #[test]
    fn deserialize_fails_for_unknown_key() {
        let result = serde_json::from_str::<ClientSettingsConfig>(r#"{ "pool-size": 3 }"#);

        assert!(result.is_err());
    }

    #[test]
    fn deserialize_fails_for_invalid_value() {
        let result =
            serde_json::from_str::<ClientSettingsConfig>(r#"{ "read-preference": "closest" }"#);

        assert!(result.is_err());
    }
}
