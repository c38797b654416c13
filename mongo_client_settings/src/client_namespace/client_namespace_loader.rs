use std::{collections::BTreeMap, path::Path};

use serde::Deserialize;
use tracing::instrument;

use crate::{
    ClientNamespaceError, ClientSettings, ClientSettingsConfig, ClientSettingsFactory,
    ConnectionString, MongoClientFactory, MongoCredential,
};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct NamespaceDocument {
    #[serde(default)]
    client_settings: Vec<ClientSettingsDefinition>,
    #[serde(default)]
    clients: Vec<ClientDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ClientSettingsDefinition {
    id: String,
    #[serde(default)]
    settings: ClientSettingsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct ClientDefinition {
    id: String,
    host: Option<String>,
    port: Option<u16>,
    connection_string: Option<ConnectionString>,
    credential: Option<String>,
    replica_set: Option<String>,
    settings_ref: Option<String>,
}

/**
Named client and client settings definitions loaded from a JSON document.

```json
{
    "client-settings": [
        { "id": "fast", "settings": { "pool-max-size": 20, "read-preference": "nearest" } }
    ],
    "clients": [
        { "id": "orders", "host": "127.0.0.1", "port": 27017, "settings-ref": "fast" },
        { "id": "audit", "connection-string": "mongodb://127.0.0.1:27017/?replicaSet=rs0" }
    ]
}
```

Ids are unique across both lists. Client settings are assembled with a
[`ClientSettingsFactory`] while loading. Clients are only validated when their settings are
computed through [`MongoClientFactory::compute_client_settings`].
*/
#[derive(Clone, Debug, Default)]
pub struct ClientNamespace {
    client_settings: BTreeMap<String, ClientSettings>,
    clients: BTreeMap<String, MongoClientFactory>,
}

impl ClientNamespace {
    #[instrument(level = "debug", name = "Load ClientNamespace", skip(json))]
    pub fn from_json(json: &str) -> Result<Self, ClientNamespaceError> {
        let document: NamespaceDocument = serde_json::from_str(json).map_err(|e| {
            let err = ClientNamespaceError::InvalidDocument(e);
            tracing::error!("{}", &err);
            err
        })?;

        let mut namespace = ClientNamespace::default();

        for definition in document.client_settings {
            namespace.ensure_unique(&definition.id)?;
            let settings = definition
                .settings
                .apply_to(ClientSettingsFactory::default())
                .build()
                .map_err(|cause| {
                    let err = ClientNamespaceError::InvalidClientSettings {
                        id: definition.id.clone(),
                        cause,
                    };
                    tracing::error!("{}", &err);
                    err
                })?;
            tracing::trace!("Loaded client settings `{}`", &definition.id);
            namespace.client_settings.insert(definition.id, settings);
        }

        for definition in document.clients {
            namespace.ensure_unique(&definition.id)?;
            let factory = namespace.client_factory_from(&definition)?;
            tracing::trace!("Loaded client `{}`", &definition.id);
            namespace.clients.insert(definition.id, factory);
        }

        Ok(namespace)
    }

    #[instrument(level = "debug", name = "Load ClientNamespace from file", skip(path))]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ClientNamespaceError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            let err = anyhow::anyhow!(
                "Failed to read client namespace file `{}`. Caused by: {}",
                path.display(),
                e
            );
            tracing::error!("{}", &err);
            err
        })?;
        Self::from_json(&json)
    }

    pub fn contains_client(&self, id: &str) -> bool {
        self.clients.contains_key(id)
    }

    pub fn client_factory(&self, id: &str) -> Option<&MongoClientFactory> {
        self.clients.get(id)
    }

    pub fn client_settings(&self, id: &str) -> Option<&ClientSettings> {
        self.client_settings.get(id)
    }

    /// Client ids in ascending order.
    pub fn client_ids(&self) -> Vec<&str> {
        self.clients.keys().map(String::as_str).collect()
    }

    fn ensure_unique(&self, id: &str) -> Result<(), ClientNamespaceError> {
        if self.client_settings.contains_key(id) || self.clients.contains_key(id) {
            let err = ClientNamespaceError::DuplicateId(id.to_string());
            tracing::error!("{}", &err);
            return Err(err);
        }
        Ok(())
    }

    fn client_factory_from(
        &self,
        definition: &ClientDefinition,
    ) -> Result<MongoClientFactory, ClientNamespaceError> {
        let mut factory = MongoClientFactory::new();

        if let Some(host) = &definition.host {
            factory = factory.set_host(host);
        }
        if let Some(port) = definition.port {
            factory = factory.set_port(port);
        }
        if let Some(connection_string) = &definition.connection_string {
            factory = factory.set_connection_string(connection_string.clone());
        }
        if let Some(credential) = &definition.credential {
            let credentials = MongoCredential::parse_list(credential).map_err(|cause| {
                let err = ClientNamespaceError::InvalidCredential {
                    id: definition.id.clone(),
                    cause,
                };
                tracing::error!("{}", &err);
                err
            })?;
            factory = factory.set_credentials(credentials);
        }
        if let Some(replica_set) = &definition.replica_set {
            factory = factory.set_replica_set(replica_set);
        }
        if let Some(settings_ref) = &definition.settings_ref {
            let settings = self.client_settings.get(settings_ref).ok_or_else(|| {
                let err = ClientNamespaceError::UnknownSettingsRef {
                    client: definition.id.clone(),
                    settings_ref: settings_ref.clone(),
                };
                tracing::error!("{}", &err);
                err
            })?;
            factory = factory.set_client_settings(settings.clone());
        }

        Ok(factory)
    }
}
