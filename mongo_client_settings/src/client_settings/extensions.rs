use std::{collections::BTreeMap, fmt};

use dyn_clone::DynClone;
use serde::Deserialize;

/// Creates the byte streams connections run over. Factories are compared by name.
pub trait StreamFactory: DynClone + fmt::Debug + Send + Sync {
    fn name(&self) -> &str;
}
dyn_clone::clone_trait_object!(StreamFactory);

impl PartialEq for dyn StreamFactory {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

/// Supplies serialization for a set of types. Providers are compared by name.
pub trait CodecProvider: DynClone + fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn handles(&self, type_name: &str) -> bool;
}
dyn_clone::clone_trait_object!(CodecProvider);

/// A provider that handles a fixed list of type names.
#[derive(Clone, Debug)]
pub struct TypeListCodecProvider {
    name: String,
    type_names: Vec<String>,
}

impl TypeListCodecProvider {
    pub fn new<T>(name: &str, type_names: &[T]) -> Self
    where
        T: AsRef<str>,
    {
        Self {
            name: name.to_string(),
            type_names: type_names.iter().map(|t| t.as_ref().to_string()).collect(),
        }
    }
}

impl CodecProvider for TypeListCodecProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn handles(&self, type_name: &str) -> bool {
        self.type_names.iter().any(|t| t == type_name)
    }
}

/// An ordered list of codec providers. The first provider that handles a type wins.
#[derive(Clone, Debug)]
pub struct CodecRegistry {
    providers: Vec<Box<dyn CodecProvider>>,
}

impl CodecRegistry {
    pub fn from_providers(providers: Vec<Box<dyn CodecProvider>>) -> Self {
        Self { providers }
    }

    /// Returns a registry that consults `provider` before any provider already registered.
    pub fn with_provider(mut self, provider: Box<dyn CodecProvider>) -> Self {
        self.providers.insert(0, provider);
        self
    }

    pub fn provider_for(&self, type_name: &str) -> Option<&dyn CodecProvider> {
        self.providers
            .iter()
            .find(|provider| provider.handles(type_name))
            .map(|provider| provider.as_ref())
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|provider| provider.name()).collect()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::from_providers(vec![
            Box::new(TypeListCodecProvider::new(
                "value",
                &[
                    "bool", "i32", "i64", "f64", "String", "ObjectId", "DateTime", "Decimal128",
                    "Binary",
                ],
            )),
            Box::new(TypeListCodecProvider::new("document", &["Document", "RawDocument"])),
            Box::new(TypeListCodecProvider::new("iterable", &["Vec", "Array"])),
        ])
    }
}

impl PartialEq for CodecRegistry {
    fn eq(&self, other: &Self) -> bool {
        self.provider_names() == other.provider_names()
    }
}

/// Client side field level encryption settings.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AutoEncryptionSettings {
    /// `database.collection` holding the data keys.
    pub key_vault_namespace: String,
    #[serde(default)]
    pub kms_providers: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub schema_map: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub bypass_auto_encryption: bool,
}
