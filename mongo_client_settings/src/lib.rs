/*!
mongo_client_settings turns flat, independently settable configuration values into
the structured [`ClientSettings`] a MongoDB client is built from.

Every value that isn't explicitly configured keeps the driver default captured when the
[`ClientSettingsFactory`] was created. Values are grouped into socket, server, cluster,
connection pool and TLS settings, and the assembled [`ClientSettings`] is immutable.

On top of that sits a [`MongoClientFactory`] that combines a host and port or a
[`ConnectionString`] with credentials, a replica set name and pre-assembled settings, and a
[`ClientNamespace`] that loads named client definitions from a JSON document.

# Example
```rust
use mongo_client_settings::{ClientSettingsFactory, ReadPreference, ServerAddress};

let settings = ClientSettingsFactory::default()
    .set_application_name("inventory")
    .set_read_preference(ReadPreference::SecondaryPreferred)
    .set_cluster_hosts(vec![ServerAddress::new("db0.example.com", 27017)])
    .build()
    .unwrap();

assert_eq!(settings.application_name(), Some("inventory"));
assert_eq!(settings.cluster_settings().hosts.len(), 1);
```

The assembled settings are handed to the official driver through
[`driver::to_client_options`] or [`driver::create_client`].
*/

mod client_factory;
mod client_namespace;
mod client_settings;
mod security_context;
mod settings_factory;

pub mod driver;

pub use client_factory::*;
pub use client_namespace::*;
pub use client_settings::*;
pub use security_context::*;
pub use settings_factory::*;

/// Writes an error followed by every error in its `source` chain.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
