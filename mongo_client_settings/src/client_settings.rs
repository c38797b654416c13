mod client_settings_builder;
mod client_settings_error;
mod connection_string;
pub(crate) mod credential;
mod extensions;
mod read_write_concerns;
mod server_address;
pub(crate) mod settings_groups;

pub use client_settings_builder::*;
pub use client_settings_error::*;
pub use connection_string::*;
pub use credential::*;
pub use extensions::*;
pub use read_write_concerns::*;
pub use server_address::*;
pub use settings_groups::{
    ClusterConnectionMode, ClusterSettings, ClusterType, ConnectionPoolSettings, ServerSettings,
    SocketSettings, SslSettings,
};
