mod client_namespace_error;
mod client_namespace_loader;

pub use client_namespace_error::*;
pub use client_namespace_loader::*;
