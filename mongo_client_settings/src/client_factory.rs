mod client_factory_builder;
mod client_factory_error;

pub use client_factory_builder::*;
pub use client_factory_error::*;
