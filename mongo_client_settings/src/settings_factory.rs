mod settings_factory_builder;
mod settings_factory_config;
mod settings_factory_error;

pub use settings_factory_builder::*;
pub use settings_factory_config::*;
pub use settings_factory_error::*;
