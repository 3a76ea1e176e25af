mod config;
mod env;

pub(crate) use config::ConfigSource;
pub use config::ConfigFileError;
pub(crate) use env::EnvSource;
pub use env::{Environment, ProcessEnvironment};
