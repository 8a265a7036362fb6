pub mod config;
pub mod load;

pub use config::ConfigError;
pub use load::LoadError;
