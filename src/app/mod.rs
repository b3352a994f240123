pub mod config;

pub use config::{Config, CoordinationConfig, MediaConfig, SessionConfig, VolumeConfig};
