pub mod app;
pub mod backend;
pub mod error;
pub mod media;
pub mod notify;
pub mod runner;
pub mod session;
pub mod volume;

pub use error::{Result, VolumenError};
