//! Common utilities shared by the fixture reader, dispatcher and runner

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use config::Config;
pub use error::{Error, Result};
