//! Configuration for the message coercion engine.

mod coercion;
mod error;
mod loader;

use std::path::Path;

use serde::Deserialize;

pub use coercion::{AudioConfig, CoercionConfig, FileConfig};
pub use error::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub coercion: CoercionConfig,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
        loader::load(path)
    }
}
