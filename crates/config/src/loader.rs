use std::path::Path;

use crate::{Config, error::Error};

pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;

    validate(&config)?;

    log::debug!("Loaded configuration from {}", path.display());

    Ok(config)
}

pub(crate) fn validate(config: &Config) -> crate::Result<()> {
    if config.coercion.files.default_mime_type.trim().is_empty() {
        return Err(Error::InvalidValue {
            path: "coercion.files.default_mime_type".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    for (format, mime_type) in &config.coercion.audio.mime_types {
        if mime_type.trim().is_empty() {
            return Err(Error::InvalidValue {
                path: format!("coercion.audio.mime_types.{format}"),
                reason: "must not be empty".to_string(),
            });
        }
    }

    Ok(())
}
