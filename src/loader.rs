//! Loading tuning data from RON files.
//!
//! Both [`ControllerConfig`] and [`SpeedTable`] deserialize with every field
//! optional, so a tuning file only needs to name what it overrides:
//!
//! ```ron
//! (
//!     max_height_velocity: 12.0,
//!     sensor: (grab_leniency: 0.2),
//! )
//! ```
//!
//! A speed table maps material kinds to their speeds; kinds left out fall
//! back to the bare-surface speeds:
//!
//! ```ron
//! {
//!     Slip: (default: 9.0, push: 6.0, pull: 6.0, up_slope: 7.0),
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use ron::Options;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::ControllerConfig;
use crate::material::SpeedTable;

/// Errors raised while loading tuning files.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: ron::error::SpannedError,
    },
}

fn ron_options() -> Options {
    Options::default().with_default_extension(ron::extensions::Extensions::IMPLICIT_SOME)
}

fn parse<T: DeserializeOwned>(contents: &str, origin: &str) -> Result<T, LoadError> {
    ron_options().from_str(contents).map_err(|source| LoadError::Parse {
        origin: origin.to_string(),
        source,
    })
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, &path.display().to_string())
}

/// Parse a controller config from RON text.
pub fn controller_config_from_ron_str(contents: &str) -> Result<ControllerConfig, LoadError> {
    parse(contents, "<string>")
}

/// Parse a speed table from RON text.
pub fn speed_table_from_ron_str(contents: &str) -> Result<SpeedTable, LoadError> {
    parse(contents, "<string>")
}

/// Load a controller config from a RON file.
pub fn load_controller_config(path: impl AsRef<Path>) -> Result<ControllerConfig, LoadError> {
    load(path.as_ref())
}

/// Load a speed table from a RON file.
pub fn load_speed_table(path: impl AsRef<Path>) -> Result<SpeedTable, LoadError> {
    load(path.as_ref())
}
