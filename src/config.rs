//! Run configuration read from the process environment.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use canopy_io::ModelName;

/// Environment variable naming the model artifact.
pub const MODEL_NAME_VAR: &str = "MODEL_NAME";

/// Environment variable overriding the artifact directory.
pub const OUTPUT_DIR_VAR: &str = "CANOPY_OUTPUT_DIR";

/// Artifact directory used when [`OUTPUT_DIR_VAR`] is unset.
pub const DEFAULT_OUTPUT_DIR: &str = "outputs";

/// Seed shared by the train/test split and the forest.
pub const SEED: u64 = 123;

/// Where a run writes its artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub model_name: ModelName,
    pub output_dir: PathBuf,
}

impl RunConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var_os(key))
    }

    /// Build the configuration from an arbitrary variable lookup.
    ///
    /// An unset variable takes its default. A variable that is set must be
    /// valid: an empty or malformed `MODEL_NAME` is an error, not a fallback.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Self> {
        let model_name = match lookup(MODEL_NAME_VAR) {
            None => ModelName::default(),
            Some(raw) => {
                let Ok(name) = raw.into_string() else {
                    bail!("{MODEL_NAME_VAR} is not valid UTF-8");
                };
                ModelName::new(name).with_context(|| format!("invalid {MODEL_NAME_VAR}"))?
            }
        };

        let output_dir = match lookup(OUTPUT_DIR_VAR) {
            Some(dir) if !dir.is_empty() => PathBuf::from(dir),
            Some(_) => bail!("{OUTPUT_DIR_VAR} is set but empty"),
            None => PathBuf::from(DEFAULT_OUTPUT_DIR),
        };

        Ok(Self {
            model_name,
            output_dir,
        })
    }
}
