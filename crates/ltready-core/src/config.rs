use std::path::{Path, PathBuf};

use ltready_parser::VendorMode;
use serde::Deserialize;

use crate::error::{PipelineError, Result};
use crate::output::SinkOptions;

/// Everything a single merge run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub input_dir: PathBuf,
    pub vendor: VendorMode,
    pub base_name: String,
    pub output_dir: Option<PathBuf>,
    pub sink: SinkOptions,
}

/// Optional TOML defaults, e.g.
///
/// ```toml
/// vendor = "thermo"
/// base_name = "2021-04-05_run"
/// input_dir = "/data/icpms/2021-04-05"
/// strings_to_numbers = true
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub input_dir: Option<PathBuf>,
    pub vendor: Option<VendorMode>,
    pub base_name: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub strings_to_numbers: Option<bool>,
}

impl ConfigFile {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|err| PipelineError::Config(err.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| {
            PipelineError::Config(format!("failed to read {}: {err}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }

    /// Values from `overrides` win over values in `self`.
    pub fn merged_with(self, overrides: ConfigFile) -> ConfigFile {
        ConfigFile {
            input_dir: overrides.input_dir.or(self.input_dir),
            vendor: overrides.vendor.or(self.vendor),
            base_name: overrides.base_name.or(self.base_name),
            output_dir: overrides.output_dir.or(self.output_dir),
            strings_to_numbers: overrides.strings_to_numbers.or(self.strings_to_numbers),
        }
    }

    pub fn into_run_config(self) -> Result<RunConfig> {
        let input_dir = self
            .input_dir
            .ok_or_else(|| PipelineError::Config("input directory is required".to_string()))?;
        let vendor = self
            .vendor
            .ok_or_else(|| PipelineError::Config("vendor mode is required".to_string()))?;
        let base_name = self
            .base_name
            .ok_or_else(|| PipelineError::Config("output base name is required".to_string()))?;

        let config = RunConfig {
            input_dir,
            vendor,
            base_name: base_name.trim().to_string(),
            output_dir: self.output_dir,
            sink: SinkOptions {
                strings_to_numbers: self.strings_to_numbers.unwrap_or(true),
            },
        };
        config.validate()?;
        Ok(config)
    }
}

impl RunConfig {
    pub fn new(input_dir: impl Into<PathBuf>, vendor: VendorMode, base_name: impl Into<String>) -> Self {
        Self {
            input_dir: input_dir.into(),
            vendor,
            base_name: base_name.into(),
            output_dir: None,
            sink: SinkOptions::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.base_name.is_empty() {
            return Err(PipelineError::Config(
                "output base name must not be empty".to_string(),
            ));
        }
        if self.base_name.contains(['/', '\\']) {
            return Err(PipelineError::Config(format!(
                "output base name '{}' must not contain path separators",
                self.base_name
            )));
        }
        if !self.input_dir.is_dir() {
            return Err(PipelineError::Config(format!(
                "input directory {} does not exist",
                self.input_dir.display()
            )));
        }
        Ok(())
    }
}
