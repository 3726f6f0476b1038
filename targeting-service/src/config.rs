use amr_client::{SelectionCriteria, ThresholdConfig};
use anyhow::Context;
use serde::Deserialize;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::sinks::csv_export::DEFAULT_CHECKED_MARKER;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub path: PathBuf,
    pub checked_marker: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("hasil_analisis_to_amr.csv"),
            checked_marker: DEFAULT_CHECKED_MARKER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Prometheus textfile written at the end of each run.
    pub textfile_path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub criteria: SelectionCriteria,
    #[serde(default)]
    pub export: ExportConfig,
    pub metrics: Option<MetricsConfig>,
}

pub const DEFAULT_CONFIG_PATH: &str = "p2tl-config.toml";

impl AppConfig {
    /// Reads `P2TL_CONFIG`, else `p2tl-config.toml` in the working directory.
    /// Only the implicit default path may be absent; a path named through the
    /// environment must exist.
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        match env::var("P2TL_CONFIG") {
            Ok(path) => Self::load_from(Path::new(&path), true),
            Err(_) => Self::load_from(Path::new(DEFAULT_CONFIG_PATH), false),
        }
    }

    pub fn load_from(path: &Path, required: bool) -> anyhow::Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !required => {
                tracing::info!(path = %path.display(), "no config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read config file {}", path.display()))
            }
        };
        Self::from_toml_str(&contents).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        let cfg: AppConfig = toml::from_str(contents)?;
        Ok(cfg)
    }
}
