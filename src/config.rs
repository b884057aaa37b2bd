//! JSON runtime configuration for the `frame-locator` binary.
use crate::image::io::Rescale;
use crate::image::volume::DEFAULT_BACKGROUND;
use crate::image::ImageGeometry;
use crate::LocatorParams;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw volume on disk plus the metadata needed to interpret it.
#[derive(Clone, Debug, Deserialize)]
pub struct VolumeSource {
    pub path: PathBuf,
    pub geometry: ImageGeometry,
    #[serde(default)]
    pub rescale: Rescale,
    #[serde(default = "default_background")]
    pub background: f64,
}

fn default_background() -> f64 {
    DEFAULT_BACKGROUND
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct OutputConfig {
    pub json_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RuntimeConfig {
    pub volume: VolumeSource,
    /// Points of interest in patient coordinates
    pub points: Vec<[f64; 3]>,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub locator_params: LocatorParams,
}

impl RuntimeConfig {
    /// Relative paths are taken relative to the config file's directory.
    pub fn resolve_paths(&mut self, config_path: &Path) {
        let Some(base) = config_path.parent() else {
            return;
        };
        if self.volume.path.is_relative() {
            self.volume.path = base.join(&self.volume.path);
        }
        if let Some(out) = self.output.json_out.as_mut() {
            if out.is_relative() {
                *out = base.join(&*out);
            }
        }
    }
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let mut config: RuntimeConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    config
        .locator_params
        .validate()
        .map_err(|e| format!("Invalid locator params in {}: {e}", path.display()))?;
    config.resolve_paths(path);
    Ok(config)
}
