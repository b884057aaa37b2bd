//! I/O helpers for raw volumes and JSON.
//!
//! - `load_volume_raw`: read little-endian `i16` voxels and rescale them.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{ImageGeometry, VolumeImage};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Linear mapping from stored integers to intensities: `value * slope + intercept`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rescale {
    pub slope: f64,
    pub intercept: f64,
}

impl Default for Rescale {
    fn default() -> Self {
        Self {
            slope: 1.0,
            intercept: 0.0,
        }
    }
}

/// Load a headerless volume of little-endian `i16`, x-fastest.
pub fn load_volume_raw(
    path: &Path,
    geometry: ImageGeometry,
    rescale: Rescale,
) -> Result<VolumeImage, String> {
    geometry.validate()?;
    let bytes =
        fs::read(path).map_err(|e| format!("Failed to read volume {}: {e}", path.display()))?;
    let expected = geometry.voxel_count() * 2;
    if bytes.len() != expected {
        return Err(format!(
            "Volume {} has {} bytes, expected {expected} for size {:?}",
            path.display(),
            bytes.len(),
            geometry.size
        ));
    }
    let data = bytes
        .chunks_exact(2)
        .map(|c| {
            let raw = i16::from_le_bytes([c[0], c[1]]) as f64;
            (raw * rescale.slope + rescale.intercept) as f32
        })
        .collect();
    VolumeImage::new(geometry, data)
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ProfileSampler;
    use nalgebra::Point3;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("frame-locator-{}-{name}", std::process::id()))
    }

    #[test]
    fn loads_and_rescales_raw_voxels() {
        let path = scratch_path("raw.bin");
        let raw: [i16; 4] = [0, 1000, -24, 2024];
        let bytes: Vec<u8> = raw.iter().flat_map(|v| v.to_le_bytes()).collect();
        fs::write(&path, bytes).unwrap();
        let g = ImageGeometry::new([0.0; 3], [1.0; 3], [2, 2, 1]);
        let vol = load_volume_raw(
            &path,
            g,
            Rescale {
                slope: 1.0,
                intercept: -1024.0,
            },
        )
        .unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(vol.voxel(0, 0, 0), Some(-1024.0));
        assert_eq!(vol.voxel(1, 0, 0), Some(-24.0));
        assert_eq!(vol.voxel(1, 1, 0), Some(1000.0));
        assert!((vol.value_at(&Point3::new(0.5, 0.0, 0.0)) + 524.0).abs() < 1e-6);
    }

    #[test]
    fn rejects_truncated_file() {
        let path = scratch_path("short.bin");
        fs::write(&path, [0u8; 5]).unwrap();
        let g = ImageGeometry::new([0.0; 3], [1.0; 3], [2, 2, 1]);
        let err = load_volume_raw(&path, g, Rescale::default()).unwrap_err();
        fs::remove_file(&path).ok();
        assert!(err.contains("expected 8"), "unexpected error: {err}");
    }

    #[test]
    fn writes_json_into_new_directory() {
        let dir = scratch_path("json");
        let path = dir.join("nested").join("out.json");
        write_json_file(&path, &vec![1, 2, 3]).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        fs::remove_dir_all(&dir).ok();
        assert!(text.contains('2'));
    }
}
