//! Synthetic brain map and atlas volumes for the yeonets integration tests.

use ndarray::{Array, Array3};
use std::path::{Path, PathBuf};

use yeonets::write_nifti;

pub const NX: usize = 18;
pub const NY: usize = 4;
pub const NZ: usize = 2;

pub const ATLAS_7_FILE: &str = "masked_resliced_liberal_yeo_7.nii";
pub const ATLAS_17_FILE: &str = "masked_resliced_liberal_yeo_17.nii.gz";
pub const STAT_MAP_FILE: &str = "stat_map.nii";

/// The 17 network atlas labels slabs along x with label `x`, slab 0 is background.
pub fn yeo17_labels() -> Array3<f64> {
    Array::from_shape_fn((NX, NY, NZ), |(x, _, _)| x as f64)
}

/// The 7 network atlas repeats labels `0..=7` along x.
pub fn yeo7_labels() -> Array3<f64> {
    Array::from_shape_fn((NX, NY, NZ), |(x, _, _)| (x % 8) as f64)
}

/// Map values decrease along x, so higher labels have lower means. All values are exact in float32.
pub fn stat_map() -> Array3<f64> {
    Array::from_shape_fn((NX, NY, NZ), |(x, y, z)| (20 - x) as f64 + 0.5 * y as f64 + 0.25 * z as f64)
}

/// Write the brain map and both atlases into `dir`, returns the path of the brain map.
pub fn write_fixture(dir: &Path) -> PathBuf {
    write_nifti(dir.join(ATLAS_7_FILE), &yeo7_labels(), [2.0, 2.0, 2.0]).unwrap();
    write_nifti(dir.join(ATLAS_17_FILE), &yeo17_labels(), [2.0, 2.0, 2.0]).unwrap();
    let stat_map_path = dir.join(STAT_MAP_FILE);
    write_nifti(&stat_map_path, &stat_map(), [2.0, 2.0, 2.0]).unwrap();
    stat_map_path
}
