//! The Yeo 2011 functional network parcellations with 7 and 17 networks.
//!
//! A parcellation volume assigns each voxel to a network via an integer label, where `0` is the
//! background and `1..=N` are the networks. The colortable contains the network names and the RGB
//! display colors used in the original publication, so that plots match the published figures.

use log::{debug, info};
use ndarray::Array3;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, YeonetsError};
use crate::nifti::NiftiVolume;

/// The default file name prefix of the atlas volumes, which were masked and resliced to the space of the brain map.
pub const DEFAULT_ATLAS_PREFIX: &str = "masked_resliced_libe";

/// Maximal distance of a voxel value from the nearest integer to still count as a label.
pub const LABEL_TOLERANCE: f64 = 1e-3;

const YEO7_NAMES: [&str; 7] = [
    "Visual", "Somatomotor", "Dorsal Attention",
    "Ventral Attention", "Limbic", "Frontoparietal",
    "Default",
];

// Network order as in Fig. 1 of Yeo et al. 2011 / Schaefer et al. 2018.
const YEO17_NAMES: [&str; 17] = [
    "Visual A", "Visual B", "Somatomotor A", "Somatomotor B",
    "Dorsal Attention A", "Dorsal Attention B",
    "VenAttn", "Salience", "Limbic A (temp)", "Limbic B (OFC)",
    "Control C", "Control A", "Control B", "Default D (Aud)", "Default C",
    "Default A", "Default B",
];

// Entry 0 is the background.
const YEO7_COLORS: [(u8, u8, u8); 8] = [
    (255, 255, 255),
    (120, 18, 134),
    (70, 130, 180),
    (0, 118, 14),
    (196, 58, 250),
    (220, 248, 164),
    (230, 148, 34),
    (205, 62, 78),
];

const YEO17_COLORS: [(u8, u8, u8); 18] = [
    (255, 255, 255),
    (120, 18, 134),
    (255, 0, 0),
    (70, 130, 180),
    (42, 204, 164),
    (74, 155, 60),
    (0, 118, 14),
    (196, 58, 250),
    (255, 152, 213),
    (220, 248, 164),
    (122, 135, 50),
    (119, 140, 176),
    (230, 148, 34),
    (135, 50, 74),
    (12, 48, 255),
    (0, 0, 130),
    (255, 255, 0),
    (205, 62, 78),
];


/// One of the two supported Yeo parcellations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum YeoAtlas {
    Yeo7,
    Yeo17,
}

impl YeoAtlas {

    /// Both atlases, in the order they are processed.
    pub const ALL: [YeoAtlas; 2] = [YeoAtlas::Yeo7, YeoAtlas::Yeo17];

    /// The number of networks, excluding the background.
    pub fn num_networks(&self) -> usize {
        match self {
            YeoAtlas::Yeo7 => 7,
            YeoAtlas::Yeo17 => 17,
        }
    }

    /// The network names, where the name at index `i` belongs to label `i + 1`.
    pub fn network_names(&self) -> &'static [&'static str] {
        match self {
            YeoAtlas::Yeo7 => &YEO7_NAMES,
            YeoAtlas::Yeo17 => &YEO17_NAMES,
        }
    }

    /// Get the name of the network with the given label, `None` for the background label `0` and labels above
    /// [`YeoAtlas::num_networks`].
    pub fn network_name(&self, label: usize) -> Option<&'static str> {
        label.checked_sub(1).and_then(|idx| self.network_names().get(idx).copied())
    }

    /// The colortable of the atlas.
    pub fn colortable(&self) -> AtlasColortable {
        match self {
            YeoAtlas::Yeo7 => AtlasColortable::new(&YEO7_NAMES, &YEO7_COLORS),
            YeoAtlas::Yeo17 => AtlasColortable::new(&YEO17_NAMES, &YEO17_COLORS),
        }
    }

    /// The file name suffix identifying the atlas volume in a directory.
    pub fn file_suffix(&self) -> &'static str {
        match self {
            YeoAtlas::Yeo7 => "_yeo_7.nii",
            YeoAtlas::Yeo17 => "_yeo_17.nii",
        }
    }
}

impl fmt::Display for YeoAtlas {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Yeo {}", self.num_networks())
    }
}


/// The regions of an atlas with their display colors. Index `0` is the background, index `k` is the network with label `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct AtlasColortable {
    pub name: Vec<String>,
    pub r: Vec<u8>,
    pub g: Vec<u8>,
    pub b: Vec<u8>,
}

impl AtlasColortable {

    fn new(network_names: &[&str], colors: &[(u8, u8, u8)]) -> AtlasColortable {
        let mut name: Vec<String> = Vec::with_capacity(colors.len());
        name.push(String::from("background"));
        name.extend(network_names.iter().map(|n| n.to_string()));

        AtlasColortable {
            name,
            r: colors.iter().map(|c| c.0).collect(),
            g: colors.iter().map(|c| c.1).collect(),
            b: colors.iter().map(|c| c.2).collect(),
        }
    }

    /// Get the RGB color of the region with the given label.
    pub fn rgb(&self, label: usize) -> (u8, u8, u8) {
        (self.r[label], self.g[label], self.b[label])
    }

    /// The number of entries, including the background.
    pub fn len(&self) -> usize {
        self.name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }
}

impl fmt::Display for AtlasColortable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Colortable for {} brain networks.", self.len() - 1)
    }
}


/// Find the volume file of the given atlas in a directory.
///
/// All files whose names start with `prefix` are considered, sorted by name, and the first one
/// ending with the atlas suffix (see [`YeoAtlas::file_suffix`]), optionally followed by `.gz`, is returned.
pub fn find_atlas_file<P: AsRef<Path>>(dir: P, prefix: &str, atlas: YeoAtlas) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let mut candidates: Vec<String> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with(prefix) {
            candidates.push(file_name);
        }
    }
    candidates.sort();
    debug!("Atlas candidates in '{}': {:?}", dir.display(), candidates);

    let suffix = atlas.file_suffix();
    let suffix_gz = format!("{}.gz", suffix);
    candidates
        .iter()
        .find(|f| f.ends_with(suffix) || f.ends_with(&suffix_gz))
        .map(|f| dir.join(f))
        .ok_or_else(|| {
            YeonetsError::AtlasFileNotFound(format!(
                "no file matching '{}*{}' in '{}'",
                prefix,
                suffix,
                dir.display()
            ))
        })
}


/// A parcellation volume with validated integer labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelVolume {
    pub atlas: YeoAtlas,
    pub labels: Array3<u8>,
}

impl LabelVolume {

    /// Convert the voxel values of a NIfTI volume to network labels.
    ///
    /// Negative values are set to `0` (background). Values which are not within [`LABEL_TOLERANCE`] of an
    /// integer, or which exceed the number of networks, are rejected. Every network must occur at least once.
    pub fn from_nifti(volume: &NiftiVolume, atlas: YeoAtlas) -> Result<LabelVolume> {
        let num_networks = atlas.num_networks();
        let mut labels: Array3<u8> = Array3::zeros(volume.data.raw_dim());
        let mut counts: Vec<usize> = vec![0; num_networks + 1];

        for (label, value) in labels.iter_mut().zip(volume.data.iter()) {
            if !value.is_finite() {
                return Err(YeonetsError::InvalidLabelValue(*value));
            }
            let value = value.max(0.0);
            let rounded = value.round();
            if (value - rounded).abs() > LABEL_TOLERANCE || rounded > num_networks as f64 {
                return Err(YeonetsError::InvalidLabelValue(value));
            }
            *label = rounded as u8;
            counts[rounded as usize] += 1;
        }

        if let Some(missing) = (1..=num_networks).find(|&l| counts[l] == 0) {
            return Err(YeonetsError::MissingNetwork(missing));
        }

        info!(
            "{} atlas: {} voxels assigned to {} networks, {} background voxels.",
            atlas,
            counts[1..].iter().sum::<usize>(),
            num_networks,
            counts[0]
        );
        Ok(LabelVolume { atlas, labels })
    }

    /// Load and validate an atlas volume from a NIfTI file.
    pub fn from_file<P: AsRef<Path>>(path: P, atlas: YeoAtlas) -> Result<LabelVolume> {
        info!("Loading {} atlas from '{}'.", atlas, path.as_ref().display());
        let volume = NiftiVolume::from_file(path)?;
        LabelVolume::from_nifti(&volume, atlas)
    }

    /// Get the number of voxels with the given label.
    pub fn num_voxels(&self, label: usize) -> usize {
        self.labels.iter().filter(|&&l| l as usize == label).count()
    }

    pub fn shape(&self) -> Vec<usize> {
        self.labels.shape().to_vec()
    }
}
