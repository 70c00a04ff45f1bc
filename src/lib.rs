//! Distributions of volumetric brain map values within the Yeo functional networks.
//!
//! The brain map and the Yeo 7 and 17 network atlases are read from NIfTI files which share the same voxel grid.
//! The map values are grouped by network, the networks are ordered by their mean value and drawn as box-plots
//! in the colors of the original publication.

pub mod atlas;
pub mod boxplot;
pub mod error;
pub mod extract;
pub mod nifti;
pub mod report;
pub mod stats;
pub mod util;

pub use atlas::{find_atlas_file, AtlasColortable, LabelVolume, YeoAtlas};
pub use boxplot::{output_file_name, render_boxplot, PlotStyle};
pub use error::{Result, YeonetsError};
pub use extract::{extract_network_values, order_by_mean, sorted_by_mean, NetworkValues};
pub use nifti::{read_nifti, write_nifti, NiftiHeader, NiftiVolume};
pub use report::{stats_table_file_name, write_stats_table};
pub use stats::BoxStats;
