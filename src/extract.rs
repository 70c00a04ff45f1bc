//! Extraction of brain map values per atlas network, and ordering of networks by their mean value.

use log::{debug, warn};

use std::fmt;

use crate::atlas::{LabelVolume, YeoAtlas};
use crate::error::{Result, YeonetsError};
use crate::nifti::NiftiVolume;
use crate::stats::BoxStats;

/// The brain map values inside one network, together with the network's identity and display color.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkValues {
    pub label: usize,
    pub name: String,
    pub color: (u8, u8, u8),
    pub values: Vec<f64>,
}

impl NetworkValues {

    /// The mean of the values. `NaN` if there are no values.
    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / self.values.len() as f64
    }

    /// Compute the box-plot statistics of the values.
    pub fn box_stats(&self) -> Result<BoxStats> {
        BoxStats::from_values(&self.values, self.label)
    }
}

impl fmt::Display for NetworkValues {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Network {} '{}' with {} values.", self.label, self.name, self.values.len())
    }
}


/// Collect the values of the brain map for every network of the atlas.
///
/// The result contains one entry per network, in label order `1..=N`. Background voxels (label `0`) are ignored,
/// as are non-finite brain map values. A network without any finite value is an error.
pub fn extract_network_values(labels: &LabelVolume, stat_map: &NiftiVolume) -> Result<Vec<NetworkValues>> {
    if labels.shape() != stat_map.shape() {
        return Err(YeonetsError::ShapeMismatch(stat_map.shape(), labels.shape()));
    }

    let atlas: YeoAtlas = labels.atlas;
    let colortable = atlas.colortable();
    let mut networks: Vec<NetworkValues> = (1..=atlas.num_networks())
        .map(|label| NetworkValues {
            label,
            name: colortable.name[label].clone(),
            color: colortable.rgb(label),
            values: Vec::with_capacity(labels.num_voxels(label)),
        })
        .collect();

    let mut num_skipped: usize = 0;
    for (&label, &value) in labels.labels.iter().zip(stat_map.data.iter()) {
        if label == 0 {
            continue;
        }
        if !value.is_finite() {
            num_skipped += 1;
            continue;
        }
        match networks.get_mut(label as usize - 1) {
            Some(net) => net.values.push(value),
            None => return Err(YeonetsError::InvalidLabelValue(label as f64)),
        }
    }

    if num_skipped > 0 {
        warn!("{} atlas: skipped {} non-finite brain map values inside networks.", atlas, num_skipped);
    }

    for net in networks.iter() {
        if net.values.is_empty() {
            return Err(YeonetsError::EmptyNetwork(net.label));
        }
        debug!("{}", net);
    }
    Ok(networks)
}


/// Returns the indices that sort the networks by ascending mean value. Ties keep their original order.
pub fn order_by_mean(networks: &[NetworkValues]) -> Vec<usize> {
    let means: Vec<f64> = networks.iter().map(|n| n.mean()).collect();
    let mut order: Vec<usize> = (0..networks.len()).collect();
    order.sort_by(|&a, &b| means[a].total_cmp(&means[b]));
    order
}


/// Reorder the networks by ascending mean value, see [`order_by_mean`]. Names and colors stay with their network.
pub fn sorted_by_mean(networks: &[NetworkValues]) -> Vec<NetworkValues> {
    order_by_mean(networks)
        .into_iter()
        .map(|idx| networks[idx].clone())
        .collect()
}
