//! Per-network summary tables in CSV format.

use csv::WriterBuilder;
use log::info;

use std::path::Path;

use crate::atlas::YeoAtlas;
use crate::error::Result;
use crate::extract::NetworkValues;

pub const STATS_TABLE_COLUMNS: [&str; 6] = ["Network ID", "Network name", "Voxels", "Mean", "Median", "Std"];

/// The CSV file name for the statistics table of the given atlas.
pub fn stats_table_file_name(atlas: YeoAtlas) -> String {
    format!("Yeo_{}_nets_stats.csv", atlas.num_networks())
}


/// Write one row per network with its label, name, number of values, mean, median and standard deviation.
///
/// Rows are written in the order of `networks`; pass them in label order for a table that matches the atlas.
pub fn write_stats_table<P: AsRef<Path>>(path: P, networks: &[NetworkValues]) -> Result<()> {
    let mut wtr = WriterBuilder::new()
        .has_headers(true)
        .from_path(path.as_ref())?;

    wtr.write_record(&STATS_TABLE_COLUMNS)?;
    for net in networks.iter() {
        let stats = net.box_stats()?;
        wtr.write_record(&[
            net.label.to_string(),
            net.name.clone(),
            stats.count.to_string(),
            stats.mean.to_string(),
            stats.median.to_string(),
            stats.std.to_string(),
        ])?;
    }
    wtr.flush()?;

    info!("Statistics for {} networks written to '{}'.", networks.len(), path.as_ref().display());
    Ok(())
}
