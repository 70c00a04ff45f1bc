//!
//! yeonets -- box-plots of brain map values within the Yeo 7 and 17 functional networks
//!
//! Expects the brain map and the atlas volumes to be aligned to the same voxel grid already.
//! Run with `--help` for the options. The defaults match the layout './Data/stat_map.nii' for the
//! brain map and './results/' for the resliced atlases and the output.

use clap::{Parser, ValueEnum};
use log::{error, info};

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use yeonets::atlas::DEFAULT_ATLAS_PREFIX;
use yeonets::{
    extract_network_values, find_atlas_file, output_file_name, read_nifti, render_boxplot, sorted_by_mean,
    stats_table_file_name, write_stats_table, LabelVolume, NiftiVolume, PlotStyle, Result, YeoAtlas,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AtlasChoice {
    #[value(name = "7")]
    Seven,
    #[value(name = "17")]
    Seventeen,
    Both,
}

impl AtlasChoice {
    fn atlases(&self) -> Vec<YeoAtlas> {
        match self {
            AtlasChoice::Seven => vec![YeoAtlas::Yeo7],
            AtlasChoice::Seventeen => vec![YeoAtlas::Yeo17],
            AtlasChoice::Both => YeoAtlas::ALL.to_vec(),
        }
    }
}

/// Box-plots of the values of a 3D brain map within the Yeo functional networks
#[derive(Parser, Debug)]
#[command(name = "yeonets", version, long_about = None)]
struct Args {
    /// Path to the 3D brain map (NIfTI, .nii or .nii.gz)
    #[arg(long, default_value = "./Data/stat_map.nii")]
    stat_map: PathBuf,

    /// Directory containing the Yeo atlas volumes resliced to the brain map
    #[arg(long, default_value = "./results/")]
    atlas_dir: PathBuf,

    /// File name prefix of the atlas volumes
    #[arg(long, default_value = DEFAULT_ATLAS_PREFIX)]
    atlas_prefix: String,

    /// Directory the figures and tables are written to, created if missing
    #[arg(short, long, default_value = "./results/")]
    output_dir: PathBuf,

    /// Which parcellation to process
    #[arg(long, value_enum, default_value_t = AtlasChoice::Both)]
    atlas: AtlasChoice,

    /// Figure resolution in dots per inch
    #[arg(long, default_value_t = 300)]
    dpi: u32,

    /// Draw values beyond the whiskers
    #[arg(long, default_value_t = false)]
    show_outliers: bool,

    /// Do not write the per-network statistics CSV table
    #[arg(long, default_value_t = false)]
    no_stats_table: bool,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}


fn process_atlas(args: &Args, atlas: YeoAtlas, stat_map: &NiftiVolume) -> Result<()> {
    let atlas_file = find_atlas_file(&args.atlas_dir, &args.atlas_prefix, atlas)?;
    let labels = LabelVolume::from_file(&atlas_file, atlas)?;

    let networks = extract_network_values(&labels, stat_map)?;
    let sorted = sorted_by_mean(&networks);
    for net in sorted.iter() {
        info!("  {:<20} n={:<8} mean={:.4}", net.name, net.values.len(), net.mean());
    }

    let mut style = PlotStyle::for_atlas(atlas);
    style.dpi = args.dpi;
    style.show_outliers = args.show_outliers;
    render_boxplot(&sorted, &style, args.output_dir.join(output_file_name(atlas)))?;

    if !args.no_stats_table {
        write_stats_table(args.output_dir.join(stats_table_file_name(atlas)), &networks)?;
    }
    Ok(())
}


fn run(args: &Args) -> Result<()> {
    info!("Loading brain map from '{}'.", args.stat_map.display());
    let stat_map = read_nifti(&args.stat_map)?;
    info!("{}", stat_map);

    fs::create_dir_all(&args.output_dir)?;

    for atlas in args.atlas.atlases() {
        info!("Processing {} networks.", atlas);
        process_atlas(args, atlas, &stat_map)?;
    }
    Ok(())
}


fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .parse_default_env()
        .init();

    match run(&args) {
        Ok(()) => {
            info!("Done, results are in '{}'.", args.output_dir.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
