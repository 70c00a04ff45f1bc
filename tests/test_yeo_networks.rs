mod common;

use approx::assert_abs_diff_eq;
use ndarray::Array3;
use tempfile::tempdir;

use yeonets::atlas::DEFAULT_ATLAS_PREFIX;
use yeonets::{
    extract_network_values, find_atlas_file, order_by_mean, output_file_name, read_nifti, render_boxplot,
    sorted_by_mean, stats_table_file_name, write_nifti, write_stats_table, LabelVolume, PlotStyle, YeoAtlas,
    YeonetsError,
};

#[test]
fn the_17_networks_are_ordered_by_mean() {
    let dir = tempdir().unwrap();
    let stat_map = read_nifti(common::write_fixture(dir.path())).unwrap();

    let atlas_file = find_atlas_file(dir.path(), DEFAULT_ATLAS_PREFIX, YeoAtlas::Yeo17).unwrap();
    let labels = LabelVolume::from_file(&atlas_file, YeoAtlas::Yeo17).unwrap();
    assert_eq!(common::NY * common::NZ, labels.num_voxels(0));

    let nets = extract_network_values(&labels, &stat_map).unwrap();
    assert_eq!(17, nets.len());
    for net in nets.iter() {
        assert_eq!(common::NY * common::NZ, net.values.len());
        // 20 - label, plus the mean offset along y and z.
        assert_abs_diff_eq!(20.0 - net.label as f64 + 0.75 + 0.125, net.mean(), epsilon = 1e-9);
    }

    let sorted = sorted_by_mean(&nets);
    assert_eq!("Default B", sorted[0].name);
    assert_eq!((205, 62, 78), sorted[0].color);
    assert_eq!("Visual A", sorted[16].name);
    assert_eq!((120, 18, 134), sorted[16].color);
}

#[test]
fn the_7_networks_keep_label_order_on_ties() {
    let dir = tempdir().unwrap();
    let stat_map = read_nifti(common::write_fixture(dir.path())).unwrap();

    let atlas_file = find_atlas_file(dir.path(), DEFAULT_ATLAS_PREFIX, YeoAtlas::Yeo7).unwrap();
    let labels = LabelVolume::from_file(&atlas_file, YeoAtlas::Yeo7).unwrap();
    let nets = extract_network_values(&labels, &stat_map).unwrap();

    // Label 1 covers three slabs, all others two. Labels 1 and 5 share the mean 11.875.
    assert_eq!(24, nets[0].values.len());
    assert_eq!(11.875, nets[0].mean());
    assert_eq!(11.875, nets[4].mean());

    let order: Vec<usize> = order_by_mean(&nets).iter().map(|&i| nets[i].label).collect();
    assert_eq!(vec![7, 6, 1, 5, 4, 3, 2], order);
}

#[test]
fn the_stats_table_is_written_in_label_order() {
    let dir = tempdir().unwrap();
    let stat_map = read_nifti(common::write_fixture(dir.path())).unwrap();
    let labels = LabelVolume::from_file(dir.path().join(common::ATLAS_7_FILE), YeoAtlas::Yeo7).unwrap();
    let nets = extract_network_values(&labels, &stat_map).unwrap();

    let table = dir.path().join(stats_table_file_name(YeoAtlas::Yeo7));
    write_stats_table(&table, &nets).unwrap();

    let mut rdr = csv::Reader::from_path(&table).unwrap();
    let names: Vec<String> = rdr.records().map(|r| r.unwrap()[1].to_string()).collect();
    let expected: Vec<String> = YeoAtlas::Yeo7.network_names().iter().map(|s| s.to_string()).collect();
    assert_eq!(expected, names);
}

#[test]
fn volumes_on_different_grids_are_rejected() {
    let dir = tempdir().unwrap();
    common::write_fixture(dir.path());
    let other_grid = dir.path().join("other_grid.nii");
    write_nifti(&other_grid, &Array3::zeros((common::NX, common::NY, 3)), [2.0, 2.0, 2.0]).unwrap();

    let labels = LabelVolume::from_file(dir.path().join(common::ATLAS_7_FILE), YeoAtlas::Yeo7).unwrap();
    let err = extract_network_values(&labels, &read_nifti(&other_grid).unwrap()).unwrap_err();
    assert!(matches!(err, YeonetsError::ShapeMismatch(_, _)));
}

#[test]
fn the_atlases_must_not_be_swapped() {
    let dir = tempdir().unwrap();
    common::write_fixture(dir.path());

    // The 17 network volume has labels up to 17, which is invalid for the 7 network atlas.
    let err = LabelVolume::from_file(dir.path().join(common::ATLAS_17_FILE), YeoAtlas::Yeo7).unwrap_err();
    assert!(matches!(err, YeonetsError::InvalidLabelValue(_)));

    // The 7 network volume lacks labels 8 to 17.
    let err = LabelVolume::from_file(dir.path().join(common::ATLAS_7_FILE), YeoAtlas::Yeo17).unwrap_err();
    assert!(matches!(err, YeonetsError::MissingNetwork(8)));
}

/// The image size stored in the IHDR chunk of a PNG file.
fn png_size(bytes: &[u8]) -> (u32, u32) {
    let be = |at: usize| u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
    (be(16), be(20))
}

#[test]
fn the_boxplot_is_saved_as_png() {
    let dir = tempdir().unwrap();
    let stat_map = read_nifti(common::write_fixture(dir.path())).unwrap();

    for atlas in YeoAtlas::ALL.iter() {
        let atlas_file = find_atlas_file(dir.path(), DEFAULT_ATLAS_PREFIX, *atlas).unwrap();
        let labels = LabelVolume::from_file(&atlas_file, *atlas).unwrap();
        let sorted = sorted_by_mean(&extract_network_values(&labels, &stat_map).unwrap());

        let mut style = PlotStyle::for_atlas(*atlas);
        style.dpi = 50;
        style.show_outliers = true;
        let png = dir.path().join(output_file_name(*atlas));
        render_boxplot(&sorted, &style, &png).unwrap();

        let bytes = std::fs::read(&png).unwrap();
        assert_eq!(&[0x89, b'P', b'N', b'G'], &bytes[0..4]);
        assert_eq!(style.figure_pixels(), png_size(&bytes));
    }
}

#[test]
fn nothing_to_draw_is_an_error() {
    let dir = tempdir().unwrap();
    let png = dir.path().join(output_file_name(YeoAtlas::Yeo7));
    let err = render_boxplot(&[], &PlotStyle::for_atlas(YeoAtlas::Yeo7), &png).unwrap_err();
    assert!(matches!(err, YeonetsError::Plot(_)));
    assert!(!png.exists());
}
