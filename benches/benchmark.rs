use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::{Array, Array3};
use yeonets::{
    extract_network_values, sorted_by_mean, BoxStats, LabelVolume, NiftiHeader, NiftiVolume, NetworkValues,
    YeoAtlas,
};

// A grid the size of a 2mm MNI152 volume.
const DIMS: (usize, usize, usize) = (91, 109, 91);

fn yeo17_volume() -> LabelVolume {
    let labels: Array3<u8> = Array::from_shape_fn(DIMS, |(x, y, z)| ((x + y + z) % 18) as u8);
    LabelVolume { atlas: YeoAtlas::Yeo17, labels }
}

fn brain_map() -> NiftiVolume {
    let data: Array3<f64> = Array::from_shape_fn(DIMS, |(x, y, z)| ((x * 7 + y * 3 + z) % 101) as f64 / 10.0);
    NiftiVolume { header: NiftiHeader::default(), data }
}

fn extract_and_sort(labels: &LabelVolume, map: &NiftiVolume) -> Vec<NetworkValues> {
    sorted_by_mean(&extract_network_values(labels, map).unwrap())
}

fn box_stats(networks: &[NetworkValues]) -> Vec<BoxStats> {
    networks.iter().map(|n| n.box_stats().unwrap()).collect()
}

fn bench_networks(c: &mut Criterion) {
    let labels = yeo17_volume();
    let map = brain_map();
    let networks = extract_and_sort(&labels, &map);

    c.bench_function("extract_and_sort_yeo17", |b| {
        b.iter(|| extract_and_sort(black_box(&labels), black_box(&map)))
    });
    c.bench_function("box_stats_yeo17", |b| {
        b.iter(|| box_stats(black_box(&networks)))
    });
}

criterion_group!(benches, bench_networks);
criterion_main!(benches);
