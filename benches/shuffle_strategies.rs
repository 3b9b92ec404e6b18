use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::prelude::*;
use seidel::{BuildConfig, PointLocator, Shuffle, TrapezoidalMap, DEFAULT_SEED};

/// A comb whose teeth point up: edges inserted in polygon order make a deep search structure.
fn comb(teeth: usize) -> Vec<[f64; 2]> {
    let mut points = vec![[teeth as f64, 0.]];
    points.extend((0..teeth).rev().flat_map(|i| {
        let x = i as f64;
        [[x + 0.75, 1.], [x + 0.5, 0.1], [x + 0.25, 1.], [x, 0.1]]
    }));
    points.push([0., 0.]);
    points
}

fn bench(c: &mut Criterion) {
    let teeth = 500;
    let polygon = comb(teeth);
    let strategies = [
        Shuffle::None,
        Shuffle::Lcg { seed: DEFAULT_SEED },
        Shuffle::ChaCha8 { seed: DEFAULT_SEED },
    ];

    let mut rng = rand::thread_rng();
    let query: Vec<_> = (0..4_200)
        .map(|_| [rng.gen::<f64>() * teeth as f64, rng.gen::<f64>()])
        .collect();

    let mut group = c.benchmark_group("Shuffle strategies");
    for shuffle in strategies {
        let config = BuildConfig::default().shuffle(shuffle);
        group.bench_with_input(BenchmarkId::new("Build", shuffle), &polygon, |b, p| {
            b.iter(|| TrapezoidalMap::from_polygon(p.iter().copied(), config));
        });

        let trap_map =
            TrapezoidalMap::from_polygon(polygon.iter().copied(), config).expect("combs are simple");
        group.bench_with_input(BenchmarkId::new("Locate", shuffle), &query, |b, q| {
            b.iter(|| trap_map.locate_many(q));
        });
    }
    group.finish();
}

criterion_group!(benches, bench);
criterion_main!(benches);
