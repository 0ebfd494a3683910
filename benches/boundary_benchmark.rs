use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use geo::Point;
use region_atlas::models::{LngLat, Region};
use region_atlas::services::boundary::{boundary_geometry, circular_boundary};

/// Build a grid of regions with computed boundaries, spaced ~5.5 km apart.
fn region_grid(count: usize) -> Vec<Region> {
    (0..count)
        .map(|i| {
            let lng = (i % 10) as f64 * 0.05;
            let lat = (i / 10) as f64 * 0.05;
            let center = LngLat::new(lng, lat);
            Region {
                id: format!("region-{}", i),
                name: format!("Region {}", i),
                coordinates: center,
                address: None,
                user: None,
                boundary: Some(boundary_geometry(center, 1000.0, 12)),
                created_at: Utc::now(),
                updated_at: Utc::now(),
            }
        })
        .collect()
}

fn benchmark_boundary(c: &mut Criterion) {
    let center = LngLat::new(-46.6333, -23.5505);

    c.bench_function("circular_boundary_12_sides", |b| {
        b.iter(|| circular_boundary(black_box(center), 1000.0, 12))
    });

    c.bench_function("circular_boundary_360_sides", |b| {
        b.iter(|| circular_boundary(black_box(center), 1000.0, 360))
    });

    let regions = region_grid(100);
    let inside = Point::new(0.0, 0.0);
    let outside = Point::new(5.0, 5.0);

    let mut group = c.benchmark_group("containment_scan");

    group.bench_function("point_inside_one_region", |b| {
        b.iter(|| {
            regions
                .iter()
                .filter(|r| r.contains(black_box(&inside)))
                .count()
        })
    });

    group.bench_function("point_outside_all_regions", |b| {
        b.iter(|| {
            regions
                .iter()
                .filter(|r| r.contains(black_box(&outside)))
                .count()
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_boundary);
criterion_main!(benches);
