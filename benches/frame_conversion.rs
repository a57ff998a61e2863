use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use gal_orbits::integrator::{GalacticModelIntegrator, IntegrationRequest, OrbitIntegrator};
use gal_orbits::ref_system::{equatorial_to_galactic_pm, galactic_to_equatorial};

/// Deterministic sky grid avoiding the Galactic poles.
fn sky_samples(n: usize) -> Vec<(f64, f64, f64, f64)> {
    (0..n)
        .map(|i| {
            let f = i as f64 / n as f64;
            let l = (f * 3607.0).rem_euclid(360.0);
            let b = -89.0 + 178.0 * ((f * 17.0).fract());
            (l, b, 5.0 * (f * 11.0).sin(), -3.0 * (f * 7.0).cos())
        })
        .collect()
}

fn bench_positions(c: &mut Criterion) {
    let samples = sky_samples(10_000);
    c.bench_function("galactic_to_equatorial/10k", |b| {
        b.iter(|| {
            for &(l, b_deg, _, _) in &samples {
                let _ = black_box(galactic_to_equatorial(black_box(l), black_box(b_deg)));
            }
        })
    });
}

fn bench_proper_motions(c: &mut Criterion) {
    let samples = sky_samples(10_000);
    c.bench_function("equatorial_to_galactic_pm/10k", |b| {
        b.iter(|| {
            for &(l, b_deg, pmra, pmde) in &samples {
                let _ = black_box(equatorial_to_galactic_pm(l, b_deg, pmra, pmde));
            }
        })
    });
}

fn bench_orbit(c: &mut Criterion) {
    let request = IntegrationRequest {
        initial_radius: 1.2,
        longitude_deg: 200.0,
        latitude_deg: 12.5,
        radial_velocity: 35.0,
        pm_l_cosb: -2.93,
        pm_b: -0.62,
        t_start: 0.0,
        t_end: 1000.0,
        mass_disc: 100.0,
        mass_sphere: 30.0,
        reverse: false,
        rtol: 1e-9,
        atol: 1e-9,
    };

    let mut group = c.benchmark_group("integrate");
    group.sample_size(20);
    group.bench_function("1Gyr/1000_samples", |b| {
        b.iter_batched(
            || GalacticModelIntegrator::new(1000),
            |integrator| black_box(integrator.integrate(&request)),
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_positions, bench_proper_motions, bench_orbit);
criterion_main!(benches);
