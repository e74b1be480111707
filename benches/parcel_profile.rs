//! Run these benches with `cargo bench --bench parcel_profile -- --verbose`
use criterion::{criterion_group, criterion_main, Criterion};

mod utils;

fn build_tester() -> Criterion {
    Criterion::default()
        .sample_size(200)
        .measurement_time(std::time::Duration::from_secs(10))
        .noise_threshold(0.03)
        .significance_level(0.01)
}

criterion_main!(parcel_profile_benches);

criterion_group!(
    name = parcel_profile_benches;
    config = build_tester();
    targets = lift_parcel_bench, integrate_bench, fine_step_ascent_bench, analyze_bench
);

fn lift_parcel_bench(c: &mut Criterion) {
    use sounding_thermo::{Parcel, SoundingProfile};

    let config = sounding_thermo::AnalysisConfig::default();
    let snds = utils::load_all_test_files().to_vec();

    let pairs: Vec<(SoundingProfile, Parcel)> = snds
        .into_iter()
        .map(|snd| {
            let parcel = sounding_thermo::parcel::mixed_layer_parcel(&snd).unwrap();
            (snd, parcel)
        })
        .collect();

    c.bench_function("lift_parcel", |b| {
        b.iter(|| {
            for (snd, parcel) in &pairs {
                let _x = sounding_thermo::parcel_profile::lift_parcel(snd, *parcel, &config)
                    .expect("oops");
            }
        });
    });
}

fn integrate_bench(c: &mut Criterion) {
    use sounding_thermo::{ParcelPath, SoundingProfile};

    let config = sounding_thermo::AnalysisConfig::default();
    let snds = utils::load_all_test_files().to_vec();

    let pairs: Vec<(SoundingProfile, ParcelPath)> = snds
        .into_iter()
        .map(|snd| {
            let parcel = sounding_thermo::parcel::surface_parcel(&snd);
            let path =
                sounding_thermo::parcel_profile::lift_parcel(&snd, parcel, &config).unwrap();
            (snd, path)
        })
        .collect();

    c.bench_function("integrate", |b| {
        b.iter(|| {
            for (snd, path) in &pairs {
                let _x = sounding_thermo::parcel_profile::integrate(snd, path, &config)
                    .expect("oops");
            }
        });
    });
}

fn fine_step_ascent_bench(c: &mut Criterion) {
    let config = sounding_thermo::AnalysisConfig {
        pressure_step: 1.0,
        ..sounding_thermo::AnalysisConfig::default()
    };
    let snds = utils::load_all_test_files();

    c.bench_function("parcel_ascent_analysis_1hPa", |b| {
        b.iter(|| {
            for snd in &snds {
                let parcel = sounding_thermo::parcel::surface_parcel(snd);
                let _x =
                    sounding_thermo::parcel_profile::parcel_ascent_analysis(snd, parcel, &config)
                        .expect("oops");
            }
        });
    });
}

fn analyze_bench(c: &mut Criterion) {
    let config = sounding_thermo::AnalysisConfig::default();
    let snds = utils::load_all_test_files();

    c.bench_function("analyze", |b| {
        b.iter(|| {
            for snd in &snds {
                let _x = sounding_thermo::analyze(snd, &config).expect("oops").summary();
            }
        });
    });
}
