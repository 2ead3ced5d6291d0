use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use egobox_gpr::GaussianProcess;
use linfa::prelude::{Dataset, Fit};
use ndarray::{Array1, Array2, Axis};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand_xoshiro::Xoshiro256Plus;

fn criterion_gp(c: &mut Criterion) {
    let dims = [2, 5, 10];
    let nts = [100, 200, 400];

    let mut group = c.benchmark_group("gp");
    group.sample_size(20);
    for i in 0..dims.len() {
        let dim = dims[i];
        let nt = nts[i];
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let xt = Array2::random_using((nt, dim), Uniform::new(-2., 2.), &mut rng);
        let yt: Array1<f64> = xt.map_axis(Axis(1), |x| x.mapv(|v| v.sin()).sum());
        let dataset = Dataset::new(xt, yt);
        let params = GaussianProcess::<f64>::params(dim, "CovSum(CovSEard, CovNoise)");
        let x = Array1::from_elem(dim, 0.5);

        // factorization on first prediction
        group.bench_function(format!("gp rebuild {dim}x{nt}"), |b| {
            b.iter_batched(
                || params.fit(&dataset).expect("GP fit error"),
                |mut gp| std::hint::black_box(gp.predict_valvar(&x).expect("GP prediction")),
                BatchSize::LargeInput,
            )
        });

        let mut gp = params.fit(&dataset).expect("GP fit error");
        gp.predict(&x).expect("GP prediction");
        group.bench_function(format!("gp cached predict {dim}x{nt}"), |b| {
            b.iter(|| std::hint::black_box(gp.predict_valvar(&x).expect("GP prediction")))
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_gp);
criterion_main!(benches);
