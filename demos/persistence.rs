use egobox_gpr::GaussianProcess;
use ndarray::array;
use std::path::Path;

fn main() {
    env_logger::init();

    let mut gp = GaussianProcess::<f64>::from_definition(2, "CovSum(CovMatern5iso, CovNoise)")
        .expect("GP creation");
    gp.set_loghyper(&array![0., 0., -3.])
        .expect("valid log-hyperparameters");
    for (x, y) in [([0., 0.], 0.), ([1., 0.], 1.), ([0., 1.], -1.), ([1., 1.], 0.5)] {
        gp.add_pattern(&array![x[0], x[1]], y)
            .expect("valid sample");
    }

    let outdir = Path::new("target").join("demos");
    std::fs::create_dir_all(&outdir).expect("output directory");
    let filename = outdir.join("gp.txt");
    gp.save(&filename).expect("GP saving");
    println!("{gp} saved in {}", filename.display());

    let mut loaded = GaussianProcess::<f64>::load(&filename).expect("GP loading");
    let x = array![0.5, 0.5];
    let (mean, var) = loaded.predict_valvar(&x).expect("GP prediction");
    println!("Reloaded {loaded}");
    println!("predict({x}) = {mean} (variance = {:?})", var);
    assert_eq!(
        (mean, var),
        gp.predict_valvar(&x).expect("GP prediction")
    );
}
