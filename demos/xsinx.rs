use egobox_gpr::GaussianProcess;
use linfa::prelude::*;
use ndarray::{arr2, array, concatenate, Array, Array1, Array2, Axis};

fn xsinx(x: &Array2<f64>) -> Array1<f64> {
    ((x - 3.5) * ((x - 3.5) / std::f64::consts::PI).mapv(|v| v.sin())).remove_axis(Axis(1))
}

fn main() {
    env_logger::init();

    let xt = arr2(&[[0.0], [5.0], [10.0], [15.0], [18.0], [20.0], [25.0]]);
    let yt = xsinx(&xt);

    println!("Train GP surrogate of 'xsinx' at {}", xt.column(0));
    let mut gp = GaussianProcess::<f64>::params(1, "CovSum(CovSEiso, CovNoise)")
        .loghyper(array![f64::ln(3.), f64::ln(10.), f64::ln(0.1)])
        .fit(&Dataset::new(xt, yt))
        .expect("GP fitting");
    println!("{gp}");
    println!(
        "log likelihood = {}, gradient = {}",
        gp.log_likelihood().expect("GP likelihood"),
        gp.log_likelihood_gradient().expect("GP likelihood gradient")
    );

    let xtest = Array::linspace(0., 25., 26).insert_axis(Axis(1));
    let ytest = xsinx(&xtest);
    let (ypred, yvar) = gp
        .predict_valvar_values(&xtest)
        .expect("GP prediction");
    // predict standard deviation
    let ysigma = yvar
        .expect("GP variance")
        .mapv(|v| v.max(0.).sqrt());

    println!("Compute prediction errors (x, err(x), sigma(x))");
    println!(
        "{}",
        concatenate![
            Axis(1),
            xtest,
            (ypred - ytest).insert_axis(Axis(1)),
            ysigma.insert_axis(Axis(1))
        ]
    );
}
