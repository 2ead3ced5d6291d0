//! A module for covariance functions (aka kernels) used by the GP regression engine.
//!
//! Every covariance function owns a vector of hyperparameters stored in log space.
//!
//! The following atomic covariance functions are implemented:
//! * isotropic squared exponential (`CovSEiso`),
//! * squared exponential with automatic relevance determination (`CovSEard`),
//! * isotropic matern 3/2 (`CovMatern3iso`),
//! * isotropic matern 5/2 (`CovMatern5iso`),
//! * isotropic rational quadratic (`CovRQiso`),
//! * linear with automatic relevance determination (`CovLinearard`),
//! * linear with bias (`CovLinearone`),
//! * independent noise (`CovNoise`).
//!
//! Compound covariance functions combine two covariance functions:
//! * sum (`CovSum`),
//! * product (`CovProd`).

use crate::errors::{check_dim, GpError, Result};
use crate::utils::{same_observation, squared_distance};
use linfa::Float;
use ndarray::{array, concatenate, s, Array1, ArrayView1, Axis, Zip};
use std::fmt;

/// A trait for covariance functions used in GP regression.
///
/// Implementations are expected to be symmetric, `get(x1, x2) == get(x2, x1)`,
/// as the engine only evaluates the lower triangle of the kernel matrix.
///
/// `get` and `grad` expect both vectors to have `input_dim` components and do not
/// check it: the [`GaussianProcess`](crate::GaussianProcess) validates dimensions
/// beforehand, direct callers have to do the same.
pub trait CovarianceFunction<F: Float>: fmt::Display + fmt::Debug + Send {
    /// Dimension of the input vectors
    fn input_dim(&self) -> usize;

    /// Number of hyperparameters
    fn param_dim(&self) -> usize;

    /// Snapshot of the current log-hyperparameters (param_dim,)
    fn loghyper(&self) -> Array1<F>;

    /// Replace the whole log-hyperparameter vector.
    ///
    /// Fails with [`GpError::InvalidParameter`] if `p` has not `param_dim` components,
    /// in which case current hyperparameters are left unchanged.
    fn set_loghyper(&mut self, p: &ArrayView1<F>) -> Result<()>;

    /// Covariance of the two `input_dim` dimensional vectors `x1` and `x2`
    fn get(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F;

    /// Gradient of the covariance of `x1` and `x2` with respect to
    /// the log-hyperparameters (param_dim,)
    fn grad(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> Array1<F>;
}

/// Isotropic squared exponential covariance function
///
/// k(x1, x2) = sf2 * exp(-|x1 - x2|^2 / (2 * ell^2))
///
/// with log-hyperparameters `[ln(ell), ln(sf)]`
#[derive(Clone, Debug, PartialEq)]
pub struct SquaredExponentialIsoCov<F: Float> {
    input_dim: usize,
    loghyper: Array1<F>,
    ell2: F,
    sf2: F,
}

impl<F: Float> SquaredExponentialIsoCov<F> {
    /// Constructor with zero log-hyperparameters, i.e. ell = 1 and sf2 = 1
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            loghyper: Array1::zeros(2),
            ell2: F::one(),
            sf2: F::one(),
        }
    }

    fn update(&mut self) {
        self.ell2 = F::exp(F::cast(2.) * self.loghyper[0]);
        self.sf2 = F::exp(F::cast(2.) * self.loghyper[1]);
    }
}

impl<F: Float> CovarianceFunction<F> for SquaredExponentialIsoCov<F> {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn param_dim(&self) -> usize {
        2
    }

    fn loghyper(&self) -> Array1<F> {
        self.loghyper.to_owned()
    }

    fn set_loghyper(&mut self, p: &ArrayView1<F>) -> Result<()> {
        check_dim(self.param_dim(), p.len())?;
        self.loghyper.assign(p);
        self.update();
        Ok(())
    }

    fn get(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
        let z = squared_distance(x1, x2) / self.ell2;
        self.sf2 * F::exp(F::cast(-0.5) * z)
    }

    fn grad(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> Array1<F> {
        let z = squared_distance(x1, x2) / self.ell2;
        let k = self.sf2 * F::exp(F::cast(-0.5) * z);
        array![k * z, F::cast(2.) * k]
    }
}

impl<F: Float> fmt::Display for SquaredExponentialIsoCov<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CovSEiso")
    }
}

/// Squared exponential covariance function with automatic relevance determination
///
/// ```text
///                    n
/// k(x1, x2) = sf2 * exp( -1/2 * sum ((x1_d - x2_d) / ell_d)^2 )
///                   d=1
/// ```
///
/// with log-hyperparameters `[ln(ell_1), ..., ln(ell_n), ln(sf)]`
#[derive(Clone, Debug, PartialEq)]
pub struct SquaredExponentialArdCov<F: Float> {
    input_dim: usize,
    loghyper: Array1<F>,
    ell: Array1<F>,
    sf2: F,
}

impl<F: Float> SquaredExponentialArdCov<F> {
    /// Constructor with zero log-hyperparameters
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            loghyper: Array1::zeros(input_dim + 1),
            ell: Array1::ones(input_dim),
            sf2: F::one(),
        }
    }

    fn update(&mut self) {
        let n = self.input_dim;
        self.ell = self.loghyper.slice(s![..n]).mapv(|v| F::exp(v));
        self.sf2 = F::exp(F::cast(2.) * self.loghyper[n]);
    }

    fn scaled_squared_diffs(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> Array1<F> {
        let mut d2 = x1 - x2;
        Zip::from(&mut d2).and(&self.ell).for_each(|d, ell| {
            let v = *d / *ell;
            *d = v * v;
        });
        d2
    }
}

impl<F: Float> CovarianceFunction<F> for SquaredExponentialArdCov<F> {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn param_dim(&self) -> usize {
        self.input_dim + 1
    }

    fn loghyper(&self) -> Array1<F> {
        self.loghyper.to_owned()
    }

    fn set_loghyper(&mut self, p: &ArrayView1<F>) -> Result<()> {
        check_dim(self.param_dim(), p.len())?;
        self.loghyper.assign(p);
        self.update();
        Ok(())
    }

    fn get(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
        let z = self.scaled_squared_diffs(x1, x2).sum();
        self.sf2 * F::exp(F::cast(-0.5) * z)
    }

    fn grad(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> Array1<F> {
        let n = self.input_dim;
        let d2 = self.scaled_squared_diffs(x1, x2);
        let k = self.sf2 * F::exp(F::cast(-0.5) * d2.sum());
        let mut grad = Array1::zeros(n + 1);
        grad.slice_mut(s![..n]).assign(&d2.mapv(|v| k * v));
        grad[n] = F::cast(2.) * k;
        grad
    }
}

impl<F: Float> fmt::Display for SquaredExponentialArdCov<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CovSEard")
    }
}

/// Isotropic matern 3/2 covariance function
///
/// k(x1, x2) = sf2 * (1 + z) * exp(-z) with z = sqrt(3) * |x1 - x2| / ell
///
/// with log-hyperparameters `[ln(ell), ln(sf)]`
#[derive(Clone, Debug, PartialEq)]
pub struct Matern32IsoCov<F: Float> {
    input_dim: usize,
    loghyper: Array1<F>,
    ell: F,
    sf2: F,
}

impl<F: Float> Matern32IsoCov<F> {
    /// Constructor with zero log-hyperparameters
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            loghyper: Array1::zeros(2),
            ell: F::one(),
            sf2: F::one(),
        }
    }

    fn update(&mut self) {
        self.ell = F::exp(self.loghyper[0]);
        self.sf2 = F::exp(F::cast(2.) * self.loghyper[1]);
    }

    fn z(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
        F::cast(3.).sqrt() * squared_distance(x1, x2).sqrt() / self.ell
    }
}

impl<F: Float> CovarianceFunction<F> for Matern32IsoCov<F> {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn param_dim(&self) -> usize {
        2
    }

    fn loghyper(&self) -> Array1<F> {
        self.loghyper.to_owned()
    }

    fn set_loghyper(&mut self, p: &ArrayView1<F>) -> Result<()> {
        check_dim(self.param_dim(), p.len())?;
        self.loghyper.assign(p);
        self.update();
        Ok(())
    }

    fn get(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
        let z = self.z(x1, x2);
        self.sf2 * (F::one() + z) * F::exp(-z)
    }

    fn grad(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> Array1<F> {
        let z = self.z(x1, x2);
        let e = F::exp(-z);
        array![
            self.sf2 * z * z * e,
            F::cast(2.) * self.sf2 * (F::one() + z) * e
        ]
    }
}

impl<F: Float> fmt::Display for Matern32IsoCov<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CovMatern3iso")
    }
}

/// Isotropic matern 5/2 covariance function
///
/// k(x1, x2) = sf2 * (1 + z + z^2 / 3) * exp(-z) with z = sqrt(5) * |x1 - x2| / ell
///
/// with log-hyperparameters `[ln(ell), ln(sf)]`
#[derive(Clone, Debug, PartialEq)]
pub struct Matern52IsoCov<F: Float> {
    input_dim: usize,
    loghyper: Array1<F>,
    ell: F,
    sf2: F,
}

impl<F: Float> Matern52IsoCov<F> {
    /// Constructor with zero log-hyperparameters
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            loghyper: Array1::zeros(2),
            ell: F::one(),
            sf2: F::one(),
        }
    }

    fn update(&mut self) {
        self.ell = F::exp(self.loghyper[0]);
        self.sf2 = F::exp(F::cast(2.) * self.loghyper[1]);
    }

    fn z(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
        F::cast(5.).sqrt() * squared_distance(x1, x2).sqrt() / self.ell
    }
}

impl<F: Float> CovarianceFunction<F> for Matern52IsoCov<F> {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn param_dim(&self) -> usize {
        2
    }

    fn loghyper(&self) -> Array1<F> {
        self.loghyper.to_owned()
    }

    fn set_loghyper(&mut self, p: &ArrayView1<F>) -> Result<()> {
        check_dim(self.param_dim(), p.len())?;
        self.loghyper.assign(p);
        self.update();
        Ok(())
    }

    fn get(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
        let z = self.z(x1, x2);
        self.sf2 * (F::one() + z + z * z / F::cast(3.)) * F::exp(-z)
    }

    fn grad(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> Array1<F> {
        let z = self.z(x1, x2);
        let e = F::exp(-z);
        array![
            self.sf2 * (z * z + z * z * z) / F::cast(3.) * e,
            F::cast(2.) * self.sf2 * (F::one() + z + z * z / F::cast(3.)) * e
        ]
    }
}

impl<F: Float> fmt::Display for Matern52IsoCov<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CovMatern5iso")
    }
}

/// Isotropic rational quadratic covariance function
///
/// k(x1, x2) = sf2 * (1 + |x1 - x2|^2 / (2 * alpha * ell^2))^(-alpha)
///
/// with log-hyperparameters `[ln(ell), ln(sf), ln(alpha)]`
#[derive(Clone, Debug, PartialEq)]
pub struct RationalQuadraticIsoCov<F: Float> {
    input_dim: usize,
    loghyper: Array1<F>,
    ell2: F,
    sf2: F,
    alpha: F,
}

impl<F: Float> RationalQuadraticIsoCov<F> {
    /// Constructor with zero log-hyperparameters
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            loghyper: Array1::zeros(3),
            ell2: F::one(),
            sf2: F::one(),
            alpha: F::one(),
        }
    }

    fn update(&mut self) {
        self.ell2 = F::exp(F::cast(2.) * self.loghyper[0]);
        self.sf2 = F::exp(F::cast(2.) * self.loghyper[1]);
        self.alpha = F::exp(self.loghyper[2]);
    }
}

impl<F: Float> CovarianceFunction<F> for RationalQuadraticIsoCov<F> {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn param_dim(&self) -> usize {
        3
    }

    fn loghyper(&self) -> Array1<F> {
        self.loghyper.to_owned()
    }

    fn set_loghyper(&mut self, p: &ArrayView1<F>) -> Result<()> {
        check_dim(self.param_dim(), p.len())?;
        self.loghyper.assign(p);
        self.update();
        Ok(())
    }

    fn get(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
        let r2 = squared_distance(x1, x2);
        let u = F::one() + r2 / (F::cast(2.) * self.alpha * self.ell2);
        self.sf2 * u.powf(-self.alpha)
    }

    fn grad(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> Array1<F> {
        let r2 = squared_distance(x1, x2);
        let u = F::one() + r2 / (F::cast(2.) * self.alpha * self.ell2);
        let k = self.sf2 * u.powf(-self.alpha);
        array![
            k * r2 / (self.ell2 * u),
            F::cast(2.) * k,
            k * (r2 / (F::cast(2.) * self.ell2 * u) - self.alpha * u.ln())
        ]
    }
}

impl<F: Float> fmt::Display for RationalQuadraticIsoCov<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CovRQiso")
    }
}

/// Linear covariance function with automatic relevance determination
///
/// ```text
///              n
/// k(x1, x2) = sum x1_d * x2_d / ell_d^2
///             d=1
/// ```
///
/// with log-hyperparameters `[ln(ell_1), ..., ln(ell_n)]`
#[derive(Clone, Debug, PartialEq)]
pub struct LinearArdCov<F: Float> {
    input_dim: usize,
    loghyper: Array1<F>,
    inv_ell2: Array1<F>,
}

impl<F: Float> LinearArdCov<F> {
    /// Constructor with zero log-hyperparameters
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            loghyper: Array1::zeros(input_dim),
            inv_ell2: Array1::ones(input_dim),
        }
    }

    fn update(&mut self) {
        self.inv_ell2 = self.loghyper.mapv(|v| F::exp(F::cast(-2.) * v));
    }
}

impl<F: Float> CovarianceFunction<F> for LinearArdCov<F> {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn param_dim(&self) -> usize {
        self.input_dim
    }

    fn loghyper(&self) -> Array1<F> {
        self.loghyper.to_owned()
    }

    fn set_loghyper(&mut self, p: &ArrayView1<F>) -> Result<()> {
        check_dim(self.param_dim(), p.len())?;
        self.loghyper.assign(p);
        self.update();
        Ok(())
    }

    fn get(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
        (x1 * x2).dot(&self.inv_ell2)
    }

    fn grad(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> Array1<F> {
        let mut grad = x1 * x2;
        Zip::from(&mut grad)
            .and(&self.inv_ell2)
            .for_each(|g, inv_ell2| *g = F::cast(-2.) * *g * *inv_ell2);
        grad
    }
}

impl<F: Float> fmt::Display for LinearArdCov<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CovLinearard")
    }
}

/// Linear covariance function with bias
///
/// k(x1, x2) = (1 + x1.x2) / t^2
///
/// with log-hyperparameter `[ln(t)]`
#[derive(Clone, Debug, PartialEq)]
pub struct LinearOneCov<F: Float> {
    input_dim: usize,
    loghyper: Array1<F>,
    inv_t2: F,
}

impl<F: Float> LinearOneCov<F> {
    /// Constructor with zero log-hyperparameter
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            loghyper: Array1::zeros(1),
            inv_t2: F::one(),
        }
    }

    fn update(&mut self) {
        self.inv_t2 = F::exp(F::cast(-2.) * self.loghyper[0]);
    }
}

impl<F: Float> CovarianceFunction<F> for LinearOneCov<F> {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn param_dim(&self) -> usize {
        1
    }

    fn loghyper(&self) -> Array1<F> {
        self.loghyper.to_owned()
    }

    fn set_loghyper(&mut self, p: &ArrayView1<F>) -> Result<()> {
        check_dim(self.param_dim(), p.len())?;
        self.loghyper.assign(p);
        self.update();
        Ok(())
    }

    fn get(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
        self.inv_t2 * (F::one() + x1.dot(x2))
    }

    fn grad(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> Array1<F> {
        array![F::cast(-2.) * self.get(x1, x2)]
    }
}

impl<F: Float> fmt::Display for LinearOneCov<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CovLinearone")
    }
}

/// Independent noise covariance function
///
/// k(x1, x2) = sn2 if x1 and x2 are the same observation, 0 otherwise
///
/// with log-hyperparameter `[ln(sn)]`.
///
/// Noise only applies when both arguments refer to the same stored vector:
/// the diagonal of the kernel matrix and the prior variance `get(x, x)`
/// of a query point. A query point located at a training input but stored
/// elsewhere is not correlated with the training noise.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseCov<F: Float> {
    input_dim: usize,
    loghyper: Array1<F>,
    sn2: F,
}

impl<F: Float> NoiseCov<F> {
    /// Constructor with zero log-hyperparameter, i.e. sn2 = 1
    pub fn new(input_dim: usize) -> Self {
        Self {
            input_dim,
            loghyper: Array1::zeros(1),
            sn2: F::one(),
        }
    }

    fn update(&mut self) {
        self.sn2 = F::exp(F::cast(2.) * self.loghyper[0]);
    }
}

impl<F: Float> CovarianceFunction<F> for NoiseCov<F> {
    fn input_dim(&self) -> usize {
        self.input_dim
    }

    fn param_dim(&self) -> usize {
        1
    }

    fn loghyper(&self) -> Array1<F> {
        self.loghyper.to_owned()
    }

    fn set_loghyper(&mut self, p: &ArrayView1<F>) -> Result<()> {
        check_dim(self.param_dim(), p.len())?;
        self.loghyper.assign(p);
        self.update();
        Ok(())
    }

    fn get(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
        if same_observation(x1, x2) {
            self.sn2
        } else {
            F::zero()
        }
    }

    fn grad(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> Array1<F> {
        array![F::cast(2.) * self.get(x1, x2)]
    }
}

impl<F: Float> fmt::Display for NoiseCov<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CovNoise")
    }
}

fn check_compound<F: Float>(
    first: &dyn CovarianceFunction<F>,
    second: &dyn CovarianceFunction<F>,
) -> Result<()> {
    if first.input_dim() != second.input_dim() {
        return Err(GpError::InvalidValueError(format!(
            "Compound covariance functions should have the same input dimension, got {} ({}) and {} ({})",
            first,
            first.input_dim(),
            second,
            second.input_dim()
        )));
    }
    Ok(())
}

/// Split `p` between `first` and `second` covariances, `p` is expected to be already checked.
fn set_compound_loghyper<F: Float>(
    first: &mut dyn CovarianceFunction<F>,
    second: &mut dyn CovarianceFunction<F>,
    p: &ArrayView1<F>,
) -> Result<()> {
    let n1 = first.param_dim();
    first.set_loghyper(&p.slice(s![..n1]))?;
    second.set_loghyper(&p.slice(s![n1..]))
}

/// Sum of two covariance functions
///
/// k(x1, x2) = k1(x1, x2) + k2(x1, x2)
///
/// with log-hyperparameters of k1 followed by the ones of k2
#[derive(Debug)]
pub struct SumCov<F: Float> {
    first: Box<dyn CovarianceFunction<F>>,
    second: Box<dyn CovarianceFunction<F>>,
}

impl<F: Float> SumCov<F> {
    /// Constructor, both covariances should share the same input dimension
    pub fn new(
        first: Box<dyn CovarianceFunction<F>>,
        second: Box<dyn CovarianceFunction<F>>,
    ) -> Result<Self> {
        check_compound(first.as_ref(), second.as_ref())?;
        Ok(Self { first, second })
    }
}

impl<F: Float> CovarianceFunction<F> for SumCov<F> {
    fn input_dim(&self) -> usize {
        self.first.input_dim()
    }

    fn param_dim(&self) -> usize {
        self.first.param_dim() + self.second.param_dim()
    }

    fn loghyper(&self) -> Array1<F> {
        concatenate![Axis(0), self.first.loghyper(), self.second.loghyper()]
    }

    fn set_loghyper(&mut self, p: &ArrayView1<F>) -> Result<()> {
        check_dim(self.param_dim(), p.len())?;
        set_compound_loghyper(self.first.as_mut(), self.second.as_mut(), p)
    }

    fn get(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
        self.first.get(x1, x2) + self.second.get(x1, x2)
    }

    fn grad(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> Array1<F> {
        concatenate![Axis(0), self.first.grad(x1, x2), self.second.grad(x1, x2)]
    }
}

impl<F: Float> fmt::Display for SumCov<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CovSum({}, {})", self.first, self.second)
    }
}

/// Product of two covariance functions
///
/// k(x1, x2) = k1(x1, x2) * k2(x1, x2)
///
/// with log-hyperparameters of k1 followed by the ones of k2
#[derive(Debug)]
pub struct ProductCov<F: Float> {
    first: Box<dyn CovarianceFunction<F>>,
    second: Box<dyn CovarianceFunction<F>>,
}

impl<F: Float> ProductCov<F> {
    /// Constructor, both covariances should share the same input dimension
    pub fn new(
        first: Box<dyn CovarianceFunction<F>>,
        second: Box<dyn CovarianceFunction<F>>,
    ) -> Result<Self> {
        check_compound(first.as_ref(), second.as_ref())?;
        Ok(Self { first, second })
    }
}

impl<F: Float> CovarianceFunction<F> for ProductCov<F> {
    fn input_dim(&self) -> usize {
        self.first.input_dim()
    }

    fn param_dim(&self) -> usize {
        self.first.param_dim() + self.second.param_dim()
    }

    fn loghyper(&self) -> Array1<F> {
        concatenate![Axis(0), self.first.loghyper(), self.second.loghyper()]
    }

    fn set_loghyper(&mut self, p: &ArrayView1<F>) -> Result<()> {
        check_dim(self.param_dim(), p.len())?;
        set_compound_loghyper(self.first.as_mut(), self.second.as_mut(), p)
    }

    fn get(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> F {
        self.first.get(x1, x2) * self.second.get(x1, x2)
    }

    fn grad(&self, x1: &ArrayView1<F>, x2: &ArrayView1<F>) -> Array1<F> {
        let k1 = self.first.get(x1, x2);
        let k2 = self.second.get(x1, x2);
        // d(k1.k2) = dk1.k2 + k1.dk2
        let g1 = self.first.grad(x1, x2).mapv(|v| v * k2);
        let g2 = self.second.grad(x1, x2).mapv(|v| v * k1);
        concatenate![Axis(0), g1, g2]
    }
}

impl<F: Float> fmt::Display for ProductCov<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "CovProd({}, {})", self.first, self.second)
    }
}
