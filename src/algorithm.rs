use crate::covariance_factory::create_covariance;
use crate::covariance_functions::CovarianceFunction;
use crate::errors::{check_dim, GpError, Result};
use crate::parameters::{GpParams, GpValidParams};
use crate::sampleset::SampleSet;

use linfa::prelude::{DatasetBase, Fit, Float};
use linfa_linalg::{cholesky::*, triangular::*};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};

use log::{debug, warn};
use std::fmt;
use std::time::Instant;

/// Internal parameters computed from the sample set and the covariance
/// hyperparameters, used later on in prediction computations
#[derive(Debug)]
pub(crate) struct GpInnerParams<F: Float> {
    /// Cholesky decomposition of the kernel matrix \[K\] = L.Lt (lower triangular L)
    chol: Array2<F>,
    /// Solution of the linear equation system : \[K\] x alpha = y
    alpha: Array1<F>,
}

/// A GP regression model with a zero prior mean, governed by a prior covariance
/// function which depends on a set of log-hyperparameters.
///
/// Given `n` training samples `(x_i, y_i)` and a query point `x`, the posterior is:
///
/// `mean(x) = kstar.K^-1.y`
///
/// `var(x) = k(x, x) - kstar.K^-1.kstar`
///
/// where:
/// * `K` is the (n, n) kernel matrix `K_ij = k(x_i, x_j)`
/// * `kstar` the (n,) vector of covariances `k(x, x_i)` with training inputs
///
/// # Implementation
///
/// * Based on [ndarray](https://github.com/rust-ndarray/ndarray)
///   and [linfa](https://github.com/rust-ml/linfa)
/// * The covariance function is any [`CovarianceFunction`], usually built with
///   [`create_covariance`] from its textual definition, e.g. `CovSum(CovSEiso, CovNoise)`
/// * Training samples are appended with [`GaussianProcess::add_pattern`]. The Cholesky
///   decomposition of `K` is computed lazily on the next prediction and cached until samples
///   or hyperparameters change. Each recomputation is a full O(n^3) decomposition,
///   no incremental update is done.
/// * Only the lower triangle of `K` is evaluated, the covariance function being symmetric.
/// * The engine is not internally synchronized: mutating methods and predictions take
///   `&mut self`, wrap the model in a `Mutex` to share it between threads.
///
/// # Example
///
/// ```no_run
/// use egobox_gpr::GaussianProcess;
/// use ndarray::array;
///
/// let mut gp = GaussianProcess::<f64>::from_definition(1, "CovSum(CovSEiso, CovNoise)")
///     .expect("GP creation");
/// gp.set_loghyper(&array![0., 0., f64::ln(0.1)]).expect("valid hyperparameters");
/// gp.add_pattern(&array![0.0], 0.0).unwrap();
/// gp.add_pattern(&array![1.0], 0.8).unwrap();
/// gp.add_pattern(&array![2.0], 0.9).unwrap();
///
/// let (mean, var) = gp.predict_valvar(&array![1.5]).expect("GP prediction");
/// ```
#[derive(Debug)]
pub struct GaussianProcess<F: Float> {
    /// Dimension of training and query inputs
    input_dim: usize,
    /// Covariance function
    covf: Box<dyn CovarianceFunction<F>>,
    /// Training samples
    sampleset: SampleSet<F>,
    /// Cached factorization, `None` when outdated wrt samples or hyperparameters
    inner_params: Option<GpInnerParams<F>>,
}

impl<F: Float> fmt::Display for GaussianProcess<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "GP(covf={}, loghyper={}, samples={})",
            self.covf,
            self.covf.loghyper(),
            self.sampleset.len()
        )
    }
}

impl<F: Float> GaussianProcess<F> {
    /// Gp parameters contructor
    pub fn params(input_dim: usize, covariance: &str) -> GpParams<F> {
        GpParams::new(input_dim, covariance)
    }

    /// Constructor of an untrained GP of `input_dim` dimensional inputs
    /// given its covariance function
    pub fn new(input_dim: usize, covf: Box<dyn CovarianceFunction<F>>) -> Result<Self> {
        if input_dim == 0 {
            return Err(GpError::InvalidValueError(
                "Input dimension should be greater than 0".to_string(),
            ));
        }
        check_dim(input_dim, covf.input_dim())?;
        Ok(GaussianProcess {
            input_dim,
            covf,
            sampleset: SampleSet::new(input_dim),
            inner_params: None,
        })
    }

    /// Constructor of an untrained GP of `input_dim` dimensional inputs
    /// given the textual definition of its covariance function (see [`create_covariance`])
    pub fn from_definition(input_dim: usize, covariance: &str) -> Result<Self> {
        Self::new(input_dim, create_covariance(input_dim, covariance)?)
    }

    /// Add a training sample, fails if `x` has not `input_dim` components
    pub fn add_pattern(&mut self, x: &ArrayBase<impl Data<Elem = F>, Ix1>, y: F) -> Result<()> {
        self.sampleset.add(x, y)?;
        self.inner_params = None;
        Ok(())
    }

    /// Set the log-hyperparameters of the covariance function,
    /// fails if `p` has not `param_dim` components
    pub fn set_loghyper(&mut self, p: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<()> {
        self.covf.set_loghyper(&p.view())?;
        self.inner_params = None;
        Ok(())
    }

    /// Alias of [`GaussianProcess::set_loghyper`]
    pub fn set_params(&mut self, p: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<()> {
        self.set_loghyper(p)
    }

    /// Log-hyperparameters of the covariance function
    pub fn loghyper(&self) -> Array1<F> {
        self.covf.loghyper()
    }

    /// Dimension of inputs
    pub fn input_dim(&self) -> usize {
        self.input_dim
    }

    /// Number of hyperparameters of the covariance function
    pub fn param_dim(&self) -> usize {
        self.covf.param_dim()
    }

    /// Number of training samples
    pub fn sampleset_size(&self) -> usize {
        self.sampleset.len()
    }

    /// Training samples
    pub fn sampleset(&self) -> &SampleSet<F> {
        &self.sampleset
    }

    /// Covariance function
    pub fn covariance(&self) -> &dyn CovarianceFunction<F> {
        self.covf.as_ref()
    }

    /// Whether the cached factorization is up-to-date
    pub fn is_clean(&self) -> bool {
        self.inner_params.is_some()
    }

    /// Predict the output value at `x` point
    pub fn predict(&mut self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<F> {
        self.predict_with(x, false).map(|(mean, _)| mean)
    }

    /// Predict the variance at `x` point, `None` when there is no training sample
    pub fn predict_var(&mut self, x: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Result<Option<F>> {
        self.predict_with(x, true).map(|(_, var)| var)
    }

    /// Predict both output value and variance at `x` point
    pub fn predict_valvar(
        &mut self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
    ) -> Result<(F, Option<F>)> {
        self.predict_with(x, true)
    }

    /// Predict output value and optionally the variance at `x` point.
    ///
    /// Without training sample, the prior mean 0 is returned and the variance is not computed.
    /// The variance is returned as computed, it may be slightly negative
    /// depending on machine precision.
    ///
    /// Fails with [`GpError::NumericalError`] when the kernel matrix is not positive-definite,
    /// the factorization is then attempted again on next call.
    pub fn predict_with(
        &mut self,
        x: &ArrayBase<impl Data<Elem = F>, Ix1>,
        compute_variance: bool,
    ) -> Result<(F, Option<F>)> {
        check_dim(self.input_dim, x.len())?;
        if self.sampleset.is_empty() {
            return Ok((F::zero(), None));
        }
        let inner =
            cached_inner_params(&mut self.inner_params, self.covf.as_ref(), &self.sampleset)?;

        let x = x.view();
        // Compute covariances between x and training inputs
        let kstar = self
            .sampleset
            .iter()
            .map(|s| self.covf.get(&x, &s.x()))
            .collect::<Array1<F>>();
        let mean = kstar.dot(&inner.alpha);

        let var = if compute_variance {
            let v = inner
                .chol
                .solve_triangular(&kstar.insert_axis(Axis(1)), UPLO::Lower)?;
            Some(self.covf.get(&x, &x) - v.mapv(|v| v * v).sum())
        } else {
            None
        };
        Ok((mean, var))
    }

    /// Predict output values at n given `x` points of nx components specified as a (n, nx) matrix.
    /// Returns n scalar output values as a vector (n,).
    pub fn predict_values(&mut self, x: &ArrayBase<impl Data<Elem = F>, Ix2>) -> Result<Array1<F>> {
        self.predict_rows(x, false).map(|(mean, _)| mean)
    }

    /// Predict both output values and variances at n given `x` points of nx components
    /// specified as a (n, nx) matrix. Variances are `None` when there is no training sample.
    pub fn predict_valvar_values(
        &mut self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ) -> Result<(Array1<F>, Option<Array1<F>>)> {
        self.predict_rows(x, true)
    }

    fn predict_rows(
        &mut self,
        x: &ArrayBase<impl Data<Elem = F>, Ix2>,
        compute_variance: bool,
    ) -> Result<(Array1<F>, Option<Array1<F>>)> {
        check_dim(self.input_dim, x.ncols())?;
        let mut mean = Array1::zeros(x.nrows());
        let mut var = Array1::zeros(x.nrows());
        let mut with_var = compute_variance;
        for (i, xi) in x.rows().into_iter().enumerate() {
            let (m, v) = self.predict_with(&xi, compute_variance)?;
            mean[i] = m;
            match v {
                Some(v) => var[i] = v,
                None => with_var = false,
            }
        }
        Ok((mean, if with_var { Some(var) } else { None }))
    }

    /// Log marginal likelihood of the training samples given current hyperparameters
    ///
    /// `log p(y|X) = -1/2 y.alpha - sum(log(L_ii)) - n/2 log(2pi)`
    ///
    /// Returns 0 when there is no training sample.
    pub fn log_likelihood(&mut self) -> Result<F> {
        if self.sampleset.is_empty() {
            return Ok(F::zero());
        }
        let inner =
            cached_inner_params(&mut self.inner_params, self.covf.as_ref(), &self.sampleset)?;
        let n_obs = F::cast(self.sampleset.len());
        let half = F::cast(0.5);
        let y = self.sampleset.targets();
        // The determinant of K is equal to the squared product of
        // the diagonal elements of its Cholesky decomposition
        let half_logdet = inner.chol.diag().mapv(|v| v.ln()).sum();
        Ok(-half * y.dot(&inner.alpha)
            - half_logdet
            - half * n_obs * F::cast(2. * std::f64::consts::PI).ln())
    }

    /// Gradient of the log marginal likelihood with respect to the log-hyperparameters (param_dim,)
    ///
    /// `d log p(y|X) / d theta_k = 1/2 tr((alpha.alpha^T - K^-1) dK/dtheta_k)`
    ///
    /// Returns zeros when there is no training sample.
    pub fn log_likelihood_gradient(&mut self) -> Result<Array1<F>> {
        let param_dim = self.covf.param_dim();
        if self.sampleset.is_empty() {
            return Ok(Array1::zeros(param_dim));
        }
        let inner =
            cached_inner_params(&mut self.inner_params, self.covf.as_ref(), &self.sampleset)?;
        let n_obs = self.sampleset.len();
        // K^-1 = L^-T.L^-1
        let chol_inv = inner
            .chol
            .solve_triangular(&Array2::eye(n_obs), UPLO::Lower)?;
        let k_inv = chol_inv.t().dot(&chol_inv);

        let half = F::cast(0.5);
        let alpha = &inner.alpha;
        let mut grad = Array1::zeros(param_dim);
        for (i, si) in self.sampleset.iter().enumerate() {
            for (j, sj) in self.sampleset.iter().take(i + 1).enumerate() {
                let w = alpha[i] * alpha[j] - k_inv[[i, j]];
                // off-diagonal terms stand for both (i, j) and (j, i)
                let factor = if i == j { half * w } else { w };
                grad.scaled_add(factor, &self.covf.grad(&si.x(), &sj.x()));
            }
        }
        Ok(grad)
    }
}

/// Return the cached factorization, computing it first when outdated.
/// The cache is left empty on failure.
fn cached_inner_params<'a, F: Float>(
    cache: &'a mut Option<GpInnerParams<F>>,
    covf: &dyn CovarianceFunction<F>,
    sampleset: &SampleSet<F>,
) -> Result<&'a GpInnerParams<F>> {
    let inner = match cache.take() {
        Some(inner) => inner,
        None => compute_inner_params(covf, sampleset)?,
    };
    Ok(&*cache.insert(inner))
}

/// Compute the Cholesky decomposition of the kernel matrix of the `sampleset`
/// and the weights `alpha` of the predictor
fn compute_inner_params<F: Float>(
    covf: &dyn CovarianceFunction<F>,
    sampleset: &SampleSet<F>,
) -> Result<GpInnerParams<F>> {
    let now = Instant::now();
    let n_obs = sampleset.len();
    // Set up K, evaluating the lower triangle only
    let mut k_mx = Array2::<F>::zeros((n_obs, n_obs));
    for (i, si) in sampleset.iter().enumerate() {
        for (j, sj) in sampleset.iter().take(i + 1).enumerate() {
            let k = covf.get(&si.x(), &sj.x());
            k_mx[[i, j]] = k;
            k_mx[[j, i]] = k;
        }
    }
    if k_mx.iter().any(|v| !v.is_finite()) {
        warn!("Non finite values in the {n_obs}x{n_obs} kernel matrix");
        return Err(GpError::NumericalError(format!(
            "kernel matrix has non finite values with loghyper = {}",
            covf.loghyper()
        )));
    }
    let chol = k_mx.cholesky().map_err(|err| {
        warn!("Cholesky decomposition error of the {n_obs}x{n_obs} kernel matrix: {err}");
        GpError::NumericalError(format!(
            "kernel matrix is not positive-definite with loghyper = {} ({err})",
            covf.loghyper()
        ))
    })?;
    let y = sampleset.targets().insert_axis(Axis(1));
    let v = chol.solve_triangular(&y, UPLO::Lower)?;
    let alpha = chol
        .t()
        .solve_triangular_into(v, UPLO::Upper)?
        .remove_axis(Axis(1));
    if alpha.iter().any(|v| !v.is_finite()) {
        warn!("Non finite weights solving the {n_obs}x{n_obs} kernel system");
        return Err(GpError::NumericalError(format!(
            "kernel system has no finite solution with loghyper = {}",
            covf.loghyper()
        )));
    }
    debug!(
        "GP factorization with {} samples, elapsed = {:?}",
        n_obs,
        now.elapsed().as_millis()
    );
    Ok(GpInnerParams { chol, alpha })
}

impl<F: Float, D: Data<Elem = F>> Fit<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>, GpError>
    for GpValidParams<F>
{
    type Object = GaussianProcess<F>;

    /// Create a GP loaded with the dataset samples, the factorization
    /// is computed on first prediction
    fn fit(
        &self,
        dataset: &DatasetBase<ArrayBase<D, Ix2>, ArrayBase<D, Ix1>>,
    ) -> Result<Self::Object> {
        let x = dataset.records();
        let y = dataset.targets();
        check_dim(self.input_dim(), x.ncols())?;

        let mut gp = self.build()?;
        for (xi, yi) in x.rows().into_iter().zip(y.iter()) {
            gp.add_pattern(&xi, *yi)?;
        }
        Ok(gp)
    }
}
